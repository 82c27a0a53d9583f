//! Inbound transport — webhook endpoints and the WebSocket event feed.
//!
//! The transport validates payloads (non-empty sender/text) before the
//! triage core ever runs, so the pipeline can assume clean input. Ticket
//! events fan out to WebSocket clients via the broadcast notifier.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::notify::BroadcastNotifier;
use crate::ticket::model::{InboundMessage, Ticket, TicketSource};
use crate::triage::TriageProcessor;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<TriageProcessor>,
    pub notifier: Arc<BroadcastNotifier>,
}

/// Build the Axum router with webhook and event-feed routes.
pub fn triage_routes(processor: Arc<TriageProcessor>, notifier: Arc<BroadcastNotifier>) -> Router {
    let state = AppState {
        processor,
        notifier,
    };

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route("/webhooks/chat", post(chat_webhook))
        .route("/webhooks/email", post(email_webhook))
        .route("/webhooks/intake", post(intake_webhook))
        .route("/tickets/{id}", get(get_ticket))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ticket-triage"
    }))
}

// ── Webhook payloads ────────────────────────────────────────────────

/// Chat webhook body. Alternate field names from upstream bots are
/// accepted as aliases.
#[derive(Debug, Deserialize)]
struct ChatPayload {
    #[serde(alias = "from")]
    sender: Option<String>,
    #[serde(alias = "body")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailPayload {
    #[serde(alias = "from", alias = "email")]
    sender: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(alias = "message", alias = "description")]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntakePayload {
    sender: Option<String>,
    message: Option<String>,
    source: Option<String>,
}

fn bad_request(detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "detail": detail })),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ── Webhook handlers ────────────────────────────────────────────────

async fn chat_webhook(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> impl IntoResponse {
    let Some(sender) = non_empty(payload.sender) else {
        return bad_request("Missing sender").into_response();
    };
    let Some(text) = non_empty(payload.message) else {
        return bad_request("Missing message").into_response();
    };

    triage(
        &state,
        InboundMessage {
            source: TicketSource::Chat,
            sender,
            text,
        },
    )
    .await
    .into_response()
}

async fn email_webhook(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> impl IntoResponse {
    let sender =
        non_empty(payload.sender).unwrap_or_else(|| "Unknown Email Sender".to_string());
    let Some(body) = non_empty(payload.body) else {
        return bad_request("Missing email body").into_response();
    };
    let subject = non_empty(payload.subject).unwrap_or_default();

    // Fold subject and body into one classifiable text.
    let text = format!("Subject: {subject}\n\nBody: {body}");

    triage(
        &state,
        InboundMessage {
            source: TicketSource::Email,
            sender,
            text,
        },
    )
    .await
    .into_response()
}

async fn intake_webhook(
    State(state): State<AppState>,
    Json(payload): Json<IntakePayload>,
) -> impl IntoResponse {
    let sender = non_empty(payload.sender).unwrap_or_else(|| "Web User".to_string());
    let Some(text) = non_empty(payload.message) else {
        return bad_request("Missing message").into_response();
    };

    // Unknown source strings fall back to Web.
    let source = payload
        .source
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(TicketSource::Web);

    triage(&state, InboundMessage { source, sender, text })
        .await
        .into_response()
}

/// Run the pipeline and shape the HTTP response.
async fn triage(
    state: &AppState,
    message: InboundMessage,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.processor.process(message).await {
        Ok(ticket) => (StatusCode::OK, Json(success_response(&ticket))),
        Err(e) => {
            warn!(error = %e, "Triage request failed at storage");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "detail": format!("Ticket could not be created: {e}") })),
            )
        }
    }
}

fn success_response(ticket: &Ticket) -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "ticket_id": ticket.ticket_id,
        "classification": ticket.classification,
        "ticket_status": ticket.status,
        "acknowledgment_message": format!(
            "Hello! We've received your request (ID: {}). Category: {}, Priority: {:?}. \
             An agent will review it shortly.",
            ticket.ticket_id, ticket.classification.category, ticket.classification.priority
        ),
    })
}

// ── Ticket read-back ────────────────────────────────────────────────

async fn get_ticket(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.processor.store().get(&id).await {
        Ok(Some(ticket)) => (StatusCode::OK, Json(serde_json::to_value(&ticket).unwrap_or_default()))
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Ticket not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": e.to_string() })),
        )
            .into_response(),
    }
}

// ── WebSocket event feed ────────────────────────────────────────────

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.notifier))
}

async fn handle_socket(socket: WebSocket, notifier: Arc<BroadcastNotifier>) {
    info!("WebSocket client connected");
    let mut rx = notifier.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let Ok(json) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            debug!("WebSocket client gone — closing feed");
                            break;
                        }
                    }
                    // Slow client fell behind the broadcast buffer; keep going.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "WebSocket client lagged behind event feed");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(_)) => {} // feed is one-way; ignore client chatter
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
        }
    }
}
