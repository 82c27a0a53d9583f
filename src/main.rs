use std::sync::Arc;
use std::time::Duration;

use ticket_triage::classifier::{ClassifierGateway, HttpClassifierClient};
use ticket_triage::config::{ClassifierConfig, TriageConfig};
use ticket_triage::notify::BroadcastNotifier;
use ticket_triage::store::MemoryStore;
use ticket_triage::triage::TriageProcessor;
use ticket_triage::webhooks::triage_routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Classifier provider settings from environment
    let api_key = std::env::var("CLASSIFIER_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: CLASSIFIER_API_KEY not set");
        eprintln!("  export CLASSIFIER_API_KEY=...");
        std::process::exit(1);
    });

    let endpoint = std::env::var("CLASSIFIER_URL").unwrap_or_else(|_| {
        eprintln!("Error: CLASSIFIER_URL not set");
        eprintln!("  export CLASSIFIER_URL=https://<provider>/v1/complete");
        std::process::exit(1);
    });

    let model =
        std::env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

    let classify_deadline: u64 = std::env::var("TRIAGE_CLASSIFY_DEADLINE_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(15);

    let port: u16 = std::env::var("TRIAGE_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let client = Arc::new(HttpClassifierClient::new(ClassifierConfig {
        endpoint,
        model: model.clone(),
        api_key: api_key.into(),
    }));

    let triage_config = TriageConfig {
        classify_deadline: Duration::from_secs(classify_deadline),
        ..TriageConfig::default()
    };

    let gateway = ClassifierGateway::new(client, triage_config);
    let store = MemoryStore::new();
    let notifier = BroadcastNotifier::new();
    let processor = Arc::new(TriageProcessor::new(
        gateway,
        store,
        Arc::clone(&notifier) as _,
    ));

    let app = triage_routes(processor, notifier);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    tracing::info!(port, model = %model, "Triage service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
