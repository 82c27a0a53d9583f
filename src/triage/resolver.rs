//! Triage resolver — merges raw classifier output with enforcement
//! rules into the final classification.
//!
//! Pure function of its inputs: no I/O, no hidden state, deterministic.
//! Each enforcement step may override fields set by the previous one;
//! spam enforcement overrides everything.

use tracing::warn;

use crate::classifier::types::{DepartmentReview, RawClassification, RouteDecision};
use crate::ticket::model::{ActiveIncidentRef, Classification, Priority, TicketRole};

/// Resolve a raw classification against the active-incident context and
/// an optional department review.
///
/// Enforcement order:
/// 1. spam override (skips everything below)
/// 2. completeness check
/// 3. duplicate/swarm linkage, verified against `active_incidents`
/// 4. department revalidation
/// 5. human-handoff narrative passthrough
pub fn resolve(
    raw: RawClassification,
    active_incidents: &[ActiveIncidentRef],
    review: Option<DepartmentReview>,
) -> Classification {
    let mut resolved = Classification {
        summary: raw.summary,
        category: raw.category,
        priority: raw.priority,
        department: raw.department,
        department_confidence: 100,
        ai_rerouted: false,
        flagged_for_review: false,
        sentiment: raw.sentiment,
        is_spam: raw.is_spam,
        spam_reason: None,
        is_duplicate: false,
        parent_incident_id: None,
        similarity_score: 0,
        swarm_reason: None,
        ticket_role: TicketRole::Primary,
        is_complete: true,
        clarification_question: None,
        is_active: true,
        handoff_summary: raw.handoff_summary,
        ai_attempts: raw.ai_attempts,
        next_best_action: raw.next_best_action,
    };

    // Step 1: spam enforcement. Overrides every other field, no matter
    // what the classifier proposed. Spam never enters duplicate or
    // completeness processing.
    if raw.is_spam {
        resolved.priority = Priority::None;
        resolved.department = None;
        resolved.sentiment = None;
        resolved.is_active = false;
        resolved.spam_reason = raw.spam_reason;
        return resolved;
    }

    // Step 2: completeness. An incomplete claim is only honored when the
    // classifier actually supplied something to ask the user.
    if !raw.is_complete {
        match raw
            .clarification_question
            .filter(|q| !q.trim().is_empty())
        {
            Some(question) => {
                resolved.is_complete = false;
                resolved.clarification_question = Some(question);
            }
            None => {
                warn!("Incomplete claim without a clarification question — dropping claim");
            }
        }
    }

    // Step 3: duplicate linkage. The parent must come from the active
    // set supplied in this call; an unverifiable foreign-key claim is a
    // classifier inconsistency and is discarded.
    if raw.is_duplicate {
        match raw.parent_incident_id {
            Some(parent_id)
                if active_incidents
                    .iter()
                    .any(|incident| incident.incident_id == parent_id) =>
            {
                resolved.is_duplicate = true;
                resolved.parent_incident_id = Some(parent_id);
                resolved.ticket_role = TicketRole::Follower;
                resolved.similarity_score = raw.similarity_score.min(100);
                resolved.swarm_reason = raw.swarm_reason;
            }
            claimed => {
                warn!(
                    claimed_parent = claimed.as_deref().unwrap_or("<none>"),
                    "Duplicate claim against unknown incident — dropping claim"
                );
            }
        }
    }

    // Step 4: department revalidation.
    if let Some(review) = review {
        match review.action {
            RouteDecision::Reroute => match review.correct_department {
                Some(department) => {
                    resolved.department = Some(department);
                    resolved.ai_rerouted = true;
                    resolved.department_confidence = review.confidence_pct();
                }
                None => {
                    warn!("Reroute decision without a target department — keeping original");
                }
            },
            RouteDecision::FlagForHuman => {
                resolved.flagged_for_review = true;
                resolved.department_confidence = review.confidence_pct();
            }
            RouteDecision::Keep => {}
        }
    }

    resolved
}
