//! Registrar review of an awarded claim. Acceptance ends the award path.

use rusqlite::Connection;

use crate::db::review_repo::{self, AWARD_REGISTRAR_REVIEW};
use crate::error::{ClaimdeskError, WorkflowError};

use super::decision::{Decision, DecisionSubmission};

pub const STAGE: &str = "Registrar award review";

pub const DECISIONS: &[Decision] = &[
    Decision::Approved,
    Decision::DecisionPending,
    Decision::Reject,
    Decision::KeepOnHold,
];

pub fn status_for(decision: Decision) -> Option<&'static str> {
    match decision {
        Decision::Approved => Some("RegistrarAccepted"),
        Decision::Reject => Some("RegistrarRejected"),
        Decision::DecisionPending => Some("RegistrarReviewPending"),
        Decision::KeepOnHold | Decision::ReCheck => None,
    }
}

pub(crate) fn apply(
    conn: &Connection,
    irn: i64,
    submission: &DecisionSubmission,
    reason: Option<&str>,
) -> Result<String, ClaimdeskError> {
    let status = status_for(submission.decision).ok_or_else(|| WorkflowError::UnsupportedDecision {
        stage: STAGE.to_string(),
        decision: submission.decision.to_string(),
    })?;
    let written = review_repo::record_decision(
        conn,
        &AWARD_REGISTRAR_REVIEW,
        irn,
        status,
        reason,
        &submission.decision_date(),
    )?;
    if written == 0 {
        return Err(WorkflowError::NotFound {
            stage: STAGE.to_string(),
            irn,
        }
        .into());
    }
    Ok(status.to_string())
}
