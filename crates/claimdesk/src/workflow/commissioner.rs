//! Chief-Commissioner / Commissioner review of an injury award.

use rusqlite::types::Value;
use rusqlite::Connection;

use crate::config::Config;
use crate::db::review_repo::{self, AWARD_COMMISSIONER_REVIEW, AWARD_REGISTRAR_REVIEW};
use crate::error::{ClaimdeskError, WorkflowError};
use crate::session::Session;

use super::decision::{Decision, DecisionSubmission};

pub const STAGE: &str = "Commissioner award review";

pub const DECISIONS: &[Decision] = &[
    Decision::Approved,
    Decision::DecisionPending,
    Decision::Reject,
    Decision::KeepOnHold,
];

/// Status written to the registrar row when a commissioner accepts.
pub const REGISTRAR_PENDING: &str = "RegistrarReviewPending";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionerRole {
    ChiefCommissioner,
    Commissioner,
}

impl CommissionerRole {
    pub fn for_session(session: &Session, config: &Config) -> Self {
        if session.staff_id == config.chief_commissioner_staff_id {
            Self::ChiefCommissioner
        } else {
            Self::Commissioner
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChiefCommissioner => "ChiefCommissioner",
            Self::Commissioner => "Commissioner",
        }
    }

    pub fn status_for(&self, decision: Decision) -> Option<String> {
        let suffix = match decision {
            Decision::Approved => "Accepted",
            Decision::Reject => "Rejected",
            Decision::DecisionPending => "ReviewPending",
            Decision::KeepOnHold | Decision::ReCheck => return None,
        };
        Some(format!("{}{}", self.as_str(), suffix))
    }
}

/// Writes the commissioner decision and, on approval, queues the claim for
/// the registrar. Returns the status written.
pub(crate) fn apply(
    conn: &Connection,
    irn: i64,
    role: CommissionerRole,
    submission: &DecisionSubmission,
    reason: Option<&str>,
) -> Result<String, ClaimdeskError> {
    let status = role
        .status_for(submission.decision)
        .ok_or_else(|| WorkflowError::UnsupportedDecision {
            stage: STAGE.to_string(),
            decision: submission.decision.to_string(),
        })?;

    let written = review_repo::record_decision(
        conn,
        &AWARD_COMMISSIONER_REVIEW,
        irn,
        &status,
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

    if submission.decision == Decision::Approved {
        let carried = review_repo::fetch_rows(
            conn,
            AWARD_COMMISSIONER_REVIEW.table,
            irn,
            &["IncidentType", "ClaimType"],
        )?
        .into_iter()
        .next()
        .unwrap_or_else(|| vec![Value::Null, Value::Null]);
        let mut carried = carried.into_iter();
        let incident_type = carried.next().unwrap_or(Value::Null);
        let claim_type = carried.next().unwrap_or(Value::Null);

        let outcome = review_repo::upsert_fields(
            conn,
            AWARD_REGISTRAR_REVIEW.table,
            irn,
            &[
                ("IncidentType", incident_type),
                ("ClaimType", claim_type),
                (
                    AWARD_REGISTRAR_REVIEW.status_column,
                    Value::Text(REGISTRAR_PENDING.to_string()),
                ),
            ],
        )?;
        log::info!("Claim {} queued for registrar review ({:?})", irn, outcome);
    }

    Ok(status)
}
