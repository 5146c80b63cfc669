//! Claims Processing Manager review of a calculated death or injury claim.

use rusqlite::types::Value;
use rusqlite::Connection;

use crate::db::review_repo::{self, CPM_REVIEW, CPO_REVIEW, FORM18, FORM6};
use crate::db::{claim_repo, worker_repo};
use crate::error::{ClaimdeskError, WorkflowError};

use super::decision::{Decision, DecisionSubmission};

pub const STAGE: &str = "CPM review";

pub const DECISIONS: &[Decision] = &[
    Decision::Approved,
    Decision::ReCheck,
    Decision::Reject,
    Decision::KeepOnHold,
];

/// Status the CPO stage is returned to on a recheck.
pub const RECALCULATE: &str = "CompensationReCalculate";

pub fn status_for(decision: Decision) -> Option<&'static str> {
    match decision {
        Decision::Approved => Some("Approved"),
        Decision::ReCheck => Some("Recheck"),
        Decision::Reject => Some("Rejected"),
        Decision::DecisionPending | Decision::KeepOnHold => None,
    }
}

fn not_found(stage: &str, irn: i64) -> ClaimdeskError {
    WorkflowError::NotFound {
        stage: stage.to_string(),
        irn,
    }
    .into()
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
        &CPM_REVIEW,
        irn,
        status,
        reason,
        &submission.decision_date(),
    )?;
    if written == 0 {
        return Err(not_found(STAGE, irn));
    }

    match submission.decision {
        Decision::Approved => open_employer_form(conn, irn)?,
        Decision::ReCheck => {
            if review_repo::set_status(conn, &CPO_REVIEW, irn, RECALCULATE)? == 0 {
                return Err(not_found(CPO_REVIEW.table, irn));
            }
        }
        _ => {}
    }
    Ok(status.to_string())
}

/// Opens Form 6 (death) or Form 18 (injury) for the worker's current employer.
fn open_employer_form(conn: &Connection, irn: i64) -> Result<(), ClaimdeskError> {
    let claim = claim_repo::find_by_irn(conn, irn)?.ok_or_else(|| not_found("form1112master", irn))?;
    let employer = worker_repo::find_employment(conn, claim.worker_id)?
        .and_then(|e| e.employer_cppsid)
        .filter(|c| !c.trim().is_empty())
        .ok_or(WorkflowError::MissingEmployer {
            worker_id: claim.worker_id,
        })?;

    let form = match claim.incident_type.as_str() {
        "Death" => FORM6,
        "Injury" => FORM18,
        other => {
            log::warn!("Claim {} has incident type '{}'; no employer form opened", irn, other);
            return Ok(());
        }
    };
    let outcome = review_repo::upsert_fields(
        conn,
        form.table,
        irn,
        &[
            ("IncidentType", Value::Text(claim.incident_type.clone())),
            ("EmployerCPPSID", Value::Text(employer)),
            (form.status_column, Value::Text("Pending".to_string())),
        ],
    )?;
    log::info!("Opened {} for claim {} ({:?})", form.table, irn, outcome);
    Ok(())
}
