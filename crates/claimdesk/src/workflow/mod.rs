//! Review workflows: locking a claim at a stage, presenting its context,
//! and committing a reviewer's decision.
//!
//! Every submission runs in one transaction. Certificates are produced
//! only after the decision has committed.

pub mod commissioner;
pub mod cpm;
pub mod decision;
pub mod registrar;

pub use commissioner::CommissionerRole;
pub use decision::{CertificateOutcome, Decision, DecisionOutcome, DecisionSubmission};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::certificate;
use crate::config::Config;
use crate::db::claim_repo::{self, ClaimRow, CompensationComponent};
use crate::db::review_repo::{self, LockAttempt, ReviewTable};
use crate::db::{worker_repo, Database};
use crate::error::{ClaimdeskError, Result, WorkflowError};
use crate::history::{self, DecisionRow, PaymentRecord};
use crate::session::Session;

/// The decision forms with a lockable review row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStage {
    CommissionerAward,
    RegistrarAward,
    Cpm,
}

impl ReviewStage {
    pub fn table(&self) -> ReviewTable {
        match self {
            Self::CommissionerAward => review_repo::AWARD_COMMISSIONER_REVIEW,
            Self::RegistrarAward => review_repo::AWARD_REGISTRAR_REVIEW,
            Self::Cpm => review_repo::CPM_REVIEW,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CommissionerAward => commissioner::STAGE,
            Self::RegistrarAward => registrar::STAGE,
            Self::Cpm => cpm::STAGE,
        }
    }

    pub fn decisions(&self) -> &'static [Decision] {
        match self {
            Self::CommissionerAward => commissioner::DECISIONS,
            Self::RegistrarAward => registrar::DECISIONS,
            Self::Cpm => cpm::DECISIONS,
        }
    }

    fn not_found(&self, irn: i64) -> WorkflowError {
        WorkflowError::NotFound {
            stage: self.label().to_string(),
            irn,
        }
    }
}

/// Everything a reviewer sees when a decision form opens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewContext {
    pub stage: ReviewStage,
    pub claim: ClaimRow,
    pub worker_name: String,
    pub decisions: Vec<DecisionRow>,
    pub payments: Vec<PaymentRecord>,
    pub components: Vec<CompensationComponent>,
    pub compensation_total: f64,
}

fn load_context(conn: &Connection, stage: ReviewStage, irn: i64) -> Result<ReviewContext> {
    let claim = claim_repo::find_by_irn(conn, irn)?.ok_or_else(|| stage.not_found(irn))?;
    let worker_name = worker_repo::find_personal(conn, claim.worker_id)?
        .map(|(p, _)| p.full_name())
        .unwrap_or_default();
    let components = claim_repo::list_components(conn, irn)?;
    let compensation_total: f64 = components.iter().map(|c| c.amount).sum();

    Ok(ReviewContext {
        stage,
        worker_name,
        decisions: history::claim_decisions(conn, irn)?,
        payments: history::claim_payments(conn, irn)?,
        components,
        compensation_total,
        claim,
    })
}

/// Fails unless `session` holds the stage lock for `irn`.
fn ensure_lock_owner(
    conn: &Connection,
    stage: ReviewStage,
    irn: i64,
    session: &Session,
) -> Result<()> {
    let table = stage.table();
    if review_repo::find_status(conn, &table, irn)?.is_none() {
        return Err(stage.not_found(irn).into());
    }
    if table.lock_column.is_some()
        && review_repo::lock_holder(conn, &table, irn)? != Some(session.staff_id)
    {
        return Err(WorkflowError::NotLockOwner {
            stage: stage.label().to_string(),
            irn,
            staff_id: session.staff_id,
        }
        .into());
    }
    Ok(())
}

#[derive(Clone)]
pub struct WorkflowService {
    db: Database,
    config: Config,
}

impl WorkflowService {
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    /// Takes the stage lock for the session and loads the review context.
    pub fn open_review(
        &self,
        stage: ReviewStage,
        irn: i64,
        session: &Session,
    ) -> Result<ReviewContext> {
        let _span =
            tracing::info_span!("workflow.open", stage = stage.label(), irn = irn).entered();

        self.db.with_transaction(|tx| {
            match review_repo::acquire_lock(tx, &stage.table(), irn, session.staff_id)? {
                LockAttempt::Acquired => {}
                LockAttempt::HeldBy(by) => {
                    return Err(ClaimdeskError::from(WorkflowError::Locked {
                        stage: stage.label().to_string(),
                        irn,
                        by,
                    }))
                }
                LockAttempt::Missing => return Err(stage.not_found(irn).into()),
            }
            load_context(tx, stage, irn)
        })
    }

    /// Releases the session's lock. Returns `false` when the row was not locked.
    pub fn release_review(&self, stage: ReviewStage, irn: i64, session: &Session) -> Result<bool> {
        let table = stage.table();
        self.db.with_transaction(|tx| {
            if review_repo::release_lock(tx, &table, irn, session.staff_id)? {
                return Ok(true);
            }
            match review_repo::lock_holder(tx, &table, irn)? {
                Some(_) => Err(ClaimdeskError::from(WorkflowError::NotLockOwner {
                    stage: stage.label().to_string(),
                    irn,
                    staff_id: session.staff_id,
                })),
                None => Ok(false),
            }
        })
    }

    /// Validates and commits a decision made at `stage` by the lock holder.
    pub fn submit(
        &self,
        stage: ReviewStage,
        irn: i64,
        session: &Session,
        submission: &DecisionSubmission,
    ) -> Result<DecisionOutcome> {
        let _span = tracing::info_span!(
            "workflow.submit",
            stage = stage.label(),
            irn = irn,
            decision = %submission.decision
        )
        .entered();

        submission.ensure_one_of(stage.label(), stage.decisions())?;
        if submission.decision == Decision::KeepOnHold {
            return Ok(DecisionOutcome::Closed);
        }
        let reason = submission.checked_reason()?;

        let status = self.db.with_transaction(|tx| {
            ensure_lock_owner(tx, stage, irn, session)?;
            match stage {
                ReviewStage::CommissionerAward => {
                    let role = CommissionerRole::for_session(session, &self.config);
                    commissioner::apply(tx, irn, role, submission, reason)
                }
                ReviewStage::RegistrarAward => registrar::apply(tx, irn, submission, reason),
                ReviewStage::Cpm => cpm::apply(tx, irn, submission, reason),
            }
        })?;
        log::info!(
            "Staff {} recorded '{}' on claim {} at {}",
            session.staff_id,
            status,
            irn,
            stage.label()
        );

        if stage == ReviewStage::RegistrarAward && submission.decision == Decision::Approved {
            let certificate = self.issue_award_certificate(irn);
            return Ok(DecisionOutcome::Awarded { status, certificate });
        }
        Ok(DecisionOutcome::Recorded { status })
    }

    fn issue_award_certificate(&self, irn: i64) -> CertificateOutcome {
        let result = self.db.with_conn(|conn| {
            Ok(certificate::generate_consent_of_award(
                conn,
                irn,
                &self.config,
                &self.config.assets.registrar,
                true,
            ))
        });
        match result {
            Ok(Ok(path)) => CertificateOutcome::Written(path),
            Ok(Err(e)) => {
                log::warn!("Certificate for claim {} failed: {}", irn, e);
                CertificateOutcome::Failed(e.to_string())
            }
            Err(e) => {
                log::warn!("Certificate for claim {} failed: {}", irn, e);
                CertificateOutcome::Failed(e.to_string())
            }
        }
    }
}
