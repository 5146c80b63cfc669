use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WorkflowError};

/// A reviewer's choice on a decision form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    DecisionPending,
    Reject,
    KeepOnHold,
    ReCheck,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Approved => "Approved",
            Decision::DecisionPending => "DecisionPending",
            Decision::Reject => "Reject",
            Decision::KeepOnHold => "KeepOnHold",
            Decision::ReCheck => "ReCheck",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSubmission {
    pub decision: Decision,
    #[serde(default)]
    pub reason: Option<String>,
    pub decided_on: NaiveDate,
}

impl DecisionSubmission {
    pub fn new(decision: Decision, reason: Option<&str>, decided_on: NaiveDate) -> Self {
        Self {
            decision,
            reason: reason.map(String::from),
            decided_on,
        }
    }

    /// Trimmed reason. Every writing decision except `Approved` needs one.
    pub(crate) fn checked_reason(&self) -> Result<Option<&str>, ValidationError> {
        let reason = self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
        if reason.is_none() && self.decision != Decision::Approved {
            return Err(ValidationError::MissingFields(vec!["Reason".to_string()]));
        }
        Ok(reason)
    }

    pub(crate) fn decision_date(&self) -> String {
        self.decided_on.format("%Y-%m-%d").to_string()
    }

    pub(crate) fn ensure_one_of(&self, stage: &str, allowed: &[Decision]) -> Result<(), WorkflowError> {
        if allowed.contains(&self.decision) {
            Ok(())
        } else {
            Err(WorkflowError::UnsupportedDecision {
                stage: stage.to_string(),
                decision: self.decision.to_string(),
            })
        }
    }
}

/// What happened to a certificate requested after an award was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "result", content = "value")]
pub enum CertificateOutcome {
    Written(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DecisionOutcome {
    /// The form closed without writing.
    Closed,
    /// A status was written at the reviewing stage.
    Recorded { status: String },
    /// The award was accepted; the decision is committed whatever the certificate outcome.
    Awarded {
        status: String,
        certificate: CertificateOutcome,
    },
}

impl DecisionOutcome {
    pub fn status(&self) -> Option<&str> {
        match self {
            DecisionOutcome::Closed => None,
            DecisionOutcome::Recorded { status } | DecisionOutcome::Awarded { status, .. } => {
                Some(status)
            }
        }
    }
}
