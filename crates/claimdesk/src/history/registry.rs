//! Declarative map from each review stage to the columns that feed the
//! common decision-history shape.

use rusqlite::types::Value;
use rusqlite::Connection;

use crate::db::review_repo::{self, ReviewTable};
use crate::db::DatabaseError;

/// How a stage's columns are read into a [`RawDecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    /// Status, reason and date come straight from the stage's columns.
    Standard,
    /// Reason, actor and date depend on which Form-18 status is present.
    Form18,
}

#[derive(Debug, Clone, Copy)]
pub struct StageMapping {
    pub submission_type: &'static str,
    pub table: ReviewTable,
    /// Column naming the region whose claims manager acts when the row is unlocked.
    pub region_column: Option<&'static str>,
    /// Shown as the actor when no staff member can be resolved.
    pub default_actor: &'static str,
    pub kind: MappingKind,
}

pub const STAGES: &[StageMapping] = &[
    StageMapping {
        submission_type: "Compensation Calculation",
        table: review_repo::CPO_REVIEW,
        region_column: None,
        default_actor: "Claims Processing Officer",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "CPM Review",
        table: review_repo::CPM_REVIEW,
        region_column: Some("RegionName"),
        default_actor: "Claims Processing Manager",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Compensation Commissioner Review",
        table: review_repo::CALCULATION_COMMISSIONER_REVIEW,
        region_column: None,
        default_actor: "Commissioner",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Compensation Registrar Review",
        table: review_repo::CALCULATION_REGISTRAR_REVIEW,
        region_column: None,
        default_actor: "Registrar",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Award Commissioner Review",
        table: review_repo::AWARD_COMMISSIONER_REVIEW,
        region_column: None,
        default_actor: "Commissioner",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Award Registrar Review",
        table: review_repo::AWARD_REGISTRAR_REVIEW,
        region_column: None,
        default_actor: "Registrar",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Time-barred Registrar Review",
        table: review_repo::TIMEBARRED_REGISTRAR_REVIEW,
        region_column: None,
        default_actor: "Registrar",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Tribunal Hearing",
        table: review_repo::TRIBUNAL_OUTCOME,
        region_column: None,
        default_actor: "Tribunal",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Form 6",
        table: review_repo::FORM6,
        region_column: None,
        default_actor: "Employer",
        kind: MappingKind::Standard,
    },
    StageMapping {
        submission_type: "Form 18",
        table: review_repo::FORM18,
        region_column: None,
        default_actor: "Employer",
        kind: MappingKind::Form18,
    },
];

const FORM18_COLUMNS: [&str; 6] = [
    "F18MStatus",
    "F18MEmployerDecisionReason",
    "F18MEmployerAcceptedDate",
    "F18MWorkerDecisionReason",
    "F18MWorkerAcceptedDate",
    "F18MWorkerNotifiedDate",
];

/// A stage row before staff names and display codes are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDecision {
    pub submission_type: &'static str,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub date_raw: Option<String>,
    pub locked_by: Option<i64>,
    pub region: Option<String>,
    /// Fixed actor label for this row, used when no staff name resolves.
    pub actor: String,
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl StageMapping {
    fn columns(&self) -> Vec<&'static str> {
        if self.kind == MappingKind::Form18 {
            return FORM18_COLUMNS.to_vec();
        }
        let t = &self.table;
        [
            Some(t.status_column),
            t.reason_column,
            t.date_column,
            t.lock_column,
            self.region_column,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Fetches and maps every row this stage holds for `irn`.
    pub fn load(&self, conn: &Connection, irn: i64) -> Result<Vec<RawDecision>, DatabaseError> {
        let columns = self.columns();
        let rows = review_repo::fetch_rows(conn, self.table.table, irn, &columns)?;
        Ok(rows
            .iter()
            .map(|values| match self.kind {
                MappingKind::Standard => self.map_standard(&columns, values),
                MappingKind::Form18 => self.map_form18(values),
            })
            .collect())
    }

    fn map_standard(&self, columns: &[&str], values: &[Value]) -> RawDecision {
        let get = |name: Option<&str>| {
            name.and_then(|n| columns.iter().position(|c| *c == n))
                .map(|i| &values[i])
        };
        RawDecision {
            submission_type: self.submission_type,
            status: get(Some(self.table.status_column)).and_then(text),
            reason: get(self.table.reason_column).and_then(text),
            date_raw: get(self.table.date_column).and_then(text),
            locked_by: get(self.table.lock_column).and_then(integer),
            region: get(self.region_column).and_then(text),
            actor: self.default_actor.to_string(),
        }
    }

    fn map_form18(&self, values: &[Value]) -> RawDecision {
        let status = text(&values[0]);
        let (reason, actor, date) = match status.as_deref() {
            Some("EmployerAccepted") => (text(&values[1]), "Employer", text(&values[2])),
            Some("WorkerAccepted") => (text(&values[3]), "Worker", text(&values[4])),
            Some("NotifiedToWorker") => (
                Some("Notified to worker".to_string()),
                "OWC",
                text(&values[5]),
            ),
            _ => (None, self.default_actor, None),
        };
        RawDecision {
            submission_type: self.submission_type,
            status,
            reason,
            date_raw: date,
            locked_by: None,
            region: None,
            actor: actor.to_string(),
        }
    }
}
