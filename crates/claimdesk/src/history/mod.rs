//! Claim decision history: every review stage's outcome for one claim,
//! reshaped into a single chronologically ordered list.

mod registry;

pub use registry::{MappingKind, RawDecision, StageMapping, STAGES};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{claim_repo, payment_repo, staff_repo, DatabaseError};

/// One decision taken on a claim at some stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRow {
    pub irn: i64,
    pub display_irn: String,
    pub submission_type: String,
    pub status: String,
    pub reason: Option<String>,
    pub taken_by: String,
    /// `dd/mm/yyyy`, empty when the stored date does not parse.
    pub decision_date: String,
    pub decision_date_raw: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssuedBy {
    #[serde(rename = "Insurance Provider")]
    InsuranceProvider,
    #[serde(rename = "OWC Trust")]
    OwcTrust,
}

impl IssuedBy {
    pub fn label(&self) -> &'static str {
        match self {
            IssuedBy::InsuranceProvider => "Insurance Provider",
            IssuedBy::OwcTrust => "OWC Trust",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub issued_by: IssuedBy,
    pub reference: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
}

/// Parses the date formats the stage tables hold into epoch milliseconds.
pub fn parse_decision_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Calendar day as written; offset timestamps keep their own local date.
fn decision_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn format_decision_date(raw: Option<&str>) -> String {
    raw.and_then(decision_day)
        .map(|day| day.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Stable ascending sort on the parsed date; rows without one come first.
pub fn sort_decisions(rows: &mut [DecisionRow]) {
    rows.sort_by_key(|row| row.decision_date_raw.as_deref().and_then(parse_decision_date));
}

/// Loads every stage's decision for `irn`, resolves who took it, and returns
/// the rows oldest first.
pub fn claim_decisions(conn: &Connection, irn: i64) -> Result<Vec<DecisionRow>, DatabaseError> {
    let mut raw = Vec::new();
    for stage in STAGES {
        raw.extend(stage.load(conn, irn)?);
    }

    let lock_ids: Vec<i64> = raw.iter().filter_map(|r| r.locked_by).collect();
    let staff_names = staff_repo::names_by_ids(conn, &lock_ids)?;
    let managers = if raw.iter().any(|r| r.locked_by.is_none() && r.region.is_some()) {
        staff_repo::region_managers(conn)?
    } else {
        Default::default()
    };
    let display = claim_repo::display_irns(conn, &[irn])?;
    let display_irn = display.get(&irn).cloned().unwrap_or_else(|| irn.to_string());

    let mut rows: Vec<DecisionRow> = raw
        .into_iter()
        .map(|r| {
            let taken_by = r
                .locked_by
                .and_then(|id| staff_names.get(&id).cloned())
                .or_else(|| {
                    r.region
                        .as_ref()
                        .filter(|_| r.locked_by.is_none())
                        .and_then(|region| managers.get(region).cloned())
                })
                .unwrap_or(r.actor);
            DecisionRow {
                irn,
                display_irn: display_irn.clone(),
                submission_type: r.submission_type.to_string(),
                status: r.status.unwrap_or_default(),
                reason: r.reason,
                taken_by,
                decision_date: format_decision_date(r.date_raw.as_deref()),
                decision_date_raw: r.date_raw,
            }
        })
        .collect();

    sort_decisions(&mut rows);
    log::debug!("Loaded {} decisions for claim {}", rows.len(), irn);
    Ok(rows)
}

/// The insurer deposit and trust cheque recorded for `irn`, at most one each.
pub fn claim_payments(conn: &Connection, irn: i64) -> Result<Vec<PaymentRecord>, DatabaseError> {
    let mut payments = Vec::new();
    let sources = [
        (IssuedBy::InsuranceProvider, payment_repo::first_bank_deposit(conn, irn)?),
        (IssuedBy::OwcTrust, payment_repo::first_cheque(conn, irn)?),
    ];
    for (issued_by, row) in sources {
        if let Some(row) = row {
            payments.push(PaymentRecord {
                issued_by,
                reference: row.reference,
                amount: row.amount,
                date: row.date,
            });
        }
    }
    Ok(payments)
}
