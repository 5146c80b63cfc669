//! Attachment completeness per claim: the required-document catalog for a
//! claim's incident type, joined against the files actually submitted.

mod export;

pub use export::{export_files_csv, export_pdf, export_summary_csv, files_csv, summary_csv};

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::attachment_repo::{self, AttachmentRequirement, ClaimSubject, SubmittedFile};
use crate::db::DatabaseError;

/// One catalog entry for one claim, with the files submitted against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentStatusRow {
    pub claim: ClaimSubject,
    pub attachment_type: String,
    pub mandatory: bool,
    pub folder_path: Option<String>,
    pub files: Vec<SubmittedFile>,
}

impl AttachmentStatusRow {
    pub fn submitted(&self) -> bool {
        !self.files.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub total_required: usize,
    pub mandatory_required: usize,
    pub total_submitted: usize,
    pub mandatory_submitted: usize,
    pub mandatory_missing: usize,
    pub total_missing: usize,
}

impl CompletionStats {
    pub fn from_rows(rows: &[AttachmentStatusRow]) -> Self {
        let mut stats = Self::default();
        for row in rows {
            stats.total_required += 1;
            if row.mandatory {
                stats.mandatory_required += 1;
            }
            if row.submitted() {
                stats.total_submitted += 1;
                if row.mandatory {
                    stats.mandatory_submitted += 1;
                }
            }
        }
        stats.mandatory_missing = stats.mandatory_required - stats.mandatory_submitted;
        stats.total_missing = stats.total_required - stats.total_submitted;
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentReport {
    pub rows: Vec<AttachmentStatusRow>,
    pub stats: CompletionStats,
}

/// Attachment types are compared trimmed and case-insensitively.
fn type_key(attachment_type: &str) -> String {
    attachment_type.trim().to_lowercase()
}

/// Joins one claim's catalog against its submitted files.
pub fn rows_for_claim(
    claim: &ClaimSubject,
    requirements: &[AttachmentRequirement],
    files: Vec<SubmittedFile>,
) -> Vec<AttachmentStatusRow> {
    let mut by_type: HashMap<String, Vec<SubmittedFile>> = HashMap::new();
    for file in files {
        by_type.entry(type_key(&file.attachment_type)).or_default().push(file);
    }
    requirements
        .iter()
        .map(|req| AttachmentStatusRow {
            claim: claim.clone(),
            attachment_type: req.attachment_type.clone(),
            mandatory: req.mandatory,
            folder_path: req.folder_path.clone(),
            files: by_type
                .get(&type_key(&req.attachment_type))
                .cloned()
                .unwrap_or_default(),
        })
        .collect()
}

/// Status rows and completion stats for every claim matching `term`
/// (CRN or worker name).
pub fn status(conn: &Connection, term: &str) -> Result<AttachmentReport, DatabaseError> {
    let _span = tracing::info_span!("attachments.status").entered();

    let claims = attachment_repo::search_claims(conn, term)?;
    let mut catalog: HashMap<String, Vec<AttachmentRequirement>> = HashMap::new();
    let mut rows = Vec::new();
    for claim in &claims {
        if !catalog.contains_key(&claim.incident_type) {
            let reqs = attachment_repo::requirements_for(conn, &claim.incident_type)?;
            catalog.insert(claim.incident_type.clone(), reqs);
        }
        let requirements = catalog
            .get(&claim.incident_type)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let files = attachment_repo::files_for(conn, claim.irn)?;
        rows.extend(rows_for_claim(claim, requirements, files));
    }

    let stats = CompletionStats::from_rows(&rows);
    log::debug!(
        "Attachment status for '{}': {} claims, {}/{} submitted",
        term,
        claims.len(),
        stats.total_submitted,
        stats.total_required
    );
    Ok(AttachmentReport { rows, stats })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::claim_repo::{self, ClaimRow};
    use crate::db::Database;

    pub(crate) fn subject() -> ClaimSubject {
        ClaimSubject {
            irn: 1,
            crn: "CRN-1".into(),
            worker_id: 10,
            worker_name: "Ana Pok".into(),
            incident_type: "Injury".into(),
        }
    }

    fn requirement(name: &str, mandatory: bool) -> AttachmentRequirement {
        AttachmentRequirement {
            incident_type: "Injury".into(),
            attachment_type: name.into(),
            mandatory,
            folder_path: Some(format!("injury/{}", name.to_lowercase())),
        }
    }

    fn file(kind: &str, name: &str) -> SubmittedFile {
        SubmittedFile {
            irn: 1,
            attachment_type: kind.into(),
            file_name: Some(name.into()),
            file_url: Some(format!("claims/1/{}", name)),
        }
    }

    pub(crate) fn sample_rows() -> Vec<AttachmentStatusRow> {
        let reqs: Vec<_> = (1..=5)
            .map(|i| requirement(&format!("Mandatory{}", i), true))
            .chain((1..=2).map(|i| requirement(&format!("Optional{}", i), false)))
            .collect();
        let files = vec![
            file(" mandatory1 ", "a.pdf"),
            file("MANDATORY2", "b.pdf"),
            file("Mandatory3", "c.pdf"),
            file("Mandatory3", "c2.pdf"),
            file("optional1", "d.pdf"),
            file("Optional2", "e.pdf"),
        ];
        rows_for_claim(&subject(), &reqs, files)
    }

    #[test]
    fn test_completion_stats() {
        let stats = CompletionStats::from_rows(&sample_rows());
        assert_eq!(
            stats,
            CompletionStats {
                total_required: 7,
                mandatory_required: 5,
                total_submitted: 5,
                mandatory_submitted: 3,
                mandatory_missing: 2,
                total_missing: 2,
            }
        );
    }

    #[test]
    fn test_type_key_normalizes() {
        let rows = sample_rows();
        assert_eq!(rows[2].files.len(), 2);
        assert!(rows[0].submitted());
        assert!(!rows[4].submitted());
    }

    #[test]
    fn test_status_from_database() {
        let db = Database::open_in_memory().unwrap();
        let report = db
            .with_conn(|conn| {
                claim_repo::insert(
                    conn,
                    &ClaimRow {
                        irn: 1,
                        display_irn: Some("CRN-1".into()),
                        worker_id: 10,
                        incident_type: "Injury".into(),
                        ..Default::default()
                    },
                )?;
                attachment_repo::insert_requirement(conn, &requirement("Medical Report", true))?;
                attachment_repo::insert_requirement(conn, &requirement("Photo", false))?;
                attachment_repo::insert_file(conn, &file("medical report", "m.pdf"))?;
                status(conn, "crn-1")
            })
            .unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.stats.mandatory_missing, 0);
        assert_eq!(report.stats.total_missing, 1);
    }
}
