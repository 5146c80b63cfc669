//! Attachment catalog (`attachmentmaster`) and per-claim submitted files
//! (`formattachments`).

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use super::{like_pattern, DatabaseError};

/// One required-document entry of the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRequirement {
    pub incident_type: String,
    pub attachment_type: String,
    pub mandatory: bool,
    pub folder_path: Option<String>,
}

/// A file submitted against a claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedFile {
    pub irn: i64,
    pub attachment_type: String,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
}

impl SubmittedFile {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            irn: row.get("IRN")?,
            attachment_type: row.get("AttachmentType")?,
            file_name: row.get("FileName")?,
            file_url: row.get("FileURL")?,
        })
    }
}

/// A claim matched by the attachment search, with its worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSubject {
    pub irn: i64,
    pub crn: String,
    pub worker_id: i64,
    pub worker_name: String,
    pub incident_type: String,
}

pub fn insert_requirement(
    conn: &Connection,
    req: &AttachmentRequirement,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO attachmentmaster (IncidentType, AttachmentType, Mandatory, FolderPath)
         VALUES (?1, ?2, ?3, ?4)",
        params![req.incident_type, req.attachment_type, req.mandatory, req.folder_path],
    )?;
    Ok(())
}

pub fn insert_file(conn: &Connection, file: &SubmittedFile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO formattachments (IRN, AttachmentType, FileName, FileURL)
         VALUES (?1, ?2, ?3, ?4)",
        params![file.irn, file.attachment_type, file.file_name, file.file_url],
    )?;
    Ok(())
}

/// Catalog entries for an incident type, in catalog order.
pub fn requirements_for(
    conn: &Connection,
    incident_type: &str,
) -> Result<Vec<AttachmentRequirement>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT IncidentType, AttachmentType, Mandatory, FolderPath FROM attachmentmaster
         WHERE IncidentType = ?1 ORDER BY AMID",
    )?;
    let rows = stmt
        .query_map(params![incident_type], |r| {
            Ok(AttachmentRequirement {
                incident_type: r.get(0)?,
                attachment_type: r.get(1)?,
                mandatory: r.get(2)?,
                folder_path: r.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn files_for(conn: &Connection, irn: i64) -> Result<Vec<SubmittedFile>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM formattachments WHERE IRN = ?1 ORDER BY FAID")?;
    let rows = stmt
        .query_map(params![irn], SubmittedFile::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Claims whose display code, worker first or last name, or full
/// `first last` name contains `term` (case-insensitive).
pub fn search_claims(conn: &Connection, term: &str) -> Result<Vec<ClaimSubject>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT f.IRN, COALESCE(f.DisplayIRN, CAST(f.IRN AS TEXT)), f.WorkerID,
                COALESCE(w.WorkerFirstName || ' ' || w.WorkerLastName, ''), f.IncidentType
         FROM form1112master f
         LEFT JOIN workerpersonaldetails w ON w.WorkerID = f.WorkerID
         WHERE f.DisplayIRN LIKE ?1 ESCAPE '\\'
            OR w.WorkerFirstName LIKE ?1 ESCAPE '\\'
            OR w.WorkerLastName LIKE ?1 ESCAPE '\\'
            OR (w.WorkerFirstName || ' ' || w.WorkerLastName) LIKE ?1 ESCAPE '\\'
         ORDER BY f.IRN",
    )?;
    let rows = stmt
        .query_map(params![like_pattern(term)], |r| {
            Ok(ClaimSubject {
                irn: r.get(0)?,
                crn: r.get(1)?,
                worker_id: r.get(2)?,
                worker_name: r.get(3)?,
                incident_type: r.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_requirements_filtered_by_incident_type() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            for (incident, kind) in [("Injury", "Medical Report"), ("Death", "Death Certificate")] {
                insert_requirement(
                    conn,
                    &AttachmentRequirement {
                        incident_type: incident.into(),
                        attachment_type: kind.into(),
                        mandatory: true,
                        folder_path: None,
                    },
                )?;
            }
            let reqs = requirements_for(conn, "Death")?;
            assert_eq!(reqs.len(), 1);
            assert_eq!(reqs[0].attachment_type, "Death Certificate");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_files_for_claim() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            insert_file(
                conn,
                &SubmittedFile {
                    irn: 1,
                    attachment_type: "Medical Report".into(),
                    file_name: Some("report.pdf".into()),
                    file_url: Some("attachments/1/report.pdf".into()),
                },
            )?;
            assert_eq!(files_for(conn, 1)?.len(), 1);
            assert!(files_for(conn, 2)?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_search_claims_matches_full_name() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "INSERT INTO workerpersonaldetails
                     (WorkerID, WorkerFirstName, WorkerLastName, WorkerDOB, WorkerGender)
                     VALUES (3, 'Ana', 'Pok', '1990-05-01', 'F');
                 INSERT INTO form1112master (IRN, DisplayIRN, WorkerID, IncidentType)
                     VALUES (30, 'CRN-0030', 3, 'Injury');",
            )?;
            for term in ["Ana Pok", "pok", "crn-0030"] {
                let hits = search_claims(conn, term)?;
                assert_eq!(hits.len(), 1, "term {:?}", term);
                assert_eq!(hits[0].worker_name, "Ana Pok");
            }
            assert!(search_claims(conn, "Pok Ana")?.is_empty());
            Ok(())
        })
        .unwrap();
    }
}
