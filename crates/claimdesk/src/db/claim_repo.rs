//! Claim repository: `form1112master` rows and their compensation components.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::DatabaseError;

/// A claim intake row. `IRN` is the opaque incident reference number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRow {
    pub irn: i64,
    pub display_irn: Option<String>,
    pub worker_id: i64,
    /// `Injury` or `Death`.
    pub incident_type: String,
    /// `Form11` or `Form12`.
    pub claim_type: Option<String>,
    pub incident_date: Option<String>,
    pub incident_location: Option<String>,
    pub incident_province: Option<String>,
    pub incident_region: Option<String>,
    pub nature_extent_injury: Option<String>,
    pub injury_cause: Option<String>,
}

impl ClaimRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            irn: row.get("IRN")?,
            display_irn: row.get("DisplayIRN")?,
            worker_id: row.get("WorkerID")?,
            incident_type: row.get("IncidentType")?,
            claim_type: row.get("ClaimType")?,
            incident_date: row.get("IncidentDate")?,
            incident_location: row.get("IncidentLocation")?,
            incident_province: row.get("IncidentProvince")?,
            incident_region: row.get("IncidentRegion")?,
            nature_extent_injury: row.get("NatureExtentInjury")?,
            injury_cause: row.get("InjuryCause")?,
        })
    }

    /// Human-readable claim code, falling back to the raw IRN.
    pub fn display_code(&self) -> String {
        self.display_irn
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| self.irn.to_string())
    }
}

pub fn insert(conn: &Connection, claim: &ClaimRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO form1112master (IRN, DisplayIRN, WorkerID, IncidentType, ClaimType,
         IncidentDate, IncidentLocation, IncidentProvince, IncidentRegion, NatureExtentInjury,
         InjuryCause) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            claim.irn,
            claim.display_irn,
            claim.worker_id,
            claim.incident_type,
            claim.claim_type,
            claim.incident_date,
            claim.incident_location,
            claim.incident_province,
            claim.incident_region,
            claim.nature_extent_injury,
            claim.injury_cause,
        ],
    )?;
    Ok(())
}

pub fn find_by_irn(conn: &Connection, irn: i64) -> Result<Option<ClaimRow>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT * FROM form1112master WHERE IRN = ?1",
            params![irn],
            ClaimRow::from_row,
        )
        .optional()?)
}

/// Batch lookup of `IRN -> DisplayIRN`. Claims without a display code are absent.
pub fn display_irns(conn: &Connection, irns: &[i64]) -> Result<HashMap<i64, String>, DatabaseError> {
    if irns.is_empty() {
        return Ok(HashMap::new());
    }
    let placeholders = vec!["?"; irns.len()].join(", ");
    let sql = format!(
        "SELECT IRN, DisplayIRN FROM form1112master WHERE IRN IN ({}) AND DisplayIRN IS NOT NULL",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(irns.iter()), |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(rows)
}

/// One line of a claim's compensation breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationComponent {
    pub component: String,
    pub amount: f64,
}

pub fn insert_component(
    conn: &Connection,
    irn: i64,
    component: &str,
    amount: f64,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO claimcompensationdetails (IRN, CCDComponent, CCDAmount) VALUES (?1, ?2, ?3)",
        params![irn, component, amount],
    )?;
    Ok(())
}

pub fn list_components(
    conn: &Connection,
    irn: i64,
) -> Result<Vec<CompensationComponent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT CCDComponent, CCDAmount FROM claimcompensationdetails WHERE IRN = ?1 ORDER BY CCDID",
    )?;
    let rows = stmt
        .query_map(params![irn], |r| {
            Ok(CompensationComponent {
                component: r.get(0)?,
                amount: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn claim(irn: i64, display: Option<&str>) -> ClaimRow {
        ClaimRow {
            irn,
            display_irn: display.map(str::to_string),
            worker_id: 1,
            incident_type: "Injury".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_irns_batch() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            insert(conn, &claim(10, Some("CRN-10")))?;
            insert(conn, &claim(11, None))?;
            let map = display_irns(conn, &[10, 11, 12])?;
            assert_eq!(map.len(), 1);
            assert_eq!(map[&10], "CRN-10");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_display_code_falls_back_to_irn() {
        assert_eq!(claim(5, None).display_code(), "5");
        assert_eq!(claim(5, Some(" ")).display_code(), "5");
        assert_eq!(claim(5, Some("CRN-5")).display_code(), "CRN-5");
    }

    #[test]
    fn test_components_in_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            insert_component(conn, 3, "Compensation", 1000.0)?;
            insert_component(conn, 3, "Medical", 200.0)?;
            insert_component(conn, 4, "Other claim", 1.0)?;
            let rows = list_components(conn, 3)?;
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[1].component, "Medical");
            Ok(())
        })
        .unwrap();
    }
}
