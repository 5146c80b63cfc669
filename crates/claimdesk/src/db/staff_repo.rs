//! Staff repository: lookups against `owcstaffmaster`.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::DatabaseError;

/// A staff master row.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffRow {
    pub staff_id: i64,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub designation: Option<String>,
    pub incharge_region: Option<String>,
}

impl StaffRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            staff_id: row.get("OSMStaffID")?,
            user_id: row.get("OSMUserID")?,
            first_name: row.get("OSMFirstName")?,
            last_name: row.get("OSMLastName")?,
            designation: row.get("OSMDesignation")?,
            incharge_region: row.get("InchargeRegion")?,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub fn insert(conn: &Connection, staff: &StaffRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO owcstaffmaster (OSMStaffID, OSMUserID, OSMFirstName, OSMLastName,
         OSMDesignation, InchargeRegion) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            staff.staff_id,
            staff.user_id,
            staff.first_name,
            staff.last_name,
            staff.designation,
            staff.incharge_region,
        ],
    )?;
    Ok(())
}

/// Resolves the staff row linked to an auth profile id.
pub fn find_by_user_id(conn: &Connection, user_id: &str) -> Result<Option<StaffRow>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT * FROM owcstaffmaster WHERE OSMUserID = ?1",
            params![user_id],
            StaffRow::from_row,
        )
        .optional()?)
}

/// Batch lookup of `staff id -> "First Last"`. Unknown ids are absent from the map.
pub fn names_by_ids(conn: &Connection, ids: &[i64]) -> Result<HashMap<i64, String>, DatabaseError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM owcstaffmaster WHERE OSMStaffID IN ({})",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), StaffRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(|r| (r.staff_id, r.full_name())).collect())
}

/// Maps each region to the name of the staff member in charge of it.
/// When several staff share a region the lowest staff id wins.
pub fn region_managers(conn: &Connection) -> Result<HashMap<String, String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM owcstaffmaster WHERE InchargeRegion IS NOT NULL
         ORDER BY OSMStaffID DESC",
    )?;
    let rows = stmt
        .query_map([], StaffRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    let mut managers = HashMap::new();
    for row in rows {
        if let Some(region) = row.incharge_region.clone() {
            managers.insert(region, row.full_name());
        }
    }
    Ok(managers)
}
