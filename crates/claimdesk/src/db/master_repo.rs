//! Employer and insurance-provider master data.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{like_pattern, DatabaseError};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerRow {
    pub cppsid: String,
    pub organization_name: String,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub po_box: Option<String>,
    pub insurance_provider_ipa_code: Option<String>,
}

impl EmployerRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            cppsid: row.get("CPPSID")?,
            organization_name: row.get("OrganizationName")?,
            address1: row.get("Address1")?,
            address2: row.get("Address2")?,
            city: row.get("City")?,
            province: row.get("Province")?,
            po_box: row.get("POBox")?,
            insurance_provider_ipa_code: row.get("InsuranceProviderIPACode")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurerRow {
    pub ipa_code: String,
    pub organization_name: String,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub po_box: Option<String>,
}

impl InsurerRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            ipa_code: row.get("IPACODE")?,
            organization_name: row.get("InsuranceCompanyOrganizationName")?,
            address1: row.get("InsuranceCompanyAddress1")?,
            address2: row.get("InsuranceCompanyAddress2")?,
            city: row.get("InsuranceCompanyCity")?,
            province: row.get("InsuranceCompanyProvince")?,
            po_box: row.get("InsuranceCompanyPOBox")?,
        })
    }
}

pub fn insert_employer(conn: &Connection, e: &EmployerRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO employermaster (CPPSID, OrganizationName, Address1, Address2, City,
         Province, POBox, InsuranceProviderIPACode) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            e.cppsid,
            e.organization_name,
            e.address1,
            e.address2,
            e.city,
            e.province,
            e.po_box,
            e.insurance_provider_ipa_code,
        ],
    )?;
    Ok(())
}

pub fn insert_insurer(conn: &Connection, i: &InsurerRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO insurancecompanymaster (IPACODE, InsuranceCompanyOrganizationName,
         InsuranceCompanyAddress1, InsuranceCompanyAddress2, InsuranceCompanyCity,
         InsuranceCompanyProvince, InsuranceCompanyPOBox) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            i.ipa_code,
            i.organization_name,
            i.address1,
            i.address2,
            i.city,
            i.province,
            i.po_box,
        ],
    )?;
    Ok(())
}

pub fn find_employer(conn: &Connection, cppsid: &str) -> Result<Option<EmployerRow>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT * FROM employermaster WHERE CPPSID = ?1",
            params![cppsid],
            EmployerRow::from_row,
        )
        .optional()?)
}

pub fn find_insurer(conn: &Connection, ipa_code: &str) -> Result<Option<InsurerRow>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT * FROM insurancecompanymaster WHERE IPACODE = ?1",
            params![ipa_code],
            InsurerRow::from_row,
        )
        .optional()?)
}

/// Partial, case-insensitive match on organization name or CPPSID.
pub fn search_employers(conn: &Connection, term: &str) -> Result<Vec<EmployerRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM employermaster
         WHERE OrganizationName LIKE ?1 ESCAPE '\\' OR CPPSID LIKE ?1 ESCAPE '\\'
         ORDER BY OrganizationName",
    )?;
    let rows = stmt
        .query_map(params![like_pattern(term)], EmployerRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Partial, case-insensitive match on company name or IPA code.
pub fn search_insurers(conn: &Connection, term: &str) -> Result<Vec<InsurerRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM insurancecompanymaster
         WHERE InsuranceCompanyOrganizationName LIKE ?1 ESCAPE '\\' OR IPACODE LIKE ?1 ESCAPE '\\'
         ORDER BY InsuranceCompanyOrganizationName",
    )?;
    let rows = stmt
        .query_map(params![like_pattern(term)], InsurerRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_search_employers_by_name_or_code() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            insert_employer(
                conn,
                &EmployerRow {
                    cppsid: "CPPS-100".into(),
                    organization_name: "Lae Builders Ltd".into(),
                    ..Default::default()
                },
            )?;
            insert_employer(
                conn,
                &EmployerRow {
                    cppsid: "CPPS-200".into(),
                    organization_name: "Highlands Coffee".into(),
                    ..Default::default()
                },
            )?;

            assert_eq!(search_employers(conn, "builders")?.len(), 1);
            assert_eq!(search_employers(conn, "cpps-2")?[0].organization_name, "Highlands Coffee");
            assert_eq!(search_employers(conn, "")?.len(), 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_find_insurer() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            insert_insurer(
                conn,
                &InsurerRow {
                    ipa_code: "IPA-9".into(),
                    organization_name: "Pacific Assurance".into(),
                    ..Default::default()
                },
            )?;
            assert_eq!(
                find_insurer(conn, "IPA-9")?.unwrap().organization_name,
                "Pacific Assurance"
            );
            assert!(find_insurer(conn, "SELF")?.is_none());
            assert_eq!(search_insurers(conn, "pacific")?.len(), 1);
            Ok(())
        })
        .unwrap();
    }
}
