//! Worker repository: personal details, current employment and the
//! dependant / work-history child sets.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{like_pattern, DatabaseError};
use crate::worker::model::{Dependant, EmploymentDetails, PersonalDetails, WorkHistoryEntry};

fn personal_from_row(row: &Row<'_>) -> Result<(PersonalDetails, bool), rusqlite::Error> {
    let personal = PersonalDetails {
        worker_first_name: row.get("WorkerFirstName")?,
        worker_last_name: row.get("WorkerLastName")?,
        worker_alias_name: row.get("WorkerAliasName")?,
        worker_dob: row.get("WorkerDOB")?,
        worker_gender: row.get("WorkerGender")?,
        worker_married: row.get("WorkerMarried")?,
        worker_handed: row.get("WorkerHanded")?,
        worker_place_of_origin_village: row.get("WorkerPlaceOfOriginVillage")?,
        worker_place_of_origin_district: row.get("WorkerPlaceOfOriginDistrict")?,
        worker_place_of_origin_province: row.get("WorkerPlaceOfOriginProvince")?,
        worker_address1: row.get("WorkerAddress1")?,
        worker_address2: row.get("WorkerAddress2")?,
        worker_city: row.get("WorkerCity")?,
        worker_province: row.get("WorkerProvince")?,
        worker_po_box: row.get("WorkerPOBox")?,
        worker_email: row.get("WorkerEmail")?,
        worker_mobile: row.get("WorkerMobile")?,
        worker_landline: row.get("WorkerLandline")?,
        spouse_first_name: row.get("SpouseFirstName")?,
        spouse_last_name: row.get("SpouseLastName")?,
        spouse_dob: row.get("SpouseDOB")?,
        spouse_address1: row.get("SpouseAddress1")?,
        spouse_city: row.get("SpouseCity")?,
        spouse_province: row.get("SpouseProvince")?,
        spouse_mobile: row.get("SpouseMobile")?,
    };
    let have_dependants: bool = row.get("WorkerHaveDependants")?;
    Ok((personal, have_dependants))
}

fn employment_from_row(row: &Row<'_>) -> Result<EmploymentDetails, rusqlite::Error> {
    Ok(EmploymentDetails {
        employment_id: row.get("EmploymentID")?,
        occupation: row.get("Occupation")?,
        place_of_employment: row.get("PlaceOfEmployment")?,
        nature_of_employment: row.get("NatureOfEmployment")?,
        average_weekly_wage: row.get("AverageWeeklyWage")?,
        weekly_payment_rate: row.get("WeeklyPaymentRate")?,
        worked_under_sub_contractor: row.get("WorkedUnderSubContractor")?,
        sub_contractor_organization_name: row.get("SubContractorOrganizationName")?,
        sub_contractor_location: row.get("SubContractorLocation")?,
        sub_contractor_nature_of_business: row.get("SubContractorNatureOfBusiness")?,
        employer_cppsid: row.get("EmployerCPPSID")?,
        insurance_provider_ipa_code: row.get("InsuranceProviderIPACode")?,
    })
}

fn dependant_from_row(row: &Row<'_>) -> Result<Dependant, rusqlite::Error> {
    Ok(Dependant {
        dependant_first_name: row.get("DependantFirstName")?,
        dependant_last_name: row.get("DependantLastName")?,
        dependant_dob: row.get("DependantDOB")?,
        dependant_type: row.get("DependantType")?,
        dependant_gender: row.get("DependantGender")?,
        dependant_address1: row.get("DependantAddress1")?,
        dependant_city: row.get("DependantCity")?,
        dependant_province: row.get("DependantProvince")?,
        dependant_mobile: row.get("DependantMobile")?,
        dependant_email: row.get("DependantEmail")?,
    })
}

fn history_from_row(row: &Row<'_>) -> Result<WorkHistoryEntry, rusqlite::Error> {
    Ok(WorkHistoryEntry {
        organization_name: row.get("OrganizationName")?,
        organization_address1: row.get("OrganizationAddress1")?,
        organization_city: row.get("OrganizationCity")?,
        organization_province: row.get("OrganizationProvince")?,
        worker_joining_date: row.get("WorkerJoiningDate")?,
        worker_ending_date: row.get("WorkerEndingDate")?,
    })
}

/// Inserts a personal-details row and returns the new `WorkerID`.
pub fn insert_personal(
    conn: &Connection,
    p: &PersonalDetails,
    have_dependants: bool,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO workerpersonaldetails (WorkerFirstName, WorkerLastName, WorkerAliasName,
         WorkerDOB, WorkerGender, WorkerMarried, WorkerHanded, WorkerPlaceOfOriginVillage,
         WorkerPlaceOfOriginDistrict, WorkerPlaceOfOriginProvince, WorkerAddress1, WorkerAddress2,
         WorkerCity, WorkerProvince, WorkerPOBox, WorkerEmail, WorkerMobile, WorkerLandline,
         SpouseFirstName, SpouseLastName, SpouseDOB, SpouseAddress1, SpouseCity, SpouseProvince,
         SpouseMobile, WorkerHaveDependants)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                 ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
        params![
            p.worker_first_name,
            p.worker_last_name,
            p.worker_alias_name,
            p.worker_dob,
            p.worker_gender,
            p.worker_married,
            p.worker_handed,
            p.worker_place_of_origin_village,
            p.worker_place_of_origin_district,
            p.worker_place_of_origin_province,
            p.worker_address1,
            p.worker_address2,
            p.worker_city,
            p.worker_province,
            p.worker_po_box,
            p.worker_email,
            p.worker_mobile,
            p.worker_landline,
            p.spouse_first_name,
            p.spouse_last_name,
            p.spouse_dob,
            p.spouse_address1,
            p.spouse_city,
            p.spouse_province,
            p.spouse_mobile,
            have_dependants,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites every personal-details column of an existing worker.
/// Returns the number of rows touched (0 when the worker does not exist).
pub fn update_personal(
    conn: &Connection,
    worker_id: i64,
    p: &PersonalDetails,
    have_dependants: bool,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE workerpersonaldetails SET WorkerFirstName=?2, WorkerLastName=?3,
         WorkerAliasName=?4, WorkerDOB=?5, WorkerGender=?6, WorkerMarried=?7, WorkerHanded=?8,
         WorkerPlaceOfOriginVillage=?9, WorkerPlaceOfOriginDistrict=?10,
         WorkerPlaceOfOriginProvince=?11, WorkerAddress1=?12, WorkerAddress2=?13, WorkerCity=?14,
         WorkerProvince=?15, WorkerPOBox=?16, WorkerEmail=?17, WorkerMobile=?18,
         WorkerLandline=?19, SpouseFirstName=?20, SpouseLastName=?21, SpouseDOB=?22,
         SpouseAddress1=?23, SpouseCity=?24, SpouseProvince=?25, SpouseMobile=?26,
         WorkerHaveDependants=?27
         WHERE WorkerID=?1",
        params![
            worker_id,
            p.worker_first_name,
            p.worker_last_name,
            p.worker_alias_name,
            p.worker_dob,
            p.worker_gender,
            p.worker_married,
            p.worker_handed,
            p.worker_place_of_origin_village,
            p.worker_place_of_origin_district,
            p.worker_place_of_origin_province,
            p.worker_address1,
            p.worker_address2,
            p.worker_city,
            p.worker_province,
            p.worker_po_box,
            p.worker_email,
            p.worker_mobile,
            p.worker_landline,
            p.spouse_first_name,
            p.spouse_last_name,
            p.spouse_dob,
            p.spouse_address1,
            p.spouse_city,
            p.spouse_province,
            p.spouse_mobile,
            have_dependants,
        ],
    )?;
    Ok(changed)
}

/// Finds a worker's personal details and their `WorkerHaveDependants` flag.
pub fn find_personal(
    conn: &Connection,
    worker_id: i64,
) -> Result<Option<(PersonalDetails, bool)>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT * FROM workerpersonaldetails WHERE WorkerID = ?1",
            params![worker_id],
            personal_from_row,
        )
        .optional()?)
}

pub fn find_employment(
    conn: &Connection,
    worker_id: i64,
) -> Result<Option<EmploymentDetails>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT * FROM currentemploymentdetails WHERE WorkerID = ?1",
            params![worker_id],
            employment_from_row,
        )
        .optional()?)
}

fn insert_employment(
    conn: &Connection,
    worker_id: i64,
    e: &EmploymentDetails,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO currentemploymentdetails (WorkerID, EmploymentID, Occupation,
         PlaceOfEmployment, NatureOfEmployment, AverageWeeklyWage, WeeklyPaymentRate,
         WorkedUnderSubContractor, SubContractorOrganizationName, SubContractorLocation,
         SubContractorNatureOfBusiness, EmployerCPPSID, InsuranceProviderIPACode)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            worker_id,
            e.employment_id,
            e.occupation,
            e.place_of_employment,
            e.nature_of_employment,
            e.average_weekly_wage,
            e.weekly_payment_rate,
            e.worked_under_sub_contractor,
            e.sub_contractor_organization_name,
            e.sub_contractor_location,
            e.sub_contractor_nature_of_business,
            e.employer_cppsid,
            e.insurance_provider_ipa_code,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Select-then-update-or-insert of the worker's single employment row.
/// Returns the row's `CEDID`.
pub fn upsert_employment(
    conn: &Connection,
    worker_id: i64,
    e: &EmploymentDetails,
) -> Result<i64, DatabaseError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT CEDID FROM currentemploymentdetails WHERE WorkerID = ?1",
            params![worker_id],
            |r| r.get(0),
        )
        .optional()?;

    let Some(cedid) = existing else {
        return insert_employment(conn, worker_id, e);
    };

    conn.execute(
        "UPDATE currentemploymentdetails SET EmploymentID=?2, Occupation=?3,
         PlaceOfEmployment=?4, NatureOfEmployment=?5, AverageWeeklyWage=?6,
         WeeklyPaymentRate=?7, WorkedUnderSubContractor=?8, SubContractorOrganizationName=?9,
         SubContractorLocation=?10, SubContractorNatureOfBusiness=?11, EmployerCPPSID=?12,
         InsuranceProviderIPACode=?13
         WHERE CEDID=?1",
        params![
            cedid,
            e.employment_id,
            e.occupation,
            e.place_of_employment,
            e.nature_of_employment,
            e.average_weekly_wage,
            e.weekly_payment_rate,
            e.worked_under_sub_contractor,
            e.sub_contractor_organization_name,
            e.sub_contractor_location,
            e.sub_contractor_nature_of_business,
            e.employer_cppsid,
            e.insurance_provider_ipa_code,
        ],
    )?;
    Ok(cedid)
}

pub fn list_dependants(conn: &Connection, worker_id: i64) -> Result<Vec<Dependant>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM dependantpersonaldetails WHERE WorkerID = ?1 ORDER BY DependantID",
    )?;
    let rows = stmt
        .query_map(params![worker_id], dependant_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Deletes every dependant of the worker, then inserts `dependants`.
/// Returns the new `DependantID`s in input order.
pub fn replace_dependants(
    conn: &Connection,
    worker_id: i64,
    dependants: &[Dependant],
) -> Result<Vec<i64>, DatabaseError> {
    conn.execute(
        "DELETE FROM dependantpersonaldetails WHERE WorkerID = ?1",
        params![worker_id],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO dependantpersonaldetails (WorkerID, DependantFirstName, DependantLastName,
         DependantDOB, DependantType, DependantGender, DependantAddress1, DependantCity,
         DependantProvince, DependantMobile, DependantEmail)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    let mut ids = Vec::with_capacity(dependants.len());
    for d in dependants {
        ids.push(stmt.insert(params![
            worker_id,
            d.dependant_first_name,
            d.dependant_last_name,
            d.dependant_dob,
            d.dependant_type,
            d.dependant_gender,
            d.dependant_address1,
            d.dependant_city,
            d.dependant_province,
            d.dependant_mobile,
            d.dependant_email,
        ])?);
    }
    Ok(ids)
}

pub fn list_work_history(
    conn: &Connection,
    worker_id: i64,
) -> Result<Vec<WorkHistoryEntry>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM workhistory WHERE WorkerID = ?1 ORDER BY WorkHistoryID")?;
    let rows = stmt
        .query_map(params![worker_id], history_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Deletes every work-history row of the worker, then inserts `entries`.
pub fn replace_work_history(
    conn: &Connection,
    worker_id: i64,
    entries: &[WorkHistoryEntry],
) -> Result<Vec<i64>, DatabaseError> {
    conn.execute("DELETE FROM workhistory WHERE WorkerID = ?1", params![worker_id])?;

    let mut stmt = conn.prepare(
        "INSERT INTO workhistory (WorkerID, OrganizationName, OrganizationAddress1,
         OrganizationCity, OrganizationProvince, WorkerJoiningDate, WorkerEndingDate)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    let mut ids = Vec::with_capacity(entries.len());
    for h in entries {
        ids.push(stmt.insert(params![
            worker_id,
            h.organization_name,
            h.organization_address1,
            h.organization_city,
            h.organization_province,
            h.worker_joining_date,
            h.worker_ending_date,
        ])?);
    }
    Ok(ids)
}

/// One row of the worker search list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub worker_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub gender: String,
    pub employer_cppsid: Option<String>,
}

/// Case-insensitive partial match on first or last name, returning
/// `(page_rows, total_matching)`.
pub fn search(
    conn: &Connection,
    term: &str,
    limit: u64,
    offset: u64,
) -> Result<(Vec<WorkerSummary>, u64), DatabaseError> {
    let pattern = like_pattern(term);
    let total: u64 = conn.query_row(
        "SELECT COUNT(*) FROM workerpersonaldetails
         WHERE WorkerFirstName LIKE ?1 ESCAPE '\\' OR WorkerLastName LIKE ?1 ESCAPE '\\'",
        params![pattern],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT w.WorkerID, w.WorkerFirstName, w.WorkerLastName, w.WorkerDOB, w.WorkerGender,
                c.EmployerCPPSID
         FROM workerpersonaldetails w
         LEFT JOIN currentemploymentdetails c ON c.WorkerID = w.WorkerID
         WHERE w.WorkerFirstName LIKE ?1 ESCAPE '\\' OR w.WorkerLastName LIKE ?1 ESCAPE '\\'
         ORDER BY w.WorkerID
         LIMIT ?2 OFFSET ?3",
    )?;
    let rows = stmt
        .query_map(params![pattern, limit as i64, offset as i64], |row| {
            Ok(WorkerSummary {
                worker_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                dob: row.get(3)?,
                gender: row.get(4)?,
                employer_cppsid: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok((rows, total))
}
