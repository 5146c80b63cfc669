//! Review-stage tables: one row per claim per workflow stage.
//!
//! Stage tables share a shape (status, reason, decision date and an
//! optional locking-staff column) but not column names, so every query
//! here is driven by a [`ReviewTable`] descriptor.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::{is_identifier, DatabaseError};

/// Column layout of one review-stage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewTable {
    pub table: &'static str,
    pub status_column: &'static str,
    pub reason_column: Option<&'static str>,
    pub date_column: Option<&'static str>,
    pub lock_column: Option<&'static str>,
}

pub const CPO_REVIEW: ReviewTable = ReviewTable {
    table: "compensationcalculationreview",
    status_column: "CPORStatus",
    reason_column: Some("CPORDecisionReason"),
    date_column: Some("CPORSubmissionDate"),
    lock_column: Some("LockedByCPOID"),
};

pub const CPM_REVIEW: ReviewTable = ReviewTable {
    table: "compensationcalculationcpmreview",
    status_column: "CPMRStatus",
    reason_column: Some("CPMRDecisionReason"),
    date_column: Some("CPMRDecisionDate"),
    lock_column: Some("LockedByID"),
};

pub const CALCULATION_COMMISSIONER_REVIEW: ReviewTable = ReviewTable {
    table: "compensationcalculationcommissionersreview",
    status_column: "CCCRReviewStatus",
    reason_column: Some("CCCRDecisionReason"),
    date_column: Some("CCCRDecisionDate"),
    lock_column: Some("LockedByID"),
};

pub const CALCULATION_REGISTRAR_REVIEW: ReviewTable = ReviewTable {
    table: "compensationcalculationregistrarreview",
    status_column: "CCRReviewStatus",
    reason_column: Some("CCRDecisionReason"),
    date_column: Some("CCRDecisionDate"),
    lock_column: Some("LockedByID"),
};

pub const AWARD_COMMISSIONER_REVIEW: ReviewTable = ReviewTable {
    table: "claimsawardedcommissionersreview",
    status_column: "CACRReviewStatus",
    reason_column: Some("CACRDecisionReason"),
    date_column: Some("CACRDecisionDate"),
    lock_column: Some("LockedByID"),
};

pub const AWARD_REGISTRAR_REVIEW: ReviewTable = ReviewTable {
    table: "claimsawardedregistrarreview",
    status_column: "CARRReviewStatus",
    reason_column: Some("CARRDecisionReason"),
    date_column: Some("CARRDecisionDate"),
    lock_column: Some("LockedByID"),
};

pub const TIMEBARRED_REGISTRAR_REVIEW: ReviewTable = ReviewTable {
    table: "timebarredclaimsregistrarreview",
    status_column: "TBCRRReviewStatus",
    reason_column: Some("TBCRRDecisionReason"),
    date_column: Some("TBCRRDecisionDate"),
    lock_column: Some("LockedByID"),
};

pub const TRIBUNAL_OUTCOME: ReviewTable = ReviewTable {
    table: "tribunalhearingoutcome",
    status_column: "THOOutcome",
    reason_column: Some("THOReason"),
    date_column: Some("THODate"),
    lock_column: None,
};

pub const FORM6: ReviewTable = ReviewTable {
    table: "form6master",
    status_column: "F6MStatus",
    reason_column: Some("F6MDecisionReason"),
    date_column: Some("F6MDecisionDate"),
    lock_column: None,
};

/// Form 18 keeps separate employer/worker reason and date columns; the
/// history registry picks among them by status.
pub const FORM18: ReviewTable = ReviewTable {
    table: "form18master",
    status_column: "F18MStatus",
    reason_column: None,
    date_column: None,
    lock_column: None,
};

/// Result of a lock attempt on a stage row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAttempt {
    /// The caller now holds the lock (or already did).
    Acquired,
    /// Another staff member holds it.
    HeldBy(i64),
    /// The claim has no row at this stage.
    Missing,
}

/// Whether an upsert inserted a fresh row or updated the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

fn check(names: &[&str]) -> Result<(), DatabaseError> {
    for name in names {
        if !is_identifier(name) {
            return Err(DatabaseError::InvalidIdentifier(name.to_string()));
        }
    }
    Ok(())
}

/// Takes the stage lock with a single conditional update, so two reviewers
/// racing for the same claim cannot both win.
pub fn acquire_lock(
    conn: &Connection,
    stage: &ReviewTable,
    irn: i64,
    staff_id: i64,
) -> Result<LockAttempt, DatabaseError> {
    let Some(lock) = stage.lock_column else {
        return Ok(LockAttempt::Acquired);
    };
    check(&[stage.table, lock])?;

    let sql = format!(
        "UPDATE {table} SET {lock} = ?2 WHERE IRN = ?1 AND ({lock} IS NULL OR {lock} = ?2)",
        table = stage.table,
        lock = lock
    );
    if conn.execute(&sql, params![irn, staff_id])? > 0 {
        return Ok(LockAttempt::Acquired);
    }

    let holder: Option<Option<i64>> = conn
        .query_row(
            &format!("SELECT {} FROM {} WHERE IRN = ?1", lock, stage.table),
            params![irn],
            |r| r.get(0),
        )
        .optional()?;
    Ok(match holder {
        Some(Some(other)) => LockAttempt::HeldBy(other),
        _ => LockAttempt::Missing,
    })
}

/// Clears the lock if `staff_id` holds it. Returns whether a row changed.
pub fn release_lock(
    conn: &Connection,
    stage: &ReviewTable,
    irn: i64,
    staff_id: i64,
) -> Result<bool, DatabaseError> {
    let Some(lock) = stage.lock_column else {
        return Ok(false);
    };
    check(&[stage.table, lock])?;
    let sql = format!(
        "UPDATE {table} SET {lock} = NULL WHERE IRN = ?1 AND {lock} = ?2",
        table = stage.table,
        lock = lock
    );
    Ok(conn.execute(&sql, params![irn, staff_id])? > 0)
}

/// Current lock holder of a stage row, `None` when unlocked or absent.
pub fn lock_holder(
    conn: &Connection,
    stage: &ReviewTable,
    irn: i64,
) -> Result<Option<i64>, DatabaseError> {
    let Some(lock) = stage.lock_column else {
        return Ok(None);
    };
    check(&[stage.table, lock])?;
    let holder: Option<Option<i64>> = conn
        .query_row(
            &format!("SELECT {} FROM {} WHERE IRN = ?1", lock, stage.table),
            params![irn],
            |r| r.get(0),
        )
        .optional()?;
    Ok(holder.flatten())
}

/// Writes a decision: status, plus reason and date where the stage has them.
/// Returns the number of rows touched.
pub fn record_decision(
    conn: &Connection,
    stage: &ReviewTable,
    irn: i64,
    status: &str,
    reason: Option<&str>,
    decision_date: &str,
) -> Result<usize, DatabaseError> {
    let mut fields: Vec<(&str, Value)> = vec![(stage.status_column, Value::Text(status.into()))];
    if let Some(col) = stage.reason_column {
        fields.push((col, reason.map_or(Value::Null, |r| Value::Text(r.into()))));
    }
    if let Some(col) = stage.date_column {
        fields.push((col, Value::Text(decision_date.into())));
    }
    update_fields(conn, stage.table, irn, &fields)
}

/// Sets only the status column.
pub fn set_status(
    conn: &Connection,
    stage: &ReviewTable,
    irn: i64,
    status: &str,
) -> Result<usize, DatabaseError> {
    update_fields(
        conn,
        stage.table,
        irn,
        &[(stage.status_column, Value::Text(status.into()))],
    )
}

/// Reads the status column; outer `None` when the claim has no row.
pub fn find_status(
    conn: &Connection,
    stage: &ReviewTable,
    irn: i64,
) -> Result<Option<Option<String>>, DatabaseError> {
    check(&[stage.table, stage.status_column])?;
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM {} WHERE IRN = ?1", stage.status_column, stage.table),
            params![irn],
            |r| r.get(0),
        )
        .optional()?)
}

/// `UPDATE table SET col = ?, ... WHERE IRN = ?`.
pub fn update_fields(
    conn: &Connection,
    table: &str,
    irn: i64,
    fields: &[(&str, Value)],
) -> Result<usize, DatabaseError> {
    if fields.is_empty() {
        return Ok(0);
    }
    check(&[table])?;
    check(&fields.iter().map(|(c, _)| *c).collect::<Vec<_>>())?;

    let assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (col, _))| format!("{} = ?{}", col, i + 2))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE IRN = ?1",
        table,
        assignments.join(", ")
    );
    let mut values = vec![Value::Integer(irn)];
    values.extend(fields.iter().map(|(_, v)| v.clone()));
    Ok(conn.execute(&sql, params_from_iter(values))?)
}

/// Inserts a stage row for `irn` with the given extra columns.
pub fn insert_fields(
    conn: &Connection,
    table: &str,
    irn: i64,
    fields: &[(&str, Value)],
) -> Result<(), DatabaseError> {
    check(&[table])?;
    check(&fields.iter().map(|(c, _)| *c).collect::<Vec<_>>())?;

    let mut columns = vec!["IRN"];
    columns.extend(fields.iter().map(|(c, _)| *c));
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );
    let mut values = vec![Value::Integer(irn)];
    values.extend(fields.iter().map(|(_, v)| v.clone()));
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Select-then-update-or-insert keyed on `IRN`.
pub fn upsert_fields(
    conn: &Connection,
    table: &str,
    irn: i64,
    fields: &[(&str, Value)],
) -> Result<UpsertOutcome, DatabaseError> {
    check(&[table])?;
    let exists: Option<i64> = conn
        .query_row(
            &format!("SELECT IRN FROM {} WHERE IRN = ?1", table),
            params![irn],
            |r| r.get(0),
        )
        .optional()?;

    if exists.is_some() {
        update_fields(conn, table, irn, fields)?;
        Ok(UpsertOutcome::Updated)
    } else {
        insert_fields(conn, table, irn, fields)?;
        Ok(UpsertOutcome::Inserted)
    }
}

/// Every row for `irn`, projected onto `columns` in order.
pub fn fetch_rows(
    conn: &Connection,
    table: &str,
    irn: i64,
    columns: &[&str],
) -> Result<Vec<Vec<Value>>, DatabaseError> {
    check(&[table])?;
    check(columns)?;
    let sql = format!(
        "SELECT {} FROM {} WHERE IRN = ?1 ORDER BY rowid",
        columns.join(", "),
        table
    );
    let mut stmt = conn.prepare(&sql)?;
    let width = columns.len();
    let rows = stmt
        .query_map(params![irn], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<Result<Vec<Value>, _>>()
        })?
        .collect::<Result<Vec<Vec<Value>>, _>>()?;
    Ok(rows)
}
