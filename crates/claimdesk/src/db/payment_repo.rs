//! Payment records: insurer bank deposits and OWC trust cheques.

use rusqlite::{params, Connection, OptionalExtension};

use super::DatabaseError;

/// A raw payment row, common to both payment tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub reference: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
}

pub fn insert_bank_deposit(
    conn: &Connection,
    irn: i64,
    payment: &PaymentRow,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO bankaccountdepositmaster (IRN, BADReference, BADAmount, BADDepositDate)
         VALUES (?1, ?2, ?3, ?4)",
        params![irn, payment.reference, payment.amount, payment.date],
    )?;
    Ok(())
}

pub fn insert_cheque(conn: &Connection, irn: i64, payment: &PaymentRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO owcclaimchequedetails (IRN, OCCDChequeNumber, OCCDAmount, OCCDChequeDate)
         VALUES (?1, ?2, ?3, ?4)",
        params![irn, payment.reference, payment.amount, payment.date],
    )?;
    Ok(())
}

/// First insurer deposit recorded for the claim.
pub fn first_bank_deposit(conn: &Connection, irn: i64) -> Result<Option<PaymentRow>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT BADReference, BADAmount, BADDepositDate FROM bankaccountdepositmaster
             WHERE IRN = ?1 ORDER BY BADID LIMIT 1",
            params![irn],
            |r| {
                Ok(PaymentRow {
                    reference: r.get(0)?,
                    amount: r.get(1)?,
                    date: r.get(2)?,
                })
            },
        )
        .optional()?)
}

/// First trust cheque recorded for the claim.
pub fn first_cheque(conn: &Connection, irn: i64) -> Result<Option<PaymentRow>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT OCCDChequeNumber, OCCDAmount, OCCDChequeDate FROM owcclaimchequedetails
             WHERE IRN = ?1 ORDER BY OCCDID LIMIT 1",
            params![irn],
            |r| {
                Ok(PaymentRow {
                    reference: r.get(0)?,
                    amount: r.get(1)?,
                    date: r.get(2)?,
                })
            },
        )
        .optional()?)
}
