//! Verification check and re-verification request query functions.

use rusqlite::{Connection, OptionalExtension, Row};

use promora_types::new_id;
use promora_types::submission::{VerificationCheck, VerificationRequest};

use crate::{DbError, Result};

fn map_check(row: &Row<'_>) -> rusqlite::Result<VerificationCheck> {
    Ok(VerificationCheck {
        id: row.get(0)?,
        submission_id: row.get(1)?,
        cycle_index: row.get(2)?,
        verified_views_total: row.get(3)?,
        admin_id: row.get(4)?,
        proof_note: row.get(5)?,
        proof_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Record one admin verification action, returning the check id.
///
/// Checks are deliberately NOT unique per (submission, cycle): re-approval
/// within the same cycle is allowed and each action leaves its own record.
#[allow(clippy::too_many_arguments)]
pub fn insert_check(
    conn: &Connection,
    submission_id: &str,
    cycle_index: i64,
    verified_views_total: i64,
    admin_id: &str,
    proof_note: Option<&str>,
    proof_url: Option<&str>,
    now: i64,
) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO verification_checks (id, submission_id, cycle_index,
             verified_views_total, admin_id, proof_note, proof_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            id,
            submission_id,
            cycle_index,
            verified_views_total,
            admin_id,
            proof_note,
            proof_url,
            now,
        ],
    )?;
    Ok(id)
}

/// List a submission's verification checks, oldest first.
pub fn list_checks(conn: &Connection, submission_id: &str) -> Result<Vec<VerificationCheck>> {
    let mut stmt = conn.prepare(
        "SELECT id, submission_id, cycle_index, verified_views_total, admin_id,
                proof_note, proof_url, created_at
         FROM verification_checks WHERE submission_id = ?1 ORDER BY created_at, id",
    )?;

    let rows = stmt
        .query_map([submission_id], map_check)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Insert a re-verification request.
///
/// The (submission_id, cycle_index) primary key is the once-per-cycle
/// guard; a conflict surfaces as a UNIQUE violation the caller maps to
/// its "already requested" error.
pub fn insert_request(
    conn: &Connection,
    submission_id: &str,
    cycle_index: i64,
    now: i64,
) -> Result<VerificationRequest> {
    conn.execute(
        "INSERT INTO verification_requests (submission_id, cycle_index, status, created_at)
         VALUES (?1, ?2, 'pending', ?3)",
        rusqlite::params![submission_id, cycle_index, now],
    )?;
    Ok(VerificationRequest {
        submission_id: submission_id.to_string(),
        cycle_index,
        status: "pending".to_string(),
        created_at: now,
    })
}

/// Fetch a re-verification request for a given cycle.
pub fn get_request(
    conn: &Connection,
    submission_id: &str,
    cycle_index: i64,
) -> Result<Option<VerificationRequest>> {
    let request = conn
        .query_row(
            "SELECT submission_id, cycle_index, status, created_at
             FROM verification_requests WHERE submission_id = ?1 AND cycle_index = ?2",
            rusqlite::params![submission_id, cycle_index],
            |row| {
                Ok(VerificationRequest {
                    submission_id: row.get(0)?,
                    cycle_index: row.get(1)?,
                    status: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(DbError::Sqlite)?;
    Ok(request)
}
