//! Submission query functions.

use rusqlite::{Connection, OptionalExtension, Row};

use promora_types::submission::{Submission, SubmissionStatus};

use crate::queries::parse_col;
use crate::{DbError, Result};

const SELECT_COLUMNS: &str = "id, campaign_id, creator_id, platform, handle, reel_url, \
     status, paid_views_total, last_verified_views_total, last_verified_cycle_index, \
     payout_status, eligible_until, created_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        creator_id: row.get(2)?,
        platform: parse_col(3, row.get::<_, String>(3)?)?,
        handle: row.get(4)?,
        reel_url: row.get(5)?,
        status: parse_col(6, row.get::<_, String>(6)?)?,
        paid_views_total: row.get(7)?,
        last_verified_views_total: row.get(8)?,
        last_verified_cycle_index: row.get(9)?,
        payout_status: parse_col(10, row.get::<_, String>(10)?)?,
        eligible_until: row.get(11)?,
        created_at: row.get(12)?,
    })
}

/// Insert a new submission.
pub fn insert(conn: &Connection, submission: &Submission) -> Result<()> {
    conn.execute(
        "INSERT INTO submissions (id, campaign_id, creator_id, platform, handle,
             reel_url, status, paid_views_total, last_verified_views_total,
             last_verified_cycle_index, payout_status, eligible_until, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        rusqlite::params![
            submission.id,
            submission.campaign_id,
            submission.creator_id,
            submission.platform.as_str(),
            submission.handle,
            submission.reel_url,
            submission.status.as_str(),
            submission.paid_views_total,
            submission.last_verified_views_total,
            submission.last_verified_cycle_index,
            submission.payout_status.as_str(),
            submission.eligible_until,
            submission.created_at,
        ],
    )?;
    Ok(())
}

/// Fetch a submission by id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Submission>> {
    let submission = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM submissions WHERE id = ?1"),
            [id],
            map_row,
        )
        .optional()?;
    Ok(submission)
}

/// Whether a creator already submitted this URL for a campaign.
pub fn url_exists(
    conn: &Connection,
    campaign_id: &str,
    creator_id: &str,
    reel_url: &str,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM submissions
         WHERE campaign_id = ?1 AND creator_id = ?2 AND reel_url = ?3",
        [campaign_id, creator_id, reel_url],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// List a creator's active, not-yet-paid submissions (payout candidates).
pub fn list_unpaid_active_for_creator(
    conn: &Connection,
    creator_id: &str,
) -> Result<Vec<Submission>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM submissions
         WHERE creator_id = ?1 AND status = 'active' AND payout_status = 'unpaid'
         ORDER BY created_at, id"
    ))?;

    let rows = stmt
        .query_map([creator_id], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Update a submission's status.
pub fn set_status(conn: &Connection, id: &str, status: SubmissionStatus) -> Result<()> {
    let updated = conn.execute(
        "UPDATE submissions SET status = ?1 WHERE id = ?2",
        rusqlite::params![status.as_str(), id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("submission {id}")));
    }
    Ok(())
}

/// Record an approved verification: activate the submission and advance
/// its attested view totals.
pub fn record_verification(
    conn: &Connection,
    id: &str,
    verified_views_total: i64,
    cycle_index: i64,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE submissions
         SET status = 'active',
             last_verified_views_total = ?1,
             last_verified_cycle_index = ?2
         WHERE id = ?3",
        rusqlite::params![verified_views_total, cycle_index, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("submission {id}")));
    }
    Ok(())
}

/// Apply a settlement: advance paid views and mark the submission paid.
pub fn apply_settlement(conn: &Connection, id: &str, views_paid: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE submissions
         SET paid_views_total = paid_views_total + ?1,
             payout_status = 'paid'
         WHERE id = ?2",
        rusqlite::params![views_paid, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("submission {id}")));
    }
    Ok(())
}
