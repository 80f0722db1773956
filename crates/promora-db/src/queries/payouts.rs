//! Payout and payout item query functions.

use rusqlite::{Connection, OptionalExtension, Row};

use promora_types::payout::{Payout, PayoutItem};

use crate::queries::parse_col;
use crate::{DbError, Result};

fn map_payout(row: &Row<'_>) -> rusqlite::Result<Payout> {
    Ok(Payout {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        amount_paise: row.get(2)?,
        status: parse_col(3, row.get::<_, String>(3)?)?,
        reference_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Insert a pending payout.
pub fn insert(conn: &Connection, payout: &Payout) -> Result<()> {
    conn.execute(
        "INSERT INTO payouts (id, creator_id, amount_paise, status, reference_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            payout.id,
            payout.creator_id,
            payout.amount_paise,
            payout.status.as_str(),
            payout.reference_id,
            payout.created_at,
        ],
    )?;
    Ok(())
}

/// Insert one payout line item.
pub fn insert_item(conn: &Connection, item: &PayoutItem) -> Result<()> {
    conn.execute(
        "INSERT INTO payout_items (payout_id, submission_id, amount_paise)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![item.payout_id, item.submission_id, item.amount_paise],
    )?;
    Ok(())
}

/// Fetch a payout by id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Payout>> {
    let payout = conn
        .query_row(
            "SELECT id, creator_id, amount_paise, status, reference_id, created_at
             FROM payouts WHERE id = ?1",
            [id],
            map_payout,
        )
        .optional()?;
    Ok(payout)
}

/// List a payout's line items.
pub fn items_for(conn: &Connection, payout_id: &str) -> Result<Vec<PayoutItem>> {
    let mut stmt = conn.prepare(
        "SELECT payout_id, submission_id, amount_paise
         FROM payout_items WHERE payout_id = ?1 ORDER BY submission_id",
    )?;

    let rows = stmt
        .query_map([payout_id], |row| {
            Ok(PayoutItem {
                payout_id: row.get(0)?,
                submission_id: row.get(1)?,
                amount_paise: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Mark a payout paid, recording the external payment reference.
pub fn mark_paid(conn: &Connection, id: &str, reference_id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE payouts SET status = 'paid', reference_id = ?1 WHERE id = ?2",
        rusqlite::params![reference_id, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("payout {id}")));
    }
    Ok(())
}
