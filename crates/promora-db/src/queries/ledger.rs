//! Money ledger query functions. The ledger is append-only.

use rusqlite::{Connection, OptionalExtension, Row};

use promora_types::ledger::{LedgerEntry, LedgerEntryType};
use promora_types::new_id;

use crate::queries::parse_col;
use crate::Result;

/// Parameters for appending a ledger entry.
#[derive(Clone, Debug)]
pub struct NewLedgerEntry<'a> {
    pub entry_type: LedgerEntryType,
    pub campaign_id: &'a str,
    pub submission_id: Option<&'a str>,
    pub payout_id: Option<&'a str>,
    pub amount_paise: i64,
    pub idempotency_key: Option<&'a str>,
    pub created_by: Option<&'a str>,
}

const SELECT_COLUMNS: &str = "id, entry_type, campaign_id, submission_id, payout_id, \
     amount_paise, idempotency_key, created_by, created_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        entry_type: parse_col(1, row.get::<_, String>(1)?)?,
        campaign_id: row.get(2)?,
        submission_id: row.get(3)?,
        payout_id: row.get(4)?,
        amount_paise: row.get(5)?,
        idempotency_key: row.get(6)?,
        created_by: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Append a ledger entry, returning its id.
///
/// A UNIQUE violation on `idempotency_key` means the underlying event was
/// already recorded; callers detect it with
/// [`crate::is_unique_violation`] and treat the repeat as a no-op.
pub fn insert(conn: &Connection, entry: &NewLedgerEntry<'_>, now: i64) -> Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO ledger_entries (id, entry_type, campaign_id, submission_id,
             payout_id, amount_paise, idempotency_key, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            id,
            entry.entry_type.as_str(),
            entry.campaign_id,
            entry.submission_id,
            entry.payout_id,
            entry.amount_paise,
            entry.idempotency_key,
            entry.created_by,
            now,
        ],
    )?;
    Ok(id)
}

/// Look up an entry by its idempotency key.
pub fn find_by_idempotency_key(conn: &Connection, key: &str) -> Result<Option<LedgerEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM ledger_entries WHERE idempotency_key = ?1"),
            [key],
            map_row,
        )
        .optional()?;
    Ok(entry)
}

/// List a campaign's ledger entries, oldest first.
pub fn list_for_campaign(conn: &Connection, campaign_id: &str) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM ledger_entries
         WHERE campaign_id = ?1 ORDER BY created_at, id"
    ))?;

    let rows = stmt
        .query_map([campaign_id], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
