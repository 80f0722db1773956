//! Campaign and budget account query functions.

use rusqlite::{Connection, OptionalExtension, Row};

use promora_types::campaign::{Campaign, CampaignStatus};

use crate::queries::{parse_col, parse_json_col};
use crate::{DbError, Result};

const SELECT_COLUMNS: &str = "id, host_id, title, description, platforms, \
     rate_per_1k_views_paise, budget_total_paise, budget_reserved_paise, \
     budget_spent_paise, status, start_at, end_at, cycle_hours, \
     submission_eligibility_days, created_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(0)?,
        host_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        platforms: parse_json_col(4, &row.get::<_, String>(4)?)?,
        rate_per_1k_views_paise: row.get(5)?,
        budget_total_paise: row.get(6)?,
        budget_reserved_paise: row.get(7)?,
        budget_spent_paise: row.get(8)?,
        status: parse_col(9, row.get::<_, String>(9)?)?,
        start_at: row.get(10)?,
        end_at: row.get(11)?,
        cycle_hours: row.get(12)?,
        submission_eligibility_days: row.get(13)?,
        created_at: row.get(14)?,
    })
}

/// Insert a new campaign.
pub fn insert(conn: &Connection, campaign: &Campaign) -> Result<()> {
    let platforms = serde_json::to_string(&campaign.platforms)
        .map_err(|e| DbError::Serialization(e.to_string()))?;
    conn.execute(
        "INSERT INTO campaigns (id, host_id, title, description, platforms,
             rate_per_1k_views_paise, budget_total_paise, budget_reserved_paise,
             budget_spent_paise, status, start_at, end_at, cycle_hours,
             submission_eligibility_days, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        rusqlite::params![
            campaign.id,
            campaign.host_id,
            campaign.title,
            campaign.description,
            platforms,
            campaign.rate_per_1k_views_paise,
            campaign.budget_total_paise,
            campaign.budget_reserved_paise,
            campaign.budget_spent_paise,
            campaign.status.as_str(),
            campaign.start_at,
            campaign.end_at,
            campaign.cycle_hours,
            campaign.submission_eligibility_days,
            campaign.created_at,
        ],
    )?;
    Ok(())
}

/// Fetch a campaign by id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Campaign>> {
    let campaign = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM campaigns WHERE id = ?1"),
            [id],
            map_row,
        )
        .optional()?;
    Ok(campaign)
}

/// Update a campaign's status.
pub fn set_status(conn: &Connection, id: &str, status: CampaignStatus) -> Result<()> {
    let updated = conn.execute(
        "UPDATE campaigns SET status = ?1 WHERE id = ?2",
        rusqlite::params![status.as_str(), id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("campaign {id}")));
    }
    Ok(())
}

/// Activate a campaign, fixing its schedule.
pub fn activate(conn: &Connection, id: &str, start_at: i64, end_at: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE campaigns SET status = 'active', start_at = ?1, end_at = ?2 WHERE id = ?3",
        rusqlite::params![start_at, end_at, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("campaign {id}")));
    }
    Ok(())
}

/// Add a deposit to the budget total.
pub fn add_to_total(conn: &Connection, id: &str, amount_paise: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE campaigns SET budget_total_paise = budget_total_paise + ?1 WHERE id = ?2",
        rusqlite::params![amount_paise, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("campaign {id}")));
    }
    Ok(())
}

/// Earmark budget for approved-but-unpaid views.
pub fn add_to_reserved(conn: &Connection, id: &str, amount_paise: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE campaigns
         SET budget_reserved_paise = budget_reserved_paise + ?1
         WHERE id = ?2",
        rusqlite::params![amount_paise, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("campaign {id}")));
    }
    Ok(())
}

/// Release part of the reserved balance, floored at zero.
pub fn release_reserved(conn: &Connection, id: &str, amount_paise: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE campaigns
         SET budget_reserved_paise = MAX(budget_reserved_paise - ?1, 0)
         WHERE id = ?2",
        rusqlite::params![amount_paise, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("campaign {id}")));
    }
    Ok(())
}

/// Convert a reservation into spend on settlement.
///
/// The reserved balance is floored at zero; the spent balance always
/// increases by the full amount.
pub fn settle_amount(conn: &Connection, id: &str, amount_paise: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE campaigns
         SET budget_reserved_paise = MAX(budget_reserved_paise - ?1, 0),
             budget_spent_paise = budget_spent_paise + ?1
         WHERE id = ?2",
        rusqlite::params![amount_paise, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("campaign {id}")));
    }
    Ok(())
}
