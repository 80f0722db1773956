//! Campaign lifecycle operations.

use rusqlite::Connection;

use promora_db::queries::{audit, campaigns};
use promora_types::campaign::{
    Campaign, CampaignStatus, CreateCampaignInput, DEFAULT_CYCLE_HOURS, DEFAULT_ELIGIBILITY_DAYS,
};
use promora_types::new_id;

use crate::{CoreError, Result};

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Default campaign run length when `end_at` is left unset at activation.
const DEFAULT_RUN_DAYS: i64 = 30;

/// Create a draft campaign owned by `host_id`.
///
/// An optional seed budget is counted into the total immediately; see
/// [`crate::budget::deposit`] for how the matching deposit is reconciled.
pub fn create_campaign(
    conn: &Connection,
    host_id: &str,
    input: &CreateCampaignInput,
    now: i64,
) -> Result<Campaign> {
    let seed = input.budget_total_paise.unwrap_or(0);
    if seed < 0 {
        return Err(CoreError::InvalidAmount(seed));
    }
    if input.rate_per_1k_views_paise <= 0 {
        return Err(CoreError::InvalidAmount(input.rate_per_1k_views_paise));
    }
    // The cycle length is a divisor in the cycle calculator
    let cycle_hours = input.cycle_hours.unwrap_or(DEFAULT_CYCLE_HOURS);
    if cycle_hours <= 0 {
        return Err(CoreError::InvalidAmount(cycle_hours));
    }
    let eligibility_days = input
        .submission_eligibility_days
        .unwrap_or(DEFAULT_ELIGIBILITY_DAYS);
    if eligibility_days <= 0 {
        return Err(CoreError::InvalidAmount(eligibility_days));
    }

    let campaign = Campaign {
        id: new_id(),
        host_id: host_id.to_string(),
        title: input.title.clone(),
        description: input.description.clone(),
        platforms: input.platforms.clone(),
        rate_per_1k_views_paise: input.rate_per_1k_views_paise,
        budget_total_paise: seed,
        budget_reserved_paise: 0,
        budget_spent_paise: 0,
        status: CampaignStatus::Draft,
        start_at: input.start_at,
        end_at: input.end_at,
        cycle_hours,
        submission_eligibility_days: eligibility_days,
        created_at: now,
    };
    campaigns::insert(conn, &campaign)?;

    tracing::info!(campaign_id = %campaign.id, host_id, "campaign created");
    Ok(campaign)
}

/// Activate a draft campaign, fixing its schedule.
///
/// Requires a positive budget and complete metadata. Missing schedule
/// bounds default to `now` and `now + 30 days`.
pub fn activate_campaign(
    conn: &Connection,
    campaign_id: &str,
    host_id: &str,
    now: i64,
) -> Result<Campaign> {
    let campaign = require(conn, campaign_id)?;
    if campaign.host_id != host_id {
        return Err(CoreError::Forbidden(format!("campaign {campaign_id}")));
    }
    if campaign.status != CampaignStatus::Draft {
        return Err(CoreError::InvalidState(
            "only draft campaigns can be activated".to_string(),
        ));
    }
    if campaign.budget_total_paise <= 0 {
        return Err(CoreError::InvalidState(
            "campaign must have budget to activate".to_string(),
        ));
    }
    if campaign.title.is_empty() || campaign.description.is_empty() || campaign.platforms.is_empty()
    {
        return Err(CoreError::InvalidState(
            "campaign must have title, description, and platforms".to_string(),
        ));
    }

    let start_at = campaign.start_at.unwrap_or(now);
    let end_at = campaign
        .end_at
        .unwrap_or(now + DEFAULT_RUN_DAYS * SECONDS_PER_DAY);
    campaigns::activate(conn, campaign_id, start_at, end_at)?;
    audit::append(
        conn,
        host_id,
        "campaign_activate",
        "campaign",
        campaign_id,
        &serde_json::json!({ "start_at": start_at, "end_at": end_at }),
        now,
    )?;

    tracing::info!(campaign_id, start_at, end_at, "campaign activated");
    require(conn, campaign_id)
}

/// Pause an active campaign.
pub fn pause_campaign(
    conn: &Connection,
    campaign_id: &str,
    host_id: &str,
    now: i64,
) -> Result<Campaign> {
    transition(
        conn,
        campaign_id,
        host_id,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        "only active campaigns can be paused",
        now,
    )
}

/// Resume a paused campaign.
pub fn resume_campaign(
    conn: &Connection,
    campaign_id: &str,
    host_id: &str,
    now: i64,
) -> Result<Campaign> {
    transition(
        conn,
        campaign_id,
        host_id,
        CampaignStatus::Paused,
        CampaignStatus::Active,
        "only paused campaigns can be resumed",
        now,
    )
}

fn transition(
    conn: &Connection,
    campaign_id: &str,
    host_id: &str,
    from: CampaignStatus,
    to: CampaignStatus,
    invalid_msg: &str,
    now: i64,
) -> Result<Campaign> {
    let campaign = require(conn, campaign_id)?;
    if campaign.host_id != host_id {
        return Err(CoreError::Forbidden(format!("campaign {campaign_id}")));
    }
    if campaign.status != from {
        return Err(CoreError::InvalidState(invalid_msg.to_string()));
    }
    campaigns::set_status(conn, campaign_id, to)?;
    audit::append(
        conn,
        host_id,
        "campaign_status",
        "campaign",
        campaign_id,
        &serde_json::json!({ "from": from.as_str(), "to": to.as_str() }),
        now,
    )?;
    require(conn, campaign_id)
}

/// Fetch a campaign or fail with `CampaignNotFound`.
pub(crate) fn require(conn: &Connection, campaign_id: &str) -> Result<Campaign> {
    campaigns::get(conn, campaign_id)?
        .ok_or_else(|| CoreError::CampaignNotFound(campaign_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use promora_types::submission::Platform;

    fn test_db() -> Connection {
        promora_db::open_memory().expect("open test db")
    }

    fn input() -> CreateCampaignInput {
        CreateCampaignInput {
            title: "Launch promo".into(),
            description: "Promote the launch".into(),
            platforms: vec![Platform::Instagram],
            rate_per_1k_views_paise: 3000,
            budget_total_paise: Some(500_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_draft() {
        let conn = test_db();
        let campaign = create_campaign(&conn, "h1", &input(), 1000).expect("create");
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert_eq!(campaign.budget_total_paise, 500_000);
        assert_eq!(campaign.cycle_hours, 48);
        assert_eq!(campaign.available_paise(), 500_000);
    }

    #[test]
    fn test_create_rejects_bad_rate() {
        let conn = test_db();
        let mut bad = input();
        bad.rate_per_1k_views_paise = 0;
        assert!(matches!(
            create_campaign(&conn, "h1", &bad, 1000),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_create_rejects_bad_schedule_inputs() {
        let conn = test_db();

        // A zero cycle length would divide by zero in the cycle calculator
        let mut bad = input();
        bad.cycle_hours = Some(0);
        assert!(matches!(
            create_campaign(&conn, "h1", &bad, 1000),
            Err(CoreError::InvalidAmount(0))
        ));

        let mut bad = input();
        bad.submission_eligibility_days = Some(-5);
        assert!(matches!(
            create_campaign(&conn, "h1", &bad, 1000),
            Err(CoreError::InvalidAmount(-5))
        ));
    }

    #[test]
    fn test_activate_defaults_schedule() {
        let conn = test_db();
        let campaign = create_campaign(&conn, "h1", &input(), 1000).expect("create");
        let campaign = activate_campaign(&conn, &campaign.id, "h1", 2000).expect("activate");
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.start_at, Some(2000));
        assert_eq!(campaign.end_at, Some(2000 + 30 * 24 * 3600));
    }

    #[test]
    fn test_activate_requires_budget() {
        let conn = test_db();
        let mut no_budget = input();
        no_budget.budget_total_paise = None;
        let campaign = create_campaign(&conn, "h1", &no_budget, 1000).expect("create");
        assert!(matches!(
            activate_campaign(&conn, &campaign.id, "h1", 2000),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn test_activate_wrong_host() {
        let conn = test_db();
        let campaign = create_campaign(&conn, "h1", &input(), 1000).expect("create");
        assert!(matches!(
            activate_campaign(&conn, &campaign.id, "h2", 2000),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn test_pause_resume_cycle() {
        let conn = test_db();
        let campaign = create_campaign(&conn, "h1", &input(), 1000).expect("create");
        activate_campaign(&conn, &campaign.id, "h1", 2000).expect("activate");

        let paused = pause_campaign(&conn, &campaign.id, "h1", 3000).expect("pause");
        assert_eq!(paused.status, CampaignStatus::Paused);
        // Pausing twice is invalid
        assert!(matches!(
            pause_campaign(&conn, &campaign.id, "h1", 3100),
            Err(CoreError::InvalidState(_))
        ));

        let resumed = resume_campaign(&conn, &campaign.id, "h1", 4000).expect("resume");
        assert_eq!(resumed.status, CampaignStatus::Active);
    }

    #[test]
    fn test_missing_campaign() {
        let conn = test_db();
        assert!(matches!(
            activate_campaign(&conn, "nope", "h1", 0),
            Err(CoreError::CampaignNotFound(_))
        ));
    }
}
