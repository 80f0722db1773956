//! Submission state machine: join, submit content, request re-verification.
//!
//! Lifecycle: `pending_host_approval -> active -> {suspended, ended}`,
//! where `suspended` is reachable only from pending via admin rejection.

use std::collections::BTreeMap;

use rusqlite::Connection;

use promora_db::is_unique_violation;
use promora_db::queries::{participations, submissions, verifications};
use promora_types::campaign::CampaignStatus;
use promora_types::new_id;
use promora_types::submission::{
    Participation, Platform, Submission, SubmissionPayoutStatus, SubmissionStatus,
    VerificationRequest,
};

use crate::{campaign, cycle, CoreError, Result};

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Content submission payload.
#[derive(Clone, Debug)]
pub struct SubmitContentInput {
    /// Platform name as supplied by the caller (any casing).
    pub platform: String,
    /// Public URL of the posted content.
    pub reel_url: String,
}

fn normalize_platform(name: &str) -> Result<Platform> {
    Platform::normalize(name).map_err(|e| CoreError::UnsupportedPlatform(e.value))
}

/// Register a creator in a campaign.
///
/// Upserts the participation: re-joining replaces platforms and handles
/// and refreshes the eligibility window. Handles with empty values are
/// dropped.
///
/// # Errors
///
/// - [`CoreError::CampaignNotFound`]
/// - [`CoreError::InvalidState`] unless the campaign is active
/// - [`CoreError::UnsupportedPlatform`] for an unknown platform name
pub fn join_campaign(
    conn: &Connection,
    campaign_id: &str,
    creator_id: &str,
    platforms: &[String],
    handles: &BTreeMap<String, String>,
    now: i64,
) -> Result<Participation> {
    let campaign = campaign::require(conn, campaign_id)?;
    if campaign.status != CampaignStatus::Active {
        return Err(CoreError::InvalidState(
            "only active campaigns can be joined".to_string(),
        ));
    }

    let mut normalized_platforms = Vec::with_capacity(platforms.len());
    for name in platforms {
        normalized_platforms.push(normalize_platform(name)?);
    }
    let mut normalized_handles = BTreeMap::new();
    for (name, handle) in handles {
        if handle.is_empty() {
            continue;
        }
        normalized_handles.insert(normalize_platform(name)?, handle.clone());
    }

    let participation = Participation {
        campaign_id: campaign_id.to_string(),
        creator_id: creator_id.to_string(),
        platforms: normalized_platforms,
        handles: normalized_handles,
        eligible_until: now + campaign.submission_eligibility_days * SECONDS_PER_DAY,
        joined_at: now,
    };
    participations::upsert(conn, &participation)?;

    tracing::info!(campaign_id, creator_id, "creator joined campaign");
    Ok(participation)
}

/// Record a piece of posted content for verification.
///
/// Requires a prior join with the submission's platform selected and a
/// non-empty handle. Duplicate URLs per (campaign, creator) are rejected.
pub fn submit_content(
    conn: &Connection,
    campaign_id: &str,
    creator_id: &str,
    input: &SubmitContentInput,
    now: i64,
) -> Result<Submission> {
    let campaign = campaign::require(conn, campaign_id)?;
    if campaign.status != CampaignStatus::Active {
        return Err(CoreError::InvalidState(
            "only active campaigns accept submissions".to_string(),
        ));
    }
    let platform = normalize_platform(&input.platform)?;

    let participation = participations::get(conn, campaign_id, creator_id)?
        .ok_or_else(|| CoreError::NotJoined(campaign_id.to_string()))?;
    if !participation.platforms.contains(&platform) {
        return Err(CoreError::PlatformNotSelected(platform.as_str().to_string()));
    }
    let handle = participation
        .handles
        .get(&platform)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| CoreError::MissingHandle(platform.as_str().to_string()))?;

    if submissions::url_exists(conn, campaign_id, creator_id, &input.reel_url)? {
        return Err(CoreError::DuplicateUrl(input.reel_url.clone()));
    }

    let submission = Submission {
        id: new_id(),
        campaign_id: campaign_id.to_string(),
        creator_id: creator_id.to_string(),
        platform,
        handle: handle.clone(),
        reel_url: input.reel_url.clone(),
        status: SubmissionStatus::PendingHostApproval,
        paid_views_total: 0,
        last_verified_views_total: 0,
        last_verified_cycle_index: 0,
        payout_status: SubmissionPayoutStatus::Unpaid,
        eligible_until: now + campaign.submission_eligibility_days * SECONDS_PER_DAY,
        created_at: now,
    };
    submissions::insert(conn, &submission)?;

    tracing::info!(
        campaign_id,
        creator_id,
        submission_id = %submission.id,
        "content submitted"
    );
    Ok(submission)
}

/// Request a re-verification for the current cycle.
///
/// At most one request per (submission, cycle), enforced by the request
/// table's primary key rather than a pre-read.
///
/// # Errors
///
/// - [`CoreError::SubmissionNotFound`] / [`CoreError::Forbidden`]
/// - [`CoreError::InvalidState`] unless the submission is active
/// - [`CoreError::EligibilityExpired`] after the eligibility window
/// - [`CoreError::CampaignNotStarted`] while the cycle index is negative
/// - [`CoreError::AlreadyRequested`] on a second request in one cycle
pub fn request_reverification(
    conn: &Connection,
    submission_id: &str,
    creator_id: &str,
    now: i64,
) -> Result<VerificationRequest> {
    let submission = require(conn, submission_id)?;
    if submission.creator_id != creator_id {
        return Err(CoreError::Forbidden(format!("submission {submission_id}")));
    }
    if submission.status != SubmissionStatus::Active {
        return Err(CoreError::InvalidState(
            "only active submissions can be re-verified".to_string(),
        ));
    }
    if now > submission.eligible_until {
        return Err(CoreError::EligibilityExpired(submission.eligible_until));
    }

    let campaign = campaign::require(conn, &submission.campaign_id)?;
    let cycle_index = cycle::cycle_index(campaign.start_at, campaign.cycle_hours, now);
    if cycle_index < 0 {
        return Err(CoreError::CampaignNotStarted);
    }

    match verifications::insert_request(conn, submission_id, cycle_index, now) {
        Ok(request) => {
            tracing::info!(submission_id, cycle_index, "re-verification requested");
            Ok(request)
        }
        Err(err) if is_unique_violation(&err, "verification_requests") => {
            Err(CoreError::AlreadyRequested(cycle_index))
        }
        Err(err) => Err(err.into()),
    }
}

/// Fetch a submission or fail with `SubmissionNotFound`.
pub(crate) fn require(conn: &Connection, submission_id: &str) -> Result<Submission> {
    submissions::get(conn, submission_id)?
        .ok_or_else(|| CoreError::SubmissionNotFound(submission_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::{activate_campaign, create_campaign};
    use crate::verification::{admin_verify, VerifyInput};
    use promora_types::campaign::{Campaign, CreateCampaignInput};

    fn test_db() -> Connection {
        promora_db::open_memory().expect("open test db")
    }

    fn active_campaign(conn: &mut Connection) -> Campaign {
        let campaign = create_campaign(
            conn,
            "h1",
            &CreateCampaignInput {
                title: "Launch promo".into(),
                description: "Promote the launch".into(),
                platforms: vec![Platform::Instagram, Platform::Youtube],
                rate_per_1k_views_paise: 3000,
                budget_total_paise: Some(500_000),
                start_at: Some(0),
                ..Default::default()
            },
            0,
        )
        .expect("create campaign");
        activate_campaign(conn, &campaign.id, "h1", 0).expect("activate")
    }

    fn join(conn: &Connection, campaign_id: &str, now: i64) -> Participation {
        let mut handles = BTreeMap::new();
        handles.insert("instagram".to_string(), "@creator".to_string());
        join_campaign(
            conn,
            campaign_id,
            "u1",
            &["INSTAGRAM".to_string()],
            &handles,
            now,
        )
        .expect("join")
    }

    fn reel(conn: &Connection, campaign_id: &str, url: &str, now: i64) -> Submission {
        submit_content(
            conn,
            campaign_id,
            "u1",
            &SubmitContentInput {
                platform: "instagram".into(),
                reel_url: url.into(),
            },
            now,
        )
        .expect("submit")
    }

    #[test]
    fn test_join_normalizes_platforms() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);

        let participation = join(&conn, &campaign.id, 100);
        assert_eq!(participation.platforms, vec![Platform::Instagram]);
        assert_eq!(
            participation.handles.get(&Platform::Instagram).map(String::as_str),
            Some("@creator")
        );
        assert_eq!(participation.eligible_until, 100 + 30 * 24 * 3600);
    }

    #[test]
    fn test_join_drops_empty_handles() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);

        let mut handles = BTreeMap::new();
        handles.insert("instagram".to_string(), String::new());
        let participation = join_campaign(
            &conn,
            &campaign.id,
            "u1",
            &["instagram".to_string()],
            &handles,
            100,
        )
        .expect("join");
        assert!(participation.handles.is_empty());
    }

    #[test]
    fn test_join_requires_active_campaign() {
        let conn = test_db();
        let campaign = create_campaign(
            &conn,
            "h1",
            &CreateCampaignInput {
                title: "t".into(),
                description: "d".into(),
                platforms: vec![Platform::Instagram],
                rate_per_1k_views_paise: 3000,
                budget_total_paise: Some(1000),
                ..Default::default()
            },
            0,
        )
        .expect("create");

        let result = join_campaign(&conn, &campaign.id, "u1", &[], &BTreeMap::new(), 100);
        assert!(matches!(result, Err(CoreError::InvalidState(_))));
    }

    #[test]
    fn test_submit_content_happy_path() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);
        join(&conn, &campaign.id, 100);

        let submission = reel(&conn, &campaign.id, "https://example.com/reel/1", 200);
        assert_eq!(submission.status, SubmissionStatus::PendingHostApproval);
        assert_eq!(submission.platform, Platform::Instagram);
        assert_eq!(submission.handle, "@creator");
    }

    #[test]
    fn test_submit_requires_join() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);

        let result = submit_content(
            &conn,
            &campaign.id,
            "u1",
            &SubmitContentInput {
                platform: "instagram".into(),
                reel_url: "https://example.com/reel/1".into(),
            },
            100,
        );
        assert!(matches!(result, Err(CoreError::NotJoined(_))));
    }

    #[test]
    fn test_submit_wrong_platform() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);
        join(&conn, &campaign.id, 100);

        let result = submit_content(
            &conn,
            &campaign.id,
            "u1",
            &SubmitContentInput {
                platform: "youtube".into(),
                reel_url: "https://example.com/v/1".into(),
            },
            200,
        );
        assert!(matches!(result, Err(CoreError::PlatformNotSelected(_))));
    }

    #[test]
    fn test_submit_duplicate_url() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);
        join(&conn, &campaign.id, 100);
        reel(&conn, &campaign.id, "https://example.com/reel/1", 200);

        let result = submit_content(
            &conn,
            &campaign.id,
            "u1",
            &SubmitContentInput {
                platform: "instagram".into(),
                reel_url: "https://example.com/reel/1".into(),
            },
            300,
        );
        assert!(matches!(result, Err(CoreError::DuplicateUrl(_))));
    }

    #[test]
    fn test_reverify_once_per_cycle() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);
        join(&conn, &campaign.id, 100);
        let submission = reel(&conn, &campaign.id, "https://example.com/reel/1", 200);

        // Approval moves the submission to active
        admin_verify(
            &mut conn,
            &submission.id,
            "admin",
            &VerifyInput::approve(Some(1000)),
            300,
        )
        .expect("verify");

        request_reverification(&conn, &submission.id, "u1", 400).expect("first request");
        let result = request_reverification(&conn, &submission.id, "u1", 500);
        assert!(matches!(result, Err(CoreError::AlreadyRequested(0))));

        // Next cycle opens a new window
        let next_cycle = 48 * 3600 + 10;
        request_reverification(&conn, &submission.id, "u1", next_cycle).expect("next cycle");
    }

    #[test]
    fn test_reverify_requires_active_submission() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);
        join(&conn, &campaign.id, 100);
        let submission = reel(&conn, &campaign.id, "https://example.com/reel/1", 200);

        let result = request_reverification(&conn, &submission.id, "u1", 300);
        assert!(matches!(result, Err(CoreError::InvalidState(_))));
    }

    #[test]
    fn test_reverify_wrong_creator() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);
        join(&conn, &campaign.id, 100);
        let submission = reel(&conn, &campaign.id, "https://example.com/reel/1", 200);

        let result = request_reverification(&conn, &submission.id, "someone-else", 300);
        assert!(matches!(result, Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn test_reverify_after_eligibility_window() {
        let mut conn = test_db();
        let campaign = active_campaign(&mut conn);
        join(&conn, &campaign.id, 100);
        let submission = reel(&conn, &campaign.id, "https://example.com/reel/1", 200);
        admin_verify(
            &mut conn,
            &submission.id,
            "admin",
            &VerifyInput::approve(Some(1000)),
            300,
        )
        .expect("verify");

        let after_window = submission.eligible_until + 1;
        let result = request_reverification(&conn, &submission.id, "u1", after_window);
        assert!(matches!(result, Err(CoreError::EligibilityExpired(_))));
    }

    #[test]
    fn test_reverify_before_campaign_start() {
        let mut conn = test_db();
        let campaign = create_campaign(
            &conn,
            "h1",
            &CreateCampaignInput {
                title: "t".into(),
                description: "d".into(),
                platforms: vec![Platform::Instagram],
                rate_per_1k_views_paise: 3000,
                budget_total_paise: Some(500_000),
                start_at: Some(1_000_000),
                ..Default::default()
            },
            0,
        )
        .expect("create");
        activate_campaign(&conn, &campaign.id, "h1", 0).expect("activate");
        join(&conn, &campaign.id, 100);
        let submission = reel(&conn, &campaign.id, "https://example.com/reel/1", 200);
        admin_verify(
            &mut conn,
            &submission.id,
            "admin",
            &VerifyInput::approve(None),
            300,
        )
        .expect("verify");

        let result = request_reverification(&conn, &submission.id, "u1", 400);
        assert!(matches!(result, Err(CoreError::CampaignNotStarted)));
    }
}
