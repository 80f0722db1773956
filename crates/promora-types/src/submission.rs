//! Participation, submission, and verification record types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::UnknownValue;

/// Views per payable unit: creators are paid per 1000 verified views.
pub const VIEWS_PER_UNIT: i64 = 1000;

/// Content platform a creator posts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Youtube,
    Instagram,
    Facebook,
}

impl Platform {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
        }
    }

    /// Normalize a caller-supplied platform name (any casing).
    pub fn normalize(s: &str) -> Result<Self, UnknownValue> {
        s.to_ascii_lowercase().parse()
    }
}

impl std::str::FromStr for Platform {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Platform::Youtube),
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            other => Err(UnknownValue {
                field: "platform",
                value: other.to_string(),
            }),
        }
    }
}

/// Submission lifecycle status.
///
/// `Suspended` is reachable only from `PendingHostApproval` via an admin
/// rejection; rejecting an already-active submission leaves it active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingHostApproval,
    Active,
    Suspended,
    Ended,
}

impl SubmissionStatus {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::PendingHostApproval => "pending_host_approval",
            SubmissionStatus::Active => "active",
            SubmissionStatus::Suspended => "suspended",
            SubmissionStatus::Ended => "ended",
        }
    }

    /// Whether an admin may verify a submission in this state.
    pub fn is_verifiable(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::PendingHostApproval | SubmissionStatus::Active
        )
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_host_approval" => Ok(SubmissionStatus::PendingHostApproval),
            "active" => Ok(SubmissionStatus::Active),
            "suspended" => Ok(SubmissionStatus::Suspended),
            "ended" => Ok(SubmissionStatus::Ended),
            other => Err(UnknownValue {
                field: "submission.status",
                value: other.to_string(),
            }),
        }
    }
}

/// Payout status of a single submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPayoutStatus {
    Unpaid,
    Paid,
}

impl SubmissionPayoutStatus {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPayoutStatus::Unpaid => "unpaid",
            SubmissionPayoutStatus::Paid => "paid",
        }
    }
}

impl std::str::FromStr for SubmissionPayoutStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(SubmissionPayoutStatus::Unpaid),
            "paid" => Ok(SubmissionPayoutStatus::Paid),
            other => Err(UnknownValue {
                field: "submission.payout_status",
                value: other.to_string(),
            }),
        }
    }
}

/// A creator's registration in a campaign, one per (campaign, creator).
///
/// Upserted on every join; re-joining refreshes platforms, handles, and
/// the eligibility window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participation {
    pub campaign_id: String,
    pub creator_id: String,
    /// Platforms selected at join time.
    pub platforms: Vec<Platform>,
    /// Handle per selected platform; empty handles are dropped at join.
    pub handles: BTreeMap<Platform, String>,
    /// Re-verification requests are rejected after this time.
    pub eligible_until: i64,
    pub joined_at: i64,
}

/// One piece of posted content under a campaign.
///
/// Invariant: `paid_views_total <= last_verified_views_total`.
/// `paid_views_total` advances only when a payout settles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub campaign_id: String,
    pub creator_id: String,
    pub platform: Platform,
    pub handle: String,
    pub reel_url: String,
    pub status: SubmissionStatus,
    /// Cumulative views already converted to paid units.
    pub paid_views_total: i64,
    /// Most recent admin-attested cumulative view count.
    pub last_verified_views_total: i64,
    /// Cycle in which the last verification occurred.
    pub last_verified_cycle_index: i64,
    pub payout_status: SubmissionPayoutStatus,
    /// Re-verification requests are rejected after this time.
    pub eligible_until: i64,
    pub created_at: i64,
}

impl Submission {
    /// Views attested but not yet paid.
    pub fn unpaid_delta_views(&self) -> i64 {
        self.last_verified_views_total - self.paid_views_total
    }
}

/// Immutable record of one admin verification action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationCheck {
    pub id: String,
    pub submission_id: String,
    pub cycle_index: i64,
    pub verified_views_total: i64,
    pub admin_id: String,
    pub proof_note: Option<String>,
    pub proof_url: Option<String>,
    pub created_at: i64,
}

/// A creator's re-verification ticket, at most one per (submission, cycle).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub submission_id: String,
    pub cycle_index: i64,
    pub status: String,
    pub created_at: i64,
}
