//! Campaign and budget account types.

use serde::{Deserialize, Serialize};

use crate::submission::Platform;
use crate::UnknownValue;

/// Default verification cycle length in hours.
pub const DEFAULT_CYCLE_HOURS: i64 = 48;

/// Default submission eligibility window in days.
pub const DEFAULT_ELIGIBILITY_DAYS: i64 = 30;

/// Campaign lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Ended => "ended",
        }
    }

    /// A campaign can receive deposits only while draft or active.
    pub fn is_fundable(&self) -> bool {
        matches!(self, CampaignStatus::Draft | CampaignStatus::Active)
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "ended" => Ok(CampaignStatus::Ended),
            other => Err(UnknownValue {
                field: "campaign.status",
                value: other.to_string(),
            }),
        }
    }
}

/// A promotional campaign with its three-field budget account.
///
/// Budget invariant: `budget_reserved_paise + budget_spent_paise <=
/// budget_total_paise` at all times. The available balance is derived,
/// never stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub description: String,
    /// Platforms creators may post on for this campaign.
    pub platforms: Vec<Platform>,
    /// Creator rate per 1000 verified views, in paise.
    pub rate_per_1k_views_paise: i64,
    /// Cumulative funds ever deposited.
    pub budget_total_paise: i64,
    /// Funds earmarked for approved-but-unpaid verified views.
    pub budget_reserved_paise: i64,
    /// Funds actually paid out.
    pub budget_spent_paise: i64,
    pub status: CampaignStatus,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    /// Verification cycle length in hours.
    pub cycle_hours: i64,
    /// Days a creator stays eligible for re-verification after joining.
    pub submission_eligibility_days: i64,
    pub created_at: i64,
}

impl Campaign {
    /// Budget still available for new reservations.
    pub fn available_paise(&self) -> i64 {
        self.budget_total_paise - self.budget_reserved_paise - self.budget_spent_paise
    }
}

/// Input for creating a draft campaign.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateCampaignInput {
    pub title: String,
    pub description: String,
    pub platforms: Vec<Platform>,
    pub rate_per_1k_views_paise: i64,
    /// Optional pre-seeded budget, counted into the total at creation.
    pub budget_total_paise: Option<i64>,
    pub start_at: Option<i64>,
    pub end_at: Option<i64>,
    pub cycle_hours: Option<i64>,
    pub submission_eligibility_days: Option<i64>,
}
