//! Payout batch types.

use serde::{Deserialize, Serialize};

use crate::UnknownValue;

/// Settlement status of a payout batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Paid,
}

impl PayoutStatus {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Paid => "paid",
        }
    }
}

impl std::str::FromStr for PayoutStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PayoutStatus::Pending),
            "paid" => Ok(PayoutStatus::Paid),
            other => Err(UnknownValue {
                field: "payout.status",
                value: other.to_string(),
            }),
        }
    }
}

/// One settlement batch for a creator, aggregating unpaid verified
/// earnings across submissions. Transitions pending -> paid exactly once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub creator_id: String,
    /// Sum of the item amounts.
    pub amount_paise: i64,
    pub status: PayoutStatus,
    /// External payment reference, set on settlement.
    pub reference_id: Option<String>,
    pub created_at: i64,
}

/// One submission's share of a payout batch. Created with the payout,
/// immutable thereafter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayoutItem {
    pub payout_id: String,
    pub submission_id: String,
    pub amount_paise: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [PayoutStatus::Pending, PayoutStatus::Paid] {
            assert_eq!(PayoutStatus::from_str(status.as_str()).expect("parse"), status);
        }
    }

    #[test]
    fn test_status_unknown() {
        assert!(PayoutStatus::from_str("cancelled").is_err());
    }
}
