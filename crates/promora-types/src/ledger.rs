//! Append-only ledger entry types.

use serde::{Deserialize, Serialize};

use crate::UnknownValue;

/// Direction/kind of a monetary movement. Amounts are stored as positive
/// magnitudes; the type gives the direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    Deposit,
    Reserve,
    ReleaseReserve,
    PayoutPaid,
    Fee,
}

impl LedgerEntryType {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Deposit => "deposit",
            LedgerEntryType::Reserve => "reserve",
            LedgerEntryType::ReleaseReserve => "release_reserve",
            LedgerEntryType::PayoutPaid => "payout_paid",
            LedgerEntryType::Fee => "fee",
        }
    }
}

impl std::str::FromStr for LedgerEntryType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(LedgerEntryType::Deposit),
            "reserve" => Ok(LedgerEntryType::Reserve),
            "release_reserve" => Ok(LedgerEntryType::ReleaseReserve),
            "payout_paid" => Ok(LedgerEntryType::PayoutPaid),
            "fee" => Ok(LedgerEntryType::Fee),
            other => Err(UnknownValue {
                field: "ledger_entry.entry_type",
                value: other.to_string(),
            }),
        }
    }
}

/// One immutable audit record of a monetary movement.
///
/// Entries are created exactly once per economically meaningful event and
/// never mutated or deleted. When `idempotency_key` is present it is
/// unique across the ledger; a conflicting insert means the event was
/// already applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub entry_type: LedgerEntryType,
    pub campaign_id: String,
    pub submission_id: Option<String>,
    pub payout_id: Option<String>,
    pub amount_paise: i64,
    pub idempotency_key: Option<String>,
    pub created_by: Option<String>,
    pub created_at: i64,
}
