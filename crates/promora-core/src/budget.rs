//! Deposit intake for campaign budgets.
//!
//! Both the host's manual "add funds" action and the payment provider's
//! confirmation webhook funnel into [`deposit`]. Webhook delivery is
//! at-least-once, so the operation is idempotent on the caller-supplied
//! key: a repeat commits nothing and reports success.

use rusqlite::{Connection, TransactionBehavior};

use promora_db::queries::ledger::{self, NewLedgerEntry};
use promora_db::queries::{audit, campaigns};
use promora_db::is_unique_violation;
use promora_types::campaign::{Campaign, CampaignStatus};
use promora_types::ledger::LedgerEntryType;

use crate::{campaign, CoreError, Result};

/// Result of a deposit attempt.
#[derive(Clone, Debug)]
pub struct DepositOutcome {
    /// The campaign after the deposit (unchanged on a repeat).
    pub campaign: Campaign,
    /// True when the idempotency key had already been applied.
    pub repeated: bool,
}

/// Add funds to a campaign's budget. One atomic transaction.
///
/// Idempotency is enforced by the UNIQUE constraint on the ledger's
/// idempotency key: the entry is inserted first and a conflict rolls the
/// whole transaction back, reporting a successful repeat. There is no
/// read-then-insert window for concurrent retries to race through.
///
/// # Errors
///
/// - [`CoreError::InvalidAmount`] if `amount_paise <= 0`
/// - [`CoreError::CampaignNotFound`] if the campaign does not exist
/// - [`CoreError::InvalidState`] unless the campaign is draft or active
pub fn deposit(
    conn: &mut Connection,
    campaign_id: &str,
    amount_paise: i64,
    idempotency_key: Option<&str>,
    actor_id: Option<&str>,
    now: i64,
) -> Result<DepositOutcome> {
    if amount_paise <= 0 {
        return Err(CoreError::InvalidAmount(amount_paise));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let before = campaign::require(&tx, campaign_id)?;
    if !before.status.is_fundable() {
        return Err(CoreError::InvalidState(
            "campaign cannot receive funds".to_string(),
        ));
    }

    let entry = NewLedgerEntry {
        entry_type: LedgerEntryType::Deposit,
        campaign_id,
        submission_id: None,
        payout_id: None,
        amount_paise,
        idempotency_key,
        created_by: actor_id,
    };
    if let Err(err) = ledger::insert(&tx, &entry, now) {
        if is_unique_violation(&err, "ledger_entries.idempotency_key") {
            // Already applied; drop the transaction and report the repeat.
            drop(tx);
            let campaign = campaign::require(conn, campaign_id)?;
            tracing::info!(campaign_id, amount_paise, "deposit repeat ignored");
            return Ok(DepositOutcome {
                campaign,
                repeated: true,
            });
        }
        return Err(err.into());
    }

    // A draft whose pre-seeded budget equals the incoming amount was
    // already counted at creation; record the ledger entry but skip the
    // increment.
    let seed_reconciliation = before.status == CampaignStatus::Draft
        && before.budget_total_paise > 0
        && before.budget_total_paise == amount_paise;
    if !seed_reconciliation {
        campaigns::add_to_total(&tx, campaign_id, amount_paise)?;
    }

    if let Some(actor_id) = actor_id {
        audit::append(
            &tx,
            actor_id,
            "budget_deposit",
            "campaign",
            campaign_id,
            &serde_json::json!({ "amount_paise": amount_paise }),
            now,
        )?;
    }

    tx.commit()?;

    let campaign = campaign::require(conn, campaign_id)?;
    tracing::info!(
        campaign_id,
        amount_paise,
        total_paise = campaign.budget_total_paise,
        "deposit applied"
    );
    Ok(DepositOutcome {
        campaign,
        repeated: false,
    })
}
