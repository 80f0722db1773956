//! Payout engine: batch creation and settlement.
//!
//! Settlement is the only place `paid_views_total` advances, which is
//! what keeps the verification workflow's cumulative reservation math
//! safe against repeated approvals.

use rusqlite::{Connection, TransactionBehavior};

use promora_db::queries::ledger::{self, NewLedgerEntry};
use promora_db::queries::{audit, campaigns, payouts, submissions};
use promora_types::ledger::LedgerEntryType;
use promora_types::new_id;
use promora_types::payout::{Payout, PayoutItem, PayoutStatus};
use promora_types::submission::VIEWS_PER_UNIT;

use crate::verification::payable_amount;
use crate::{campaign, submission, CoreError, Result};

/// A payout together with its line items.
#[derive(Clone, Debug)]
pub struct PayoutBatch {
    pub payout: Payout,
    pub items: Vec<PayoutItem>,
}

/// Batch a creator's unpaid verified earnings into a pending payout.
/// One atomic transaction.
///
/// Scans the creator's active, unpaid submissions and recomputes each
/// payable amount from its attested-minus-paid view delta; submissions
/// below one payable unit are skipped.
///
/// # Errors
///
/// - [`CoreError::NoUnpaidSubmissions`] if the scan finds nothing
/// - [`CoreError::NoPayableAmount`] if every candidate rounds to zero
pub fn create_payout_batch(
    conn: &mut Connection,
    creator_id: &str,
    admin_id: &str,
    now: i64,
) -> Result<PayoutBatch> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let unpaid = submissions::list_unpaid_active_for_creator(&tx, creator_id)?;
    if unpaid.is_empty() {
        return Err(CoreError::NoUnpaidSubmissions);
    }

    let payout_id = new_id();
    let mut total_paise: i64 = 0;
    let mut items = Vec::new();
    for candidate in &unpaid {
        let campaign = campaign::require(&tx, &candidate.campaign_id)?;
        let amount_paise =
            payable_amount(candidate.unpaid_delta_views(), campaign.rate_per_1k_views_paise)?;
        if amount_paise <= 0 {
            continue;
        }
        total_paise = total_paise
            .checked_add(amount_paise)
            .ok_or(CoreError::Overflow)?;
        items.push(PayoutItem {
            payout_id: payout_id.clone(),
            submission_id: candidate.id.clone(),
            amount_paise,
        });
    }
    if total_paise == 0 {
        return Err(CoreError::NoPayableAmount);
    }

    let payout = Payout {
        id: payout_id,
        creator_id: creator_id.to_string(),
        amount_paise: total_paise,
        status: PayoutStatus::Pending,
        reference_id: None,
        created_at: now,
    };
    payouts::insert(&tx, &payout)?;
    for item in &items {
        payouts::insert_item(&tx, item)?;
    }
    audit::append(
        &tx,
        admin_id,
        "payout_create",
        "payout",
        &payout.id,
        &serde_json::json!({
            "creator_id": creator_id,
            "amount_paise": total_paise,
            "items": items.len(),
        }),
        now,
    )?;

    tx.commit()?;

    tracing::info!(
        payout_id = %payout.id,
        creator_id,
        amount_paise = total_paise,
        items = items.len(),
        "payout batch created"
    );
    Ok(PayoutBatch { payout, items })
}

/// Settle a pending payout against an external payment reference.
/// One atomic transaction.
///
/// Per item: the amount moves from the campaign's reserved balance
/// (floored at zero) into spent, a `payout_paid` ledger entry is
/// appended, and the submission's `paid_views_total` advances by the
/// views the amount covers.
///
/// # Errors
///
/// - [`CoreError::PayoutNotFound`]
/// - [`CoreError::AlreadyPaid`] on a second settlement
pub fn settle_payout(
    conn: &mut Connection,
    payout_id: &str,
    admin_id: &str,
    reference_id: &str,
    now: i64,
) -> Result<PayoutBatch> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let payout = payouts::get(&tx, payout_id)?
        .ok_or_else(|| CoreError::PayoutNotFound(payout_id.to_string()))?;
    if payout.status == PayoutStatus::Paid {
        return Err(CoreError::AlreadyPaid);
    }

    let items = payouts::items_for(&tx, payout_id)?;
    for item in &items {
        let paid_submission = submission::require(&tx, &item.submission_id)?;
        let campaign = campaign::require(&tx, &paid_submission.campaign_id)?;

        campaigns::settle_amount(&tx, &campaign.id, item.amount_paise)?;
        ledger::insert(
            &tx,
            &NewLedgerEntry {
                entry_type: LedgerEntryType::PayoutPaid,
                campaign_id: &campaign.id,
                submission_id: Some(&item.submission_id),
                payout_id: Some(payout_id),
                amount_paise: item.amount_paise,
                idempotency_key: None,
                created_by: Some(admin_id),
            },
            now,
        )?;

        let views_paid = item
            .amount_paise
            .checked_div(campaign.rate_per_1k_views_paise)
            .unwrap_or(0)
            * VIEWS_PER_UNIT;
        submissions::apply_settlement(&tx, &item.submission_id, views_paid)?;
    }

    payouts::mark_paid(&tx, payout_id, reference_id)?;
    audit::append(
        &tx,
        admin_id,
        "payout_mark_paid",
        "payout",
        payout_id,
        &serde_json::json!({
            "reference_id": reference_id,
            "amount_paise": payout.amount_paise,
        }),
        now,
    )?;

    tx.commit()?;

    tracing::info!(
        payout_id,
        reference_id,
        amount_paise = payout.amount_paise,
        "payout settled"
    );

    let payout = payouts::get(conn, payout_id)?
        .ok_or_else(|| CoreError::PayoutNotFound(payout_id.to_string()))?;
    let items = payouts::items_for(conn, payout_id)?;
    Ok(PayoutBatch { payout, items })
}
