//! Admin verification workflow.
//!
//! Approval records an immutable verification check and adjusts the
//! campaign's reserved balance so the earmark always equals the payable
//! delta between attested and paid views. Repeating an approval with the
//! same attested total reserves nothing extra, and a corrected, lower
//! total releases the surplus back to the available budget.

use rusqlite::{Connection, TransactionBehavior};

use promora_db::queries::ledger::{self, NewLedgerEntry};
use promora_db::queries::{audit, campaigns, submissions, verifications};
use promora_types::ledger::LedgerEntryType;
use promora_types::submission::{Submission, SubmissionStatus, VIEWS_PER_UNIT};

use crate::{campaign, cycle, submission, CoreError, Result};

/// Admin verification payload.
#[derive(Clone, Debug)]
pub struct VerifyInput {
    pub approved: bool,
    /// Attested cumulative view count; defaults to the last verified value.
    pub verified_views_total: Option<i64>,
    pub proof_note: Option<String>,
    pub proof_url: Option<String>,
}

impl VerifyInput {
    /// An approval attesting the given cumulative view count.
    pub fn approve(verified_views_total: Option<i64>) -> Self {
        Self {
            approved: true,
            verified_views_total,
            proof_note: None,
            proof_url: None,
        }
    }

    /// A rejection.
    pub fn reject() -> Self {
        Self {
            approved: false,
            verified_views_total: None,
            proof_note: None,
            proof_url: None,
        }
    }
}

/// Payable amount for a view delta at the campaign's rate.
///
/// Only whole units of [`VIEWS_PER_UNIT`] views are payable.
pub(crate) fn payable_amount(delta_views: i64, rate_per_1k_views_paise: i64) -> Result<i64> {
    let units = delta_views / VIEWS_PER_UNIT;
    units
        .checked_mul(rate_per_1k_views_paise)
        .ok_or(CoreError::Overflow)
}

/// Approve or reject a submission. One atomic transaction.
///
/// Approval path: compute the payable delta against views already paid,
/// adjust the budget earmark to match it, record a verification check
/// (even when nothing new is payable), and activate the submission with
/// the new totals.
///
/// Rejection path: a pending submission is suspended; an active one is
/// left untouched (an approved, paying submission cannot be un-approved).
///
/// # Errors
///
/// - [`CoreError::SubmissionNotFound`] / [`CoreError::CampaignNotFound`]
/// - [`CoreError::InvalidState`] unless the submission is pending or active
/// - [`CoreError::RegressionNotAllowed`] if the attested total is below
///   the views already paid for
/// - [`CoreError::InsufficientBudget`] if the reservation would exceed the
///   campaign's available budget
pub fn admin_verify(
    conn: &mut Connection,
    submission_id: &str,
    admin_id: &str,
    input: &VerifyInput,
    now: i64,
) -> Result<Submission> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let before = submission::require(&tx, submission_id)?;
    if !before.status.is_verifiable() {
        return Err(CoreError::InvalidState(
            "submission not in verifiable state".to_string(),
        ));
    }
    let campaign = campaign::require(&tx, &before.campaign_id)?;
    let cycle_index = cycle::cycle_index(campaign.start_at, campaign.cycle_hours, now);

    if input.approved {
        let verified_views_total = input
            .verified_views_total
            .unwrap_or(before.last_verified_views_total);
        if verified_views_total < before.paid_views_total {
            return Err(CoreError::RegressionNotAllowed {
                verified: verified_views_total,
                paid: before.paid_views_total,
            });
        }

        let delta_views = verified_views_total - before.paid_views_total;
        let target_paise = payable_amount(delta_views, campaign.rate_per_1k_views_paise)?;
        // The earmark already held for this submission covers the span
        // between the previous attested total and the paid total.
        let held_paise = payable_amount(
            before.last_verified_views_total - before.paid_views_total,
            campaign.rate_per_1k_views_paise,
        )?;
        let amount_paise = target_paise - held_paise;
        if amount_paise > 0 {
            let available = campaign.available_paise();
            if amount_paise > available {
                return Err(CoreError::InsufficientBudget {
                    needed: amount_paise,
                    available,
                });
            }
            campaigns::add_to_reserved(&tx, &campaign.id, amount_paise)?;
            ledger::insert(
                &tx,
                &NewLedgerEntry {
                    entry_type: LedgerEntryType::Reserve,
                    campaign_id: &campaign.id,
                    submission_id: Some(submission_id),
                    payout_id: None,
                    amount_paise,
                    idempotency_key: None,
                    created_by: Some(admin_id),
                },
                now,
            )?;
        } else if amount_paise < 0 {
            campaigns::release_reserved(&tx, &campaign.id, -amount_paise)?;
            ledger::insert(
                &tx,
                &NewLedgerEntry {
                    entry_type: LedgerEntryType::ReleaseReserve,
                    campaign_id: &campaign.id,
                    submission_id: Some(submission_id),
                    payout_id: None,
                    amount_paise: -amount_paise,
                    idempotency_key: None,
                    created_by: Some(admin_id),
                },
                now,
            )?;
        }

        // A verification with no new payable views is still an audit record
        verifications::insert_check(
            &tx,
            submission_id,
            cycle_index,
            verified_views_total,
            admin_id,
            input.proof_note.as_deref(),
            input.proof_url.as_deref(),
            now,
        )?;
        submissions::record_verification(&tx, submission_id, verified_views_total, cycle_index)?;
        audit::append(
            &tx,
            admin_id,
            "verify_approve",
            "submission",
            submission_id,
            &serde_json::json!({
                "verified_views_total": verified_views_total,
                "amount_paise": amount_paise,
                "cycle_index": cycle_index,
            }),
            now,
        )?;

        tracing::info!(
            submission_id,
            verified_views_total,
            amount_paise,
            cycle_index,
            "submission verified"
        );
    } else {
        // Rejecting an active submission is a deliberate no-op state-wise
        if before.status == SubmissionStatus::PendingHostApproval {
            submissions::set_status(&tx, submission_id, SubmissionStatus::Suspended)?;
        }
        audit::append(
            &tx,
            admin_id,
            "verify_reject",
            "submission",
            submission_id,
            &serde_json::json!({ "proof_note": input.proof_note }),
            now,
        )?;

        tracing::info!(submission_id, "submission rejected");
    }

    tx.commit()?;
    submission::require(conn, submission_id)
}
