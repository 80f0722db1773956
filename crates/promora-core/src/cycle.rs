//! Verification cycle calculator.
//!
//! A campaign's schedule divides time into fixed-length cycles (default
//! 48h) counted from `start_at`. Each submission gets at most one
//! re-verification request per cycle.
//!
//! The raw index may be negative for a campaign scheduled in the future;
//! workflows reject negative cycles, while [`CycleInfo`] clamps the index
//! at 0 for display.

use serde::{Deserialize, Serialize};

use promora_types::campaign::Campaign;

const SECONDS_PER_HOUR: i64 = 3600;

/// Raw cycle index at `now` for a schedule starting at `start_at`.
///
/// A missing `start_at` is treated as "started just now", yielding index 0.
pub fn cycle_index(start_at: Option<i64>, cycle_hours: i64, now: i64) -> i64 {
    let start_at = start_at.unwrap_or(now);
    let cycle_seconds = cycle_hours * SECONDS_PER_HOUR;
    (now - start_at).div_euclid(cycle_seconds)
}

/// When the next verification window opens.
pub fn next_window_at(start_at: Option<i64>, cycle_hours: i64, now: i64) -> i64 {
    let start_at = start_at.unwrap_or(now);
    let cycle_seconds = cycle_hours * SECONDS_PER_HOUR;
    start_at + (cycle_index(Some(start_at), cycle_hours, now) + 1) * cycle_seconds
}

/// Display-facing cycle position for a campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleInfo {
    /// Current cycle index, clamped at 0.
    pub cycle_index: i64,
    /// When the next verification window opens.
    pub next_window_at: i64,
}

/// Compute the display cycle position for a campaign at `now`.
pub fn cycle_info(campaign: &Campaign, now: i64) -> CycleInfo {
    CycleInfo {
        cycle_index: cycle_index(campaign.start_at, campaign.cycle_hours, now).max(0),
        next_window_at: next_window_at(campaign.start_at, campaign.cycle_hours, now),
    }
}
