//! # promora-core
//!
//! Budget accounting and the verification-to-payout pipeline.
//!
//! Every operation that moves money runs inside a single IMMEDIATE SQLite
//! transaction: either all writes commit (balances, ledger entry,
//! submission/payout state) or none do. Actor identity arrives as an
//! explicit parameter; the core holds no session state and performs no
//! network I/O.
//!
//! ## Modules
//!
//! - [`campaign`] — campaign lifecycle (create, activate, pause, resume)
//! - [`budget`] — idempotent deposit intake
//! - [`cycle`] — verification cycle calculator
//! - [`submission`] — join, submit content, request re-verification
//! - [`verification`] — admin approval/rejection workflow
//! - [`payout`] — payout batching and settlement

pub mod budget;
pub mod campaign;
pub mod cycle;
pub mod payout;
pub mod submission;
pub mod verification;

use promora_db::DbError;

/// Error types for core operations.
///
/// Business-rule violations map to 4xx-equivalent responses at the edge;
/// none of them are retried automatically. An idempotent deposit repeat is
/// NOT an error (see [`budget::DepositOutcome`]).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Campaign does not exist.
    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    /// Submission does not exist.
    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    /// Payout does not exist.
    #[error("payout not found: {0}")]
    PayoutNotFound(String),

    /// The entity is in the wrong lifecycle state for this operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The actor does not own the target entity.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A non-positive or otherwise malformed amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// The campaign's available budget cannot cover the reservation.
    #[error("insufficient campaign budget: need {needed}, available {available}")]
    InsufficientBudget {
        /// Amount the reservation requires.
        needed: i64,
        /// Budget currently available.
        available: i64,
    },

    /// Attested views may never drop below views already paid for.
    #[error("verified views {verified} below already paid views {paid}")]
    RegressionNotAllowed {
        /// The incoming attested total.
        verified: i64,
        /// Views already converted to payouts.
        paid: i64,
    },

    /// The creator never joined the campaign.
    #[error("creator has not joined campaign {0}")]
    NotJoined(String),

    /// The platform was not selected when the creator joined.
    #[error("platform {0} not selected at join")]
    PlatformNotSelected(String),

    /// No handle registered for the submission's platform.
    #[error("no handle set for platform {0}")]
    MissingHandle(String),

    /// The creator already submitted this URL for the campaign.
    #[error("duplicate submission URL for this campaign")]
    DuplicateUrl(String),

    /// The platform name is not one the marketplace supports.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// A re-verification request already exists for this cycle.
    #[error("re-verification already requested for cycle {0}")]
    AlreadyRequested(i64),

    /// The submission's eligibility window has lapsed.
    #[error("eligibility window ended at {0}")]
    EligibilityExpired(i64),

    /// The payout batch would be empty of money.
    #[error("no payable amount across unpaid submissions")]
    NoPayableAmount,

    /// The creator has no active unpaid submissions.
    #[error("no unpaid approved submissions")]
    NoUnpaidSubmissions,

    /// The payout was already settled.
    #[error("payout already marked paid")]
    AlreadyPaid,

    /// The campaign's first verification cycle has not begun.
    #[error("campaign not started")]
    CampaignNotStarted,

    /// Arithmetic overflow in a payable-amount calculation.
    #[error("arithmetic overflow in payout calculation")]
    Overflow,

    /// Underlying storage error.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Db(DbError::Sqlite(err))
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
