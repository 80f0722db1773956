//! SQL schema definitions.

/// Complete schema for Promora v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Campaigns & budget accounts
-- ============================================================

CREATE TABLE IF NOT EXISTS campaigns (
    id TEXT PRIMARY KEY,
    host_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    platforms TEXT NOT NULL,
    rate_per_1k_views_paise INTEGER NOT NULL,
    budget_total_paise INTEGER NOT NULL DEFAULT 0,
    budget_reserved_paise INTEGER NOT NULL DEFAULT 0,
    budget_spent_paise INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'draft',
    start_at INTEGER,
    end_at INTEGER,
    cycle_hours INTEGER NOT NULL DEFAULT 48,
    submission_eligibility_days INTEGER NOT NULL DEFAULT 30,
    created_at INTEGER NOT NULL,
    CHECK (budget_reserved_paise + budget_spent_paise <= budget_total_paise)
);

CREATE INDEX IF NOT EXISTS idx_campaigns_host ON campaigns(host_id);
CREATE INDEX IF NOT EXISTS idx_campaigns_status ON campaigns(status);

-- ============================================================
-- Money ledger (append-only)
-- ============================================================

CREATE TABLE IF NOT EXISTS ledger_entries (
    id TEXT PRIMARY KEY,
    entry_type TEXT NOT NULL,
    campaign_id TEXT NOT NULL REFERENCES campaigns(id),
    submission_id TEXT,
    payout_id TEXT,
    amount_paise INTEGER NOT NULL,
    idempotency_key TEXT UNIQUE,
    created_by TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ledger_campaign ON ledger_entries(campaign_id);

-- ============================================================
-- Participations & submissions
-- ============================================================

CREATE TABLE IF NOT EXISTS participations (
    campaign_id TEXT NOT NULL REFERENCES campaigns(id),
    creator_id TEXT NOT NULL,
    platforms TEXT NOT NULL,
    handles TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    eligible_until INTEGER NOT NULL,
    joined_at INTEGER NOT NULL,
    PRIMARY KEY (campaign_id, creator_id)
);

CREATE TABLE IF NOT EXISTS submissions (
    id TEXT PRIMARY KEY,
    campaign_id TEXT NOT NULL REFERENCES campaigns(id),
    creator_id TEXT NOT NULL,
    platform TEXT NOT NULL,
    handle TEXT NOT NULL,
    reel_url TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending_host_approval',
    paid_views_total INTEGER NOT NULL DEFAULT 0,
    last_verified_views_total INTEGER NOT NULL DEFAULT 0,
    last_verified_cycle_index INTEGER NOT NULL DEFAULT 0,
    payout_status TEXT NOT NULL DEFAULT 'unpaid',
    eligible_until INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (campaign_id, creator_id, reel_url),
    CHECK (paid_views_total <= last_verified_views_total)
);

CREATE INDEX IF NOT EXISTS idx_submissions_creator ON submissions(creator_id);
CREATE INDEX IF NOT EXISTS idx_submissions_campaign_creator ON submissions(campaign_id, creator_id);

-- ============================================================
-- Verification records
-- ============================================================

CREATE TABLE IF NOT EXISTS verification_checks (
    id TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL REFERENCES submissions(id),
    cycle_index INTEGER NOT NULL,
    verified_views_total INTEGER NOT NULL,
    admin_id TEXT NOT NULL,
    proof_note TEXT,
    proof_url TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_checks_submission ON verification_checks(submission_id);

CREATE TABLE IF NOT EXISTS verification_requests (
    submission_id TEXT NOT NULL REFERENCES submissions(id),
    cycle_index INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at INTEGER NOT NULL,
    PRIMARY KEY (submission_id, cycle_index)
);

-- ============================================================
-- Payouts
-- ============================================================

CREATE TABLE IF NOT EXISTS payouts (
    id TEXT PRIMARY KEY,
    creator_id TEXT NOT NULL,
    amount_paise INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    reference_id TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_payouts_creator ON payouts(creator_id);

CREATE TABLE IF NOT EXISTS payout_items (
    payout_id TEXT NOT NULL REFERENCES payouts(id),
    submission_id TEXT NOT NULL REFERENCES submissions(id),
    amount_paise INTEGER NOT NULL,
    PRIMARY KEY (payout_id, submission_id)
);

-- ============================================================
-- Audit log (append-only)
-- ============================================================

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id TEXT NOT NULL,
    action_type TEXT NOT NULL,
    target_type TEXT NOT NULL,
    target_id TEXT NOT NULL,
    metadata TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_target ON audit_log(target_type, target_id);
"#;
