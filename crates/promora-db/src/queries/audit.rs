//! Audit log query functions. The log is append-only.

use rusqlite::Connection;

use crate::{DbError, Result};

/// Append an audit record for an admin or host action.
pub fn append(
    conn: &Connection,
    actor_id: &str,
    action_type: &str,
    target_type: &str,
    target_id: &str,
    metadata: &serde_json::Value,
    now: i64,
) -> Result<()> {
    let metadata = serde_json::to_string(metadata)
        .map_err(|e| DbError::Serialization(e.to_string()))?;
    conn.execute(
        "INSERT INTO audit_log (actor_id, action_type, target_type, target_id, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![actor_id, action_type, target_type, target_id, metadata, now],
    )?;
    Ok(())
}

/// A raw audit row.
#[derive(Debug)]
pub struct AuditRow {
    pub actor_id: String,
    pub action_type: String,
    pub target_type: String,
    pub target_id: String,
    pub metadata: String,
    pub created_at: i64,
}

/// List audit records for a target, oldest first.
pub fn list_for_target(
    conn: &Connection,
    target_type: &str,
    target_id: &str,
) -> Result<Vec<AuditRow>> {
    let mut stmt = conn.prepare(
        "SELECT actor_id, action_type, target_type, target_id, metadata, created_at
         FROM audit_log WHERE target_type = ?1 AND target_id = ?2 ORDER BY id",
    )?;

    let rows = stmt
        .query_map([target_type, target_id], |row| {
            Ok(AuditRow {
                actor_id: row.get(0)?,
                action_type: row.get(1)?,
                target_type: row.get(2)?,
                target_id: row.get(3)?,
                metadata: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
