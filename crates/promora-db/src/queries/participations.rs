//! Participation query functions.

use rusqlite::{Connection, OptionalExtension, Row};

use promora_types::submission::Participation;

use crate::queries::parse_json_col;
use crate::{DbError, Result};

fn map_row(row: &Row<'_>) -> rusqlite::Result<Participation> {
    Ok(Participation {
        campaign_id: row.get(0)?,
        creator_id: row.get(1)?,
        platforms: parse_json_col(2, &row.get::<_, String>(2)?)?,
        handles: parse_json_col(3, &row.get::<_, String>(3)?)?,
        eligible_until: row.get(4)?,
        joined_at: row.get(5)?,
    })
}

/// Insert or refresh a participation. Re-joining replaces platforms and
/// handles and extends the eligibility window.
pub fn upsert(conn: &Connection, participation: &Participation) -> Result<()> {
    let platforms = serde_json::to_string(&participation.platforms)
        .map_err(|e| DbError::Serialization(e.to_string()))?;
    let handles = serde_json::to_string(&participation.handles)
        .map_err(|e| DbError::Serialization(e.to_string()))?;
    conn.execute(
        "INSERT INTO participations (campaign_id, creator_id, platforms, handles,
             status, eligible_until, joined_at)
         VALUES (?1, ?2, ?3, ?4, 'active', ?5, ?6)
         ON CONFLICT (campaign_id, creator_id) DO UPDATE SET
             platforms = excluded.platforms,
             handles = excluded.handles,
             status = 'active',
             eligible_until = excluded.eligible_until",
        rusqlite::params![
            participation.campaign_id,
            participation.creator_id,
            platforms,
            handles,
            participation.eligible_until,
            participation.joined_at,
        ],
    )?;
    Ok(())
}

/// Fetch a creator's participation in a campaign.
pub fn get(conn: &Connection, campaign_id: &str, creator_id: &str) -> Result<Option<Participation>> {
    let participation = conn
        .query_row(
            "SELECT campaign_id, creator_id, platforms, handles, eligible_until, joined_at
             FROM participations WHERE campaign_id = ?1 AND creator_id = ?2",
            [campaign_id, creator_id],
            map_row,
        )
        .optional()?;
    Ok(participation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::campaigns;
    use promora_types::campaign::{Campaign, CampaignStatus};
    use promora_types::submission::Platform;
    use std::collections::BTreeMap;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        campaigns::insert(
            &conn,
            &Campaign {
                id: "c1".into(),
                host_id: "h1".into(),
                title: "t".into(),
                description: "d".into(),
                platforms: vec![Platform::Instagram],
                rate_per_1k_views_paise: 3000,
                budget_total_paise: 0,
                budget_reserved_paise: 0,
                budget_spent_paise: 0,
                status: CampaignStatus::Active,
                start_at: Some(0),
                end_at: None,
                cycle_hours: 48,
                submission_eligibility_days: 30,
                created_at: 0,
            },
        )
        .expect("insert campaign");
        conn
    }

    fn sample(eligible_until: i64) -> Participation {
        let mut handles = BTreeMap::new();
        handles.insert(Platform::Instagram, "@creator".to_string());
        Participation {
            campaign_id: "c1".into(),
            creator_id: "u1".into(),
            platforms: vec![Platform::Instagram],
            handles,
            eligible_until,
            joined_at: 1000,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let conn = test_db();
        upsert(&conn, &sample(5000)).expect("upsert");

        let participation = get(&conn, "c1", "u1").expect("get").expect("exists");
        assert_eq!(participation.platforms, vec![Platform::Instagram]);
        assert_eq!(
            participation.handles.get(&Platform::Instagram).map(String::as_str),
            Some("@creator")
        );
        assert_eq!(participation.eligible_until, 5000);
    }

    #[test]
    fn test_rejoin_refreshes_window() {
        let conn = test_db();
        upsert(&conn, &sample(5000)).expect("first join");
        upsert(&conn, &sample(9000)).expect("re-join");

        let participation = get(&conn, "c1", "u1").expect("get").expect("exists");
        assert_eq!(participation.eligible_until, 9000);
    }

    #[test]
    fn test_get_missing() {
        let conn = test_db();
        assert!(get(&conn, "c1", "nobody").expect("get").is_none());
    }
}
