//! Tier catalog persistence: the billing sync writes tiers, the engine reads
//! them once at startup.

use std::collections::BTreeMap;

use rusqlite::{params, Connection};

use tollgate_core::errors::TollgateResult;
use tollgate_core::models::{FeatureGrant, Tier};

use crate::to_storage_err;

/// Replace a tier and its full grant list atomically.
pub fn upsert_tier(conn: &Connection, tier: &Tier) -> TollgateResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("upsert_tier begin: {e}")))?;

    match upsert_tier_inner(&tx, tier) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("upsert_tier commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn upsert_tier_inner(conn: &Connection, tier: &Tier) -> TollgateResult<()> {
    conn.execute(
        "INSERT INTO tiers (slug, name, display_order) VALUES (?1, ?2, ?3)
         ON CONFLICT(slug) DO UPDATE SET name = excluded.name, display_order = excluded.display_order",
        params![tier.slug, tier.name, tier.display_order],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "DELETE FROM tier_features WHERE tier_slug = ?1",
        params![tier.slug],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    for (feature_slug, grant) in &tier.features {
        let limit = grant
            .limit
            .map(|l| {
                i64::try_from(l).map_err(|_| to_storage_err(format!("limit {l} overflows i64")))
            })
            .transpose()?;
        conn.execute(
            "INSERT INTO tier_features (tier_slug, feature_slug, enabled, usage_limit)
             VALUES (?1, ?2, ?3, ?4)",
            params![tier.slug, feature_slug, grant.enabled as i32, limit],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

/// All tiers with their grants, ordered by display order then name.
pub fn list_tiers(conn: &Connection) -> TollgateResult<Vec<Tier>> {
    let mut stmt = conn
        .prepare("SELECT slug, name, display_order FROM tiers ORDER BY display_order, name")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut tiers = stmt
        .query_map([], |row| {
            Ok(Tier {
                slug: row.get(0)?,
                name: row.get(1)?,
                display_order: row.get(2)?,
                features: BTreeMap::new(),
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut grant_stmt = conn
        .prepare(
            "SELECT tier_slug, feature_slug, enabled, usage_limit FROM tier_features
             ORDER BY tier_slug, feature_slug",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let grants = grant_stmt
        .query_map([], |row| {
            let enabled: i32 = row.get(2)?;
            let limit: Option<i64> = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                FeatureGrant {
                    enabled: enabled != 0,
                    limit: limit.map(|l| l.max(0) as u64),
                },
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    for grant in grants {
        let (tier_slug, feature_slug, grant) = grant.map_err(|e| to_storage_err(e.to_string()))?;
        if let Some(tier) = tiers.iter_mut().find(|t| t.slug == tier_slug) {
            tier.features.insert(feature_slug, grant);
        }
    }
    Ok(tiers)
}
