/// Founding memberships: the `startup_founders` join table
///
/// # Schema
///
/// ```sql
/// CREATE TABLE startup_founders (
///     id SERIAL PRIMARY KEY,
///     startup_id INTEGER NOT NULL REFERENCES startups(id) ON DELETE CASCADE,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role VARCHAR(50) NOT NULL DEFAULT 'founder',
///     is_owner BOOLEAN NOT NULL DEFAULT FALSE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (startup_id, user_id)
/// );
/// ```
///
/// Exactly one row per startup has `is_owner = true`: the creator's, written
/// by [`Startup::create`](super::startup::Startup::create). Rows added here are
/// always non-owner, and [`Founder::remove`] can never delete the owner row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

use crate::auth::ownership::OwnerGrant;

/// Role given to the creator's membership row
pub const OWNER_ROLE: &str = "founder";

/// Role used when a co-founder is added without one
pub const DEFAULT_COFOUNDER_ROLE: &str = "co-founder";

/// A membership row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Founder {
    pub id: i32,

    pub startup_id: i32,

    pub user_id: i32,

    /// Free text ("founder", "co-founder", "CTO", ...)
    pub role: String,

    pub is_owner: bool,

    pub joined_at: DateTime<Utc>,
}

/// Founder as listed on a startup's own page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FounderProfile {
    /// User id
    pub id: i32,

    pub name: String,

    pub email: String,

    pub profile_image: Option<String>,

    pub role: String,

    pub is_owner: bool,
}

/// Founder as listed in the public directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FounderSummary {
    /// User id
    pub id: i32,

    pub name: String,

    pub profile_image: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct StartupFounderSummary {
    startup_id: i32,

    #[sqlx(flatten)]
    founder: FounderSummary,
}

/// Groups `(startup_id, founder)` pairs by startup, keeping order per group
pub(crate) fn group_by_startup<F>(rows: impl IntoIterator<Item = (i32, F)>) -> HashMap<i32, Vec<F>> {
    let mut grouped: HashMap<i32, Vec<F>> = HashMap::new();
    for (startup_id, founder) in rows {
        grouped.entry(startup_id).or_default().push(founder);
    }
    grouped
}

impl Founder {
    /// Writes the creator's owner row inside the creation transaction
    pub(crate) async fn insert_owner(
        conn: &mut PgConnection,
        startup_id: i32,
        user_id: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Founder>(
            r#"
            INSERT INTO startup_founders (startup_id, user_id, role, is_owner)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id, startup_id, user_id, role, is_owner, joined_at
            "#,
        )
        .bind(startup_id)
        .bind(user_id)
        .bind(OWNER_ROLE)
        .fetch_one(conn)
        .await
    }

    /// Adds `user_id` to the granted startup as a non-owner
    ///
    /// # Errors
    ///
    /// If the user is already a member the store's unique violation on
    /// `startup_founders_startup_id_user_id_key` is returned unchanged; see
    /// [`crate::db::unique_violation`].
    pub async fn add(
        pool: &PgPool,
        grant: &OwnerGrant,
        user_id: i32,
        role: &str,
    ) -> Result<Self, sqlx::Error> {
        let founder = sqlx::query_as::<_, Founder>(
            r#"
            INSERT INTO startup_founders (startup_id, user_id, role, is_owner)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, startup_id, user_id, role, is_owner, joined_at
            "#,
        )
        .bind(grant.startup_id())
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            startup_id = founder.startup_id,
            user_id,
            role,
            added_by = grant.user_id(),
            "Co-founder added"
        );
        Ok(founder)
    }

    /// Removes a non-owner member from the granted startup
    ///
    /// The owner row is excluded by the `WHERE` clause, so asking to remove
    /// the owner matches nothing and returns `Ok(false)`.
    pub async fn remove(pool: &PgPool, grant: &OwnerGrant, user_id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM startup_founders
            WHERE startup_id = $1 AND user_id = $2 AND is_owner = FALSE
            "#,
        )
        .bind(grant.startup_id())
        .bind(user_id)
        .execute(pool)
        .await?;

        let removed = result.rows_affected() > 0;
        tracing::info!(
            startup_id = grant.startup_id(),
            user_id,
            removed,
            "Co-founder removal requested"
        );
        Ok(removed)
    }

    /// True iff `(startup_id, user_id)` has a row with `is_owner = true`
    ///
    /// No row at all is `false`, not an error.
    pub async fn is_owner(pool: &PgPool, startup_id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
        let is_owner: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT is_owner FROM startup_founders
            WHERE startup_id = $1 AND user_id = $2
            "#,
        )
        .bind(startup_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(is_owner.unwrap_or(false))
    }

    /// Membership row for a pair, if any
    pub async fn find(pool: &PgPool, startup_id: i32, user_id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Founder>(
            r#"
            SELECT id, startup_id, user_id, role, is_owner, joined_at
            FROM startup_founders
            WHERE startup_id = $1 AND user_id = $2
            "#,
        )
        .bind(startup_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Full founder profiles for one startup, owner first
    pub async fn profiles_for(pool: &PgPool, startup_id: i32) -> Result<Vec<FounderProfile>, sqlx::Error> {
        sqlx::query_as::<_, FounderProfile>(
            r#"
            SELECT u.id, u.name, u.email, u.profile_image, sf.role, sf.is_owner
            FROM startup_founders sf
            INNER JOIN users u ON u.id = sf.user_id
            WHERE sf.startup_id = $1
            ORDER BY sf.is_owner DESC, sf.joined_at ASC, sf.id ASC
            "#,
        )
        .bind(startup_id)
        .fetch_all(pool)
        .await
    }

    /// Founder summaries for a batch of startups, owner first within each
    pub(crate) async fn summaries_for(
        pool: &PgPool,
        startup_ids: &[i32],
    ) -> Result<Vec<(i32, FounderSummary)>, sqlx::Error> {
        if startup_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, StartupFounderSummary>(
            r#"
            SELECT sf.startup_id, u.id, u.name, u.profile_image
            FROM startup_founders sf
            INNER JOIN users u ON u.id = sf.user_id
            WHERE sf.startup_id = ANY($1)
            ORDER BY sf.startup_id, sf.is_owner DESC, sf.joined_at ASC, sf.id ASC
            "#,
        )
        .bind(startup_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.startup_id, r.founder)).collect())
    }
}
