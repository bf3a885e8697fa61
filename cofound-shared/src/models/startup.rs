/// Startup profiles
///
/// # Schema
///
/// ```sql
/// CREATE TABLE startups (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     tagline VARCHAR(500),
///     description TEXT,
///     category VARCHAR(100),
///     stage VARCHAR(50) NOT NULL DEFAULT 'idea',
///     website VARCHAR(500),
///     logo VARCHAR(500),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// A startup always has at least one row in `startup_founders`: [`Startup::create`]
/// inserts the startup and its owner membership in one transaction.
///
/// Mutations ([`Startup::update`], [`Startup::delete`]) take an
/// [`OwnerGrant`], which only [`require_owner`](crate::auth::ownership::require_owner)
/// can produce.
///
/// # Example
///
/// ```no_run
/// use cofound_shared::auth::ownership::require_owner;
/// use cofound_shared::models::startup::{Startup, StartupData};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i32) -> Result<(), Box<dyn std::error::Error>> {
/// let startup = Startup::create(&pool, StartupData::named("Acme"), user_id).await?;
///
/// let grant = require_owner(&pool, startup.id, user_id).await?;
/// let mut data = StartupData::named("Acme Robotics");
/// data.tagline = Some("Robots for everyone".to_string());
/// Startup::update(&pool, &grant, data).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use super::founder::{group_by_startup, Founder, FounderProfile, FounderSummary};
use crate::auth::ownership::OwnerGrant;

const STARTUP_COLUMNS: &str = "id, name, tagline, description, category, stage, \
                               website, logo, created_at, updated_at";

/// Maturity of a startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartupStage {
    #[default]
    Idea,
    Mvp,
    EarlyRevenue,
    Growth,
}

impl StartupStage {
    pub const ALL: [StartupStage; 4] = [
        StartupStage::Idea,
        StartupStage::Mvp,
        StartupStage::EarlyRevenue,
        StartupStage::Growth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StartupStage::Idea => "idea",
            StartupStage::Mvp => "mvp",
            StartupStage::EarlyRevenue => "early-revenue",
            StartupStage::Growth => "growth",
        }
    }
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown startup stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for StartupStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StartupStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

impl TryFrom<String> for StartupStage {
    type Error = UnknownStage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A startup row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Startup {
    pub id: i32,

    /// Never empty
    pub name: String,

    pub tagline: Option<String>,

    pub description: Option<String>,

    pub category: Option<String>,

    #[sqlx(try_from = "String")]
    pub stage: StartupStage,

    pub website: Option<String>,

    /// URL or storage key of the logo
    pub logo: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Mutable startup fields, used for both create and full-replacement update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StartupData {
    pub name: String,

    pub tagline: Option<String>,

    pub description: Option<String>,

    pub category: Option<String>,

    #[serde(default)]
    pub stage: StartupStage,

    pub website: Option<String>,

    pub logo: Option<String>,
}

impl StartupData {
    /// Only a name; every other field empty and stage `idea`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), StartupError> {
        if self.name.trim().is_empty() {
            return Err(StartupError::MissingName);
        }
        Ok(())
    }
}

/// Startup with its full founding team, as returned for a single startup
#[derive(Debug, Clone, Serialize)]
pub struct StartupDetail {
    #[serde(flatten)]
    pub startup: Startup,

    /// Owner first, then members in join order
    pub founders: Vec<FounderProfile>,
}

/// Startup with a light founder list, as shown in the public directory
#[derive(Debug, Clone, Serialize)]
pub struct StartupListing {
    #[serde(flatten)]
    pub startup: Startup,

    pub founders: Vec<FounderSummary>,
}

/// Startup seen from one member's point of view
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MemberStartup {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub startup: Startup,

    /// The member's role in this startup
    pub role: String,

    /// Whether the member owns this startup
    pub is_owner: bool,
}

/// Errors from startup operations
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// `name` was empty or whitespace
    #[error("Startup name is required")]
    MissingName,

    /// Raw store error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl Startup {
    /// Creates a startup owned by `owner_id`
    ///
    /// The startup row and the owner's membership (`role = 'founder'`,
    /// `is_owner = true`) are written in a single transaction. If either
    /// insert fails the transaction is dropped uncommitted and nothing is
    /// visible.
    ///
    /// # Errors
    ///
    /// - [`StartupError::MissingName`] when `data.name` is blank
    /// - [`StartupError::Database`] for anything the store rejects, including
    ///   an unknown `owner_id`
    pub async fn create(
        pool: &PgPool,
        data: StartupData,
        owner_id: i32,
    ) -> Result<Self, StartupError> {
        data.validate()?;

        let mut tx = pool.begin().await?;

        let startup = sqlx::query_as::<_, Startup>(&format!(
            r#"
            INSERT INTO startups (name, tagline, description, category, stage, website, logo)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {STARTUP_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.tagline)
        .bind(data.description)
        .bind(data.category)
        .bind(data.stage.as_str())
        .bind(data.website)
        .bind(data.logo)
        .fetch_one(&mut *tx)
        .await?;

        Founder::insert_owner(&mut *tx, startup.id, owner_id).await?;

        tx.commit().await?;

        tracing::info!(startup_id = startup.id, owner_id, "Startup created");
        Ok(startup)
    }

    /// Bare startup row
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Startup>(&format!(
            "SELECT {STARTUP_COLUMNS} FROM startups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Startup with every founder's public profile; `None` if it doesn't exist
    pub async fn find_detail(pool: &PgPool, id: i32) -> Result<Option<StartupDetail>, sqlx::Error> {
        let Some(startup) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let founders = Founder::profiles_for(pool, id).await?;

        Ok(Some(StartupDetail { startup, founders }))
    }

    /// Every startup, newest first, each with its founder summaries
    ///
    /// Two queries: the startups, then all their founders in one batch,
    /// grouped by startup id here.
    pub async fn list_with_founders(pool: &PgPool) -> Result<Vec<StartupListing>, sqlx::Error> {
        let startups = sqlx::query_as::<_, Startup>(&format!(
            "SELECT {STARTUP_COLUMNS} FROM startups ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(pool)
        .await?;

        let ids: Vec<i32> = startups.iter().map(|s| s.id).collect();
        let mut founders = group_by_startup(Founder::summaries_for(pool, &ids).await?);

        Ok(startups
            .into_iter()
            .map(|startup| StartupListing {
                founders: founders.remove(&startup.id).unwrap_or_default(),
                startup,
            })
            .collect())
    }

    /// Startups `user_id` belongs to, newest first, with that user's role
    pub async fn list_by_member(
        pool: &PgPool,
        user_id: i32,
    ) -> Result<Vec<MemberStartup>, sqlx::Error> {
        sqlx::query_as::<_, MemberStartup>(
            r#"
            SELECT s.id, s.name, s.tagline, s.description, s.category, s.stage,
                   s.website, s.logo, s.created_at, s.updated_at,
                   sf.role, sf.is_owner
            FROM startups s
            INNER JOIN startup_founders sf ON sf.startup_id = s.id
            WHERE sf.user_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Replaces every mutable field of the granted startup
    ///
    /// Returns `None` if the startup was deleted after the grant was issued.
    pub async fn update(
        pool: &PgPool,
        grant: &OwnerGrant,
        data: StartupData,
    ) -> Result<Option<Self>, StartupError> {
        data.validate()?;

        let startup = sqlx::query_as::<_, Startup>(&format!(
            r#"
            UPDATE startups
            SET name = $2, tagline = $3, description = $4, category = $5,
                stage = $6, website = $7, logo = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {STARTUP_COLUMNS}
            "#
        ))
        .bind(grant.startup_id())
        .bind(data.name)
        .bind(data.tagline)
        .bind(data.description)
        .bind(data.category)
        .bind(data.stage.as_str())
        .bind(data.website)
        .bind(data.logo)
        .fetch_optional(pool)
        .await?;

        if startup.is_some() {
            tracing::info!(startup_id = grant.startup_id(), user_id = grant.user_id(), "Startup updated");
        }

        Ok(startup)
    }

    /// Deletes the granted startup; memberships go with it (ON DELETE CASCADE)
    ///
    /// Consumes the grant. Returns false if the startup was already gone.
    pub async fn delete(pool: &PgPool, grant: OwnerGrant) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM startups WHERE id = $1")
            .bind(grant.startup_id())
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(startup_id = grant.startup_id(), user_id = grant.user_id(), "Startup deleted");
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trips_through_str() {
        for stage in StartupStage::ALL {
            assert_eq!(stage.as_str().parse::<StartupStage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_stage_rejects_unknown_values() {
        assert!("seed".parse::<StartupStage>().is_err());
        assert!("early_revenue".parse::<StartupStage>().is_err());
        assert!("".parse::<StartupStage>().is_err());
    }

    #[test]
    fn test_stage_serde_uses_kebab_case() {
        let json = serde_json::to_string(&StartupStage::EarlyRevenue).unwrap();
        assert_eq!(json, r#""early-revenue""#);
    }

    #[test]
    fn test_startup_data_defaults() {
        assert_eq!(StartupStage::default(), StartupStage::Idea);

        let data: StartupData = serde_json::from_str(r#"{"name": "Acme"}"#).unwrap();
        assert_eq!(data, StartupData::named("Acme"));
        assert_eq!(data.stage, StartupStage::Idea);
        assert!(data.tagline.is_none());
    }

    #[test]
    fn test_startup_data_blank_name_is_rejected() {
        assert!(matches!(
            StartupData::named("   ").validate(),
            Err(StartupError::MissingName)
        ));
        assert!(StartupData::named("Acme").validate().is_ok());
    }

    #[test]
    fn test_member_startup_flattens() {
        let member = MemberStartup {
            startup: Startup {
                id: 3,
                name: "Acme".to_string(),
                tagline: None,
                description: None,
                category: Some("robotics".to_string()),
                stage: StartupStage::Mvp,
                website: None,
                logo: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            role: "co-founder".to_string(),
            is_owner: false,
        };

        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["stage"], "mvp");
        assert_eq!(json["role"], "co-founder");
        assert_eq!(json["is_owner"], false);
    }
}
