/// User accounts: founders and investors
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password VARCHAR(255),              -- Argon2id hash, NULL for external accounts
///     role VARCHAR(50) NOT NULL DEFAULT 'founder',
///     bio TEXT,
///     profile_image VARCHAR(500),
///     google_id VARCHAR(255) UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Two row shapes are exposed. [`User`] is the public profile and has no
/// password field at all, so it can be serialized to clients as-is.
/// [`UserCredentials`] adds the hash and is only returned by
/// [`User::find_by_email`] for the login comparison.
///
/// # Example
///
/// ```no_run
/// use cofound_shared::models::user::{RegisterUser, User, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::register(
///     &pool,
///     RegisterUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password: Some("hunter2hunter2".to_string()),
///         role: UserRole::Founder,
///     },
/// )
/// .await?;
///
/// let creds = User::find_by_email(&pool, "ada@example.com").await?.unwrap();
/// assert!(creds.verify_password("hunter2hunter2")?);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use crate::auth::password::{self, PasswordError};

const USER_COLUMNS: &str =
    "id, name, email, role, bio, profile_image, created_at, updated_at";

/// Account type chosen at registration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Founder,
    Investor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Founder => "founder",
            UserRole::Investor => "investor",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown user role: {0}")]
pub struct UnknownUserRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownUserRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "founder" => Ok(UserRole::Founder),
            "investor" => Ok(UserRole::Investor),
            other => Err(UnknownUserRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = UnknownUserRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Public user profile
///
/// Safe to return to any client: it carries no credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,

    pub name: String,

    /// Unique across all users
    pub email: String,

    #[sqlx(try_from = "String")]
    pub role: UserRole,

    pub bio: Option<String>,

    /// URL or storage key of the avatar
    pub profile_image: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// User row including the stored password hash
///
/// Never serialized; only used server-side to check a login attempt.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,

    /// Argon2id PHC string, `None` for externally-authenticated accounts
    #[sqlx(rename = "password")]
    pub password_hash: Option<String>,
}

impl UserCredentials {
    /// Checks `plaintext` against the stored hash
    ///
    /// Accounts without a password (external sign-in) never match.
    pub fn verify_password(&self, plaintext: &str) -> Result<bool, PasswordError> {
        match self.password_hash.as_deref() {
            Some(hash) => password::verify_password(plaintext, hash),
            None => Ok(false),
        }
    }
}

/// Input for [`User::register`]
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub name: String,

    pub email: String,

    /// Plaintext password; hashed before it reaches the database
    pub password: Option<String>,

    #[serde(default)]
    pub role: UserRole,
}

/// Self-editable profile fields
///
/// Email and role cannot be changed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub name: String,

    pub bio: Option<String>,

    pub profile_image: Option<String>,
}

/// Errors from account operations
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Hashing the supplied password failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Raw store error (unique violations included)
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl User {
    /// Registers a new account
    ///
    /// A supplied password is hashed with Argon2id first; the plaintext never
    /// reaches SQL or logs. A duplicate email surfaces as the database's
    /// unique-violation error inside [`UserError::Database`].
    pub async fn register(pool: &PgPool, data: RegisterUser) -> Result<Self, UserError> {
        let password_hash = data
            .password
            .as_deref()
            .map(password::hash_password)
            .transpose()?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(password_hash)
        .bind(data.role.as_str())
        .fetch_one(pool)
        .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Public profile lookup; `None` when no such user
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lookup by email, including the password hash
    ///
    /// Used for login and for resolving a co-founder invitation by email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Replaces name, bio and profile image
    ///
    /// Returns `None` if the user no longer exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: i32,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2, bio = $3, profile_image = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.bio)
        .bind(data.profile_image)
        .fetch_optional(pool)
        .await
    }

    /// Permanently deletes an account
    ///
    /// Memberships cascade away with it. If the user owned a startup, that
    /// startup is left with no owner and can no longer be edited; there is no
    /// reassignment path. Not exposed over HTTP.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::warn!(user_id = id, "User deleted; owned startups may be orphaned");
        }

        Ok(result.rows_affected() > 0)
    }
}
