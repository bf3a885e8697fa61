/// Startup ownership checks
///
/// Every mutating startup operation needs proof that the caller owns the
/// startup. That proof is an [`OwnerGrant`]: its fields are private and the
/// only way to obtain one is [`require_owner`], so code that has not passed
/// the check cannot call [`Startup::update`](crate::models::startup::Startup::update),
/// [`Startup::delete`](crate::models::startup::Startup::delete),
/// [`Founder::add`](crate::models::founder::Founder::add) or
/// [`Founder::remove`](crate::models::founder::Founder::remove).
///
/// # Example
///
/// ```no_run
/// use cofound_shared::auth::ownership::{require_owner, AuthzError};
/// use cofound_shared::models::founder::Founder;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, caller: i32, startup_id: i32, member: i32) -> Result<(), AuthzError> {
/// let grant = require_owner(&pool, startup_id, caller).await?;
/// Founder::remove(&pool, &grant, member).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;

use crate::models::founder::Founder;

/// Errors from ownership checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller has no owner membership for the startup
    ///
    /// Also returned when the startup does not exist.
    #[error("User {user_id} is not the owner of startup {startup_id}")]
    NotOwner { startup_id: i32, user_id: i32 },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Proof that `user_id` owned `startup_id` when the check ran
#[derive(Debug)]
pub struct OwnerGrant {
    startup_id: i32,
    user_id: i32,
}

impl OwnerGrant {
    /// The startup this grant covers
    pub fn startup_id(&self) -> i32 {
        self.startup_id
    }

    /// The owner who passed the check
    pub fn user_id(&self) -> i32 {
        self.user_id
    }
}

/// Checks ownership and issues a grant
///
/// # Errors
///
/// [`AuthzError::NotOwner`] if the user has no membership, a non-owner
/// membership, or the startup doesn't exist.
pub async fn require_owner(
    pool: &PgPool,
    startup_id: i32,
    user_id: i32,
) -> Result<OwnerGrant, AuthzError> {
    if !Founder::is_owner(pool, startup_id, user_id).await? {
        tracing::debug!(startup_id, user_id, "Ownership check failed");
        return Err(AuthzError::NotOwner { startup_id, user_id });
    }

    Ok(OwnerGrant { startup_id, user_id })
}
