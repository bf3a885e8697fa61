/// Authentication and authorization
///
/// - [`password`]: Argon2id hashing and the registration password policy
/// - [`jwt`]: access/refresh token issuance and validation
/// - [`middleware`]: Axum layer that turns a bearer token into an [`middleware::AuthContext`]
/// - [`ownership`]: startup ownership checks issuing [`ownership::OwnerGrant`]s
///
/// # Example
///
/// ```
/// use cofound_shared::auth::jwt::{validate_access_token, TokenPair};
/// use cofound_shared::auth::password::{hash_password, verify_password};
/// use cofound_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenPair::issue(1, UserRole::Founder, "secret-key")?;
/// assert_eq!(validate_access_token(&tokens.access_token, "secret-key")?.sub, 1);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;
