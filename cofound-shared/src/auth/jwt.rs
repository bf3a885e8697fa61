/// JWT issuance and validation
///
/// Tokens are HS256-signed and carry the user id (`sub`) and account role.
/// Two kinds are issued at login/registration:
///
/// - **Access** (24h): sent as `Authorization: Bearer <token>`
/// - **Refresh** (30d): exchanged for a new access token
///
/// # Example
///
/// ```
/// use cofound_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use cofound_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42, UserRole::Founder, TokenType::Access);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_access_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

/// Value of the `iss` claim on every token
pub const ISSUER: &str = "cofound";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    /// Token signed for a different issuer
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// Access token used where a refresh token is required, or vice versa
    #[error("Expected {expected} token, got {actual} token")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,

    /// Always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expires at (Unix seconds)
    pub exp: i64,

    /// Not before (Unix seconds)
    pub nbf: i64,

    /// Account role at issue time
    pub role: UserRole,

    pub token_type: TokenType,
}

impl Claims {
    /// Claims expiring after the token type's default lifetime
    pub fn new(user_id: i32, role: UserRole, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, role, token_type, token_type.default_expiration())
    }

    /// Claims expiring after `expires_in` (negative durations yield expired claims)
    pub fn with_expiration(
        user_id: i32,
        role: UserRole,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            role,
            token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        (self.exp > now).then(|| Duration::seconds(self.exp - now))
    }
}

/// Access/refresh pair handed out at login and registration
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    /// Signs a fresh access and refresh token for `user_id`
    pub fn issue(user_id: i32, role: UserRole, secret: &str) -> Result<Self, JwtError> {
        Ok(Self {
            access_token: create_token(&Claims::new(user_id, role, TokenType::Access), secret)?,
            refresh_token: create_token(&Claims::new(user_id, role, TokenType::Refresh), secret)?,
        })
    }
}

/// Signs `claims` with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature, expiry, not-before and issuer, then returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

fn validate_typed(token: &str, secret: &str, expected: TokenType) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }

    Ok(claims)
}

/// [`validate_token`] plus a check that it is an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Access)
}

/// [`validate_token`] plus a check that it is a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_typed(token, secret, TokenType::Refresh)
}

/// Exchanges a valid refresh token for a new access token
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let refresh_claims = validate_refresh_token(refresh_token, secret)?;

    create_token(
        &Claims::new(refresh_claims.sub, refresh_claims.role, TokenType::Access),
        secret,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_type_expiration() {
        assert_eq!(TokenType::Access.default_expiration(), Duration::hours(24));
        assert_eq!(TokenType::Refresh.default_expiration(), Duration::days(30));
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, UserRole::Investor, TokenType::Access);

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, UserRole::Investor);
        assert_eq!(claims.iss, ISSUER);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_with_custom_expiration() {
        let claims = Claims::with_expiration(7, UserRole::Founder, TokenType::Access, Duration::hours(1));

        let time_left = claims.time_until_expiration().unwrap();
        assert!(time_left.num_seconds() > 3500);
        assert!(time_left.num_seconds() <= 3600);
    }

    #[test]
    fn test_create_and_validate_token() {
        let token = create_token(&Claims::new(7, UserRole::Founder, TokenType::Access), SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, 7);
        assert_eq!(validated.role, UserRole::Founder);
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&Claims::new(7, UserRole::Founder, TokenType::Access), SECRET).unwrap();
        assert!(validate_token(&token, "another-secret-key-at-least-32-bytes").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(7, UserRole::Founder, TokenType::Access, Duration::seconds(-3600));
        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let pair = TokenPair::issue(7, UserRole::Founder, SECRET).unwrap();

        assert!(validate_access_token(&pair.access_token, SECRET).is_ok());
        assert!(validate_refresh_token(&pair.refresh_token, SECRET).is_ok());

        assert!(matches!(
            validate_access_token(&pair.refresh_token, SECRET),
            Err(JwtError::WrongTokenType { expected: "access", actual: "refresh" })
        ));
        assert!(validate_refresh_token(&pair.access_token, SECRET).is_err());
    }

    #[test]
    fn test_refresh_access_token() {
        let pair = TokenPair::issue(7, UserRole::Investor, SECRET).unwrap();

        let new_access = refresh_access_token(&pair.refresh_token, SECRET).unwrap();
        let validated = validate_access_token(&new_access, SECRET).unwrap();
        assert_eq!(validated.sub, 7);
        assert_eq!(validated.role, UserRole::Investor);

        assert!(refresh_access_token(&pair.access_token, SECRET).is_err());
    }
}
