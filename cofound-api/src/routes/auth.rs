/// Account endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account and get tokens
/// - `POST /api/auth/login` - Exchange email and password for tokens
/// - `POST /api/auth/refresh` - Exchange a refresh token for an access token
/// - `GET /api/auth/profile` - The caller's profile (authenticated)
/// - `PUT /api/auth/profile` - Edit name, bio and image (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use cofound_shared::{
    auth::{
        jwt::{self, TokenPair},
        middleware::AuthContext,
        password,
    },
    models::user::{RegisterUser, UpdateProfile, User, UserRole},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// `founder` (default) or `investor`
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,

    pub user: User,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    pub bio: Option<String>,

    #[validate(length(max = 500, message = "Profile image must be at most 500 characters"))]
    pub profile_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,

    pub user: User,
}

fn required_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "Name is required"));
    }
    Ok(name.to_string())
}

fn parse_role(role: Option<&str>) -> ApiResult<UserRole> {
    match role.map(str::trim) {
        None | Some("") => Ok(UserRole::default()),
        Some(role) => role
            .parse()
            .map_err(|_| ApiError::invalid_field("role", "Role must be founder or investor")),
    }
}

/// Register a new account
///
/// ```text
/// POST /api/auth/register
///
/// { "name": "Ada", "email": "ada@example.com", "password": "hunter2hunter2", "role": "founder" }
/// ```
///
/// Responds `201` with the profile and a token pair.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or the email is taken
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let name = required_name(&req.name)?;
    password::validate_password(&req.password).map_err(|e| ApiError::invalid_field("password", e))?;
    let role = parse_role(req.role.as_deref())?;

    let user = User::register(
        &state.db,
        RegisterUser {
            name,
            email: req.email.trim().to_string(),
            password: Some(req.password),
            role,
        },
    )
    .await?;

    let tokens = TokenPair::issue(user.id, user.role, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
            tokens,
        }),
    ))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: malformed email
/// - `401 Unauthorized`: unknown email, wrong password, or an account with no password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let credentials = User::find_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !credentials.verify_password(&req.password)? {
        tracing::debug!(user_id = credentials.user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let user = credentials.user;
    let tokens = TokenPair::issue(user.id, user.role, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse { user, tokens }))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: invalid, expired, or an access token
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let Json(req) = payload?;

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// The caller's profile
///
/// # Errors
///
/// - `404 Not Found`: the account behind the token no longer exists
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse { message: None, user }))
}

/// Replace the caller's name, bio and profile image
///
/// # Errors
///
/// - `400 Bad Request`: blank name or oversize field
/// - `404 Not Found`: the account behind the token no longer exists
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<ProfileResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = User::update_profile(
        &state.db,
        auth.user_id,
        UpdateProfile {
            name: required_name(&req.name)?,
            bio: req.bio,
            profile_image: req.profile_image,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        message: Some("Profile updated successfully"),
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(None).unwrap(), UserRole::Founder);
        assert_eq!(parse_role(Some("investor")).unwrap(), UserRole::Investor);
        assert!(matches!(parse_role(Some("admin")), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_required_name() {
        assert_eq!(required_name("  Ada ").unwrap(), "Ada");
        assert!(required_name("   ").is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"name": "Ada", "email": "nope", "password": "hunter2hunter2"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: RegisterRequest = serde_json::from_str(r#"{"name": "Ada", "email": "ada@example.com"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(password::validate_password(&req.password).is_err());
    }

    #[test]
    fn test_register_rejects_oversize_email() {
        let label = format!("{}.", "b".repeat(63));
        let email = format!("{}@{}com", "a".repeat(64), label);
        let long_email = format!("{}@{}com", "a".repeat(64), label.repeat(3));
        assert!(long_email.len() > 255);

        let req = RegisterRequest {
            name: "Ada".to_string(),
            email: long_email,
            password: "hunter2hunter2".to_string(),
            role: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let req = RegisterRequest { email, ..req };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_tokens_flatten_into_login_response() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Founder,
            bio: None,
            profile_image: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let tokens = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };

        let json = serde_json::to_value(LoginResponse { user, tokens }).unwrap();
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token"], "r");
        assert_eq!(json["user"]["email"], "ada@example.com");
        assert!(json["user"].get("password").is_none());
    }
}
