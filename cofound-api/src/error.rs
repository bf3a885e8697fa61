/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; `ApiError` renders as
/// `{ "error": code, "message": text, "details"?: [...] }` with the status
/// for its variant. Errors from the shared crate convert with `?`.
///
/// # Example
///
/// ```
/// use cofound_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(id: i32) -> ApiResult<Json<serde_json::Value>> {
///     if id <= 0 {
///         return Err(ApiError::NotFound("Startup not found".to_string()));
///     }
///     Ok(Json(json!({ "id": id })))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cofound_shared::{
    auth::{jwt::JwtError, ownership::AuthzError, password::PasswordError},
    db::unique_violation,
    models::{startup::StartupError, user::UserError},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unique constraint on `users.email`
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Unique constraint on `(startup_id, user_id)` in `startup_founders`
pub const FOUNDER_PAIR_KEY: &str = "startup_founders_startup_id_user_id_key";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (400)
    BadRequest(String),

    /// Missing or bad credentials (401)
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Duplicate email or membership (400)
    Conflict(String),

    /// Field-level validation failures (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Anything else (500); the detail is logged, never returned
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Conflict(_) | ApiError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Request validation failed".to_string()),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "Server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Unique violations become conflicts keyed on the constraint name
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(constraint) = unique_violation(&err) {
            return match constraint {
                USERS_EMAIL_KEY => ApiError::Conflict("Email already exists".to_string()),
                FOUNDER_PAIR_KEY => ApiError::Conflict("This user is already a team member".to_string()),
                other => ApiError::Conflict(format!("Duplicate value violates {}", other)),
            };
        }

        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            other => ApiError::InternalError(format!("Database error: {}", other)),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotOwner { .. } => {
                ApiError::Forbidden("Only the startup owner can perform this action".to_string())
            }
            AuthzError::DatabaseError(err) => err.into(),
        }
    }
}

impl From<StartupError> for ApiError {
    fn from(err: StartupError) -> Self {
        match err {
            StartupError::MissingName => {
                ApiError::invalid_field("name", StartupError::MissingName.to_string())
            }
            StartupError::Database(err) => err.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Password(err) => err.into(),
            UserError::Database(err) => err.into(),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    ValidationErrorDetail::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid {}", field)),
                    )
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

/// Unparseable or wrongly-typed JSON bodies are client errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Startup not found".to_string());
        assert_eq!(err.to_string(), "Not found: Startup not found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ValidationError(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InternalError("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error() {
        let err = ApiError::ValidationError(vec![
            ValidationErrorDetail::new("email", "Invalid email format"),
            ValidationErrorDetail::new("password", "Password too short"),
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_not_owner_is_forbidden() {
        let err: ApiError = AuthzError::NotOwner {
            startup_id: 1,
            user_id: 2,
        }
        .into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_missing_name_is_validation_error() {
        let err: ApiError = StartupError::MissingName.into();
        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details, vec![ValidationErrorDetail::new("name", "Startup name is required")]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_jwt_errors_are_unauthorized() {
        let err: ApiError = JwtError::Expired.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = JwtError::WrongTokenType {
            expected: "refresh",
            actual: "access",
        }
        .into();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::InternalError("connection refused at 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "internal_error");
        assert!(!body.message.contains("10.0.0.5"));
    }
}
