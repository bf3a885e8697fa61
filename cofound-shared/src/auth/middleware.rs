/// Bearer-token authentication middleware for Axum
///
/// Reads `Authorization: Bearer <token>`, validates it as an access token
/// and inserts an [`AuthContext`] into the request extensions. Handlers
/// behind the layer take `Extension<AuthContext>`.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use cofound_shared::auth::middleware::{create_jwt_middleware, AuthContext};
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .route_layer(middleware::from_fn(create_jwt_middleware("secret".to_string())));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{future::Future, pin::Pin};

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::user::UserRole;

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: i32,

    /// Role carried by the token; may lag a profile change until re-login
    pub role: UserRole,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Rejections produced before the handler runs
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Bad signature, expired, wrong issuer or wrong token type
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing credentials".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

fn bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Validates the bearer token and attaches [`AuthContext`]
///
/// # Errors
///
/// - 401 if the header is missing, or the token is invalid or expired
/// - 400 if the header is not a Bearer token
pub async fn jwt_auth_middleware(secret: String, mut req: Request, next: Next) -> Result<Response, AuthError> {
    let claims = validate_access_token(bearer_token(&req)?, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    req.extensions_mut().insert(AuthContext::from(&claims));

    Ok(next.run(req).await)
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>;

/// Captures the secret and returns a closure for `axum::middleware::from_fn`
///
/// The closure owns its copy of the secret, so the layer is `'static` and
/// can outlive whatever config it was read from.
pub fn create_jwt_middleware(secret: String) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}
