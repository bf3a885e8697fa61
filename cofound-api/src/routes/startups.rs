/// Startup endpoints
///
/// # Endpoints
///
/// Public:
/// - `GET /api/startups` - Every startup with founder summaries
/// - `GET /api/startups/:id` - One startup with full founder profiles
///
/// Authenticated:
/// - `POST /api/startups` - Create a startup owned by the caller
/// - `GET /api/startups/my/startups` - Startups the caller belongs to
///
/// Owner only:
/// - `PUT /api/startups/:id` - Replace the startup's fields
/// - `DELETE /api/startups/:id` - Delete the startup and its memberships
/// - `POST /api/startups/:id/cofounders` - Add a member by email
/// - `DELETE /api/startups/:id/cofounders/:user_id` - Remove a non-owner member

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use cofound_shared::{
    auth::{
        middleware::AuthContext,
        ownership::{require_owner, AuthzError, OwnerGrant},
    },
    models::{
        founder::{Founder, DEFAULT_COFOUNDER_ROLE},
        startup::{MemberStartup, Startup, StartupData, StartupDetail, StartupListing, StartupStage},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create/update request body
///
/// `name` defaults to empty so a missing name is reported as a validation
/// error rather than a JSON rejection.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct StartupRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Tagline must be at most 500 characters"))]
    pub tagline: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    /// One of `idea`, `mvp`, `early-revenue`, `growth`; `idea` when absent
    pub stage: Option<String>,

    #[validate(length(max = 500, message = "Website must be at most 500 characters"))]
    pub website: Option<String>,

    #[validate(length(max = 500, message = "Logo must be at most 500 characters"))]
    pub logo: Option<String>,
}

impl StartupRequest {
    /// Validates and converts into model input
    ///
    /// A blank name is left for the model to reject.
    pub fn into_data(self) -> ApiResult<StartupData> {
        self.validate()?;

        let stage = match self.stage.as_deref().map(str::trim) {
            None | Some("") => StartupStage::default(),
            Some(stage) => stage.parse::<StartupStage>().map_err(|_| {
                let allowed: Vec<&str> = StartupStage::ALL.iter().map(StartupStage::as_str).collect();
                ApiError::invalid_field("stage", format!("Stage must be one of: {}", allowed.join(", ")))
            })?,
        };

        Ok(StartupData {
            name: self.name.trim().to_string(),
            tagline: self.tagline,
            description: self.description,
            category: self.category,
            stage,
            website: self.website,
            logo: self.logo,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddCofounderRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Defaults to `co-founder`
    #[validate(length(min = 1, max = 50, message = "Role must be 1 to 50 characters"))]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StartupResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,

    pub startup: T,
}

#[derive(Debug, Serialize)]
pub struct StartupsResponse<T> {
    pub startups: Vec<T>,
}

/// Ownership check with a per-action 403 message
async fn owner_grant(state: &AppState, startup_id: i32, auth: &AuthContext, action: &str) -> ApiResult<OwnerGrant> {
    require_owner(&state.db, startup_id, auth.user_id)
        .await
        .map_err(|e| match e {
            AuthzError::NotOwner { .. } => ApiError::Forbidden(format!("Only startup owner can {}", action)),
            other => other.into(),
        })
}

/// Create a startup
///
/// ```text
/// POST /api/startups
/// Authorization: Bearer <token>
///
/// { "name": "Acme", "tagline": "Rockets", "stage": "mvp" }
/// ```
///
/// The caller becomes the owner (`role = "founder"`).
///
/// # Errors
///
/// - `400 Bad Request`: missing name, unknown stage, oversize field
/// - `401 Unauthorized`: no valid token
pub async fn create_startup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<StartupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StartupResponse<Startup>>)> {
    let Json(req) = payload?;
    let data = req.into_data()?;

    let startup = Startup::create(&state.db, data, auth.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(StartupResponse {
            message: Some("Startup created successfully"),
            startup,
        }),
    ))
}

/// List every startup, newest first
pub async fn list_startups(State(state): State<AppState>) -> ApiResult<Json<StartupsResponse<StartupListing>>> {
    let startups = Startup::list_with_founders(&state.db).await?;

    Ok(Json(StartupsResponse { startups }))
}

/// One startup with its founders (owner first)
///
/// # Errors
///
/// - `404 Not Found`: no such startup
pub async fn get_startup(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<StartupResponse<StartupDetail>>> {
    let Path(id) = path?;

    let startup = Startup::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Startup not found".to_string()))?;

    Ok(Json(StartupResponse { message: None, startup }))
}

/// Startups the caller belongs to, with the caller's role in each
pub async fn my_startups(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<StartupsResponse<MemberStartup>>> {
    let startups = Startup::list_by_member(&state.db, auth.user_id).await?;

    Ok(Json(StartupsResponse { startups }))
}

/// Replace a startup's fields
///
/// Full replacement: omitted optional fields are cleared.
///
/// # Errors
///
/// - `400 Bad Request`: same rules as create
/// - `403 Forbidden`: caller is not the owner
/// - `404 Not Found`: startup deleted meanwhile
pub async fn update_startup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StartupRequest>, JsonRejection>,
) -> ApiResult<Json<StartupResponse<Startup>>> {
    let Path(id) = path?;
    let grant = owner_grant(&state, id, &auth, "update").await?;

    let Json(req) = payload?;
    let data = req.into_data()?;

    let startup = Startup::update(&state.db, &grant, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Startup not found".to_string()))?;

    Ok(Json(StartupResponse {
        message: Some("Startup updated successfully"),
        startup,
    }))
}

/// Delete a startup; memberships go with it
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the owner (or the startup is gone)
pub async fn delete_startup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    let grant = owner_grant(&state, id, &auth, "delete").await?;

    Startup::delete(&state.db, grant).await?;

    Ok(Json(MessageResponse {
        message: "Startup deleted successfully",
    }))
}

/// Add a registered user to the team by email
///
/// ```text
/// POST /api/startups/:id/cofounders
///
/// { "email": "bob@example.com", "role": "CTO" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: bad email, or the user is already a member
/// - `403 Forbidden`: caller is not the owner
/// - `404 Not Found`: no user with that email
pub async fn add_cofounder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<AddCofounderRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    let grant = owner_grant(&state, id, &auth, "add co-founders").await?;

    let Json(req) = payload?;
    req.validate()?;

    let cofounder = User::find_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found with this email".to_string()))?;

    if Founder::find(&state.db, grant.startup_id(), cofounder.user.id).await?.is_some() {
        return Err(ApiError::Conflict("This user is already a team member".to_string()));
    }

    // The unique pair still catches a concurrent add that slips past the check above
    let role = req.role.as_deref().unwrap_or(DEFAULT_COFOUNDER_ROLE);
    Founder::add(&state.db, &grant, cofounder.user.id, role).await?;

    Ok(Json(MessageResponse {
        message: "Co-founder added successfully",
    }))
}

/// Remove a member
///
/// Naming the owner, or someone who isn't a member, succeeds without
/// changing anything.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the owner
pub async fn remove_cofounder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path((id, user_id)) = path?;
    let grant = owner_grant(&state, id, &auth, "remove co-founders").await?;

    Founder::remove(&state.db, &grant, user_id).await?;

    Ok(Json(MessageResponse {
        message: "Co-founder removed successfully",
    }))
}
