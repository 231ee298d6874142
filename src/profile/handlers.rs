use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{ProfileResponse, UpdateProfileRequest},
    repo,
    services::{missing_steps, validate_household},
};
use crate::{
    auth::{repo_types::User, AuthUser},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me/profile", get(get_profile).put(update_profile))
        .route("/me/profile/complete", post(complete_setup))
}

async fn load_user(state: &AppState, user_id: uuid::Uuid) -> AppResult<User> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("User"))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    Ok(Json(load_user(&state, user_id).await?.into()))
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let display_name = body.display_name.as_deref().map(str::trim);
    if display_name == Some("") {
        return Err(AppError::bad_request("Display name cannot be empty"));
    }
    let household_size = body
        .household_size
        .map(validate_household)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let user = repo::update_profile(
        &state.db,
        user_id,
        display_name,
        body.diet_preference.map(|d| d.as_str()),
        household_size,
    )
    .await?
    .ok_or(AppError::NotFound("User"))?;

    info!(%user_id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn complete_setup(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = load_user(&state, user_id).await?;
    let missing = missing_steps(&user);
    if !missing.is_empty() {
        warn!(%user_id, ?missing, "setup incomplete");
        return Err(AppError::bad_request(format!(
            "Profile setup incomplete: missing {}",
            missing.join(", ")
        )));
    }
    let user = repo::mark_setup_complete(&state.db, user_id).await?;
    info!(%user_id, "profile setup completed");
    Ok(Json(user.into()))
}
