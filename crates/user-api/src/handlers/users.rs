//! User directory handlers.
//!
//! All routes here sit behind `require_auth`; only deletion additionally
//! requires the admin role.

use crate::crypto::Claims;
use crate::errors::ApiError;
use crate::middleware::require_role;
use crate::models::{NewUser, Role, User, UserUpdate};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

/// Parse the `:id` segment. Anything that is not a positive integer cannot
/// name a record, so it resolves to 404 like an unknown id.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// GET /users
#[tracing::instrument(skip_all, name = "user_api.handlers.list_users")]
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.users.list().await)
}

/// GET /users/:id
#[tracing::instrument(skip_all, name = "user_api.handlers.get_user", fields(id = %id))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.users.get(id).await?))
}

/// POST /users
#[tracing::instrument(skip_all, name = "user_api.handlers.create_user")]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(new_user) = payload?;

    let user = state.users.create(new_user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users/:id
///
/// Any authenticated caller may change any field, role included.
#[tracing::instrument(skip_all, name = "user_api.handlers.update_user", fields(id = %id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;

    Ok(Json(state.users.update(id, update).await?))
}

/// DELETE /users/:id (admin only)
///
/// The role check runs before the lookup: a non-admin learns nothing about
/// which ids exist.
#[tracing::instrument(skip_all, name = "user_api.handlers.delete_user", fields(id = %id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, Role::Admin)?;

    let id = parse_id(&id)?;
    state.users.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
