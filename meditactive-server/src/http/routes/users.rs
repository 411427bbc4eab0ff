//! User endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::db::User;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidId};
use crate::http::server::AppState;
use crate::models::UserFields;

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub nome: String,
    pub cognome: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            nome: u.nome,
            cognome: u.cognome,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/users - list all users
async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users - create a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(fields): JsonBody<UserFields>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.users.create(fields).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/users/{id} - overwrite only the supplied fields
async fn update_user(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    JsonBody(fields): JsonBody<UserFields>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.update(id, fields).await?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/users/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
