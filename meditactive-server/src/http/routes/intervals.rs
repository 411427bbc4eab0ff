//! Interval and goal endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::Interval;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, QueryParams, ValidId};
use crate::http::server::AppState;
use crate::models::{GoalFields, IntervalFields, IntervalQuery};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Interval response, with owner fields and goal names
#[derive(Debug, Serialize)]
pub struct IntervalResponse {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub user_id: i64,
    pub user_email: String,
    pub user_nome: String,
    pub user_cognome: String,
    pub created_at: String,
    pub obiettivi: Vec<String>,
}

impl From<Interval> for IntervalResponse {
    fn from(i: Interval) -> Self {
        Self {
            id: i.id,
            start_date: i.start_date.format(DATE_FORMAT).to_string(),
            end_date: i.end_date.format(DATE_FORMAT).to_string(),
            user_id: i.user_id,
            user_email: i.user_email,
            user_nome: i.user_nome,
            user_cognome: i.user_cognome,
            created_at: i.created_at.to_rfc3339(),
            obiettivi: i.goals,
        }
    }
}

/// GET /api/intervals - list with optional filters
///
/// Query: `obiettivi` (goal substring), `dataInizio` (start on or after),
/// `dataFine` (end on or before).
async fn list_intervals(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<IntervalQuery>,
) -> Result<Json<Vec<IntervalResponse>>, ApiError> {
    let intervals = state.intervals.list(query).await?;
    Ok(Json(intervals.into_iter().map(IntervalResponse::from).collect()))
}

/// POST /api/intervals
async fn create_interval(
    State(state): State<Arc<AppState>>,
    JsonBody(fields): JsonBody<IntervalFields>,
) -> Result<(StatusCode, Json<IntervalResponse>), ApiError> {
    let interval = state.intervals.create(fields).await?;
    Ok((StatusCode::CREATED, Json(IntervalResponse::from(interval))))
}

/// GET /api/intervals/{id}
async fn get_interval(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<IntervalResponse>, ApiError> {
    let interval = state.intervals.get(id).await?;
    Ok(Json(IntervalResponse::from(interval)))
}

/// PUT /api/intervals/{id}
async fn update_interval(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    JsonBody(fields): JsonBody<IntervalFields>,
) -> Result<Json<IntervalResponse>, ApiError> {
    let interval = state.intervals.update(id, fields).await?;
    Ok(Json(IntervalResponse::from(interval)))
}

/// DELETE /api/intervals/{id}
async fn delete_interval(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    state.intervals.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/intervals/{id}/obiettivi - attach a goal
async fn add_goal(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    JsonBody(fields): JsonBody<GoalFields>,
) -> Result<Json<IntervalResponse>, ApiError> {
    let interval = state.intervals.add_goal(id, fields).await?;
    Ok(Json(IntervalResponse::from(interval)))
}

/// Interval routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/intervals", get(list_intervals).post(create_interval))
        .route(
            "/api/intervals/{id}",
            get(get_interval).put(update_interval).delete(delete_interval),
        )
        .route("/api/intervals/{id}/obiettivi", post(add_goal))
}
