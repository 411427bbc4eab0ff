//! Liveness endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Service info response
#[derive(Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        service: "meditactive",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(root))
}
