//! Axum server setup
//!
//! Server skeleton with:
//! - Tracing middleware
//! - JSON 404/405 fallbacks for unknown routes and methods
//! - Internal error detail exposed in development only
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::middleware::map_response_with_state;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::error::{ApiError, InternalDetail};
use super::routes;
use crate::db::{IntervalRepo, IntervalStore, UserRepo, UserStore};
use crate::services::{IntervalService, UserService};

/// Deployment environment; decides log verbosity and error exposure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown environment '{0}' (expected 'development' or 'production')")]
pub struct ParseEnvironmentError(String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ParseEnvironmentError(s.to_owned())),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    pub bind_addr: SocketAddr,

    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            environment: Environment::default(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub intervals: IntervalService,
    pub environment: Environment,
}

impl AppState {
    /// State backed by the PostgreSQL repositories.
    pub fn new(pool: PgPool, environment: Environment) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(UserRepo::new(pool.clone()));
        let intervals: Arc<dyn IntervalStore> = Arc::new(IntervalRepo::new(pool));
        Self::with_stores(users, intervals, environment)
    }

    pub fn with_stores(
        users: Arc<dyn UserStore>,
        intervals: Arc<dyn IntervalStore>,
        environment: Environment,
    ) -> Self {
        Self {
            users: UserService::new(users.clone()),
            intervals: IntervalService::new(intervals, users),
            environment,
        }
    }
}

/// Build the application router with all routes.
pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(routes::root::router())
        .merge(routes::users::router())
        .merge(routes::intervals::router())
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(map_response_with_state(state.clone(), expose_internal_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "route",
        id: uri.path().to_owned(),
    }
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_owned(),
    }
}

/// In development, replace the generic 500 message with the real error text.
async fn expose_internal_detail(
    State(state): State<Arc<AppState>>,
    mut response: Response,
) -> Response {
    let Some(InternalDetail(detail)) = response.extensions_mut().remove::<InternalDetail>() else {
        return response;
    };
    if state.environment.is_production() {
        return response;
    }

    let body = json!({ "error": "internal_error", "message": detail });
    (response.status(), Json(body)).into_response()
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DbConfig::default()).await?;
/// run_server(pool, ServerConfig::default()).await?;
/// ```
pub async fn run_server(pool: PgPool, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(AppState::new(pool, config.environment));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        environment = %config.environment,
        "Server listening on {}",
        config.bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::GENERIC_INTERNAL_MESSAGE;
    use crate::testing::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(store: MemoryStore, environment: Environment) -> Router {
        let store = Arc::new(store);
        build_router(AppState::with_stores(store.clone(), store, environment))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        call(app, "GET", uri).await
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn parses_environment() {
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Development".parse::<Environment>().unwrap(), Environment::Development);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = get(app(MemoryStore::new(), Environment::Development), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "route '/nope' not found");
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let (status, body) = call(
            app(MemoryStore::new(), Environment::Development),
            "PATCH",
            "/api/users/1",
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "method_not_allowed");
        assert_eq!(body["message"], "method PATCH is not allowed on '/api/users/1'");

        let (status, body) = get(
            app(MemoryStore::new(), Environment::Development),
            "/api/intervals/1/obiettivi",
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "method_not_allowed");
    }

    #[tokio::test]
    async fn internal_detail_only_in_development() {
        let dev = app(MemoryStore::broken(), Environment::Development);
        let (status, body) = get(dev, "/api/users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().starts_with("storage failure"));

        let prod = app(MemoryStore::broken(), Environment::Production);
        let (status, body) = get(prod, "/api/users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], GENERIC_INTERNAL_MESSAGE);
    }
}
