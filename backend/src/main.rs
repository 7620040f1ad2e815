//! Distillery Operations Platform - Backend Server
//!
//! Serves the production calculations used across the distillery: LAL and
//! yield figures, rum recipe dilution, bottling run planning, and batch
//! record merging and import.

use axum::{routing::get, Router};
use shared::models::RecipeCatalog;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod routes;
mod services;

pub use crate::config::Config;

use error::AppError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recipes: Arc<RecipeCatalog>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "distillery_server=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Distillery Operations Server");
    tracing::info!("Environment: {}", config.environment);

    let recipes = RecipeCatalog::builtin();
    tracing::info!("Loaded {} recipes", recipes.len());

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        recipes: Arc::new(recipes),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Distillery Operations Platform API v1.0"
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("Route {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        create_app(AppState {
            config: Arc::new(Config::default()),
            recipes: Arc::new(RecipeCatalog::builtin()),
        })
    }

    async fn send(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["recipes"], 3);
    }

    #[tokio::test]
    async fn test_calculate_dilution_route() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/recipes/calculate",
            Some(json!({ "recipe": "pineapple-rum", "volume_l": 96.0, "abv_percent": 60.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_volume_l"], 144.0);
        assert_eq!(body["water_to_add_l"], 48.0);
    }

    #[tokio::test]
    async fn test_under_proof_is_unprocessable() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/recipes/calculate",
            Some(json!({ "recipe": "pineapple-rum", "volume_l": 96.0, "abv_percent": 30.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNDER_PROOF");
    }

    #[tokio::test]
    async fn test_unknown_recipe_is_not_found() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/recipes/calculate",
            Some(json!({ "recipe": "banana-rum", "volume_l": 96.0, "abv_percent": 60.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "RECIPE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_lal_route_reports_data_issue() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/lal",
            Some(json!({ "lal_in": 100.0, "lal_out": 120.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_data_issue"], true);
        assert_eq!(body["loss_display"], "check data");
    }

    #[tokio::test]
    async fn test_merge_route() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/batches/merge",
            Some(json!([
                { "batch_id": "RUM-24-03", "still_used": "Roberta" },
                { "batch_id": "RUM-24-03", "notes": "second pass" }
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["notes"], "second pass");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/lal")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = send(Method::GET, "/api/v1/lots", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
