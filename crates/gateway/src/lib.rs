//! NewsNotes API Gateway
//!
//! HTTP surface over the article store:
//! - Articles and their notes
//! - The saved-articles list
//! - The homepage scrape trigger
//! - Health, readiness and Prometheus metrics

pub mod handlers;
pub mod middleware;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use newsnotes_common::{config::AppConfig, db::DbPool, ScrapeService};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub scraper: Arc<ScrapeService>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let static_files = ServeDir::new(&state.config.server.static_dir);
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        state.config.request_timeout(),
    );

    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))

        // Note endpoints
        .route("/notes", get(handlers::notes::list_notes))
        .route(
            "/notes/deleteNote/{note_id}/{article_id}",
            delete(handlers::notes::delete_note),
        )

        // Article endpoints
        .route("/articles", get(handlers::articles::list_articles))
        .route("/articles/deleteAll", delete(handlers::articles::delete_all_articles))
        .route(
            "/articles/{id}",
            get(handlers::articles::get_article).post(handlers::articles::add_note),
        )

        // Saved-list endpoints
        .route("/saved", get(handlers::saved::list_saved))
        .route("/saved/{id}", post(handlers::saved::save_article))
        .route("/deleteSaved/{id}", post(handlers::saved::unsave_article))

        // Scrape trigger
        .route("/scrape", get(handlers::scrape::scrape))

        .route_layer(axum_middleware::from_fn(middleware::metrics::track_metrics));

    // Compose the app
    api_routes
        .fallback_service(static_files)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}
