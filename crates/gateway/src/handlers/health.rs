//! Liveness, readiness and metrics endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Probe {
    Up,
    Down,
}

#[derive(Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub database: StoreCheck,
    pub scraper: ScraperCheck,
}

/// Round trip to the article store
#[derive(Serialize)]
pub struct StoreCheck {
    pub status: Probe,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where `GET /scrape` will fetch from; reported, not probed
#[derive(Serialize)]
pub struct ScraperCheck {
    pub target_url: String,
}

pub async fn health(State(state): State<AppState>) -> Json<Liveness> {
    Json(Liveness {
        status: "healthy",
        service: state.config.observability.service_name.clone(),
        version: newsnotes_common::VERSION,
    })
}

/// 503 until the article store answers a ping
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let start = Instant::now();

    let database = match state.db.ping().await {
        Ok(()) => StoreCheck {
            status: Probe::Up,
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Article store unreachable");
            StoreCheck {
                status: Probe::Down,
                latency_ms: None,
                error: Some(e.to_string()),
            }
        }
    };

    let (code, status) = match database.status {
        Probe::Up => (StatusCode::OK, "ready"),
        Probe::Down => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
    };

    let checks = ReadinessChecks {
        database,
        scraper: ScraperCheck {
            target_url: state.scraper.target_url().to_string(),
        },
    };

    (code, Json(Readiness { status, checks }))
}

/// Prometheus exposition; 404 when metrics are disabled
pub async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(StatusCode::NOT_FOUND)
}
