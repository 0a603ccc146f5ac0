//! Health check endpoints
//!
//! - /health - liveness, 200 whenever the process is serving
//! - /ready - readiness, 200 only if the question store answers a ping
//! - /version - build information

use hyper::{Response, StatusCode};
use serde::Serialize;

use super::common::json_response;
use crate::server::{AppState, BoxBody};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    /// `online` or `degraded`
    pub status: &'static str,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    /// `development` or `production`
    pub mode: &'static str,
    /// `mongodb` or `memory`
    pub store: &'static str,
    pub image_storage: bool,
}

fn build_health_response(state: &AppState, healthy: bool) -> HealthResponse {
    HealthResponse {
        healthy,
        status: if healthy { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        store: state.store_kind,
        image_storage: state.args.s3.is_configured(),
    }
}

/// Handle GET /health
pub fn health_check(state: &AppState) -> Response<BoxBody> {
    json_response(StatusCode::OK, &build_health_response(state, true))
}

/// Handle GET /ready
pub async fn readiness_check(state: &AppState) -> Response<BoxBody> {
    match state.questions.ping().await {
        Ok(()) => json_response(StatusCode::OK, &build_health_response(state, true)),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &build_health_response(state, false),
            )
        }
    }
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// Handle GET /version
pub fn version_info() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
            commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
            build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
            service: "preplens-admin",
        },
    )
}
