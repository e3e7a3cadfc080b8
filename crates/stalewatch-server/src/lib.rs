// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Liveness endpoint for the stalewatch monitor.
//!
//! The monitor itself runs on the [`JobRegistry`]; this crate only exposes
//! `/health` so a platform probe can tell the process is up, and reports the
//! scheduler's view of the check job alongside.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::get, Json, Router};
use serde::Serialize;
use stalewatch_jobs::{JobRegistry, JobsHealthStatus};
use tower_http::trace::TraceLayer;

pub mod version;

#[derive(Clone)]
pub struct AppState {
	pub registry: Arc<JobRegistry>,
}

impl AppState {
	pub fn new(registry: Arc<JobRegistry>) -> Self {
		Self { registry }
	}
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub jobs: JobsHealthStatus,
}

/// The process answers `ok` for as long as it can serve requests. Job health
/// is informational and never changes the status code.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		jobs: state.registry.health_status().await,
	})
}

/// POST /health - same answer as GET. The body, form-encoded or empty, is
/// ignored.
pub async fn health_post(State(state): State<AppState>, _body: Bytes) -> Json<HealthResponse> {
	health(State(state)).await
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health).post(health_post))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
