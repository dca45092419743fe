// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Maintenance task routes.
//!
//! Called by an external scheduler (cron, Cloud Scheduler), not by users.
//! Protected by the maintenance token middleware in routes/mod.rs.

use crate::error::Result;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Task handler routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/cleanup-activities", post(cleanup_activities))
}

#[derive(Deserialize)]
struct CleanupParams {
    /// Age threshold in hours (default: configured retention)
    threshold_hours: Option<u32>,
}

#[derive(Serialize)]
pub struct CleanupResponse {
    pub deleted_count: usize,
    pub threshold_hours: u32,
}

/// Delete activity older than the threshold. Safe to call repeatedly.
async fn cleanup_activities(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<CleanupParams>, QueryRejection>,
) -> Result<Json<CleanupResponse>> {
    let Query(params) = params?;
    let threshold_hours = params
        .threshold_hours
        .unwrap_or(state.activity_service.retention_hours());

    tracing::info!(threshold_hours, "Running activity cleanup task");

    let deleted_count = state
        .activity_service
        .sweep_expired(Some(threshold_hours))
        .await?;

    Ok(Json(CleanupResponse {
        deleted_count,
        threshold_hours,
    }))
}
