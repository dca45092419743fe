// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HearNear API Server
//!
//! Keeps each listener's live location and track, and answers
//! "who is listening nearby" queries.

use hearnear::{
    config::{Config, StorageBackend},
    db::{Db, FirestoreDb, MemoryDb},
    services::{spawn_periodic_sweep, ActivityService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting HearNear API");

    let db = match &config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; activity is lost on restart");
            Db::Memory(MemoryDb::new())
        }
        StorageBackend::Firestore { project_id } => {
            Db::Firestore(FirestoreDb::new(project_id).await?)
        }
    };

    let activity_service =
        ActivityService::new(db.clone()).with_retention_hours(config.activity_retention_hours);

    if let Some(interval) = config.cleanup_interval() {
        tracing::info!(
            interval_secs = interval.as_secs(),
            retention_hours = config.activity_retention_hours,
            "Starting periodic activity sweep"
        );
        spawn_periodic_sweep(activity_service.clone(), interval);
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        activity_service,
    });

    // Build router
    let app = hearnear::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hearnear=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
