// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! HearNear: see who is listening to music nearby
//!
//! This crate provides the backend API that keeps each user's live
//! location and now-playing track, and answers nearby-listener queries.

pub mod config;
pub mod db;
pub mod error;
pub mod geo_math;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::ActivityService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub activity_service: ActivityService,
}
