// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, security, etc.).

pub mod auth;
pub mod maintenance;
pub mod security;

pub use auth::require_auth;
pub use maintenance::require_maintenance_token;
