// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod cleanup;
pub mod lifecycle;
pub mod proximity;

pub use activity::ActivityService;
pub use cleanup::spawn_periodic_sweep;
pub use lifecycle::{ActivityInput, ValidationError};
pub use proximity::NearbyQuery;
