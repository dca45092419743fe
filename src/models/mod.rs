// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod nearby;
pub mod profile;

pub use activity::{ActivityRecord, ActivityUpdate, UserId};
pub use nearby::{NearbyListener, NearbyResult};
pub use profile::Profile;
