// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Results of a nearby-listeners query.

use geo::Point;

use crate::models::{ActivityRecord, Profile};

/// One listener within range of the requester.
#[derive(Debug, Clone)]
pub struct NearbyListener {
    pub record: ActivityRecord,
    /// Great-circle distance from the requester
    pub distance_km: f64,
    /// Whole minutes since `record.last_updated`
    pub minutes_ago: i64,
    /// Display metadata, if the profile store has any
    pub profile: Option<Profile>,
}

/// Ranked listeners plus the parameters that produced them.
#[derive(Debug, Clone)]
pub struct NearbyResult {
    /// Sorted by ascending distance
    pub listeners: Vec<NearbyListener>,
    pub total_count: usize,
    pub max_distance_km: f64,
    pub max_age_minutes: u32,
    /// Requester's own position
    pub origin: Point<f64>,
}
