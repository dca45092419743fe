// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nearby-listener search.
//!
//! Two independent stages: the store returns only fresh records of other
//! users, then [`rank_by_distance`] keeps those within range and sorts them.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::geo_math::point_distance_km;
use crate::models::{ActivityRecord, NearbyListener, NearbyResult, UserId};
use crate::services::lifecycle::{
    freshness_cutoff, ValidationError, DEFAULT_MAX_AGE_MINUTES, DEFAULT_MAX_DISTANCE_KM,
};
use crate::time_utils::minutes_between;

/// Candidate sets at least this large have distances computed on the rayon pool.
const PARALLEL_THRESHOLD: usize = 256;

/// Search parameters for a nearby query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub max_distance_km: f64,
    pub max_age_minutes: u32,
}

impl Default for NearbyQuery {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            max_age_minutes: DEFAULT_MAX_AGE_MINUTES,
        }
    }
}

impl NearbyQuery {
    /// Fill omitted parameters with the defaults (50 km, 60 minutes).
    pub fn with_defaults(max_distance_km: Option<f64>, max_age_minutes: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            max_distance_km: max_distance_km.unwrap_or(defaults.max_distance_km),
            max_age_minutes: max_age_minutes.unwrap_or(defaults.max_age_minutes),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.max_distance_km.is_finite() || self.max_distance_km < 0.0 {
            return Err(ValidationError::InvalidSearchParameter(
                "max_distance must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Find listeners near `requester_id`.
///
/// Fails with [`AppError::NoOwnActivity`] if the requester has no live
/// record. Profiles are left empty; the caller merges them.
pub async fn nearby(
    db: &Db,
    requester_id: UserId,
    query: &NearbyQuery,
    now: DateTime<Utc>,
) -> Result<NearbyResult> {
    query.validate()?;

    let cutoff = freshness_cutoff(now, query.max_age_minutes)?;

    let own = db
        .get_activity(requester_id)
        .await?
        .ok_or(AppError::NoOwnActivity(requester_id))?;

    let candidates = db
        .list_fresh_activities_except(requester_id, cutoff)
        .await?;
    let candidate_count = candidates.len();

    let listeners = rank_by_distance(&own, candidates, query.max_distance_km, now);

    tracing::debug!(
        user_id = requester_id,
        candidates = candidate_count,
        matched = listeners.len(),
        max_distance_km = query.max_distance_km,
        max_age_minutes = query.max_age_minutes,
        "Nearby query complete"
    );

    Ok(NearbyResult {
        total_count: listeners.len(),
        listeners,
        max_distance_km: query.max_distance_km,
        max_age_minutes: query.max_age_minutes,
        origin: own.point(),
    })
}

/// Keep candidates within `max_distance_km` (inclusive) of `origin`, sorted
/// by ascending distance. Equal distances keep their input order.
pub fn rank_by_distance(
    origin: &ActivityRecord,
    candidates: Vec<ActivityRecord>,
    max_distance_km: f64,
    now: DateTime<Utc>,
) -> Vec<NearbyListener> {
    let from = origin.point();
    let to_listener = |record: ActivityRecord| {
        let distance_km = point_distance_km(from, record.point());
        (distance_km <= max_distance_km && record.user_id != origin.user_id).then(|| {
            NearbyListener {
                distance_km,
                minutes_ago: minutes_between(record.last_updated, now),
                record,
                profile: None,
            }
        })
    };

    let mut listeners: Vec<NearbyListener> = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates.into_par_iter().filter_map(to_listener).collect()
    } else {
        candidates.into_iter().filter_map(to_listener).collect()
    };

    listeners.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    listeners
}
