// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity service: the operations exposed to request handlers.
//!
//! Handles the core workflow:
//! 1. Validate and store a user's live activity
//! 2. Answer nearby-listener queries, merging profile metadata
//! 3. Sweep expired activity on demand

use std::sync::Arc;

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{ActivityRecord, NearbyResult, UserId};
use crate::services::lifecycle::{
    retention_cutoff, validate_activity, ActivityInput, DEFAULT_RETENTION_HOURS,
};
use crate::services::proximity::{self, NearbyQuery};
use crate::time_utils::{Clock, SystemClock};

#[derive(Clone)]
pub struct ActivityService {
    db: Db,
    clock: Arc<dyn Clock>,
    retention_hours: u32,
}

impl ActivityService {
    pub fn new(db: Db) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Db, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            retention_hours: DEFAULT_RETENTION_HOURS,
        }
    }

    /// Default sweep threshold used when the caller gives none.
    pub fn with_retention_hours(mut self, hours: u32) -> Self {
        self.retention_hours = hours;
        self
    }

    pub fn retention_hours(&self) -> u32 {
        self.retention_hours
    }

    /// Validate and store the user's current position and track.
    pub async fn submit_activity(
        &self,
        user_id: UserId,
        input: &ActivityInput,
    ) -> Result<ActivityRecord> {
        let update = validate_activity(input).inspect_err(|e| {
            tracing::debug!(user_id, error = %e, "Rejected activity update");
        })?;

        let record = self
            .db
            .upsert_activity(user_id, &update, self.clock.now())
            .await?;

        tracing::info!(
            user_id,
            track = %record.track_name,
            artist = %record.artist_name,
            "Activity updated"
        );

        Ok(record)
    }

    /// Delete the user's activity. Returns `false` if there was none.
    pub async fn remove_activity(&self, user_id: UserId) -> Result<bool> {
        let removed = self.db.delete_activity(user_id).await?;
        tracing::info!(user_id, removed, "Activity removal requested");
        Ok(removed)
    }

    pub async fn get_own_activity(&self, user_id: UserId) -> Result<ActivityRecord> {
        self.db
            .get_activity(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No activity for user {}", user_id)))
    }

    /// Listeners near the caller, nearest first, with profile metadata.
    pub async fn query_nearby(
        &self,
        user_id: UserId,
        max_distance_km: Option<f64>,
        max_age_minutes: Option<u32>,
    ) -> Result<NearbyResult> {
        let query = NearbyQuery::with_defaults(max_distance_km, max_age_minutes);
        let mut result = proximity::nearby(&self.db, user_id, &query, self.clock.now()).await?;

        if result.listeners.is_empty() {
            return Ok(result);
        }

        let ids: Vec<UserId> = result.listeners.iter().map(|l| l.record.user_id).collect();
        match self.db.get_profiles(&ids).await {
            Ok(mut profiles) => {
                for listener in &mut result.listeners {
                    listener.profile = profiles.remove(&listener.record.user_id);
                }
            }
            Err(e) => {
                // Profiles are presentation only; return listeners without them.
                tracing::warn!(user_id, error = %e, "Failed to load listener profiles");
            }
        }

        Ok(result)
    }

    /// Remove activity older than `threshold_hours` (default: retention setting).
    pub async fn sweep_expired(&self, threshold_hours: Option<u32>) -> Result<usize> {
        let hours = threshold_hours.unwrap_or(self.retention_hours);
        let cutoff = retention_cutoff(self.clock.now(), hours)?;

        let deleted = self.db.delete_activities_older_than(cutoff).await?;
        tracing::info!(threshold_hours = hours, deleted, "Expired activity swept");

        Ok(deleted)
    }
}
