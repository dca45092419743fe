// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Live listening activity: one record per user.

use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};

/// Opaque user identifier issued by the identity provider.
pub type UserId = u64;

/// Stored activity record (also the Firestore document, keyed by user ID).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Owner of the record
    pub user_id: UserId,
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
    /// Track title (trimmed, non-empty)
    pub track_name: String,
    /// Artist name (trimmed, non-empty)
    pub artist_name: String,
    /// Album title, absent when unknown
    pub album_name: Option<String>,
    /// Time of the most recent write
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl ActivityRecord {
    /// Build the record that an upsert of `update` at `now` stores.
    pub fn from_update(user_id: UserId, update: &ActivityUpdate, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            latitude: update.latitude,
            longitude: update.longitude,
            track_name: update.track_name.clone(),
            artist_name: update.artist_name.clone(),
            album_name: update.album_name.clone(),
            last_updated: now,
        }
    }

    /// Position as a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// An activity update that has passed validation and normalisation.
///
/// Only produced by [`crate::services::lifecycle::validate_activity`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ActivityUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
}
