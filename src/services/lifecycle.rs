// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rules for what an activity may contain and how long it stays live.
//!
//! Every update is validated and normalised here before it reaches the
//! store, so a rejected update never touches the existing record.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::models::ActivityUpdate;

/// Maximum length of track, artist and album names, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Records older than this are removed by the sweep when no threshold is given.
pub const DEFAULT_RETENTION_HOURS: u32 = 24;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
pub const DEFAULT_MAX_AGE_MINUTES: u32 = 60;

/// Raw activity update as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityInput {
    pub latitude: f64,
    pub longitude: f64,
    pub track_name: String,
    pub artist_name: String,
    #[serde(default)]
    pub album_name: Option<String>,
}

/// Rejected input. The stored record is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}")]
    CoordinateOutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be between 1 and {max} characters")]
    FieldLength { field: &'static str, max: usize },

    #[error("Invalid search parameter: {0}")]
    InvalidSearchParameter(String),
}

/// Validate and normalise an update.
///
/// Names are trimmed; an album that is empty after trimming becomes `None`.
pub fn validate_activity(input: &ActivityInput) -> Result<ActivityUpdate, ValidationError> {
    check_coordinate("latitude", input.latitude, 90.0)?;
    check_coordinate("longitude", input.longitude, 180.0)?;

    let track_name = required_name("track_name", &input.track_name)?;
    let artist_name = required_name("artist_name", &input.artist_name)?;

    let album_name = match input.album_name.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(album) if album.chars().count() > MAX_NAME_CHARS => {
            return Err(ValidationError::FieldLength {
                field: "album_name",
                max: MAX_NAME_CHARS,
            })
        }
        Some(album) => Some(album.to_string()),
    };

    Ok(ActivityUpdate {
        latitude: input.latitude,
        longitude: input.longitude,
        track_name,
        artist_name,
        album_name,
    })
}

fn check_coordinate(field: &'static str, value: f64, limit: f64) -> Result<(), ValidationError> {
    // NaN fails the range check.
    if (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::CoordinateOutOfRange {
            field,
            min: -limit,
            max: limit,
        })
    }
}

fn required_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(ValidationError::FieldLength {
            field,
            max: MAX_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Oldest `last_updated` still eligible for a nearby query.
pub fn freshness_cutoff(
    now: DateTime<Utc>,
    max_age_minutes: u32,
) -> Result<DateTime<Utc>, ValidationError> {
    Duration::try_minutes(i64::from(max_age_minutes))
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| {
            ValidationError::InvalidSearchParameter(format!(
                "max_age_minutes {} is out of range",
                max_age_minutes
            ))
        })
}

/// Records last updated before this are swept.
///
/// Thresholds reaching past the representable date range are rejected.
pub fn retention_cutoff(
    now: DateTime<Utc>,
    threshold_hours: u32,
) -> Result<DateTime<Utc>, ValidationError> {
    Duration::try_hours(i64::from(threshold_hours))
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| {
            ValidationError::InvalidSearchParameter(format!(
                "threshold_hours {} is out of range",
                threshold_hours
            ))
        })
}
