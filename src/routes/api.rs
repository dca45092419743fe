// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityRecord, NearbyListener, UserId};
use crate::services::ActivityInput;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/update-activity", post(update_activity))
        .route("/api/activity", get(get_activity).delete(delete_activity))
        .route("/api/nearby-listeners", get(get_nearby_listeners))
}

// ─── Own Activity ────────────────────────────────────────────

/// Activity as returned to its owner.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityData {
    pub latitude: f64,
    pub longitude: f64,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub last_updated: String,
}

impl From<ActivityRecord> for ActivityData {
    fn from(r: ActivityRecord) -> Self {
        Self {
            latitude: r.latitude,
            longitude: r.longitude,
            track_name: r.track_name,
            artist_name: r.artist_name,
            album_name: r.album_name,
            last_updated: format_utc_rfc3339(r.last_updated),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    pub message: String,
    pub activity: ActivityData,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteActivityResponse {
    pub message: String,
    pub deleted: bool,
}

/// Store the caller's current location and track.
async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ActivityInput>,
) -> Result<Json<ActivityResponse>> {
    let record = state
        .activity_service
        .submit_activity(user.user_id, &input)
        .await?;

    Ok(Json(ActivityResponse {
        message: "Activity updated".to_string(),
        activity: record.into(),
    }))
}

/// Get the caller's live activity.
async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ActivityResponse>> {
    let record = state.activity_service.get_own_activity(user.user_id).await?;

    Ok(Json(ActivityResponse {
        message: "Activity found".to_string(),
        activity: record.into(),
    }))
}

/// Stop sharing: remove the caller's activity.
async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteActivityResponse>> {
    if !state.activity_service.remove_activity(user.user_id).await? {
        return Err(AppError::NotFound(format!(
            "No activity for user {}",
            user.user_id
        )));
    }

    Ok(Json(DeleteActivityResponse {
        message: "Activity removed".to_string(),
        deleted: true,
    }))
}

// ─── Nearby Listeners ────────────────────────────────────────

#[derive(Deserialize)]
struct NearbyParams {
    /// Search radius in kilometers (default 50)
    max_distance: Option<f64>,
    /// Freshness window in minutes (default 60)
    max_age_minutes: Option<u32>,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NearbyListenerResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: UserId,
    pub nick: String,
    pub avatar_url: Option<String>,
    pub instagram_username: Option<String>,
    pub instagram_url: Option<String>,
    pub distance_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub last_updated: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub minutes_ago: i64,
}

impl From<NearbyListener> for NearbyListenerResponse {
    fn from(l: NearbyListener) -> Self {
        let profile = l.profile;
        let r = l.record;
        Self {
            user_id: r.user_id,
            nick: profile.as_ref().map(|p| p.nick.clone()).unwrap_or_default(),
            avatar_url: profile.as_ref().and_then(|p| p.avatar_url.clone()),
            instagram_username: profile.as_ref().and_then(|p| p.instagram_username.clone()),
            instagram_url: profile.as_ref().and_then(|p| p.instagram_url.clone()),
            distance_km: l.distance_km,
            latitude: r.latitude,
            longitude: r.longitude,
            track_name: r.track_name,
            artist_name: r.artist_name,
            album_name: r.album_name,
            last_updated: format_utc_rfc3339(r.last_updated),
            minutes_ago: l.minutes_ago,
        }
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct YourLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SearchParams {
    pub max_distance_km: f64,
    pub max_age_minutes: u32,
    pub your_location: YourLocation,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NearbyListenersResponse {
    pub listeners: Vec<NearbyListenerResponse>,
    pub total_count: usize,
    pub search_params: SearchParams,
}

/// Listeners near the caller, nearest first.
async fn get_nearby_listeners(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    params: std::result::Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<NearbyListenersResponse>> {
    let Query(params) = params?;
    tracing::debug!(
        user_id = user.user_id,
        max_distance = ?params.max_distance,
        max_age_minutes = ?params.max_age_minutes,
        "Fetching nearby listeners"
    );

    let result = state
        .activity_service
        .query_nearby(user.user_id, params.max_distance, params.max_age_minutes)
        .await?;

    Ok(Json(NearbyListenersResponse {
        total_count: result.total_count,
        search_params: SearchParams {
            max_distance_km: result.max_distance_km,
            max_age_minutes: result.max_age_minutes,
            your_location: YourLocation {
                latitude: result.origin.y(),
                longitude: result.origin.x(),
            },
        },
        listeners: result.listeners.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use chrono::{TimeZone, Utc};

    fn record() -> ActivityRecord {
        ActivityRecord {
            user_id: 42,
            latitude: 52.21,
            longitude: 21.0,
            track_name: "Levitating".to_string(),
            artist_name: "Dua Lipa".to_string(),
            album_name: Some("Future Nostalgia".to_string()),
            last_updated: Utc.with_ymd_and_hms(2025, 3, 1, 17, 58, 0).unwrap(),
        }
    }

    #[test]
    fn test_listener_response_merges_profile() {
        let listener = NearbyListener {
            record: record(),
            distance_km: 1.11,
            minutes_ago: 2,
            profile: Some(Profile {
                user_id: 42,
                nick: "anna".to_string(),
                avatar_url: Some("/avatars/42.jpg".to_string()),
                instagram_username: Some("anna".to_string()),
                instagram_url: Some("https://instagram.com/anna".to_string()),
            }),
        };

        let json = serde_json::to_value(NearbyListenerResponse::from(listener)).unwrap();
        assert_eq!(json["nick"], "anna");
        assert_eq!(json["avatar_url"], "/avatars/42.jpg");
        assert_eq!(json["last_updated"], "2025-03-01T17:58:00Z");
        assert_eq!(json["minutes_ago"], 2);
        assert_eq!(json["album_name"], "Future Nostalgia");
    }

    #[test]
    fn test_listener_response_without_profile() {
        let listener = NearbyListener {
            record: record(),
            distance_km: 1.11,
            minutes_ago: 2,
            profile: None,
        };

        let json = serde_json::to_value(NearbyListenerResponse::from(listener)).unwrap();
        assert_eq!(json["nick"], "");
        assert!(json["avatar_url"].is_null());
        assert!(json["instagram_url"].is_null());
    }
}
