// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Duration, TimeZone, Utc};
use hearnear::config::Config;
use hearnear::db::{Db, FirestoreDb, MemoryDb};
use hearnear::routes::create_router;
use hearnear::services::{ActivityInput, ActivityService};
use hearnear::time_utils::Clock;
use hearnear::AppState;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Clock that only moves when told to.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Fixed starting point for clock-driven tests.
#[allow(dead_code)]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

/// Activity service over a fresh in-memory store and a mock clock at `t0()`.
#[allow(dead_code)]
pub fn test_service() -> (ActivityService, Db, Arc<MockClock>) {
    let db = Db::Memory(MemoryDb::new());
    let clock = Arc::new(MockClock::new(t0()));
    let service = ActivityService::with_clock(db.clone(), clock.clone());
    (service, db, clock)
}

/// Build a valid activity input.
#[allow(dead_code)]
pub fn activity(latitude: f64, longitude: f64, track: &str) -> ActivityInput {
    ActivityInput {
        latitude,
        longitude,
        track_name: track.to_string(),
        artist_name: "Test Artist".to_string(),
        album_name: None,
    }
}

/// Create a test app over the in-memory store.
/// Returns the router, the shared state and the clock driving it.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MockClock>) {
    let config = Config::test_default();
    let (activity_service, db, clock) = test_service();

    let state = Arc::new(AppState {
        config,
        db,
        activity_service,
    });

    (create_router(state.clone()), state, clock)
}

/// Create a session token accepted by the test app.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64, signing_key: &[u8]) -> String {
    hearnear::middleware::auth::create_jwt(user_id, signing_key).expect("Failed to create JWT")
}
