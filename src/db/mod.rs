// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: activity store and profile lookups.
//!
//! [`Db`] dispatches to Firestore in production or to an in-process map
//! for local development and tests.

pub mod firestore;
pub mod memory;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;
use crate::error::AppError;
use crate::models::{ActivityRecord, ActivityUpdate, Profile, UserId};

/// Collection names as constants.
pub mod collections {
    /// Profiles (keyed by user_id)
    pub const USERS: &str = "users";
    /// Live activity (keyed by user_id)
    pub const ACTIVITIES: &str = "activities";
}

/// Storage backend shared by all request handlers.
#[derive(Clone)]
pub enum Db {
    Memory(MemoryDb),
    Firestore(FirestoreDb),
}

impl Db {
    /// Insert or replace the user's activity, stamped with `now`.
    pub async fn upsert_activity(
        &self,
        user_id: UserId,
        update: &ActivityUpdate,
        now: DateTime<Utc>,
    ) -> Result<ActivityRecord, AppError> {
        match self {
            Db::Memory(db) => Ok(db.upsert_activity(user_id, update, now)),
            Db::Firestore(db) => db.upsert_activity(user_id, update, now).await,
        }
    }

    pub async fn get_activity(&self, user_id: UserId) -> Result<Option<ActivityRecord>, AppError> {
        match self {
            Db::Memory(db) => Ok(db.get_activity(user_id)),
            Db::Firestore(db) => db.get_activity(user_id).await,
        }
    }

    /// Returns `true` if a record existed and was removed.
    pub async fn delete_activity(&self, user_id: UserId) -> Result<bool, AppError> {
        match self {
            Db::Memory(db) => Ok(db.delete_activity(user_id)),
            Db::Firestore(db) => db.delete_activity(user_id).await,
        }
    }

    /// Records of every other user with `last_updated >= cutoff`.
    ///
    /// Ordered most recently updated first, then by ascending user ID.
    pub async fn list_fresh_activities_except(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        match self {
            Db::Memory(db) => Ok(db.list_fresh_activities_except(user_id, cutoff)),
            Db::Firestore(db) => db.list_fresh_activities_except(user_id, cutoff).await,
        }
    }

    /// Remove records with `last_updated < cutoff`; returns how many.
    pub async fn delete_activities_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        match self {
            Db::Memory(db) => Ok(db.delete_activities_older_than(cutoff)),
            Db::Firestore(db) => db.delete_activities_older_than(cutoff).await,
        }
    }

    /// Profiles for the given users, keyed by user ID.
    pub async fn get_profiles(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, Profile>, AppError> {
        let profiles: Vec<Profile> = match self {
            Db::Memory(db) => user_ids
                .iter()
                .filter_map(|&id| db.get_profile(id))
                .collect(),
            Db::Firestore(db) => db.get_profiles(user_ids).await?,
        };

        Ok(profiles.into_iter().map(|p| (p.user_id, p)).collect())
    }

    pub async fn upsert_profile(&self, profile: Profile) -> Result<(), AppError> {
        match self {
            Db::Memory(db) => {
                db.upsert_profile(profile);
                Ok(())
            }
            Db::Firestore(db) => db.upsert_profile(&profile).await,
        }
    }
}
