// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent hash maps.
//!
//! Used for local development and tests. Each record is replaced as a
//! whole under its shard lock, so readers never see a half-written record.
//! Contents are lost when the process exits.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::models::{ActivityRecord, ActivityUpdate, Profile, UserId};

#[derive(Clone, Default)]
pub struct MemoryDb {
    activities: Arc<DashMap<UserId, ActivityRecord>>,
    profiles: Arc<DashMap<UserId, Profile>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Activity Operations ─────────────────────────────────────

    pub fn upsert_activity(
        &self,
        user_id: UserId,
        update: &ActivityUpdate,
        now: DateTime<Utc>,
    ) -> ActivityRecord {
        let record = ActivityRecord::from_update(user_id, update, now);
        self.activities.insert(user_id, record.clone());
        record
    }

    pub fn get_activity(&self, user_id: UserId) -> Option<ActivityRecord> {
        self.activities.get(&user_id).map(|r| r.value().clone())
    }

    pub fn delete_activity(&self, user_id: UserId) -> bool {
        self.activities.remove(&user_id).is_some()
    }

    /// Records of other users updated at or after `cutoff`, most recent first.
    pub fn list_fresh_activities_except(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> Vec<ActivityRecord> {
        let mut records: Vec<ActivityRecord> = self
            .activities
            .iter()
            .filter(|entry| *entry.key() != user_id && entry.value().last_updated >= cutoff)
            .map(|entry| entry.value().clone())
            .collect();

        records.sort_by_key(|r| (Reverse(r.last_updated), r.user_id));
        records
    }

    /// Remove every record last updated before `cutoff`.
    ///
    /// A record refreshed between the scan and the removal is kept.
    pub fn delete_activities_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let stale: Vec<UserId> = self
            .activities
            .iter()
            .filter(|entry| entry.value().last_updated < cutoff)
            .map(|entry| *entry.key())
            .collect();

        stale
            .into_iter()
            .filter(|user_id| {
                self.activities
                    .remove_if(user_id, |_, record| record.last_updated < cutoff)
                    .is_some()
            })
            .count()
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub fn get_profile(&self, user_id: UserId) -> Option<Profile> {
        self.profiles.get(&user_id).map(|p| p.value().clone())
    }

    pub fn upsert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.user_id, profile);
    }
}
