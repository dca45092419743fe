// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Activities (one live document per user, keyed by user ID)
//! - Profiles (read-only display metadata)

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use firestore::{FirestoreConsistencySelector, FirestoreTimestamp, FirestoreTransaction};
use futures_util::{stream, StreamExt};

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ActivityRecord, ActivityUpdate, Profile, UserId};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation returns a database error.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Get the live activity for a user.
    pub async fn get_activity(&self, user_id: UserId) -> Result<Option<ActivityRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the user's activity document in a single write.
    pub async fn upsert_activity(
        &self,
        user_id: UserId,
        update: &ActivityUpdate,
        now: DateTime<Utc>,
    ) -> Result<ActivityRecord, AppError> {
        let record = ActivityRecord::from_update(user_id, update, now);

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(user_id.to_string())
            .object(&record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(record)
    }

    /// Delete the user's activity. Returns `false` if there was none.
    ///
    /// The existence check is read inside the deleting transaction, so of two
    /// concurrent removals only one reports `true`.
    pub async fn delete_activity(&self, user_id: UserId) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let doc_id = user_id.to_string();

        let mut transaction = begin_transaction(client).await?;
        let existing: Option<ActivityRecord> = in_transaction(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read activity in transaction: {}", e))
            })?;

        if existing.is_none() {
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        client
            .fluent()
            .delete()
            .from(collections::ACTIVITIES)
            .document_id(&doc_id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit deletion: {}", e)))?;

        Ok(true)
    }

    /// Activities of other users updated at or after `cutoff`, most recent first.
    pub async fn list_fresh_activities_except(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let mut records: Vec<ActivityRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.field("last_updated")
                    .greater_than_or_equal(FirestoreTimestamp(cutoff))
            })
            .order_by([(
                "last_updated",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        records.retain(|r| r.user_id != user_id);
        // Firestore leaves equal timestamps unordered.
        records.sort_by_key(|r| (Reverse(r.last_updated), r.user_id));
        Ok(records)
    }

    /// Delete every activity last updated before `cutoff`.
    ///
    /// Each batch of stale documents is queried inside the transaction that
    /// deletes it. A document refreshed concurrently conflicts with the
    /// transaction instead of being deleted; the commit then fails and the
    /// sweep can simply be run again. Returns the number of committed deletes.
    pub async fn delete_activities_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        let client = self.get_client()?;
        let mut deleted = 0;

        loop {
            let mut transaction = begin_transaction(client).await?;
            let stale: Vec<ActivityRecord> = in_transaction(client, &transaction)
                .fluent()
                .select()
                .from(collections::ACTIVITIES)
                .filter(move |q| q.field("last_updated").less_than(FirestoreTimestamp(cutoff)))
                .limit(BATCH_SIZE as u32)
                .obj()
                .query()
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to query stale activity: {}", e))
                })?;

            if stale.is_empty() {
                let _ = transaction.rollback().await;
                break;
            }

            for record in &stale {
                client
                    .fluent()
                    .delete()
                    .from(collections::ACTIVITIES)
                    .document_id(record.user_id.to_string())
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction: {}",
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;

            deleted += stale.len();
            tracing::debug!(batch = stale.len(), deleted, "Committed stale activity batch");

            if stale.len() < BATCH_SIZE {
                break;
            }
        }

        Ok(deleted)
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user's display profile.
    pub async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch profiles for many users concurrently; missing users are skipped.
    pub async fn get_profiles(&self, user_ids: &[UserId]) -> Result<Vec<Profile>, AppError> {
        let profiles = stream::iter(user_ids.to_vec())
            .map(|user_id| async move { self.get_profile(user_id).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<Profile>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<Profile>>, AppError>>()?;

        Ok(profiles.into_iter().flatten().collect())
    }

    /// Create or update a profile.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(profile.user_id.to_string())
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

// ─── Transaction Helpers ───────────────────────────────────────────

async fn begin_transaction(
    client: &firestore::FirestoreDb,
) -> Result<FirestoreTransaction<'_>, AppError> {
    client
        .begin_transaction()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
}

/// Client whose reads belong to `transaction`, so the documents they return
/// are checked for conflicts when it commits.
fn in_transaction(
    client: &firestore::FirestoreDb,
    transaction: &FirestoreTransaction<'_>,
) -> firestore::FirestoreDb {
    client.clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
        transaction.transaction_id().clone(),
    ))
}
