// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is read first when present, for local development.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;

use crate::services::lifecycle::{retention_cutoff, DEFAULT_RETENTION_HOURS};

/// Where activity and profiles are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local maps (development and tests)
    Memory,
    /// Firestore in the given GCP project
    Firestore { project_id: String },
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Storage backend
    pub storage: StorageBackend,
    /// Default sweep threshold
    pub activity_retention_hours: u32,
    /// Run the sweep in-process at this interval; `None` leaves it to an
    /// external scheduler calling `/tasks/cleanup-activities`
    pub cleanup_interval_minutes: Option<u64>,

    // --- Secrets ---
    /// JWT signing key shared with the identity provider (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Bearer token for maintenance routes; routes are disabled when unset
    pub maintenance_token: Option<String>,
}

impl Config {
    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            activity_retention_hours: DEFAULT_RETENTION_HOURS,
            cleanup_interval_minutes: None,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            maintenance_token: Some("test_maintenance_token".to_string()),
        }
    }

    /// In-process sweep interval, if one is configured.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        self.cleanup_interval_minutes.and_then(interval_from_minutes)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "firestore" => StorageBackend::Firestore {
                project_id: env::var("GCP_PROJECT_ID")
                    .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let activity_retention_hours: u32 =
            parse_or("ACTIVITY_RETENTION_HOURS", DEFAULT_RETENTION_HOURS)?;
        if retention_cutoff(Utc::now(), activity_retention_hours).is_err() {
            return Err(ConfigError::Invalid {
                name: "ACTIVITY_RETENTION_HOURS",
                value: activity_retention_hours.to_string(),
            });
        }

        let cleanup_interval_minutes: Option<u64> = parse_optional("CLEANUP_INTERVAL_MINUTES")?;
        if let Some(minutes) = cleanup_interval_minutes {
            if interval_from_minutes(minutes).is_none() {
                return Err(ConfigError::Invalid {
                    name: "CLEANUP_INTERVAL_MINUTES",
                    value: minutes.to_string(),
                });
            }
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("PORT", 8080)?,
            storage,
            activity_retention_hours,
            cleanup_interval_minutes,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            maintenance_token: env::var("MAINTENANCE_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Non-zero interval in minutes; `None` for zero or on overflow.
fn interval_from_minutes(minutes: u64) -> Option<Duration> {
    minutes
        .checked_mul(60)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn parse_optional<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                value: raw.clone(),
            }),
        Err(_) => Ok(None),
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_optional(name)?.unwrap_or(default))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
