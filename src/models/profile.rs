// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Display metadata owned by the profile store.

use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// User profile stored in Firestore (`users/{user_id}`).
///
/// Only read here; registration and avatar uploads live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub nick: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub instagram_username: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
}
