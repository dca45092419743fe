// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic in-process sweep of expired activity.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::services::ActivityService;

/// Run `sweep_expired` with the default threshold every `interval`.
///
/// Failures are logged and retried on the next tick. A zero interval is
/// refused and the task exits immediately.
pub fn spawn_periodic_sweep(service: ActivityService, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if interval.is_zero() {
            tracing::error!("Periodic activity sweep needs a non-zero interval; not started");
            return;
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = service.sweep_expired(None).await {
                tracing::warn!(error = %e, "Periodic activity sweep failed");
            }
        }
    })
}
