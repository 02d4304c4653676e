//! Background tasks for the Callweave server.
//!
//! Includes:
//! - Sweeping idle call contexts out of the registry.

use crate::AppState;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Starts the call-context expiry task.
///
/// This task runs indefinitely, periodically removing contexts that have
/// been idle longer than `ttl_seconds`. It is the backstop for calls that
/// never report completion through the teardown endpoint.
pub async fn start_context_expiry_task(state: Arc<AppState>, ttl_seconds: u64) {
    if ttl_seconds == 0 {
        tracing::warn!("context expiry task disabled (ttl=0)");
        return;
    }

    // Run check every 60 seconds or ttl/2, whichever is smaller (but min 1s)
    let interval_seconds = (ttl_seconds / 2).clamp(1, 60);
    let interval = Duration::from_secs(interval_seconds);

    tracing::info!(
        ttl_seconds,
        interval_seconds,
        "starting call context expiry task"
    );

    loop {
        sleep(interval).await;
        let swept = state
            .registry
            .sweep_expired(std::time::Duration::from_secs(ttl_seconds));
        if swept == 0 {
            tracing::debug!("no idle call contexts to expire");
        }
    }
}
