//! Data bridge: feeds [`Monitor`] output into the action loop.
//!
//! Starts the monitor's periodic refresh, pushes the current dataset and
//! status, then forwards every change as an [`Action`] until cancelled.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use waterline_core::{FeedStatus, Monitor};

use crate::action::Action;

pub async fn spawn_data_bridge(
    monitor: Monitor,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut readings = monitor.subscribe();
    let mut status = monitor.status();

    let initial = readings.current().clone();
    if !initial.is_empty() {
        let _ = action_tx.send(Action::ReadingsUpdated(initial));
    }
    let _ = action_tx.send(Action::FeedStatusChanged(
        status.borrow_and_update().clone(),
    ));

    // First tick fires immediately and performs the initial load.
    monitor.start().await;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = readings.changed() => {
                debug!(count = snapshot.len(), "dispatching ReadingsUpdated");
                let _ = action_tx.send(Action::ReadingsUpdated(snapshot));
            }
            Ok(()) = status.changed() => {
                let current = status.borrow_and_update().clone();
                log_status(&current);
                let _ = action_tx.send(Action::FeedStatusChanged(current));
            }
        }
    }

    monitor.stop().await;
    info!("data bridge stopped");
}

fn log_status(status: &FeedStatus) {
    match status {
        FeedStatus::Degraded { error } => warn!(%error, "refresh failed; serving stale data"),
        FeedStatus::Failed { error } => warn!(%error, "refresh failed with nothing loaded"),
        FeedStatus::Idle | FeedStatus::Loading | FeedStatus::Ready => {
            debug!(?status, "feed status changed");
        }
    }
}
