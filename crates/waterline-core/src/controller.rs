// ── Monitor lifecycle ──
//
// Owns the feed client and the reading store. Handles the periodic refresh
// task, the single in-flight fetch guarantee, and feed status reporting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use waterline_api::transport::{TlsMode, TransportConfig};
use waterline_api::FeedClient;

use crate::config::{MonitorConfig, TlsVerification};
use crate::convert;
use crate::error::CoreError;
use crate::model::SensorReading;
use crate::store::ReadingStore;
use crate::stream::ReadingStream;

// ── FeedStatus ───────────────────────────────────────────────────

/// Feed health observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing fetched yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Ready,
    /// The last fetch failed; older data is still being served.
    Degraded { error: String },
    /// Fetching failed and there is no data to fall back on.
    Failed { error: String },
}

impl FeedStatus {
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Degraded { error } | Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// What a call to [`Monitor::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The feed answered; `count` readings survived normalization.
    Refreshed { count: usize },
    /// Another fetch was already in flight.
    Skipped,
    /// The monitor was stopped before the response arrived.
    Cancelled,
}

// ── Monitor ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MonitorInner>`.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    client: FeedClient,
    store: Arc<ReadingStore>,
    status: watch::Sender<FeedStatus>,
    in_flight: AtomicBool,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Build a monitor. Does not fetch; call [`refresh()`](Self::refresh)
    /// or [`start()`](Self::start).
    pub fn new(config: MonitorConfig) -> Result<Self, CoreError> {
        let client = FeedClient::new(config.endpoint.clone(), &build_transport(&config))?;
        Ok(Self::with_client(config, client))
    }

    /// Build a monitor around an existing feed client.
    pub fn with_client(config: MonitorConfig, client: FeedClient) -> Self {
        let (status, _) = watch::channel(FeedStatus::Idle);
        Self {
            inner: Arc::new(MonitorInner {
                config,
                client,
                store: Arc::new(ReadingStore::new()),
                status,
                in_flight: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<ReadingStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the periodic refresh task. Its first tick fires immediately and
    /// performs the initial load. A zero refresh interval spawns nothing.
    pub async fn start(&self) {
        let period = self.inner.config.refresh_interval;
        if period.is_zero() {
            debug!("refresh interval is zero; background refresh disabled");
            return;
        }
        let monitor = self.clone();
        let cancel = self.inner.cancel.clone();
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(refresh_task(monitor, period, cancel)));
        info!(period_secs = period.as_secs(), "monitor started");
    }

    /// Cancel the refresh task and any in-flight fetch, then wait for the
    /// task to exit. Responses arriving afterwards are discarded.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("monitor stopped");
    }

    /// Build a monitor, load the feed once, run `f`, and stop.
    pub async fn oneshot<F, Fut, T>(config: MonitorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Monitor) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval = Duration::ZERO;

        let monitor = Monitor::new(cfg)?;
        monitor.refresh().await?;
        let result = f(monitor.clone()).await;
        monitor.stop().await;
        result
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch the feed once and swap in the result.
    ///
    /// Returns `Skipped` without fetching when another refresh is in flight.
    /// On failure the previous dataset stays in place.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        let Some(_guard) = InFlightGuard::acquire(&self.inner.in_flight) else {
            debug!("refresh already in flight; skipping");
            return Ok(RefreshOutcome::Skipped);
        };
        if self.inner.cancel.is_cancelled() {
            return Ok(RefreshOutcome::Cancelled);
        }

        let previous = self.inner.status.send_replace(FeedStatus::Loading);

        let fetched = tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => {
                debug!("refresh cancelled mid-flight");
                let _ = self.inner.status.send_replace(previous);
                return Ok(RefreshOutcome::Cancelled);
            }
            res = self.inner.client.fetch() => res,
        };

        match fetched {
            Ok(payload) => {
                let readings = convert::normalize_payload(payload, &Local);
                let count = readings.len();
                if !self.inner.store.replace(readings) {
                    warn!("feed returned no readings; keeping previous dataset");
                }
                let _ = self.inner.status.send_replace(FeedStatus::Ready);
                debug!(count, "refresh complete");
                Ok(RefreshOutcome::Refreshed { count })
            }
            Err(e) => {
                let err = CoreError::from(e);
                let error = err.to_string();
                let status = if self.inner.store.is_empty() {
                    FeedStatus::Failed { error }
                } else {
                    FeedStatus::Degraded { error }
                };
                let _ = self.inner.status.send_replace(status);
                Err(err)
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to feed status changes.
    pub fn status(&self) -> watch::Receiver<FeedStatus> {
        self.inner.status.subscribe()
    }

    pub fn current_status(&self) -> FeedStatus {
        self.inner.status.borrow().clone()
    }

    /// Whether a fetch is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    // ── Data access ──────────────────────────────────────────────

    pub fn readings(&self) -> Arc<Vec<SensorReading>> {
        self.inner.store.snapshot()
    }

    pub fn latest(&self) -> Option<SensorReading> {
        self.inner.store.latest()
    }

    pub fn subscribe(&self) -> ReadingStream {
        self.inner.store.subscribe()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.store.last_refresh()
    }
}

// ── In-flight guard ──────────────────────────────────────────────

/// Holds the in-flight flag for the duration of one fetch.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh the feed until cancelled.
async fn refresh_task(monitor: Monitor, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match monitor.refresh().await {
                    Ok(RefreshOutcome::Refreshed { count }) => debug!(count, "periodic refresh"),
                    Ok(RefreshOutcome::Skipped) => debug!("periodic refresh skipped; fetch in flight"),
                    Ok(RefreshOutcome::Cancelled) => break,
                    Err(e) => warn!(error = %e, "periodic refresh failed"),
                }
            }
        }
    }
}

/// Build a [`TransportConfig`] from the monitor configuration.
fn build_transport(config: &MonitorConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let first = InFlightGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(first);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn status_error_text() {
        let status = FeedStatus::Degraded {
            error: "boom".into(),
        };
        assert_eq!(status.error(), Some("boom"));
        assert_eq!(FeedStatus::Ready.error(), None);
    }
}
