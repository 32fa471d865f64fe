//! Refresh scheduler.
//!
//! Drives periodic and on-demand price refreshes. Each refresh fetches from the
//! price source, replaces the price store, evaluates every alert against the new
//! snapshot and hands triggered alerts to the notifier.

use crate::evaluator::evaluate;
use cryptowatch_alerts::{AlertRegistry, Notifier};
use cryptowatch_core::{Notification, PriceRecord, DEFAULT_ASSETS};
use cryptowatch_feeds::{dedup_asset_ids, PriceSource, PriceStore};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Default refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between scheduled refreshes.
    pub interval: Duration,
    /// Assets to fetch on every refresh.
    pub asset_ids: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            asset_ids: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Result of one refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Fresh prices were stored.
    Updated,
    /// Fetch failed with an empty store; fallback prices were stored.
    FallbackApplied,
    /// Fetch failed; previous prices were kept.
    Retained,
    /// Another refresh was already in flight.
    Skipped,
    /// The scheduler was shut down before the fetch completed.
    Discarded,
}

impl RefreshOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RefreshOutcome::Updated => "updated",
            RefreshOutcome::FallbackApplied => "fallback_applied",
            RefreshOutcome::Retained => "retained",
            RefreshOutcome::Skipped => "skipped",
            RefreshOutcome::Discarded => "discarded",
        }
    }
}

/// Refresh counters.
#[derive(Debug, Default)]
pub struct RefreshStats {
    /// Refreshes that ran to completion (success or failure).
    pub refreshes: AtomicU64,
    /// Fetches that returned an error.
    pub failures: AtomicU64,
    /// Times fallback prices were substituted.
    pub fallbacks: AtomicU64,
    /// Triggers ignored because a refresh was in flight.
    pub skipped: AtomicU64,
    /// Alerts triggered and pruned.
    pub triggered: AtomicU64,
}

/// Point-in-time copy of the scheduler state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub in_flight: bool,
    pub last_outcome: Option<RefreshOutcome>,
    pub refreshes: u64,
    pub failures: u64,
    pub fallbacks: u64,
    pub skipped: u64,
    pub triggered: u64,
    pub notifications: u64,
    /// Time of the last price store update in milliseconds since the epoch; 0 if never.
    pub last_updated_ms: u64,
}

/// Clears the in-flight flag when dropped, including on cancellation.
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

struct Inner {
    source: Arc<dyn PriceSource>,
    store: PriceStore,
    registry: AlertRegistry,
    notifier: Notifier,
    interval: Duration,
    asset_ids: Vec<String>,
    in_flight: AtomicBool,
    stats: RefreshStats,
    last_outcome: Mutex<Option<RefreshOutcome>>,
    shutdown_tx: watch::Sender<bool>,
}

/// Owns the recurring refresh task and the in-flight flag.
///
/// At most one fetch runs at a time; triggers arriving while one is in flight
/// are dropped with [`RefreshOutcome::Skipped`].
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<Inner>,
}

impl RefreshScheduler {
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: PriceStore,
        notifier: Notifier,
        config: SchedulerConfig,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let registry = notifier.registry().clone();
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                registry,
                notifier,
                interval: config.interval.max(Duration::from_millis(1)),
                asset_ids: dedup_asset_ids(&config.asset_ids),
                in_flight: AtomicBool::new(false),
                stats: RefreshStats::default(),
                last_outcome: Mutex::new(None),
                shutdown_tx,
            }),
        }
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown_tx.borrow()
    }

    pub fn asset_ids(&self) -> &[String] {
        &self.inner.asset_ids
    }

    /// Run one refresh now unless one is already in flight.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let inner = &self.inner;

        if self.is_shut_down() {
            return RefreshOutcome::Discarded;
        }

        let Some(_guard) = InFlightGuard::acquire(&inner.in_flight) else {
            inner.stats.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("Refresh already in flight, skipping trigger");
            return RefreshOutcome::Skipped;
        };

        let result = inner.source.fetch_prices(&inner.asset_ids).await;

        if self.is_shut_down() {
            debug!("Scheduler shut down during fetch, discarding result");
            return RefreshOutcome::Discarded;
        }

        let outcome = match result {
            Ok(records) => {
                debug!(
                    source = inner.source.name(),
                    count = records.len(),
                    "Prices refreshed"
                );
                self.apply(records);
                RefreshOutcome::Updated
            }
            Err(e) => {
                inner.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    source = inner.source.name(),
                    transient = e.is_transient(),
                    error = %e,
                    "Failed to fetch prices"
                );

                if inner.store.is_empty() {
                    let fallback = inner.source.fallback_prices(&inner.asset_ids);
                    info!(count = fallback.len(), "Using fallback prices");
                    inner.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                    inner.notifier.notify(Notification::warning(
                        "Price Refresh Failed",
                        format!("{}. Showing fallback prices.", e),
                    ));
                    self.apply(fallback);
                    RefreshOutcome::FallbackApplied
                } else {
                    inner.notifier.notify(Notification::warning(
                        "Price Refresh Failed",
                        format!("{}. Showing previous prices.", e),
                    ));
                    RefreshOutcome::Retained
                }
            }
        };

        inner.stats.refreshes.fetch_add(1, Ordering::Relaxed);
        *inner.last_outcome.lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome);
        outcome
    }

    /// Replace the store, then evaluate and prune against the new snapshot.
    fn apply(&self, records: Vec<PriceRecord>) {
        let inner = &self.inner;
        let version = inner.store.replace(records);

        let rules = inner.registry.list();
        let prices = inner.store.price_map();
        let triggered = evaluate(&rules, &prices);
        let pruned = inner.notifier.process(&triggered);

        inner
            .stats
            .triggered
            .fetch_add(pruned as u64, Ordering::Relaxed);
        debug!(
            version = version,
            rules = rules.len(),
            triggered = triggered.len(),
            "Alerts evaluated"
        );
    }

    /// Refresh immediately, then every interval until shut down.
    pub async fn run(&self) {
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        if *shutdown_rx.borrow() {
            return;
        }

        info!(
            interval_secs = self.inner.interval.as_secs_f64(),
            assets = self.inner.asset_ids.len(),
            source = self.inner.source.name(),
            "Starting refresh scheduler"
        );

        let mut ticker = tokio::time::interval(self.inner.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.refresh_now().await;
                    debug!(outcome = outcome.as_str(), "Scheduled refresh finished");
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
            if self.is_shut_down() {
                break;
            }
        }

        info!("Refresh scheduler stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move { scheduler.run().await })
    }

    /// Stop the recurring trigger. An in-flight fetch completes but its result is discarded.
    pub fn shutdown(&self) {
        self.inner.shutdown_tx.send_replace(true);
    }

    pub fn stats(&self) -> StatsSummary {
        let stats = &self.inner.stats;
        StatsSummary {
            in_flight: self.is_refreshing(),
            last_outcome: *self
                .inner
                .last_outcome
                .lock()
                .unwrap_or_else(|e| e.into_inner()),
            refreshes: stats.refreshes.load(Ordering::Relaxed),
            failures: stats.failures.load(Ordering::Relaxed),
            fallbacks: stats.fallbacks.load(Ordering::Relaxed),
            skipped: stats.skipped.load(Ordering::Relaxed),
            triggered: stats.triggered.load(Ordering::Relaxed),
            notifications: self.inner.notifier.emitted(),
            last_updated_ms: self.inner.store.updated_at_ms(),
        }
    }
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("source", &self.inner.source.name())
            .field("interval", &self.inner.interval)
            .field("asset_ids", &self.inner.asset_ids)
            .field("in_flight", &self.is_refreshing())
            .finish()
    }
}
