//! Monitoring session facade.
//!
//! Wires the price store, alert registry, notifier and refresh scheduler
//! together and exposes the operations a presentation layer needs.

use crate::scheduler::{RefreshOutcome, RefreshScheduler, SchedulerConfig, StatsSummary};
use cryptowatch_alerts::{
    created_notification, deleted_notification, validation_notification, AlertRegistry,
    AlertRequest, Notifier, ValidationError,
};
use cryptowatch_core::{AlertRule, Notification, PriceRecord};
use cryptowatch_feeds::{PriceSource, PriceStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default capacity of the notification channel.
pub const DEFAULT_NOTIFICATION_BUFFER: usize = 256;

/// A price monitoring session.
#[derive(Debug, Clone)]
pub struct PriceMonitor {
    store: PriceStore,
    registry: AlertRegistry,
    notifier: Notifier,
    scheduler: RefreshScheduler,
}

impl PriceMonitor {
    pub fn new(
        source: Arc<dyn PriceSource>,
        config: SchedulerConfig,
        notification_buffer: usize,
    ) -> Self {
        let store = PriceStore::new();
        let registry = AlertRegistry::new();
        let notifier = Notifier::new(registry.clone(), notification_buffer);
        let scheduler = RefreshScheduler::new(source, store.clone(), notifier.clone(), config);
        Self {
            store,
            registry,
            notifier,
            scheduler,
        }
    }

    /// Validate and register an alert, reporting the result as a notification.
    pub fn create_alert(&self, request: &AlertRequest) -> Result<AlertRule, ValidationError> {
        match self.registry.create(request) {
            Ok(rule) => {
                self.notifier.notify(created_notification(&rule));
                Ok(rule)
            }
            Err(e) => {
                debug!(field = e.field(), error = %e, "Rejected alert request");
                self.notifier.notify(validation_notification(&e));
                Err(e)
            }
        }
    }

    /// Remove an alert. Unknown ids are a silent no-op.
    pub fn delete_alert(&self, id: &str) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            self.notifier.notify(deleted_notification());
        }
        removed
    }

    pub fn prices(&self) -> Vec<PriceRecord> {
        self.store.snapshot()
    }

    pub fn alerts(&self) -> Vec<AlertRule> {
        self.registry.list()
    }

    pub fn alert(&self, id: &str) -> Option<AlertRule> {
        self.registry.get(id)
    }

    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.scheduler.refresh_now().await
    }

    pub fn is_refreshing(&self) -> bool {
        self.scheduler.is_refreshing()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn stats(&self) -> StatsSummary {
        self.scheduler.stats()
    }

    /// Start the recurring refresh task.
    pub fn start(&self) -> JoinHandle<()> {
        self.scheduler.spawn()
    }

    /// Cancel the recurring refresh task.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    pub fn registry(&self) -> &AlertRegistry {
        &self.registry
    }
}
