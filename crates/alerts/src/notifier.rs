//! Notification delivery and pruning of triggered alerts.

use crate::error::ValidationError;
use crate::registry::AlertRegistry;
use cryptowatch_core::{format_usd, AlertRule, Notification, TriggeredAlert};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Broadcast channel sender for notifications.
pub type NotificationSender = broadcast::Sender<Notification>;

/// Title of trigger notifications.
pub const TRIGGER_TITLE: &str = "Price Alert Triggered!";

/// Emits notifications and removes triggered rules from the registry.
///
/// Delivery is best-effort: with no subscriber attached the event is dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    registry: AlertRegistry,
    tx: NotificationSender,
    emitted: Arc<AtomicU64>,
}

impl Notifier {
    /// Create a notifier with its own broadcast channel.
    pub fn new(registry: AlertRegistry, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self::with_sender(registry, tx)
    }

    /// Create a notifier publishing on an existing channel.
    pub fn with_sender(registry: AlertRegistry, tx: NotificationSender) -> Self {
        Self {
            registry,
            tx,
            emitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to the notification stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Emit a notification. Returns whether any subscriber received it.
    pub fn notify(&self, notification: Notification) -> bool {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        match self.tx.send(notification) {
            Ok(receivers) => {
                debug!(receivers = receivers, "Notification sent");
                true
            }
            Err(_) => {
                debug!("Notification dropped: no listeners");
                false
            }
        }
    }

    /// For each triggered alert, in order: notify, then remove the rule.
    /// Returns the number of rules removed by this call.
    pub fn process(&self, triggered: &[TriggeredAlert]) -> usize {
        let mut removed = 0;
        for hit in triggered {
            info!(
                id = %hit.rule.id,
                asset = %hit.rule.asset_id,
                condition = %hit.rule.condition,
                threshold = hit.rule.threshold_price,
                price = hit.price.price,
                "Alert triggered"
            );
            self.notify(trigger_notification(hit));
            if self.registry.remove(&hit.rule.id) {
                removed += 1;
            }
        }
        removed
    }

    /// Total notifications emitted, delivered or not.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn registry(&self) -> &AlertRegistry {
        &self.registry
    }
}

/// Message body for a triggered alert.
pub fn format_trigger_message(hit: &TriggeredAlert) -> String {
    format!(
        "{} is {} ${}. Current price: ${}",
        hit.price.display_name,
        hit.rule.condition,
        format_usd(hit.rule.threshold_price),
        format_usd(hit.price.price)
    )
}

pub fn trigger_notification(hit: &TriggeredAlert) -> Notification {
    Notification::warning(TRIGGER_TITLE, format_trigger_message(hit))
}

pub fn created_notification(rule: &AlertRule) -> Notification {
    Notification::success(
        "Alert Created",
        format!(
            "Alert set for {} {} ${}",
            rule.asset_id,
            rule.condition,
            format_usd(rule.threshold_price)
        ),
    )
}

pub fn deleted_notification() -> Notification {
    Notification::info("Alert Deleted", "Price alert has been removed")
}

pub fn validation_notification(err: &ValidationError) -> Notification {
    let message = match err {
        ValidationError::MissingAssetId
        | ValidationError::MissingCondition
        | ValidationError::MissingThreshold => "Please fill in all fields",
        ValidationError::InvalidCondition(_) => "Please choose above or below",
        ValidationError::InvalidThreshold(_) | ValidationError::NonPositiveThreshold(_) => {
            "Please enter a valid price"
        }
    };
    Notification::error(err.title(), message)
}
