//! In-memory registry of active alert rules.

use crate::error::ValidationError;
use crate::request::{AlertRequest, NewAlert};
use cryptowatch_core::AlertRule;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Thread-safe set of active alert rules, kept in insertion order.
///
/// Each operation takes the lock exactly once, so add/remove are atomic with
/// respect to snapshots taken by an evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct AlertRegistry {
    rules: Arc<RwLock<Vec<AlertRule>>>,
}

impl AlertRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a raw request and register it.
    pub fn create(&self, request: &AlertRequest) -> Result<AlertRule, ValidationError> {
        let alert = request.validate()?;
        Ok(self.add(alert))
    }

    /// Register a validated alert, assigning a fresh id and creation time.
    pub fn add(&self, alert: NewAlert) -> AlertRule {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());

        let id = loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if !rules.iter().any(|r| r.id == candidate) {
                break candidate;
            }
        };

        let rule = AlertRule {
            id,
            asset_id: alert.asset_id,
            condition: alert.condition,
            threshold_price: alert.threshold_price,
            created_at: chrono::Utc::now(),
        };
        rules.push(rule.clone());

        info!(
            id = %rule.id,
            asset = %rule.asset_id,
            condition = %rule.condition,
            threshold = rule.threshold_price,
            "Alert added"
        );
        rule
    }

    /// Remove a rule by id. Returns false if no such rule existed.
    pub fn remove(&self, id: &str) -> bool {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        match rules.iter().position(|r| r.id == id) {
            Some(idx) => {
                rules.remove(idx);
                info!(id = id, "Alert removed");
                true
            }
            None => {
                debug!(id = id, "Alert not found, nothing removed");
                false
            }
        }
    }

    /// Point-in-time copy of all rules in insertion order.
    pub fn list(&self) -> Vec<AlertRule> {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn get(&self, id: &str) -> Option<AlertRule> {
        self.rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptowatch_core::AlertCondition;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn new_alert(asset: &str, threshold: f64) -> NewAlert {
        NewAlert::new(asset, AlertCondition::Above, threshold).unwrap()
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let registry = AlertRegistry::new();
        let ids: HashSet<String> = (0..200)
            .map(|i| registry.add(new_alert("bitcoin", 1.0 + i as f64)).id)
            .collect();
        assert_eq!(ids.len(), 200);
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn test_add_copies_fields() {
        let registry = AlertRegistry::new();
        let rule = registry.add(new_alert("ethereum", 3000.0));
        assert_eq!(rule.asset_id, "ethereum");
        assert_eq!(rule.condition, AlertCondition::Above);
        assert_eq!(rule.threshold_price, 3000.0);
        assert_eq!(registry.get(&rule.id), Some(rule));
    }

    #[test]
    fn test_list_in_insertion_order() {
        let registry = AlertRegistry::new();
        let a = registry.add(new_alert("solana", 1.0));
        let b = registry.add(new_alert("bitcoin", 2.0));
        let c = registry.add(new_alert("cardano", 3.0));

        let ids: Vec<String> = registry.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_remove_existing() {
        let registry = AlertRegistry::new();
        let rule = registry.add(new_alert("bitcoin", 1.0));
        assert!(registry.remove(&rule.id));
        assert!(registry.get(&rule.id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_nonexistent_is_noop() {
        let registry = AlertRegistry::new();
        let rule = registry.add(new_alert("bitcoin", 1.0));
        let before = registry.list();

        assert!(!registry.remove("does-not-exist"));
        assert_eq!(registry.list(), before);
        assert!(registry.get(&rule.id).is_some());
    }

    #[test]
    fn test_create_rejects_invalid_without_storing() {
        let registry = AlertRegistry::new();
        let request = AlertRequest::new("bitcoin", AlertCondition::Above, "-1");
        assert!(registry.create(&request).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_accepts_unknown_asset() {
        let registry = AlertRegistry::new();
        let request = AlertRequest::new("notacoin", AlertCondition::Below, "5");
        let rule = registry.create(&request).unwrap();
        assert_eq!(rule.asset_id, "notacoin");
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let registry = AlertRegistry::new();
        registry.add(new_alert("bitcoin", 1.0));
        let snapshot = registry.list();
        registry.add(new_alert("ethereum", 2.0));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}
