//! Alert evaluation.
//!
//! Matches alert rules against the current price snapshot. Pure: no registry
//! mutation and no notifications happen here.

use cryptowatch_core::{AlertRule, PriceRecord, TriggeredAlert};
use std::collections::HashMap;

/// Return every rule satisfied by `prices`, in rule order.
///
/// Rules whose asset has no price record are dormant and skipped.
pub fn evaluate(rules: &[AlertRule], prices: &HashMap<String, PriceRecord>) -> Vec<TriggeredAlert> {
    rules
        .iter()
        .filter_map(|rule| {
            let price = prices.get(&rule.asset_id)?;
            rule.is_triggered_by(price).then(|| TriggeredAlert {
                rule: rule.clone(),
                price: price.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cryptowatch_core::AlertCondition;
    use pretty_assertions::assert_eq;

    fn rule(id: &str, asset: &str, condition: AlertCondition, threshold: f64) -> AlertRule {
        AlertRule {
            id: id.to_string(),
            asset_id: asset.to_string(),
            condition,
            threshold_price: threshold,
            created_at: Utc::now(),
        }
    }

    fn prices(quotes: &[(&str, f64)]) -> HashMap<String, PriceRecord> {
        quotes
            .iter()
            .map(|(id, p)| (id.to_string(), PriceRecord::from_quote(id, *p, 0.0)))
            .collect()
    }

    fn ids(triggered: &[TriggeredAlert]) -> Vec<&str> {
        triggered.iter().map(|t| t.rule.id.as_str()).collect()
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let rules = vec![
            rule("a", "bitcoin", AlertCondition::Above, 100.0),
            rule("b", "bitcoin", AlertCondition::Below, 100.0),
        ];
        let triggered = evaluate(&rules, &prices(&[("bitcoin", 100.0)]));
        assert_eq!(ids(&triggered), vec!["a", "b"]);
    }

    #[test]
    fn test_not_triggered() {
        let rules = vec![
            rule("a", "bitcoin", AlertCondition::Above, 70000.0),
            rule("b", "bitcoin", AlertCondition::Below, 60000.0),
        ];
        assert!(evaluate(&rules, &prices(&[("bitcoin", 69000.0)])).is_empty());
    }

    #[test]
    fn test_dormant_rule_skipped() {
        let rules = vec![
            rule("a", "notacoin", AlertCondition::Above, 1.0),
            rule("b", "ethereum", AlertCondition::Above, 1.0),
        ];
        let triggered = evaluate(&rules, &prices(&[("ethereum", 2650.3)]));
        assert_eq!(ids(&triggered), vec!["b"]);
    }

    #[test]
    fn test_order_follows_rules() {
        let rules = vec![
            rule("z", "solana", AlertCondition::Below, 200.0),
            rule("m", "bitcoin", AlertCondition::Above, 1.0),
            rule("a", "cardano", AlertCondition::Below, 1.0),
        ];
        let triggered = evaluate(
            &rules,
            &prices(&[("bitcoin", 67420.5), ("cardano", 0.4567), ("solana", 145.67)]),
        );
        assert_eq!(ids(&triggered), vec!["z", "m", "a"]);
    }

    #[test]
    fn test_triggered_carries_price() {
        let rules = vec![rule("a", "bitcoin", AlertCondition::Above, 70000.0)];
        let triggered = evaluate(&rules, &prices(&[("bitcoin", 71000.0)]));
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].price.price, 71000.0);
        assert_eq!(triggered[0].price.display_name, "Bitcoin");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(evaluate(&[], &prices(&[("bitcoin", 1.0)])).is_empty());
        let rules = vec![rule("a", "bitcoin", AlertCondition::Above, 1.0)];
        assert!(evaluate(&rules, &HashMap::new()).is_empty());
    }
}
