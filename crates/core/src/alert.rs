//! Alert rule definitions.

use crate::PriceRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction in which a price must cross the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    /// Check whether `price` satisfies this condition. Inclusive at the boundary.
    #[inline]
    pub fn is_met(self, price: f64, threshold: f64) -> bool {
        match self {
            AlertCondition::Above => price >= threshold,
            AlertCondition::Below => price <= threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            other => Err(format!("unknown alert condition: {}", other)),
        }
    }
}

/// A registered price alert. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Opaque identifier, unique within the registry
    pub id: String,
    /// Asset the rule watches; may reference an asset with no current price
    pub asset_id: String,
    pub condition: AlertCondition,
    /// Threshold in USD (> 0)
    pub threshold_price: f64,
    pub created_at: DateTime<Utc>,
}

impl AlertRule {
    /// Check whether the given price record satisfies this rule.
    pub fn is_triggered_by(&self, price: &PriceRecord) -> bool {
        self.asset_id == price.asset_id && self.condition.is_met(price.price, self.threshold_price)
    }
}

/// A rule whose condition was satisfied, paired with the price that satisfied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    pub rule: AlertRule,
    pub price: PriceRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(condition: AlertCondition, threshold: f64) -> AlertRule {
        AlertRule {
            id: "r1".to_string(),
            asset_id: "bitcoin".to_string(),
            condition,
            threshold_price: threshold,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_condition_inclusive_boundary() {
        assert!(AlertCondition::Above.is_met(100.0, 100.0));
        assert!(AlertCondition::Below.is_met(100.0, 100.0));
        assert!(!AlertCondition::Above.is_met(99.99, 100.0));
        assert!(!AlertCondition::Below.is_met(100.01, 100.0));
    }

    #[test]
    fn test_condition_nan_never_met() {
        assert!(!AlertCondition::Above.is_met(f64::NAN, 100.0));
        assert!(!AlertCondition::Below.is_met(f64::NAN, 100.0));
    }

    #[test]
    fn test_condition_parse() {
        assert_eq!("above".parse::<AlertCondition>(), Ok(AlertCondition::Above));
        assert_eq!(" BELOW ".parse::<AlertCondition>(), Ok(AlertCondition::Below));
        assert!("sideways".parse::<AlertCondition>().is_err());
    }

    #[test]
    fn test_condition_serde_lowercase() {
        let json = serde_json::to_string(&AlertCondition::Above).unwrap();
        assert_eq!(json, "\"above\"");
        let parsed: AlertCondition = serde_json::from_str("\"below\"").unwrap();
        assert_eq!(parsed, AlertCondition::Below);
    }

    #[test]
    fn test_rule_triggered_by_matching_asset_only() {
        let r = rule(AlertCondition::Above, 70000.0);
        let btc = PriceRecord::from_quote("bitcoin", 71000.0, 0.0);
        let eth = PriceRecord::from_quote("ethereum", 71000.0, 0.0);
        assert!(r.is_triggered_by(&btc));
        assert!(!r.is_triggered_by(&eth));
    }
}
