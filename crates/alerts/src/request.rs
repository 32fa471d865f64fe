//! Alert creation requests and their validation.

use crate::error::ValidationError;
use cryptowatch_core::AlertCondition;
use serde::{Deserialize, Serialize};

/// Raw alert creation input as supplied by the UI.
///
/// Condition and threshold are kept as text so that parse failures are
/// reported against the field instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRequest {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub threshold_price: String,
}

impl AlertRequest {
    pub fn new(
        asset_id: impl Into<String>,
        condition: AlertCondition,
        threshold_price: impl Into<String>,
    ) -> Self {
        Self::from_text(asset_id, condition.as_str(), threshold_price)
    }

    /// Build a request from unvalidated text fields.
    pub fn from_text(
        asset_id: impl Into<String>,
        condition: impl Into<String>,
        threshold_price: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            condition: condition.into(),
            threshold_price: threshold_price.into(),
        }
    }

    /// Validate the request. Asset id must be non-empty, condition must be
    /// `above` or `below`, threshold must parse as a finite number greater than zero.
    pub fn validate(&self) -> Result<NewAlert, ValidationError> {
        let asset_id = self.asset_id.trim();
        if asset_id.is_empty() {
            return Err(ValidationError::MissingAssetId);
        }

        let condition_raw = self.condition.trim();
        if condition_raw.is_empty() {
            return Err(ValidationError::MissingCondition);
        }
        let condition = condition_raw
            .parse::<AlertCondition>()
            .map_err(|_| ValidationError::InvalidCondition(condition_raw.to_string()))?;

        let raw = self.threshold_price.trim();
        if raw.is_empty() {
            return Err(ValidationError::MissingThreshold);
        }
        let threshold = raw
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidThreshold(raw.to_string()))?;

        NewAlert::new(asset_id, condition, threshold)
    }
}

/// A validated alert, ready to be registered.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub(crate) asset_id: String,
    pub(crate) condition: AlertCondition,
    pub(crate) threshold_price: f64,
}

impl NewAlert {
    /// Validate already-numeric input.
    pub fn new(
        asset_id: impl Into<String>,
        condition: AlertCondition,
        threshold_price: f64,
    ) -> Result<Self, ValidationError> {
        let asset_id = asset_id.into().trim().to_string();
        if asset_id.is_empty() {
            return Err(ValidationError::MissingAssetId);
        }
        if !threshold_price.is_finite() || threshold_price <= 0.0 {
            return Err(ValidationError::NonPositiveThreshold(threshold_price));
        }
        Ok(Self {
            asset_id,
            condition,
            threshold_price,
        })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn condition(&self) -> AlertCondition {
        self.condition
    }

    pub fn threshold_price(&self) -> f64 {
        self.threshold_price
    }
}
