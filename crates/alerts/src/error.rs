//! Validation errors for alert creation.

use thiserror::Error;

/// Invalid user input to alert creation. No state changes when returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("asset_id must not be empty")]
    MissingAssetId,
    #[error("condition is required")]
    MissingCondition,
    #[error("condition must be \"above\" or \"below\", got {0:?}")]
    InvalidCondition(String),
    #[error("threshold_price is required")]
    MissingThreshold,
    #[error("threshold_price must be a number, got {0:?}")]
    InvalidThreshold(String),
    #[error("threshold_price must be a finite number greater than 0, got {0}")]
    NonPositiveThreshold(f64),
}

impl ValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingAssetId => "asset_id",
            ValidationError::MissingCondition | ValidationError::InvalidCondition(_) => "condition",
            ValidationError::MissingThreshold
            | ValidationError::InvalidThreshold(_)
            | ValidationError::NonPositiveThreshold(_) => "threshold_price",
        }
    }

    /// Short user-facing title.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingAssetId
            | ValidationError::MissingCondition
            | ValidationError::MissingThreshold => "Missing Information",
            ValidationError::InvalidCondition(_) => "Invalid Condition",
            ValidationError::InvalidThreshold(_) | ValidationError::NonPositiveThreshold(_) => {
                "Invalid Price"
            }
        }
    }
}
