//! Alert rules for the crypto price monitor.
//!
//! This crate provides:
//! - Validation of alert creation requests
//! - The in-memory alert registry
//! - The notifier that reports triggered alerts and prunes them

pub mod error;
pub mod notifier;
pub mod registry;
pub mod request;

pub use error::ValidationError;
pub use notifier::*;
pub use registry::AlertRegistry;
pub use request::{AlertRequest, NewAlert};
