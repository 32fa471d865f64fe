//! Core data types for the crypto price monitor.

pub mod alert;
pub mod asset;
pub mod format;
pub mod notification;
pub mod price;

pub use alert::*;
pub use asset::*;
pub use format::*;
pub use notification::*;
pub use price::*;
