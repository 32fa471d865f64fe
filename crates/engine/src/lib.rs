//! Refresh and evaluation engine for the crypto price monitor.
//!
//! - `evaluator` - pure matching of alert rules against a price snapshot
//! - `scheduler` - periodic and manual refresh with a single in-flight fetch
//! - `monitor` - session facade used by the server

pub mod evaluator;
pub mod monitor;
pub mod scheduler;

pub use evaluator::evaluate;
pub use monitor::*;
pub use scheduler::*;
