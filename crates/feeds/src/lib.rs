//! Price collection for the crypto price monitor.
//!
//! ## Architecture
//!
//! - `source` - `PriceSource` trait implemented by every provider
//! - `rest` - CoinGecko `/simple/price` fetcher
//! - `simulator` - random-walk source for demo mode
//! - `fallback` - static seed snapshot used when the provider is unreachable
//! - `store` - `PriceStore`, the latest snapshot per asset

pub mod error;
pub mod fallback;
pub mod rest;
pub mod simulator;
pub mod source;
pub mod store;

pub use error::*;
pub use fallback::{fallback_prices, seed_prices};
pub use rest::*;
pub use simulator::*;
pub use source::*;
pub use store::*;
