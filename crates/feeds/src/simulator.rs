//! Simulated price source for demo mode.
//!
//! Starts from the seed snapshot and applies a small random walk on every fetch.

use crate::error::FeedError;
use crate::fallback;
use crate::source::PriceSource;
use async_trait::async_trait;
use cryptowatch_core::PriceRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;

/// Maximum relative price move per fetch (±2%).
const MAX_PRICE_STEP: f64 = 0.02;
/// Maximum drift of the 24h change per fetch (±0.25 points).
const MAX_CHANGE_STEP: f64 = 0.25;

struct SimState {
    prices: HashMap<String, PriceRecord>,
    rng: StdRng,
}

/// Price source that random-walks the seed prices.
pub struct SimulatedSource {
    state: Mutex<SimState>,
}

impl SimulatedSource {
    /// Create a simulator seeded from entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a deterministic simulator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let prices = fallback::seed_prices()
            .into_iter()
            .map(|r| (r.asset_id.clone(), r))
            .collect();
        Self {
            state: Mutex::new(SimState { prices, rng }),
        }
    }

    /// Advance every requested asset by one step and return the new records.
    /// Assets the simulator has no seed for are omitted.
    fn advance(&self, asset_ids: &[String]) -> Vec<PriceRecord> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let SimState { prices, rng } = &mut *state;

        asset_ids
            .iter()
            .filter_map(|id| {
                let record = prices.get_mut(id)?;
                let step = rng.gen_range(-MAX_PRICE_STEP..=MAX_PRICE_STEP);
                let drift = rng.gen_range(-MAX_CHANGE_STEP..=MAX_CHANGE_STEP);
                *record = record.with_price(
                    record.price * (1.0 + step),
                    record.change_24h_percent + drift,
                );
                Some(record.clone())
            })
            .collect()
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for SimulatedSource {
    async fn fetch_prices(&self, asset_ids: &[String]) -> Result<Vec<PriceRecord>, FeedError> {
        Ok(self.advance(asset_ids))
    }

    fn name(&self) -> &'static str {
        "simulator"
    }
}
