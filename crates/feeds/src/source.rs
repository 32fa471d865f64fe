//! Price source abstraction.

use crate::error::FeedError;
use crate::fallback;
use async_trait::async_trait;
use cryptowatch_core::PriceRecord;

/// A provider of current prices for a set of asset identifiers.
///
/// `fetch_prices` never substitutes fallback data on its own; callers decide
/// when to use [`PriceSource::fallback_prices`].
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch current prices for exactly the requested assets, in request order.
    async fn fetch_prices(&self, asset_ids: &[String]) -> Result<Vec<PriceRecord>, FeedError>;

    /// Static snapshot used when the provider is unreachable.
    fn fallback_prices(&self, asset_ids: &[String]) -> Vec<PriceRecord> {
        fallback::fallback_prices(asset_ids)
    }

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Remove duplicate identifiers, keeping the first occurrence.
pub fn dedup_asset_ids(asset_ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    asset_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_asset_ids_keeps_order() {
        let ids = vec![
            "ethereum".to_string(),
            "bitcoin".to_string(),
            "ethereum".to_string(),
        ];
        assert_eq!(dedup_asset_ids(&ids), vec!["ethereum", "bitcoin"]);
    }
}
