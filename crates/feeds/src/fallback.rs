//! Static fallback snapshot for when the provider is unreachable.

use cryptowatch_core::PriceRecord;

/// Seed values: (asset_id, price_usd, change_24h_percent).
const SEED_PRICES: [(&str, f64, f64); 5] = [
    ("bitcoin", 67420.50, 2.45),
    ("ethereum", 2650.30, -1.23),
    ("cardano", 0.4567, 5.67),
    ("solana", 145.67, 3.21),
    ("polkadot", 6.78, -2.34),
];

/// All seed records in table order.
pub fn seed_prices() -> Vec<PriceRecord> {
    SEED_PRICES
        .iter()
        .map(|(id, price, change)| PriceRecord::from_quote(id, *price, *change))
        .collect()
}

/// Fallback records for the requested assets, in request order.
/// Assets without a seed value are omitted.
pub fn fallback_prices(asset_ids: &[String]) -> Vec<PriceRecord> {
    asset_ids
        .iter()
        .filter_map(|id| {
            SEED_PRICES
                .iter()
                .find(|(seed_id, _, _)| seed_id == id)
                .map(|(seed_id, price, change)| PriceRecord::from_quote(seed_id, *price, *change))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fallback_follows_request_order() {
        let ids = vec!["solana".to_string(), "bitcoin".to_string()];
        let records = fallback_prices(&ids);
        let got: Vec<&str> = records.iter().map(|r| r.asset_id.as_str()).collect();
        assert_eq!(got, vec!["solana", "bitcoin"]);
        assert_eq!(records[1].price, 67420.50);
        assert_eq!(records[1].display_name, "Bitcoin");
    }

    #[test]
    fn test_fallback_skips_unseeded_assets() {
        let ids = vec!["dogecoin".to_string(), "cardano".to_string()];
        let records = fallback_prices(&ids);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asset_id, "cardano");
    }

    #[test]
    fn test_seed_prices_complete() {
        assert_eq!(seed_prices().len(), 5);
    }
}
