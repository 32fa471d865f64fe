//! CoinGecko REST price fetcher.
//!
//! Queries `/simple/price` for USD price and 24h change of the requested
//! assets and maps the payload onto [`PriceRecord`]s.

use crate::error::FeedError;
use crate::source::{dedup_asset_ids, PriceSource};
use async_trait::async_trait;
use cryptowatch_core::PriceRecord;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Per-asset quote as returned by `/simple/price`.
#[derive(Debug, Deserialize)]
struct SimplePriceQuote {
    #[serde(default)]
    usd: Option<f64>,
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

/// CoinGecko REST API price fetcher.
#[derive(Debug, Clone)]
pub struct CoinGeckoFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoFetcher {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";

    /// Create a fetcher against `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("cryptowatch")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn price_url(&self) -> String {
        format!("{}/simple/price", self.base_url.trim_end_matches('/'))
    }

    /// Fetch USD prices and 24h change for the given assets.
    pub async fn fetch_prices(&self, asset_ids: &[String]) -> Result<Vec<PriceRecord>, FeedError> {
        let ids = dedup_asset_ids(asset_ids);
        if ids.is_empty() {
            debug!("CoinGecko: No assets to fetch");
            return Ok(Vec::new());
        }
        let ids_param = ids.join(",");
        debug!("CoinGecko: Fetching prices for {}", ids_param);

        let response = self
            .client
            .get(self.price_url())
            .query(&[
                ("ids", ids_param.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let records = parse_simple_price(&body, &ids)?;
        debug!("CoinGecko: Successfully fetched {} prices", records.len());
        Ok(records)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoFetcher {
    async fn fetch_prices(&self, asset_ids: &[String]) -> Result<Vec<PriceRecord>, FeedError> {
        CoinGeckoFetcher::fetch_prices(self, asset_ids).await
    }

    fn name(&self) -> &'static str {
        "coingecko"
    }
}

/// Parse a `/simple/price` payload into records ordered like `asset_ids`.
///
/// Payload shape: `{"bitcoin": {"usd": 67420.5, "usd_24h_change": 2.45}, ...}`.
/// A missing `usd_24h_change` defaults to 0. Requested assets absent from the
/// payload, or present without a `usd` price, are skipped; a payload with no
/// usable entry for any of them is an error.
pub fn parse_simple_price(body: &[u8], asset_ids: &[String]) -> Result<Vec<PriceRecord>, FeedError> {
    let quotes: HashMap<String, SimplePriceQuote> = serde_json::from_slice(body)?;

    let records: Vec<PriceRecord> = asset_ids
        .iter()
        .filter_map(|id| match quotes.get(id) {
            Some(SimplePriceQuote {
                usd: Some(usd),
                usd_24h_change,
            }) => Some(PriceRecord::from_quote(id, *usd, usd_24h_change.unwrap_or(0.0))),
            Some(_) => {
                debug!("CoinGecko: {} has no usd price, skipping", id);
                None
            }
            None => {
                debug!("CoinGecko: {} missing from response", id);
                None
            }
        })
        .collect();

    if records.is_empty() && !asset_ids.is_empty() {
        return Err(FeedError::Parse(
            "response contained none of the requested assets".to_string(),
        ));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple_price_maps_fields() {
        let body = br#"{
            "bitcoin": {"usd": 67420.5, "usd_24h_change": 2.45},
            "ethereum": {"usd": 2650.3, "usd_24h_change": -1.23}
        }"#;
        let records = parse_simple_price(body, &ids(&["bitcoin", "ethereum"])).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].asset_id, "bitcoin");
        assert_eq!(records[0].display_name, "Bitcoin");
        assert_eq!(records[0].symbol.as_str(), "BTC");
        assert_eq!(records[0].price, 67420.5);
        assert_eq!(records[1].change_24h_percent, -1.23);
    }

    #[test]
    fn test_parse_simple_price_follows_request_order() {
        let body = br#"{"bitcoin": {"usd": 1.0}, "solana": {"usd": 2.0}}"#;
        let records = parse_simple_price(body, &ids(&["solana", "bitcoin"])).unwrap();
        let order: Vec<&str> = records.iter().map(|r| r.asset_id.as_str()).collect();
        assert_eq!(order, vec!["solana", "bitcoin"]);
    }

    #[test]
    fn test_parse_simple_price_missing_change_defaults_to_zero() {
        let body = br#"{"cardano": {"usd": 0.4567}}"#;
        let records = parse_simple_price(body, &ids(&["cardano"])).unwrap();
        assert_eq!(records[0].change_24h_percent, 0.0);
    }

    #[test]
    fn test_parse_simple_price_null_change_defaults_to_zero() {
        let body = br#"{"cardano": {"usd": 0.4567, "usd_24h_change": null}}"#;
        let records = parse_simple_price(body, &ids(&["cardano"])).unwrap();
        assert_eq!(records[0].change_24h_percent, 0.0);
    }

    #[test]
    fn test_parse_simple_price_unknown_asset_uses_defaults() {
        let body = br#"{"dogecoin": {"usd": 0.12, "usd_24h_change": 1.0}}"#;
        let records = parse_simple_price(body, &ids(&["dogecoin"])).unwrap();
        assert_eq!(records[0].display_name, "dogecoin");
        assert_eq!(records[0].symbol.as_str(), "DOGECOIN");
        assert_eq!(records[0].icon, "●");
    }

    #[test]
    fn test_parse_simple_price_skips_absent_assets() {
        let body = br#"{"bitcoin": {"usd": 67000.0}}"#;
        let records = parse_simple_price(body, &ids(&["bitcoin", "notacoin"])).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_simple_price_skips_entry_without_usd() {
        let body = br#"{"bitcoin": {"usd": 1.0}, "solana": {}}"#;
        let records = parse_simple_price(body, &ids(&["bitcoin", "solana"])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asset_id, "bitcoin");
        assert_eq!(records[0].price, 1.0);
    }

    #[test]
    fn test_parse_simple_price_rejects_malformed_payloads() {
        let requested = ids(&["bitcoin"]);
        assert!(matches!(
            parse_simple_price(b"not json", &requested),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(
            parse_simple_price(br#"{"bitcoin": {"eur": 1.0}}"#, &requested),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(
            parse_simple_price(br#"{"bitcoin": {"usd": "high"}}"#, &requested),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(
            parse_simple_price(b"{}", &requested),
            Err(FeedError::Parse(_))
        ));
    }

    #[test]
    fn test_price_url_trims_trailing_slash() {
        let fetcher =
            CoinGeckoFetcher::new("https://example.test/api/v3/", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.price_url(), "https://example.test/api/v3/simple/price");
    }

    #[tokio::test]
    async fn test_fetch_empty_request_skips_network() {
        let fetcher =
            CoinGeckoFetcher::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let records = fetcher.fetch_prices(&[]).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_provider_is_error() {
        // Port 9 (discard) is not expected to serve HTTP.
        let fetcher =
            CoinGeckoFetcher::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = fetcher.fetch_prices(&ids(&["bitcoin"])).await;
        assert!(result.is_err());
    }
}
