//! Price records held by the price store.

use crate::asset;
use crate::format::{format_change, format_usd};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Latest known price for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Provider asset identifier (unique key)
    pub asset_id: String,
    /// Human readable name (e.g., "Bitcoin")
    pub display_name: String,
    /// Ticker symbol (e.g., "BTC")
    pub symbol: CompactString,
    /// Price in USD
    pub price: f64,
    /// 24h change in percent
    pub change_24h_percent: f64,
    /// Icon glyph
    pub icon: String,
}

impl PriceRecord {
    /// Build a record from a provider quote, filling display fields from the asset table.
    pub fn from_quote(asset_id: &str, price: f64, change_24h_percent: f64) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            display_name: asset::display_name(asset_id),
            symbol: asset::symbol(asset_id),
            price,
            change_24h_percent,
            icon: asset::icon(asset_id).to_string(),
        }
    }

    /// Copy of this record with a new price and change.
    pub fn with_price(&self, price: f64, change_24h_percent: f64) -> Self {
        Self {
            price,
            change_24h_percent,
            ..self.clone()
        }
    }

    /// Whether the 24h change is non-negative.
    #[inline]
    pub fn is_gain(&self) -> bool {
        self.change_24h_percent >= 0.0
    }

    /// Formatted price, e.g. "$67,420.50".
    pub fn price_display(&self) -> String {
        format!("${}", format_usd(self.price))
    }

    /// Formatted change, e.g. "+2.45%".
    pub fn change_display(&self) -> String {
        format_change(self.change_24h_percent)
    }
}
