//! Asset identifier lookup table.
//!
//! Maps provider asset identifiers (e.g. "bitcoin") to their display name,
//! ticker symbol and icon glyph. Identifiers outside the table still resolve,
//! using deterministic defaults, so new assets need no code changes.

use compact_str::CompactString;

/// Icon used for assets outside the known table.
pub const DEFAULT_ICON: &str = "●";

/// Assets monitored when nothing else is configured.
pub const DEFAULT_ASSETS: [&str; 5] = ["bitcoin", "ethereum", "cardano", "solana", "polkadot"];

/// Static display metadata for a known asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub symbol: &'static str,
    pub icon: &'static str,
}

static KNOWN_ASSETS: [AssetInfo; 5] = [
    AssetInfo { id: "bitcoin", display_name: "Bitcoin", symbol: "BTC", icon: "₿" },
    AssetInfo { id: "ethereum", display_name: "Ethereum", symbol: "ETH", icon: "Ξ" },
    AssetInfo { id: "cardano", display_name: "Cardano", symbol: "ADA", icon: "₳" },
    AssetInfo { id: "solana", display_name: "Solana", symbol: "SOL", icon: "◎" },
    AssetInfo { id: "polkadot", display_name: "Polkadot", symbol: "DOT", icon: "●" },
];

/// Look up a known asset by identifier.
pub fn known_asset(asset_id: &str) -> Option<&'static AssetInfo> {
    KNOWN_ASSETS.iter().find(|a| a.id == asset_id)
}

/// Display name for an asset; the identifier itself when unknown.
pub fn display_name(asset_id: &str) -> String {
    known_asset(asset_id)
        .map(|a| a.display_name.to_string())
        .unwrap_or_else(|| asset_id.to_string())
}

/// Ticker symbol for an asset; the uppercased identifier when unknown.
pub fn symbol(asset_id: &str) -> CompactString {
    match known_asset(asset_id) {
        Some(a) => CompactString::new(a.symbol),
        None => CompactString::new(asset_id.to_uppercase()),
    }
}

/// Icon glyph for an asset; [`DEFAULT_ICON`] when unknown.
pub fn icon(asset_id: &str) -> &'static str {
    known_asset(asset_id).map(|a| a.icon).unwrap_or(DEFAULT_ICON)
}
