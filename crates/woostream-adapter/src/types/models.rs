/*
[INPUT]:  REST snapshot payloads (positions, holdings, symbol info)
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub symbol: String,
    #[serde(default)]
    pub holding: Decimal,
    #[serde(default)]
    pub pending_long_qty: Decimal,
    #[serde(default)]
    pub pending_short_qty: Decimal,
    #[serde(default)]
    pub settle_price: Decimal,
    #[serde(default)]
    pub average_open_price: Decimal,
    #[serde(default)]
    pub mark_price: Decimal,
}

/// GET /v1/positions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub positions: Vec<PositionInfo>,
}

impl PositionsResponse {
    /// Positions with a non-zero holding
    pub fn open_positions(&self) -> impl Iterator<Item = &PositionInfo> {
        self.positions
            .iter()
            .filter(|position| !position.holding.is_zero())
    }
}

/// GET /v1/client/holding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub holding: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub quote_min: Decimal,
    #[serde(default)]
    pub quote_max: Decimal,
    #[serde(default)]
    pub quote_tick: Decimal,
    #[serde(default)]
    pub base_min: Decimal,
    #[serde(default)]
    pub base_max: Decimal,
    pub base_tick: Decimal,
}

/// GET /v1/public/info
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicInfoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub rows: Vec<SymbolInfo>,
}

impl PublicInfoResponse {
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.rows.iter().find(|row| row.symbol == symbol)
    }

    /// Spot market used to value a balance asset.
    ///
    /// `SPOT_{asset}_USDT`, except USDT itself which maps to `SPOT_USDC_USDT`.
    pub fn spot_market_for(&self, asset: &str) -> Option<&SymbolInfo> {
        if asset == "USDT" {
            return self.symbol("SPOT_USDC_USDT");
        }
        self.symbol(&format!("SPOT_{asset}_USDT"))
    }
}

/// One-shot REST state fetched before streaming. Missing parts failed to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub positions: Option<PositionsResponse>,
    pub holding: Option<HoldingResponse>,
    pub public_info: Option<PublicInfoResponse>,
}

impl Snapshot {
    pub fn is_complete(&self) -> bool {
        self.positions.is_some() && self.holding.is_some() && self.public_info.is_some()
    }
}
