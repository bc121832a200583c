/*
[INPUT]:  Signed GET requests (x-api-key / x-api-signature / x-api-timestamp)
[OUTPUT]: Account snapshot data (positions, holdings)
[POS]:    HTTP layer - account endpoints (require API key auth)
[UPDATE]: When adding new account endpoints or changing response format
*/

use crate::http::{Result, WooClient};
use crate::types::{HoldingResponse, PositionsResponse};

pub const POSITIONS_ENDPOINT: &str = "/v1/positions";
pub const HOLDING_ENDPOINT: &str = "/v1/client/holding";

impl WooClient {
    /// Query open positions
    ///
    /// GET /v1/positions
    pub async fn positions(&self) -> Result<PositionsResponse> {
        self.get_as(POSITIONS_ENDPOINT, true).await
    }

    /// Query asset holdings
    ///
    /// GET /v1/client/holding
    pub async fn holding(&self) -> Result<HoldingResponse> {
        self.get_as(HOLDING_ENDPOINT, true).await
    }
}
