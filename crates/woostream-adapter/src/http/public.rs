/*
[INPUT]:  Unsigned GET requests
[OUTPUT]: Exchange symbol information (tick sizes, limits)
[POS]:    HTTP layer - public market data endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use crate::http::{Result, WooClient};
use crate::types::PublicInfoResponse;

pub const PUBLIC_INFO_ENDPOINT: &str = "/v1/public/info";

impl WooClient {
    /// Query all symbol information
    ///
    /// GET /v1/public/info
    pub async fn public_info(&self) -> Result<PublicInfoResponse> {
        self.get_as(PUBLIC_INFO_ENDPOINT, false).await
    }
}
