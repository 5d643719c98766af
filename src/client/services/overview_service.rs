use serde_json::Value;

use crate::client::services::api_client::ApiClient;
use crate::common::error::ApiResult;
use crate::common::models::QueryParams;

#[derive(Debug, Default)]
pub struct OverviewService;

impl OverviewService {
    /// Dataset-wide summary shown on the landing page.
    pub async fn overview(client: &ApiClient) -> ApiResult<Value> {
        client.get("/overview", QueryParams::new()).await
    }
}
