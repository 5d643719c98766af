use serde_json::{json, Value};

use crate::client::services::api_client::ApiClient;
use crate::common::error::ApiResult;
use crate::common::models::{ApiRequest, QueryParams};

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_MIN_JOBS: u32 = 0;

#[derive(Debug, Default)]
pub struct CityService;

impl CityService {
    /// City ranking, `limit` cities with at least `min_jobs` postings.
    pub async fn analysis(client: &ApiClient, limit: u32, min_jobs: u32) -> ApiResult<Value> {
        let query = QueryParams::new().push("limit", limit).push("min_jobs", min_jobs);
        client.get("/charts/city", query).await
    }

    pub async fn detail(client: &ApiClient, city_name: &str) -> ApiResult<Value> {
        client
            .send(ApiRequest::get("/charts/city/detail").with_segment(city_name))
            .await
    }

    /// Side-by-side comparison. The backend wants at least two names.
    pub async fn compare(client: &ApiClient, cities: &[String]) -> ApiResult<Value> {
        client.post("/charts/city/compare", json!({ "cities": cities })).await
    }
}
