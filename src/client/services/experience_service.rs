use serde_json::{json, Value};

use crate::client::services::api_client::ApiClient;
use crate::common::error::ApiResult;
use crate::common::models::{ApiRequest, QueryParams};

#[derive(Debug, Default)]
pub struct ExperienceService;

impl ExperienceService {
    pub async fn analysis(client: &ApiClient, limit: u32, min_jobs: u32) -> ApiResult<Value> {
        let query = QueryParams::new().push("limit", limit).push("min_jobs", min_jobs);
        client.get("/charts/experience", query).await
    }

    pub async fn salary(client: &ApiClient, limit: u32, min_jobs: u32) -> ApiResult<Value> {
        let query = QueryParams::new().push("limit", limit).push("min_jobs", min_jobs);
        client.get("/charts/experience/salary", query).await
    }

    pub async fn overview(client: &ApiClient) -> ApiResult<Value> {
        client.get("/charts/experience/overview", QueryParams::new()).await
    }

    pub async fn detail(client: &ApiClient, experience: &str) -> ApiResult<Value> {
        client
            .send(ApiRequest::get("/charts/experience/detail").with_segment(experience))
            .await
    }

    pub async fn compare(client: &ApiClient, experiences: &[String]) -> ApiResult<Value> {
        client
            .post("/charts/experience/compare", json!({ "experiences": experiences }))
            .await
    }
}
