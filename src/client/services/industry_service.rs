use serde_json::{json, Value};

use crate::client::services::api_client::ApiClient;
use crate::common::error::ApiResult;
use crate::common::models::{ApiRequest, QueryParams};

#[derive(Debug, Default)]
pub struct IndustryService;

impl IndustryService {
    pub async fn analysis(client: &ApiClient, limit: u32, min_jobs: u32) -> ApiResult<Value> {
        let query = QueryParams::new().push("limit", limit).push("min_jobs", min_jobs);
        client.get("/charts/industry", query).await
    }

    pub async fn salary(client: &ApiClient, limit: u32, min_jobs: u32) -> ApiResult<Value> {
        let query = QueryParams::new().push("limit", limit).push("min_jobs", min_jobs);
        client.get("/charts/industry/salary", query).await
    }

    pub async fn detail(client: &ApiClient, industry_name: &str) -> ApiResult<Value> {
        client
            .send(ApiRequest::get("/charts/industry/detail").with_segment(industry_name))
            .await
    }

    pub async fn compare(client: &ApiClient, industries: &[String]) -> ApiResult<Value> {
        client
            .post("/charts/industry/compare", json!({ "industries": industries }))
            .await
    }

    pub async fn overview(client: &ApiClient) -> ApiResult<Value> {
        client.get("/charts/industry/overview", QueryParams::new()).await
    }

    /// Top job titles by composite score (bar chart).
    pub async fn job_ranking(client: &ApiClient) -> ApiResult<Value> {
        client.get("/industry/ranking/jobs", QueryParams::new()).await
    }

    /// Per company-type trend data for the nested rose chart.
    pub async fn trend_rose(client: &ApiClient) -> ApiResult<Value> {
        client.get("/industry/trend/rose", QueryParams::new()).await
    }

    pub async fn national_stats(client: &ApiClient) -> ApiResult<Value> {
        client.get("/industry-stats/national", QueryParams::new()).await
    }
}
