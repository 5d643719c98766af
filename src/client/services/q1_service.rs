use serde_json::Value;

use crate::client::services::api_client::ApiClient;
use crate::common::error::ApiResult;
use crate::common::models::QueryParams;

/// Endpoints behind the Q1 cohort scatter view.
#[derive(Debug, Default)]
pub struct Q1Service;

impl Q1Service {
    pub async fn cities(client: &ApiClient) -> ApiResult<Value> {
        client.get("/q1/cities", QueryParams::new()).await
    }

    pub async fn scatter(client: &ApiClient, city: &str) -> ApiResult<Value> {
        client.get("/q1/scatter", QueryParams::new().push("city", city)).await
    }

    pub async fn job_levels(client: &ApiClient) -> ApiResult<Value> {
        client.get("/q1/job-levels", QueryParams::new()).await
    }

    /// Industry categories, optionally restricted to one city.
    pub async fn industries(client: &ApiClient, city: Option<&str>) -> ApiResult<Value> {
        client
            .get("/q1/industries", QueryParams::new().push_non_empty("city", city))
            .await
    }
}
