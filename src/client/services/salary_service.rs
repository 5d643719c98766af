use serde_json::Value;

use crate::client::services::api_client::ApiClient;
use crate::common::error::ApiResult;
use crate::common::models::QueryParams;

/// Optional filters for the salary boxplot. Empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxplotFilters {
    pub experience: Option<String>,
    pub education: Option<String>,
    pub city: Option<String>,
    pub company_type: Option<String>,
}

impl BoxplotFilters {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push_non_empty("experience", self.experience.as_deref())
            .push_non_empty("education", self.education.as_deref())
            .push_non_empty("city", self.city.as_deref())
            .push_non_empty("company_type", self.company_type.as_deref())
    }
}

#[derive(Debug, Default)]
pub struct SalaryService;

impl SalaryService {
    /// Experience × education × salary cube for the 3D chart.
    pub async fn experience_education_salary(client: &ApiClient) -> ApiResult<Value> {
        client
            .get("/charts/3d/experience-education-salary", QueryParams::new())
            .await
    }

    pub async fn boxplot(client: &ApiClient, filters: &BoxplotFilters) -> ApiResult<Value> {
        client
            .get("/charts/boxplot/salary-distribution", filters.to_query())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_produce_no_query() {
        assert!(BoxplotFilters::default().to_query().is_empty());
    }

    #[test]
    fn filters_keep_fixed_order() {
        let filters = BoxplotFilters {
            experience: Some("1-3年".into()),
            education: Some(String::new()),
            city: Some("深圳".into()),
            company_type: Some("民营".into()),
        };
        let q = filters.to_query();
        let keys: Vec<&str> = q.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["experience", "city", "company_type"]);
    }
}
