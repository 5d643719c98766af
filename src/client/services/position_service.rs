use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::client::services::api_client::ApiClient;
use crate::common::error::ApiResult;
use crate::common::models::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SankeyMode {
    /// Flows over the whole dataset.
    #[default]
    All,
    /// Flows restricted to the selected job titles.
    Compare,
}

impl SankeyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SankeyMode::All => "all",
            SankeyMode::Compare => "compare",
        }
    }
}

impl fmt::Display for SankeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SankeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SankeyMode::All),
            "compare" => Ok(SankeyMode::Compare),
            other => Err(format!("unknown sankey mode '{}'", other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct PositionService;

impl PositionService {
    /// Parallel-coordinates data for up to three job titles.
    pub async fn parallel(client: &ApiClient, job_titles: &[String]) -> ApiResult<Value> {
        client.get("/positions/parallel", Self::parallel_query(job_titles)).await
    }

    pub async fn sankey(
        client: &ApiClient,
        mode: SankeyMode,
        job_titles: &[String],
        dimensions: &[String],
    ) -> ApiResult<Value> {
        client
            .get("/positions/sankey", Self::sankey_query(mode, job_titles, dimensions))
            .await
    }

    pub async fn nested_bar(
        client: &ApiClient,
        job_titles: &[String],
        detail_job: Option<&str>,
    ) -> ApiResult<Value> {
        client
            .get("/positions/nested_bar", Self::nested_bar_query(job_titles, detail_job))
            .await
    }

    fn parallel_query(job_titles: &[String]) -> QueryParams {
        QueryParams::new().push_all("job_titles", job_titles)
    }

    fn sankey_query(mode: SankeyMode, job_titles: &[String], dimensions: &[String]) -> QueryParams {
        let mut query = QueryParams::new().push("mode", mode);
        // Titles only matter when comparing.
        if mode == SankeyMode::Compare {
            query = query.push_all("job_titles", job_titles);
        }
        query.push_all("dimensions", dimensions)
    }

    fn nested_bar_query(job_titles: &[String], detail_job: Option<&str>) -> QueryParams {
        QueryParams::new()
            .push_all("job_titles", job_titles)
            .push_non_empty("detail_job", detail_job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sankey_all_mode_drops_job_titles() {
        let q = PositionService::sankey_query(SankeyMode::All, &titles(&["Java"]), &titles(&["city"]));
        assert_eq!(q.to_query_string(), "mode=all&dimensions=city");
    }

    #[test]
    fn sankey_compare_mode_sends_titles_then_dimensions() {
        let q = PositionService::sankey_query(
            SankeyMode::Compare,
            &titles(&["Java", "Go"]),
            &titles(&["education", "experience"]),
        );
        assert_eq!(
            q.to_query_string(),
            "mode=compare&job_titles=Java&job_titles=Go&dimensions=education&dimensions=experience"
        );
    }

    #[test]
    fn nested_bar_detail_job_is_optional() {
        let without = PositionService::nested_bar_query(&titles(&["A", "B"]), None);
        assert_eq!(without.to_query_string(), "job_titles=A&job_titles=B");
        let with = PositionService::nested_bar_query(&titles(&["A"]), Some("A"));
        assert_eq!(with.get_all("detail_job"), vec!["A"]);
    }

    #[test]
    fn sankey_mode_parses_known_names_only() {
        assert_eq!("compare".parse::<SankeyMode>(), Ok(SankeyMode::Compare));
        assert!("diff".parse::<SankeyMode>().is_err());
    }
}
