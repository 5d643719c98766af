use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Wrapper the analytics backend puts around most payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub request_id: Option<Uuid>,
    /// Extra diagnostics attached to error envelopes (`{type, details}`)
    #[serde(default)]
    pub error: Option<Value>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Typed view over a raw payload returned by an endpoint service.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        match self.status.as_deref() {
            Some(status) => status == "success",
            None => (200..300).contains(&self.code),
        }
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered query parameters. Repeated keys are kept in insertion order,
/// which is how array values travel (`?job_titles=A&job_titles=B`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Skips `None` and empty strings, matching how optional filters are sent.
    pub fn push_non_empty(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.push(key, v),
            _ => self,
        }
    }

    pub fn push_all<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        for v in values {
            self.pairs.push((key.to_string(), v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// All values recorded for `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// `application/x-www-form-urlencoded` rendering, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// One outgoing call: built fresh per endpoint invocation, never retained.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: QueryParams,
    /// Appended to `path` one segment each, percent-encoded when the URL
    /// is built.
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: QueryParams::new(),
            segments: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            query: QueryParams::new(),
            segments: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Adds a free-form value (a city or industry name) as its own path
    /// segment, so `/` or spaces in it cannot change the route.
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_keys_keep_caller_order() {
        let q = QueryParams::new()
            .push("mode", "compare")
            .push_all("job_titles", ["c", "a", "b"]);
        assert_eq!(q.get_all("job_titles"), vec!["c", "a", "b"]);
        assert_eq!(
            q.to_query_string(),
            "mode=compare&job_titles=c&job_titles=a&job_titles=b"
        );
    }

    #[test]
    fn non_empty_filter_skips_blank_values() {
        let q = QueryParams::new()
            .push_non_empty("city", Some(""))
            .push_non_empty("education", None)
            .push_non_empty("experience", Some("3-5年"));
        assert_eq!(q.pairs().len(), 1);
        assert_eq!(q.get_all("experience"), vec!["3-5年"]);
    }

    #[test]
    fn segments_are_kept_apart_from_the_path() {
        let req = ApiRequest::get("/charts/city/detail").with_segment("New York");
        assert_eq!(req.path, "/charts/city/detail");
        assert_eq!(req.segments, vec!["New York"]);
        assert!(req.query.is_empty());
    }

    #[test]
    fn envelope_parses_backend_success_shape() {
        let raw = json!({
            "status": "success",
            "code": 200,
            "message": "ok",
            "timestamp": "2024-01-05T09:03:07.123456",
            "request_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "data": {"cities": ["北京", "上海"]}
        });
        let env: Envelope<Value> = Envelope::from_value(raw).unwrap();
        assert!(env.is_success());
        assert!(env.timestamp.is_some());
        assert_eq!(env.into_data().unwrap()["cities"][1], "上海");
    }

    #[test]
    fn envelope_without_status_uses_code() {
        let env: Envelope<Value> =
            Envelope::from_value(json!({"code": 404, "message": "missing"})).unwrap();
        assert!(!env.is_success());
        assert!(env.data.is_none());
    }
}
