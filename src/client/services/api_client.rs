use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::client::config::ApiConfig;
use crate::common::error::{ApiError, ApiResult, CODE_NETWORK, CODE_TIMEOUT};
use crate::common::models::{ApiRequest, HttpMethod, QueryParams};

/// Hook run on every outgoing request before it is sent.
///
/// Returning an error aborts the call and the error reaches the caller
/// unchanged.
#[async_trait]
pub trait RequestInterceptor: Send + Sync + 'static {
    async fn intercept(&self, request: ApiRequest) -> ApiResult<ApiRequest>;
}

/// Leaves requests untouched.
pub struct PassThrough;

#[async_trait]
impl RequestInterceptor for PassThrough {
    async fn intercept(&self, request: ApiRequest) -> ApiResult<ApiRequest> {
        Ok(request)
    }
}

/// HTTP client shared by every endpoint service.
///
/// Successful calls yield the response body only; every failure is turned
/// into an [`ApiError`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    interceptor: Arc<dyn RequestInterceptor>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("config", &self.config).finish()
    }
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::configuration(e.to_string()).with_cause(e))?;

        Ok(Self {
            http,
            config,
            interceptor: Arc::new(PassThrough),
        })
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get(&self, path: &str, query: QueryParams) -> ApiResult<Value> {
        self.send(ApiRequest::get(path).with_query(query)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(ApiRequest::post(path, body)).await
    }

    pub async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let request = self.interceptor.intercept(request).await?;
        let method = request.method;

        let url = match self.build_url(&request) {
            Ok(url) => url,
            Err(e) => {
                log_failure(method, &self.full_url(&request.path), &e);
                return Err(e);
            }
        };

        let mut builder = match method {
            HttpMethod::Get => self.http.get(url.clone()),
            HttpMethod::Post => self.http.post(url.clone()),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let err = classify_transport_error(e);
                if err.is_connectivity() {
                    error!(
                        "Network request details: method={} url={} code={:?} cause={:?}",
                        method,
                        url,
                        err.code,
                        err.cause.as_ref().map(|c| c.to_string())
                    );
                }
                log_failure(method, url.as_str(), &err);
                return Err(err);
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => Some(decode_body(&bytes)),
            Err(e) if status.is_success() => {
                let err = classify_transport_error(e);
                log_failure(method, url.as_str(), &err);
                return Err(err);
            }
            Err(e) => {
                debug!("Could not read error body from {}: {}", url, e);
                None
            }
        };

        if !status.is_success() {
            let err = ApiError::server(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                body,
            );
            log_failure(method, url.as_str(), &err);
            return Err(err);
        }

        debug!("{} {} -> {}", method, url, status.as_u16());
        Ok(body.unwrap_or(Value::Null))
    }

    fn full_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn build_url(&self, request: &ApiRequest) -> ApiResult<Url> {
        let raw = self.full_url(&request.path);
        let mut url = Url::parse(&raw).map_err(|e| {
            ApiError::configuration(format!("invalid request url '{}': {}", raw, e)).with_cause(e)
        })?;
        if !request.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| {
                    ApiError::configuration(format!("base url '{}' cannot take path segments", raw))
                })?
                .extend(request.segments.iter());
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.pairs().iter());
        }
        Ok(url)
    }
}

fn classify_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::configuration(e.to_string()).with_cause(e)
    } else if e.is_timeout() {
        ApiError::connectivity(CODE_TIMEOUT, e)
    } else {
        ApiError::connectivity(CODE_NETWORK, e)
    }
}

/// JSON when possible, otherwise the raw text.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn log_failure(method: HttpMethod, url: &str, err: &ApiError) {
    error!(
        "API request failed: message={:?} method={} url={} status={:?} has_response={} code={:?}",
        err.message,
        method,
        url,
        err.status,
        err.status.is_some(),
        err.code
    );
}
