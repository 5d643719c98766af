use serde_json::Value;

/// Fallback text used when no better message can be extracted.
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

/// Message shown when the request went out but nothing came back.
pub const CONNECTIVITY_MESSAGE: &str =
    "unable to reach the server, check that the backend service is running";

pub const CODE_TIMEOUT: &str = "ECONNABORTED";
pub const CODE_NETWORK: &str = "ERR_NETWORK";
pub const CODE_BAD_OPTION: &str = "ERR_BAD_OPTION";
pub const CODE_BAD_REQUEST: &str = "ERR_BAD_REQUEST";
pub const CODE_BAD_RESPONSE: &str = "ERR_BAD_RESPONSE";

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The server answered with a non-2xx status.
    Server,
    /// The request was sent but no response arrived (network or timeout).
    Connectivity,
    /// The request could not be built or sent.
    Configuration,
}

/// Single error shape produced by the transport for every failure.
///
/// `message` is never empty. `status` and `body` are only set when the
/// server actually responded.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<Value>,
    pub code: Option<String>,
    #[source]
    pub cause: Option<Cause>,
}

impl ApiError {
    /// Non-2xx response. Prefers the `message` field of the body when the
    /// server sent one.
    pub fn server(status: u16, status_text: &str, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("server error: {} - {}", status, status_text));
        let code = if status >= 500 { CODE_BAD_RESPONSE } else { CODE_BAD_REQUEST };
        Self {
            kind: ApiErrorKind::Server,
            message,
            status: Some(status),
            body,
            code: Some(code.to_string()),
            cause: None,
        }
    }

    pub fn connectivity(code: &str, cause: impl Into<Cause>) -> Self {
        Self {
            kind: ApiErrorKind::Connectivity,
            message: CONNECTIVITY_MESSAGE.to_string(),
            status: None,
            body: None,
            code: Some(code.to_string()),
            cause: Some(cause.into()),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Configuration,
            message: non_empty(message.into()),
            status: None,
            body: None,
            code: Some(CODE_BAD_OPTION.to_string()),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn is_server(&self) -> bool {
        self.kind == ApiErrorKind::Server
    }

    pub fn is_connectivity(&self) -> bool {
        self.kind == ApiErrorKind::Connectivity
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
