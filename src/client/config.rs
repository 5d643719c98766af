use dotenvy::dotenv;
use log::{info, warn};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 50_000;

/// Transport settings handed to [`ApiClient::new`](crate::client::services::api_client::ApiClient::new).
///
/// Recognized options are `base_url` and `timeout`; the defaults are
/// [`DEFAULT_BASE_URL`] and [`DEFAULT_TIMEOUT_MS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the config from `API_BASE_URL` / `API_TIMEOUT_MS` (after
    /// loading `.env`). Unset or invalid values keep the defaults.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = match lookup("API_BASE_URL") {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => defaults.base_url,
        };

        let timeout = match lookup("API_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    warn!("Ignoring invalid API_TIMEOUT_MS={:?}, using {}ms", raw, DEFAULT_TIMEOUT_MS);
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        let config = Self { base_url, timeout };
        info!("API configuration loaded: base_url={} timeout={:?}", config.base_url, config.timeout);
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    pub primary_color: String,
    pub secondary_color: String,
    pub background: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#667eea".to_string(),
            secondary_color: "#764ba2".to_string(),
            background: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    pub default_height: u32,
    pub default_width: String,
    pub animation_duration: Duration,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_height: 600,
            default_width: "100%".to_string(),
            animation_duration: Duration::from_millis(750),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_page_size: usize,
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 20, 50, 100],
        }
    }
}

/// Everything the dashboard needs at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub theme: ThemeConfig,
    pub chart: ChartConfig,
    pub pagination: PaginationConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            ..Self::default()
        }
    }
}
