use std::io::Write;

use chrono::Utc;
use log::{info, LevelFilter};

/// Level used when neither `LOG_LEVEL` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub struct DashboardLogger;

impl DashboardLogger {
    /// Installs the global logger. `LOG_LEVEL` wins over `RUST_LOG`.
    /// Calling it twice is harmless: the second call reports an error.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let level = std::env::var("LOG_LEVEL").ok();
        Self::builder(level.as_deref()).try_init()?;
        info!("Dashboard logger initialized");
        Ok(())
    }

    fn builder(level: Option<&str>) -> env_logger::Builder {
        let mut builder = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(DEFAULT_LOG_LEVEL),
        );
        if let Some(filter) = level.and_then(parse_level) {
            builder.filter_level(filter);
        }
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });
        builder
    }
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    raw.trim().parse().ok()
}
