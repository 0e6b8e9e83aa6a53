use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

/// Application-level constants
pub const APP_NAME: &str = "EliteCuts";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "elitecuts=info,tower_http=warn"
}

/// Get the application data directory.
/// Falls back to the working directory when no platform data dir exists
/// (containers without a home directory).
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database location under the data directory.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("elitecuts.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Email function endpoint. `None` disables delivery (notices are logged and dropped).
    pub email_function_url: Option<String>,
    pub email_function_key: Option<String>,
    pub notify_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests don't touch process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("ELITECUTS_BIND_ADDR").unwrap_or_else(|| {
            info!("ELITECUTS_BIND_ADDR not set, using default: {DEFAULT_BIND_ADDR}");
            DEFAULT_BIND_ADDR.to_string()
        });
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "ELITECUTS_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let db_path = lookup("ELITECUTS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let email_function_url = lookup("ELITECUTS_EMAIL_FUNCTION_URL")
            .filter(|url| !url.trim().is_empty());
        if email_function_url.is_none() {
            info!("ELITECUTS_EMAIL_FUNCTION_URL not set, email delivery disabled");
        }
        let email_function_key = lookup("ELITECUTS_EMAIL_FUNCTION_KEY");

        let notify_timeout = match lookup("ELITECUTS_NOTIFY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ELITECUTS_NOTIFY_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        };

        Ok(Self {
            bind_addr,
            db_path,
            email_function_url,
            email_function_key,
            notify_timeout,
        })
    }
}
