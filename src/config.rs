use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// HTTP defaults
// =============================================================================

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Base delay between retries in milliseconds, doubled on every attempt
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Delay after a 429 response without a `Retry-After` header (15 seconds)
pub const DEFAULT_RATE_LIMITED_DELAY_MS: u64 = 15_000;

pub const DEFAULT_USER_AGENT: &str = "version-gate";

pub const DEFAULT_RETRY_STATUS_CODES: [u16; 6] = [403, 429, 500, 502, 503, 504];

pub const DEFAULT_SUCCESS_STATUS_CODES: [u16; 9] = [200, 201, 202, 203, 204, 205, 206, 207, 208];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration
///
/// Every field has a default, so any partial JSON object is a valid config:
/// keys that are present override the defaults, nested objects field by field.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub rate_limit: Option<RateLimitConfig>,
    pub log: LogConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "http.max_retries must be at least 1".to_string(),
            ));
        }
        if self.http.success_status_codes.is_empty() {
            return Err(ConfigError::Invalid(
                "http.success_status_codes must not be empty".to_string(),
            ));
        }
        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.max_calls == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.max_calls must be at least 1".to_string(),
                ));
            }
            if rate_limit.period_ms == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.period_ms must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Total attempts per request, including the first one
    #[serde(alias = "max-retries")]
    pub max_retries: u32,
    /// Statuses that trigger another attempt
    pub retry_status_codes: Vec<u16>,
    /// Statuses treated as success
    pub success_status_codes: Vec<u16>,
    pub timeout_secs: u64,
    /// Headers sent with every request
    pub headers: IndexMap<String, String>,
    pub retry_delay_ms: u64,
    pub rate_limited_delay_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_status_codes: DEFAULT_RETRY_STATUS_CODES.to_vec(),
            success_status_codes: DEFAULT_SUCCESS_STATUS_CODES.to_vec(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headers: IndexMap::new(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            rate_limited_delay_ms: DEFAULT_RATE_LIMITED_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rate_limited_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limited_delay_ms)
    }

    pub fn is_success(&self, status: u16) -> bool {
        self.success_status_codes.contains(&status)
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }

    /// Configured headers overlaid with per-request headers.
    ///
    /// Header names match case-insensitively; a request header replaces the
    /// configured one with the same name.
    pub fn merge_headers(&self, request: &IndexMap<String, String>) -> IndexMap<String, String> {
        let mut merged = self.headers.clone();
        for (name, value) in request {
            merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            merged.insert(name.clone(), value.clone());
        }
        merged
    }
}

/// Sliding-window rate limit applied before every HTTP attempt
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_calls: usize,
    pub period_ms: u64,
}

impl RateLimitConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Write to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Returns the path to the data directory for version-gate.
/// Uses $XDG_DATA_HOME/version-gate if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/version-gate,
/// or ./version-gate if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("version-gate.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-gate")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "http": {
                "timeout_secs": 30
            }
        }))
        .unwrap();

        assert_eq!(result.http.timeout_secs, 30);
        assert_eq!(result.http.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(
            result.http.retry_status_codes,
            DEFAULT_RETRY_STATUS_CODES.to_vec()
        );
        assert_eq!(result.rate_limit, None);
        assert_eq!(result.log, LogConfig::default());
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "http": {
                "max_retries": 5,
                "retry_status_codes": [503],
                "success_status_codes": [200],
                "timeout_secs": 3,
                "headers": { "Accept": "application/json" },
                "retry_delay_ms": 10,
                "rate_limited_delay_ms": 20,
                "user_agent": "tester"
            },
            "rate_limit": { "max_calls": 50, "period_ms": 30000 },
            "log": { "level": "debug", "json": true, "file": "/tmp/gate.log" }
        }))
        .unwrap();

        assert_eq!(
            result,
            Config {
                http: HttpConfig {
                    max_retries: 5,
                    retry_status_codes: vec![503],
                    success_status_codes: vec![200],
                    timeout_secs: 3,
                    headers: IndexMap::from([(
                        "Accept".to_string(),
                        "application/json".to_string()
                    )]),
                    retry_delay_ms: 10,
                    rate_limited_delay_ms: 20,
                    user_agent: "tester".to_string(),
                },
                rate_limit: Some(RateLimitConfig {
                    max_calls: 50,
                    period_ms: 30000
                }),
                log: LogConfig {
                    level: "debug".to_string(),
                    json: true,
                    file: Some(PathBuf::from("/tmp/gate.log")),
                },
            }
        );
    }

    #[test]
    fn http_config_accepts_hyphenated_max_retries() {
        let result = serde_json::from_value::<HttpConfig>(json!({ "max-retries": 7 })).unwrap();
        assert_eq!(result.max_retries, 7);
    }

    #[test]
    fn from_json_str_rejects_wrong_types() {
        let result = Config::from_json_str(r#"{ "http": { "max_retries": "three" } }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn from_json_str_rejects_zero_rate_limit() {
        let result =
            Config::from_json_str(r#"{ "rate_limit": { "max_calls": 0, "period_ms": 10 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn from_json_str_rejects_zero_attempts() {
        let result = Config::from_json_str(r#"{ "http": { "max_retries": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn merge_headers_lets_request_headers_override_defaults() {
        let config = HttpConfig {
            headers: IndexMap::from([
                ("User-Agent".to_string(), "gate".to_string()),
                ("Accept".to_string(), "*/*".to_string()),
            ]),
            ..Default::default()
        };
        let request = IndexMap::from([
            ("accept".to_string(), "application/json".to_string()),
            ("X-Trace".to_string(), "1".to_string()),
        ]);

        let merged = config.merge_headers(&request);

        assert_eq!(
            merged,
            IndexMap::from([
                ("User-Agent".to_string(), "gate".to_string()),
                ("accept".to_string(), "application/json".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ])
        );
    }

    #[test]
    fn status_classification_uses_configured_sets() {
        let config = HttpConfig::default();

        assert!(config.is_success(204));
        assert!(!config.is_success(301));
        assert!(config.is_retryable(429));
        assert!(!config.is_retryable(404));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/version-gate"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/version-gate"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./version-gate"));
    }
}
