use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::domain::{Session, SessionUser};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub bet_store: BetStoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the roster and prediction service (e.g. "http://localhost:8000/api")
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetStoreConfig {
    /// Base URL of the bet history routes (e.g. "http://localhost:3000/api")
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra attempts after a retryable network failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Base delay for exponential backoff between attempts
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u8 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    200
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay before the given retry (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(1 << attempt.min(10)))
    }
}

/// Session handed over by the host's identity provider
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

impl SessionConfig {
    pub fn session(&self) -> Session {
        if self.user_name.is_none() && self.user_email.is_none() {
            return Session::Anonymous;
        }
        Session::SignedIn(SessionUser {
            name: self.user_name.clone(),
            email: self.user_email.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rolling log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("api.base_url", "http://localhost:8000/api")?
            .set_default("bet_store.base_url", "http://localhost:3000/api")?
            .set_default("http.timeout_ms", default_timeout_ms() as i64)?
            .set_default("http.max_retries", default_max_retries() as i64)?
            .set_default("http.retry_backoff_ms", default_retry_backoff_ms() as i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("HEDGE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (HEDGE_API__BASE_URL, etc.)
            .add_source(
                Environment::with_prefix("HEDGE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Create a default configuration for CLI usage
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
            },
            bet_store: BetStoreConfig {
                base_url: "http://localhost:3000/api".to_string(),
            },
            http: HttpConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                json: false,
                dir: None,
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, raw) in [
            ("api.base_url", &self.api.base_url),
            ("bet_store.base_url", &self.bet_store.base_url),
        ] {
            match url::Url::parse(raw) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(format!(
                    "{name} must use http or https, got {}",
                    parsed.scheme()
                )),
                Err(e) => errors.push(format!("{name} is not a valid URL ({raw}): {e}")),
            }
        }

        if self.http.timeout_ms == 0 {
            errors.push("http.timeout_ms must be positive".to_string());
        }

        if self.http.max_retries > 5 {
            errors.push(format!(
                "http.max_retries should be at most 5, got {}",
                self.http.max_retries
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default_config();
        assert!(config.validate().is_ok());
        assert!(!config.session.session().is_signed_in());
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut config = AppConfig::default_config();
        config.api.base_url = "not a url".to_string();
        config.bet_store.base_url = "ftp://example.com".to_string();
        config.http.timeout_ms = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("api.base_url"));
        assert!(errors[1].contains("http or https"));
    }

    #[test]
    fn test_backoff_doubles() {
        let http = HttpConfig {
            timeout_ms: 1000,
            max_retries: 2,
            retry_backoff_ms: 100,
        };
        assert_eq!(http.backoff(1), Duration::from_millis(200));
        assert_eq!(http.backoff(2), Duration::from_millis(400));
    }

    #[test]
    fn test_session_from_config() {
        let session = SessionConfig {
            user_name: Some("Jason".to_string()),
            user_email: None,
        }
        .session();
        assert!(session.is_signed_in());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("hedgebets-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            "[api]\nbase_url = \"http://scoring.internal:9000/api\"\n\n[http]\nmax_retries = 1\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&dir).unwrap();
        assert_eq!(config.api.base_url, "http://scoring.internal:9000/api");
        assert_eq!(config.bet_store.base_url, "http://localhost:3000/api");
        assert_eq!(config.http.max_retries, 1);
        assert_eq!(config.http.timeout_ms, 10_000);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
