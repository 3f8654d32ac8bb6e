use crate::error::{Result, VizError};
use dotenv::dotenv;
use std::env;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api/vol_surface";
pub const DEFAULT_SYMBOL: &str = "SPY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the surface pricing service
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Endpoint that answers the surface POST request
    pub url: String,
    /// Underlying symbol sent in the request body
    pub symbol: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    /// Pricing service configuration
    pub api: ApiConfig,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("VOLSURF_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Url::parse(&url).map_err(|e| {
            VizError::ConfigError(format!("VOLSURF_API_URL is not a valid URL ({}): {}", url, e))
        })?;

        let symbol = lookup("VOLSURF_SYMBOL")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

        let timeout_secs = match lookup("VOLSURF_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(VizError::ConfigError(format!(
                        "VOLSURF_TIMEOUT_SECS must be a positive integer, got {:?}",
                        raw
                    )))
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Config {
            api: ApiConfig {
                url,
                symbol,
                timeout_secs,
            },
            log_level,
        })
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .map_err(|e| VizError::ConfigError(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}
