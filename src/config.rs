use secrecy::Secret;
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Backend API
    pub api_base_url: String,
    pub api_token: Option<Secret<String>>,
    pub request_timeout_secs: u64,

    // Scanner behaviour: pause after each scan until the guard dismisses it
    pub require_scan_ack: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            require_scan_ack: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Self::from_source(&config)
    }

    fn from_source(config: &config::Config) -> Result<Self, config::ConfigError> {
        Ok(Self {
            api_base_url: config
                .get("api_base_url")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            api_token: config
                .get::<String>("api_token")
                .ok()
                .filter(|token| !token.is_empty())
                .map(Secret::new),
            request_timeout_secs: match config.get::<u64>("request_timeout_secs") {
                Ok(secs) => secs,
                Err(config::ConfigError::NotFound(_)) => DEFAULT_REQUEST_TIMEOUT_SECS,
                Err(e) => return Err(e),
            },
            require_scan_ack: config.get("require_scan_ack").unwrap_or(false),
        })
    }
}
