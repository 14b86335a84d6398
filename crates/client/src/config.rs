use std::time::Duration;

/// Client configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash (default: `http://localhost:8000`).
    pub api_base_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session expiry poll interval in seconds (default: `300`).
    pub session_poll_interval_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `PORTAL_API_BASE_URL`        | `http://localhost:8000` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `SESSION_POLL_INTERVAL_SECS` | `300`                   |
    pub fn from_env() -> Self {
        // Pick up a local .env if one exists; absence is fine.
        dotenvy::dotenv().ok();

        let api_base_url = std::env::var("PORTAL_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into())
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_poll_interval_secs: u64 = std::env::var("SESSION_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("SESSION_POLL_INTERVAL_SECS must be a valid u64");

        Self {
            api_base_url,
            request_timeout_secs,
            session_poll_interval_secs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_poll_interval(&self) -> Duration {
        Duration::from_secs(self.session_poll_interval_secs)
    }
}
