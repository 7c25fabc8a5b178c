/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Optional path to a JSON seed file of `{collection: {key: document}}`
    /// loaded into the in-memory backend at boot.
    pub seed_file: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default     |
    /// |------------------------|-------------|
    /// | `HOST`                 | `0.0.0.0`   |
    /// | `PORT`                 | `3000`      |
    /// | `REQUEST_TIMEOUT_SECS` | `30`        |
    /// | `SEED_FILE`            | unset       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let seed_file = std::env::var("SEED_FILE").ok().filter(|s| !s.is_empty());

        Self {
            host,
            port,
            request_timeout_secs,
            seed_file,
        }
    }
}
