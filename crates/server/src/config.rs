use notes::StoreConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Deployment environment name, reported by /health
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Origins allowed outside development. Development allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    /// Log level / env-filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Storage backend
    #[serde(default)]
    pub storage: StoreConfig,

    /// Insert a welcome note at startup when the store is empty
    #[serde(default)]
    pub seed_welcome_note: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            environment: default_environment(),
            enable_cors: default_true(),
            cors_allowed_origins: Vec::new(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            storage: StoreConfig::default(),
            seed_welcome_note: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    ///
    /// Environment variables use the `NOTES_SERVER__` prefix, e.g.
    /// `NOTES_SERVER__PORT=3000` or
    /// `NOTES_SERVER__CORS_ALLOWED_ORIGINS=https://a.example,https://b.example`.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("NOTES_SERVER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins"),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;

        if !config.is_development() && config.enable_cors && config.cors_allowed_origins.is_empty()
        {
            tracing::warn!(
                environment = %config.environment,
                "CORS enabled without allowed origins; cross-origin requests will be refused"
            );
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size(), 1024 * 1024);
        assert!(cfg.enable_cors);
        assert!(cfg.is_development());
        assert_eq!(cfg.storage, StoreConfig::InMemory);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{"port": 3000, "environment": "Production", "storage": {"backend": "redb", "path": "notes.redb"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.port, 3000);
        assert!(!cfg.is_development());
        assert_eq!(cfg.storage, StoreConfig::redb("notes.redb"));
        assert_eq!(cfg.bind_addr, "0.0.0.0");
    }
}
