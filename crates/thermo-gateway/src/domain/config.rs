//! Gateway configuration with validation.
//!
//! Every option is overridable from the environment; absent variables
//! fall back to the defaults documented on each field.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP + WebSocket server configuration
    pub http: HttpConfig,
    /// PostgreSQL connection configuration
    pub database: DatabaseConfig,
    /// Change-signal listener configuration
    pub listener: ListenerConfig,
    /// Production mode suppresses error detail in HTTP responses
    pub production: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            database: DatabaseConfig::default(),
            listener: ListenerConfig::default(),
            production: false,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the environment.
    ///
    /// Recognized variables: `DB_USER`, `DB_HOST`, `DB_NAME`,
    /// `DB_PASSWORD`, `DB_PORT`, `PORT`, `APP_ENV`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(user) = std::env::var("DB_USER") {
            config.database.user = user;
        }
        if let Ok(host) = std::env::var("DB_HOST") {
            config.database.host = host;
        }
        if let Ok(name) = std::env::var("DB_NAME") {
            config.database.name = name;
        }
        if let Ok(password) = std::env::var("DB_PASSWORD") {
            config.database.password = password;
        }
        if let Ok(port) = std::env::var("DB_PORT") {
            if let Ok(p) = port.parse() {
                config.database.port = p;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.http.port = p;
            }
        }
        if let Ok(env) = std::env::var("APP_ENV") {
            config.production = env.eq_ignore_ascii_case("production");
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidPool(
                "max_connections cannot be 0".into(),
            ));
        }

        if self.listener.channel.is_empty() {
            return Err(ConfigError::Invalid("listener channel cannot be empty".into()));
        }

        if self.listener.retry_delay.is_zero() {
            return Err(ConfigError::Invalid("listener retry delay cannot be 0".into()));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
        }
    }
}

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database user
    pub user: String,
    /// Database host
    pub host: String,
    /// Database name
    pub name: String,
    /// Database password
    pub password: String,
    /// Port (default: 5432)
    pub port: u16,
    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            host: "localhost".to_string(),
            name: "monitoring_suhu".to_string(),
            password: String::new(),
            port: 5432,
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Build a `postgres://` connection URL for the pool and listener.
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

/// Change-signal listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// NOTIFY channel raised by committed mutations
    pub channel: String,
    /// Delay before re-establishing a failed listener connection
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            channel: "temperature_changes".to_string(),
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid connection pool configuration
    #[error("invalid pool configuration: {0}")]
    InvalidPool(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Serde helper for Duration-as-seconds fields
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
