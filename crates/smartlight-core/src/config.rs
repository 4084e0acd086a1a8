//! Configuration types for smartlight.
//!
//! [`Config::load`] layers, lowest precedence first: the embedded defaults, a
//! TOML file (`smartlight.toml` in the working directory unless a path is
//! given), the `NETPIE_*` / `PORT` environment variables used by the deployed
//! backend, and finally `SMARTLIGHT__SECTION__KEY` variables.
//! [`Config::defaults`] returns the embedded defaults without touching the
//! filesystem or the environment.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[mqtt]
host               = "mqtts://mqtt.netpie.io:8883"
client_id          = ""
username           = ""
password           = ""
topic              = "@msg/stm32"
keep_alive_secs    = 30
reconnect_delay_ms = 2000
channel_capacity   = 32

[http]
bind       = "0.0.0.0"
port       = 3000
public_dir = "public"

[status]
stale_after_ms = 12000
"#;

const DEFAULT_CONFIG_FILE: &str = "smartlight.toml";

/// Environment variable → config key. These are the names the deployed backend reads.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("NETPIE_HOST", "mqtt.host"),
    ("NETPIE_CLIENT_ID", "mqtt.client_id"),
    ("NETPIE_USERNAME", "mqtt.username"),
    ("NETPIE_PASSWORD", "mqtt.password"),
    ("PORT", "http.port"),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("missing required NETPIE env vars: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid http bind address {0:?}")]
    InvalidBind(String),
}

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub http: HttpConfig,
    pub status: StatusConfig,
}

/// `[mqtt]` section: broker connection and subscription.
#[derive(Clone, Deserialize)]
pub struct MqttConfig {
    /// Broker URL, `mqtt://` / `tcp://` for plain TCP, `mqtts://` / `ssl://` for TLS.
    pub host: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub topic: String,
    pub keep_alive_secs: u64,
    pub reconnect_delay_ms: u64,
    /// Request channel capacity handed to the MQTT client.
    pub channel_capacity: usize,
}

impl MqttConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl std::fmt::Debug for MqttConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttConfig")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("topic", &self.topic)
            .field("keep_alive_secs", &self.keep_alive_secs)
            .field("reconnect_delay_ms", &self.reconnect_delay_ms)
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

/// `[http]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Directory of static dashboard assets served at `/`.
    pub public_dir: PathBuf,
}

impl HttpConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|_| ConfigError::InvalidBind(self.bind.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// `[status]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    pub stale_after_ms: u64,
}

impl StatusConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `path` (or `smartlight.toml` if present) plus the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, &std::env::vars().collect())
    }

    /// Like [`load`](Self::load) but reading variables from `env` instead of
    /// the process environment.
    pub fn load_with(path: Option<&Path>, env: &config::Map<String, String>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        // Deployment names rewritten to `SECTION__KEY` so they layer like any
        // other environment source.
        let deployment: config::Map<String, String> = ENV_OVERRIDES
            .iter()
            .filter_map(|(var, key)| {
                let value = env.get(*var)?.trim();
                (!value.is_empty()).then(|| (key.replace('.', "__"), value.to_string()))
            })
            .collect();

        builder = builder
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(deployment)),
            )
            .add_source(
                config::Environment::with_prefix("SMARTLIGHT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Check the broker settings required to connect. Lists every missing
    /// value by its environment variable name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("NETPIE_CLIENT_ID", &self.mqtt.client_id),
            ("NETPIE_USERNAME", &self.mqtt.username),
            ("NETPIE_PASSWORD", &self.mqtt.password),
            ("NETPIE_HOST", &self.mqtt.host),
        ];
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
