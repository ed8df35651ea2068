//! Server configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (HUDDLE_*, and PORT)
//! - TOML configuration file

use anyhow::{Context, Result};
use huddle_core::HubConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HUDDLE_CONFIG";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON file with the player list.
    #[serde(default = "default_players_path")]
    pub players_path: String,

    /// Directory served for non-API paths.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Allow cross-origin requests.
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Event stream configuration.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Request limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Event stream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Path for the Server-Sent Events endpoint.
    #[serde(default = "default_sse_path")]
    pub sse_path: String,

    /// Path for the WebSocket endpoint.
    #[serde(default = "default_ws_path")]
    pub websocket_path: String,

    /// Reconnect delay suggested to clients, in milliseconds.
    #[serde(default = "default_retry_ms")]
    pub retry_ms: u64,

    /// Interval between SSE keep-alive comments, in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Events buffered per observer before it is dropped as lagging.
    #[serde(default = "default_observer_buffer")]
    pub observer_buffer: usize,
}

/// Request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum request body (and WebSocket message) size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics export.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics port.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_host() -> String {
    host_from(|key| std::env::var(key).ok())
}

fn default_port() -> u16 {
    port_from(|key| std::env::var(key).ok())
}

fn host_from(var: impl Fn(&str) -> Option<String>) -> String {
    var("HUDDLE_HOST").unwrap_or_else(|| "127.0.0.1".to_string())
}

/// `HUDDLE_PORT` wins over `PORT`. Unparseable values are skipped.
fn port_from(var: impl Fn(&str) -> Option<String>) -> u16 {
    ["HUDDLE_PORT", "PORT"]
        .iter()
        .find_map(|key| var(key).and_then(|p| p.trim().parse().ok()))
        .unwrap_or(3001)
}

fn default_players_path() -> String {
    "players.json".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sse_path() -> String {
    "/sse".to_string()
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_retry_ms() -> u64 {
    10_000
}

fn default_keep_alive_secs() -> u64 {
    15
}

fn default_observer_buffer() -> usize {
    huddle_core::hub::DEFAULT_OBSERVER_BUFFER
}

fn default_max_body_bytes() -> usize {
    1_000_000
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            players_path: default_players_path(),
            static_dir: default_static_dir(),
            cors: true,
            stream: StreamConfig::default(),
            limits: LimitsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sse_path: default_sse_path(),
            websocket_path: default_ws_path(),
            retry_ms: default_retry_ms(),
            keep_alive_secs: default_keep_alive_secs(),
            observer_buffer: default_observer_buffer(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from file or defaults.
    ///
    /// `HUDDLE_CONFIG` names an explicit file; otherwise the first existing
    /// default path is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(shellexpand::tilde(&path).as_ref());
        }

        let config_paths = [
            "huddle.toml",
            "/etc/huddle/huddle.toml",
            "~/.config/huddle/huddle.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Get the socket address to bind to.
    ///
    /// # Errors
    ///
    /// Returns an error if host and port do not form a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Hub settings derived from the stream section.
    #[must_use]
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            observer_buffer: self.stream.observer_buffer,
        }
    }
}
