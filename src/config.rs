use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::trace;

use crate::util;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub slack: SlackConfig,

    /// Listener for incoming mention events
    #[serde(default)]
    pub server: ServerConfig,

    /// Seconds between two monitoring ticks
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Start monitoring on every channel right after bootstrap
    #[serde(default = "default_autostart")]
    pub autostart: bool,

    /// Base URL of the PurpleAir JSON endpoint
    #[serde(default = "default_sensor_url")]
    pub sensor_url: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`), overridden by `SLACK_TOKEN`
    pub token: Option<String>,

    /// Legacy verification token checked on incoming events
    pub verification_token: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Log messages instead of posting them
    #[serde(default)]
    pub silent: bool,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: None,
            verification_token: None,
            api_url: default_api_url(),
            silent: false,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: IpAddr,
    #[serde(default = "crate::util::get_default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: util::get_default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }
}

fn default_interval() -> u64 {
    600
}

fn default_autostart() -> bool {
    true
}

fn default_sensor_url() -> String {
    String::from("https://www.purpleair.com/json")
}

fn default_api_url() -> String {
    String::from("https://slack.com/api")
}

fn default_addr() -> IpAddr {
    IpAddr::V4(util::get_default_addr())
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    /// Environment variables take precedence over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(token) = util::get_slack_token() {
            self.slack.token = Some(token);
        }
        if let Some(token) = util::get_verification_token() {
            self.slack.verification_token = Some(token);
        }
        if util::is_silent() {
            self.slack.silent = true;
        }
        self
    }
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    parse_config(&file_content)
        .map(Config::with_env_overrides)
        .inspect(|config| trace!("loaded config: {config:?}"))
}
