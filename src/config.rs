use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "RELAYCACHE_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub origin: OriginConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the proxy accepts clients on
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:54321".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Port dialed when the Host header names no port
    pub default_port: u16,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self { default_port: 80 }
    }
}

impl Config {
    /// Builds the runtime config: file from `RELAYCACHE_CONFIG` if set,
    /// defaults otherwise, then the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg = serde_yaml::from_str(raw)?;
        Ok(cfg)
    }
}
