//! Configuration loaded from an optional YAML file plus environment overrides.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::http::connection::DEFAULT_READ_SIZE;

/// Env var naming the YAML config file
pub const CONFIG_ENV: &str = "RAWHTTP_CONFIG";
/// Env var overriding `server.listen_addr`
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub routes: RoutesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Bytes requested per socket read while parsing a request
    pub read_buffer_size: usize,
    pub dispatch: DispatchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:42069".to_string(),
            read_buffer_size: DEFAULT_READ_SIZE,
            dispatch: DispatchConfig::default(),
        }
    }
}

/// How accepted connections are handed to tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchConfig {
    /// One task per connection with no limit
    #[default]
    Unbounded,
    /// At most `max_connections` in flight; accepting waits for a free slot
    Bounded { max_connections: usize },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// File served at `/video`
    pub video_path: String,
    /// Plain-HTTP base URL relayed under `/httpbin/`
    pub upstream: String,
    /// Size of each chunk relayed from the upstream
    pub relay_chunk_size: usize,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            video_path: "assets/vim.mp4".to_string(),
            upstream: "http://httpbin.org".to_string(),
            relay_chunk_size: 32,
        }
    }
}

impl Config {
    /// Loads the file named by `RAWHTTP_CONFIG` (defaults when unset), then
    /// applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        cfg.apply_listen_override(std::env::var(LISTEN_ENV).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(content).context("Invalid config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_listen_override(&mut self, listen_addr: Option<String>) {
        if let Some(addr) = listen_addr {
            self.server.listen_addr = addr;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.read_buffer_size == 0 {
            anyhow::bail!("server.read_buffer_size must be greater than zero");
        }
        if self.routes.relay_chunk_size == 0 {
            anyhow::bail!("routes.relay_chunk_size must be greater than zero");
        }
        if let DispatchConfig::Bounded { max_connections: 0 } = self.server.dispatch {
            anyhow::bail!("server.dispatch.max_connections must be greater than zero");
        }
        url::Url::parse(&self.routes.upstream).context("routes.upstream is not a valid URL")?;
        Ok(())
    }
}
