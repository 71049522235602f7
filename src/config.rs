use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

use crate::transport::wire::ServerContext;

pub const CONFIG_FILE_VAR: &str = "PORTICO_CONFIG";
pub const LISTEN_VAR: &str = "PORTICO_LISTEN";
pub const SERVER_NAME_VAR: &str = "PORTICO_SERVER_NAME";
pub const SCRIPT_BASE_VAR: &str = "PORTICO_SCRIPT_BASE";

/// Dev-server settings.
///
/// Defaults, then the YAML file named by `PORTICO_CONFIG`, then individual
/// environment variables; each layer overrides the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub server_name: String,
    pub script_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            server_name: "127.0.0.1".to_string(),
            script_base: "/".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml(&text).with_context(|| format!("parsing config file {}", path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(v) = std::env::var(LISTEN_VAR) {
            cfg.listen_addr = v;
        }
        if let Ok(v) = std::env::var(SERVER_NAME_VAR) {
            cfg.server_name = v;
        }
        if let Ok(v) = std::env::var(SCRIPT_BASE_VAR) {
            cfg.script_base = v;
        }

        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Port part of `listen_addr`, or 0 if it has none.
    pub fn listen_port(&self) -> u16 {
        if let Ok(addr) = self.listen_addr.parse::<SocketAddr>() {
            return addr.port();
        }
        self.listen_addr
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
            .unwrap_or(0)
    }

    pub fn server_context(&self) -> ServerContext {
        ServerContext {
            server_name: self.server_name.clone(),
            server_port: self.listen_port(),
            script_base: self.script_base.clone(),
        }
    }
}
