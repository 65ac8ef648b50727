//! Configuration management for the native panel.

use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::app::Endpoints;
use crate::sync::DEFAULT_RECONNECT_DELAY;

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    sync: SyncConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_server_url")]
    url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SyncConfig {
    #[serde(default = "default_reconnect_delay_ms")]
    reconnect_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

fn default_server_url() -> String {
    format!("http://localhost:{}", fazantix_types::DEFAULT_PORT)
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY.as_millis() as u64
}

/// Panel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// Switcher server root, e.g. `http://localhost:8000`
    pub server_url: String,
    /// Delay before reconnecting the live channel
    pub reconnect_delay_ms: u64,
    /// Log level (if set, overrides RUST_LOG environment variable)
    pub log_level: Option<String>,
}

impl PanelConfig {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `.fazantix-panel.toml` in current directory
    /// 2. `panel.toml` in user config directory (~/.config/fazantix/ on Linux)
    ///
    /// Env vars use `__` for nesting, e.g. `FAZANTIX_SYNC__RECONNECT_DELAY_MS`.
    pub fn from_figment(
        server_url: Option<String>,
        reconnect_delay_ms: Option<u64>,
        log_level: Option<String>,
    ) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".fazantix-panel.toml"));
        let user_config = directories::ProjectDirs::from("", "", "fazantix")
            .map(|dirs| dirs.config_dir().join("panel.toml"));

        // defaults < user config < local config < env vars < CLI args
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile::default()));

        if let Some(ref path) = user_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        if let Some(ref path) = local_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("FAZANTIX_").split("__"));

        if let Some(ref url) = server_url {
            figment = figment.merge(Serialized::default("server.url", url));
        }
        if let Some(delay) = reconnect_delay_ms {
            figment = figment.merge(Serialized::default("sync.reconnect_delay_ms", delay));
        }
        if let Some(ref level) = log_level {
            figment = figment.merge(Serialized::default("logging.log_level", level));
        }

        let config_file: ConfigFile = figment.extract()?;

        let server_url = config_file.server.url.trim_end_matches('/').to_string();
        if server_url.is_empty() {
            anyhow::bail!("server url must not be empty");
        }

        Ok(Self {
            server_url,
            reconnect_delay_ms: config_file.sync.reconnect_delay_ms,
            log_level: config_file.logging.log_level,
        })
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// REST and push channel endpoints derived from the server URL.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::for_server(&self.server_url, self.reconnect_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 3] = [
        "FAZANTIX_SERVER__URL",
        "FAZANTIX_SYNC__RECONNECT_DELAY_MS",
        "FAZANTIX_LOGGING__LOG_LEVEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    /// Load config from inside `dir` so the local config file is picked up.
    fn load_in(
        dir: &TempDir,
        server_url: Option<String>,
        reconnect_delay_ms: Option<u64>,
    ) -> PanelConfig {
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        let config = PanelConfig::from_figment(server_url, reconnect_delay_ms, None);
        // Restore before temp_dir is dropped, ignore errors
        let _ = std::env::set_current_dir(original_dir);
        config.unwrap()
    }

    #[test]
    #[serial]
    fn test_from_figment_defaults() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();

        let config = load_in(&temp_dir, None, None);

        assert_eq!(config.server_url, "http://localhost:8000");
        assert_eq!(config.reconnect_delay(), Duration::from_millis(2000));
        assert!(config.log_level.is_none());
    }

    #[test]
    #[serial]
    fn test_from_figment_config_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".fazantix-panel.toml"),
            r#"
[server]
url = "https://mixer.example/"

[sync]
reconnect_delay_ms = 500

[logging]
log_level = "debug"
"#,
        )
        .unwrap();

        let config = load_in(&temp_dir, None, None);

        assert_eq!(config.server_url, "https://mixer.example");
        assert_eq!(config.reconnect_delay_ms, 500);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.endpoints().ws_url, "wss://mixer.example/api/ws");
    }

    #[test]
    #[serial]
    fn test_from_figment_env_vars_override_config_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".fazantix-panel.toml"),
            "[sync]\nreconnect_delay_ms = 500",
        )
        .unwrap();
        std::env::set_var("FAZANTIX_SYNC__RECONNECT_DELAY_MS", "750");

        let config = load_in(&temp_dir, None, None);
        clear_env();

        assert_eq!(config.reconnect_delay_ms, 750);
    }

    #[test]
    #[serial]
    fn test_from_figment_cli_overrides_env_and_config() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".fazantix-panel.toml"),
            "[server]\nurl = \"http://file:1\"",
        )
        .unwrap();
        std::env::set_var("FAZANTIX_SERVER__URL", "http://env:2");

        let config = load_in(&temp_dir, Some("http://cli:3".to_string()), Some(100));
        clear_env();

        assert_eq!(config.server_url, "http://cli:3");
        assert_eq!(config.reconnect_delay_ms, 100);
    }

    #[test]
    #[serial]
    fn test_from_figment_rejects_empty_url() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = PanelConfig::from_figment(Some("/".to_string()), None, None);

        let _ = std::env::set_current_dir(original_dir);
        assert!(result.is_err());
    }
}
