use crate::{EqusendError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub network: NetworkSettings,
    pub transfer: TransferSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub host: String,
    pub port: u16,
    /// Per-connection timeout for connect and send; 0 disables it and the
    /// call may block indefinitely on an unresponsive peer.
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Upper bound on concurrently open outbound connections.
    pub workers: usize,
    /// Extension of recognized equation files, without the dot.
    pub extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: NetworkSettings {
                host: "127.0.0.1".to_string(),
                port: 31337,
                timeout_seconds: 30,
            },
            transfer: TransferSettings {
                workers: default_worker_count(),
                extension: "equ".to_string(),
            },
        }
    }
}

/// Core count plus a little headroom, so a handful of sockets stay in
/// flight without unbounded fan-out.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        + 4
}

impl Settings {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = match config_path {
            Some(path) => PathBuf::from(path),
            None => Self::default_config_path()?,
        };

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| EqusendError::Config(format!("Failed to read config: {}", e)))?;

            let settings: Settings = toml::from_str(&content)
                .map_err(|e| EqusendError::Config(format!("Failed to parse config: {}", e)))?;

            settings.validate()?;
            Ok(settings)
        } else {
            let settings = Self::default();
            settings.save(Some(&path))?;
            Ok(settings)
        }
    }

    pub fn save(&self, config_path: Option<&Path>) -> Result<()> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EqusendError::Config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| EqusendError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| EqusendError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Reject values the client cannot run with. Called on load and again
    /// after any CLI overrides are applied.
    pub fn validate(&self) -> Result<()> {
        if self.network.port == 0 {
            return Err(EqusendError::Config("port must be 1-65535".to_string()));
        }
        if self.transfer.workers == 0 {
            return Err(EqusendError::Config(
                "transfer.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "equsend", "client").ok_or_else(|| {
            EqusendError::Config("Failed to get project directories".to_string())
        })?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.network.host, self.network.port)
    }

    pub fn send_timeout(&self) -> Option<Duration> {
        if self.network.timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.network.timeout_seconds))
        }
    }
}
