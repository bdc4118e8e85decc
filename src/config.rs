use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
    #[serde(default = "default_short_toast_ms")]
    pub short_toast_ms: u64,
    #[serde(default = "default_clone_refresh_delay_ms")]
    pub clone_refresh_delay_ms: u64,
    #[serde(default = "default_create_redirect_delay_ms")]
    pub create_redirect_delay_ms: u64,
    #[serde(default = "default_status_poll_secs")]
    pub status_poll_secs: u64,
    #[serde(default = "default_focus_delay_ms")]
    pub focus_delay_ms: u64,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            toast_ms: default_toast_ms(),
            short_toast_ms: default_short_toast_ms(),
            clone_refresh_delay_ms: default_clone_refresh_delay_ms(),
            create_redirect_delay_ms: default_create_redirect_delay_ms(),
            status_poll_secs: default_status_poll_secs(),
            focus_delay_ms: default_focus_delay_ms(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub toast: Duration,
    pub short_toast: Duration,
    pub clone_refresh_delay: Duration,
    pub create_redirect_delay: Duration,
    pub status_poll: Duration,
    pub focus_delay: Duration,
    pub search_debounce: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Config::default().timing()
    }
}

impl Config {
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
            Ok(cfg)
        } else {
            let cfg = Config::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            toast: Duration::from_millis(self.toast_ms),
            short_toast: Duration::from_millis(self.short_toast_ms),
            clone_refresh_delay: Duration::from_millis(self.clone_refresh_delay_ms),
            create_redirect_delay: Duration::from_millis(self.create_redirect_delay_ms),
            // A zero interval would make tokio::time::interval panic.
            status_poll: Duration::from_secs(self.status_poll_secs.max(1)),
            focus_delay: Duration::from_millis(self.focus_delay_ms),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
        }
    }
}

pub fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot resolve home dir")?;
    Ok(home.join(".minigit-ui"))
}

pub fn ensure_data_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("create {}", path.display()))?;
    Ok(())
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_toast_ms() -> u64 {
    5000
}

fn default_short_toast_ms() -> u64 {
    2000
}

fn default_clone_refresh_delay_ms() -> u64 {
    1000
}

fn default_create_redirect_delay_ms() -> u64 {
    1500
}

fn default_status_poll_secs() -> u64 {
    30
}

fn default_focus_delay_ms() -> u64 {
    100
}

fn default_search_debounce_ms() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_default_config_on_first_load() -> Result<()> {
        let dir = tempdir()?;
        let path = config_path(dir.path());
        let cfg = Config::load_or_create(&path)?;
        assert!(path.exists());
        assert_eq!(cfg.server_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.timing().toast, Duration::from_millis(5000));
        Ok(())
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = config_path(dir.path());
        std::fs::write(&path, "server_url = \"http://localhost:8080\"\nstatus_poll_secs = 0\n")?;
        let cfg = Config::load_or_create(&path)?;
        assert_eq!(cfg.server_url, "http://localhost:8080");
        assert_eq!(cfg.clone_refresh_delay_ms, 1000);
        assert_eq!(cfg.timing().status_poll, Duration::from_secs(1));
        Ok(())
    }
}
