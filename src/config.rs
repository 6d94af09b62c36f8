use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Default log filter: off | error | warn | info | debug | trace
    #[serde(default = "Config::default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub paths: PathsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            paths: PathsConfig::default(),
        }
    }
}

const VALID_LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Python interpreter path or command name
    #[serde(default = "PathsConfig::default_python")]
    pub python: String,

    /// Directory holding the bundled wheels (empty: ~/.ensurepip/bundled)
    #[serde(default)]
    pub bundle_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            python: Self::default_python(),
            bundle_dir: String::new(),
        }
    }
}

impl PathsConfig {
    fn default_python() -> String {
        "python3".to_string()
    }
}

impl Config {
    fn default_log_level() -> String {
        "warn".to_string()
    }

    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(&path)
            .context(format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .context(format!("failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let parent = ensurepip_home()?;
        let path = parent.join("config.toml");
        fs::create_dir_all(&parent).context(format!(
            "failed to create config directory: {}",
            parent.display()
        ))?;
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, contents)
            .context(format!("failed to write config file: {}", path.display()))
    }

    /// Where the bundled wheels live, honoring an explicit override.
    pub fn bundle_dir(&self) -> Result<PathBuf> {
        if self.paths.bundle_dir.is_empty() {
            Ok(ensurepip_home()?.join("bundled"))
        } else {
            Ok(PathBuf::from(&self.paths.bundle_dir))
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "python" => Some(self.paths.python.clone()),
            "bundle_dir" => Some(self.paths.bundle_dir.clone()),
            "log_level" => Some(self.log_level.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "python" => {
                if value.is_empty() {
                    anyhow::bail!("python must not be empty");
                }
                self.paths.python = value.to_string();
                Ok(true)
            }
            "bundle_dir" => {
                self.paths.bundle_dir = value.to_string();
                Ok(true)
            }
            "log_level" => {
                let normalized = value.to_lowercase();
                if !VALID_LOG_LEVELS.contains(&normalized.as_str()) {
                    anyhow::bail!(
                        "invalid log_level '{}', expected one of: {}",
                        value,
                        VALID_LOG_LEVELS.join(", ")
                    );
                }
                self.log_level = normalized;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("python".to_string(), self.paths.python.clone()),
            ("bundle_dir".to_string(), self.paths.bundle_dir.clone()),
            ("log_level".to_string(), self.log_level.clone()),
        ]
    }

    pub fn reset() -> Result<Self> {
        let config = Config::default();
        config.save()?;
        Ok(config)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensurepip_home()?.join("config.toml"))
}

pub fn ensurepip_home() -> Result<PathBuf> {
    let home = home_dir()?;
    Ok(home.join(".ensurepip"))
}

pub fn home_dir() -> Result<PathBuf> {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("failed to determine home directory")?;
    Ok(PathBuf::from(home))
}
