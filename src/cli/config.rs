// ABOUTME: Configuration management for the switchyard application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Durable workflow run log.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Executor catalog maintained by the onboarding process.
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Optional route table file; without one, routing relies on fuzzy
    /// matching only.
    #[serde(default)]
    pub routes_path: Option<PathBuf>,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_steps: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            registry_path: default_registry_path(),
            routes_path: None,
            max_concurrent_steps: default_max_concurrent(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("switchyard-runs.json")
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("agents.json")
}

fn default_max_concurrent() -> usize {
    4
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = serde_yaml::from_str(&contents)?;

            config.merge_env()?;

            Ok(config)
        } else {
            let mut config = Config::default();
            config.merge_env()?;
            Ok(config)
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Result<PathBuf> {
        let possible_paths = vec![
            PathBuf::from("switchyard.yaml"),
            PathBuf::from("switchyard.yml"),
            PathBuf::from(".switchyard.yaml"),
            PathBuf::from(".switchyard.yml"),
        ];

        // Check home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".switchyard").join("config.yaml");
            if home_config.exists() {
                return Ok(home_config);
            }
        }

        // Check current directory
        for path in possible_paths {
            if path.exists() {
                return Ok(path);
            }
        }

        // Return default path (may not exist)
        Ok(PathBuf::from("switchyard.yaml"))
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(state_path) = std::env::var("SWITCHYARD_STATE_PATH") {
            self.state_path = PathBuf::from(state_path);
        }
        if let Ok(registry) = std::env::var("SWITCHYARD_REGISTRY") {
            self.registry_path = PathBuf::from(registry);
        }
        if let Ok(routes) = std::env::var("SWITCHYARD_ROUTES") {
            self.routes_path = Some(PathBuf::from(routes));
        }
        if let Ok(max_steps) = std::env::var("SWITCHYARD_MAX_CONCURRENT") {
            self.max_concurrent_steps = max_steps.parse()?;
        }

        // Logging configuration
        if let Ok(level) = std::env::var("SWITCHYARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SWITCHYARD_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }
}
