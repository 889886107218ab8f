//! Configuration loading.
//!
//! Values are resolved in priority order: built-in defaults, then
//! `<config_dir>/<name>.json`, then environment variables named
//! `<PREFIX>_<NAME>_<KEY>`.

use crate::{CtError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default environment prefix
pub const ENV_PREFIX: &str = "LIQUID_CT";

/// Configuration source priority (higher number = higher priority)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    Default = 0,
    File = 1,
    Environment = 2,
}

/// Loads and saves JSON configuration files with environment overrides.
pub struct ConfigManager {
    config_dir: PathBuf,
    environment_prefix: String,
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf, environment_prefix: &str) -> Self {
        Self {
            config_dir,
            environment_prefix: environment_prefix.to_string(),
        }
    }

    fn config_path(&self, config_name: &str) -> PathBuf {
        self.config_dir.join(format!("{}.json", config_name))
    }

    /// Load configuration from all sources
    pub fn load_config<T>(&self, config_name: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de> + Serialize + Default,
    {
        let mut config_value = serde_json::to_value(T::default())?;

        let config_file_path = self.config_path(config_name);
        if config_file_path.exists() {
            let file_config = self.load_from_file(&config_file_path)?;
            merge_config_values(&mut config_value, file_config, ConfigSource::File);
        }

        let env_config = self.load_from_environment(config_name);
        merge_config_values(&mut config_value, env_config, ConfigSource::Environment);

        serde_json::from_value(config_value).map_err(|e| {
            CtError::config(&format!("Failed to deserialize config: {}", e))
                .with_context("config_name", config_name)
        })
    }

    /// Save configuration to file
    pub fn save_config<T: Serialize>(&self, config_name: &str, config: &T) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }

        let config_file_path = self.config_path(config_name);
        fs::write(&config_file_path, serde_json::to_string_pretty(config)?)?;

        log::info!("Configuration '{}' saved to {:?}", config_name, config_file_path);
        Ok(())
    }

    pub fn config_exists(&self, config_name: &str) -> bool {
        self.config_path(config_name).exists()
    }

    pub fn delete_config(&self, config_name: &str) -> Result<()> {
        let config_file_path = self.config_path(config_name);
        if config_file_path.exists() {
            fs::remove_file(&config_file_path)?;
            log::info!("Configuration '{}' deleted", config_name);
        }
        Ok(())
    }

    fn load_from_file(&self, file_path: &Path) -> Result<serde_json::Value> {
        let content = fs::read_to_string(file_path)?;
        serde_json::from_str(&content).map_err(|e| {
            CtError::config(&format!("Failed to parse config file: {}", e))
                .with_context("path", &file_path.display().to_string())
        })
    }

    /// Nested keys are addressed with a double underscore, so
    /// `LIQUID_CT_CORE_ENGINE__STRICT_DER=false` sets `engine.strict_der`.
    fn load_from_environment(&self, config_name: &str) -> serde_json::Value {
        let prefix = format!(
            "{}_{}_",
            self.environment_prefix,
            config_name.to_uppercase()
        );
        let mut env_config = serde_json::Value::Object(serde_json::Map::new());

        for (key, value) in env::vars() {
            let Some(stripped) = key.strip_prefix(&prefix) else {
                continue;
            };

            // Try to parse as JSON first, then fall back to string
            let parsed_value = serde_json::from_str(&value)
                .unwrap_or_else(|_| serde_json::Value::String(value));

            let path: Vec<String> = stripped.to_lowercase().split("__").map(str::to_string).collect();
            insert_path(&mut env_config, &path, parsed_value);
        }

        env_config
    }
}

fn insert_path(target: &mut serde_json::Value, path: &[String], value: serde_json::Value) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let serde_json::Value::Object(map) = target else {
        return;
    };

    if rest.is_empty() {
        map.insert(head.clone(), value);
    } else {
        let child = map
            .entry(head.clone())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        insert_path(child, rest, value);
    }
}

/// Recursively overlay `overlay` onto `base`.
fn merge_config_values(base: &mut serde_json::Value, overlay: serde_json::Value, source: ConfigSource) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_config_values(existing, value, source),
                    None => {
                        log::debug!("config key '{}' added from {:?}", key, source);
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay;
        }
    }
}
