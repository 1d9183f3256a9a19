//! Runtime Configuration
//!
//! Controls where plugins are discovered and which ones are refused.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `VOID_PLUGIN_DIR`, `VOID_PLUGIN_BLACKLIST`
//!    (comma separated), `VOID_LOAD_PLUGINS` (`0`/`false` disables loading)
//! 2. Config file: `void.toml` or `config/void.toml`, first found wins
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! [plugins]
//! dir = "plugins"          # relative to the executable directory
//! blacklist = ["legacy_audio"]
//! load_dynamic = true
//!
//! [settings]
//! window.title = "Void"
//! physics.substeps = 4
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, Result};

/// Default plugin directory, relative to the executable directory
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";

/// Config file locations searched by [`RuntimeConfig::load`]
pub const CONFIG_PATHS: &[&str] = &["void.toml", "config/void.toml"];

/// Plugin discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Plugin directory; relative paths resolve against the executable directory
    pub dir: PathBuf,
    /// Plugin names that are never loaded
    pub blacklist: BTreeSet<String>,
    /// Whether shared libraries are discovered at all
    pub load_dynamic: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_PLUGIN_DIR),
            blacklist: BTreeSet::new(),
            load_dynamic: true,
        }
    }
}

impl PluginConfig {
    /// Resolve the plugin directory against `exe_dir`
    pub fn resolve_dir(&self, exe_dir: &Path) -> PathBuf {
        if self.dir.is_absolute() {
            self.dir.clone()
        } else {
            exe_dir.join(&self.dir)
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Plugin discovery
    pub plugins: PluginConfig,
    /// Free-form settings exposed through the config manager as `"runtime"`
    pub settings: toml::Table,
    /// Config file path (for reloading)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Load configuration from all sources
    pub fn load() -> Self {
        let mut config = Self::default();

        for path in CONFIG_PATHS {
            if !Path::new(path).exists() {
                continue;
            }
            match Self::load_from_file(path) {
                Ok(loaded) => {
                    config = loaded;
                    log::info!("Loaded runtime config from {}", path);
                    break;
                }
                Err(e) => log::warn!("Ignoring config file: {}", e),
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| PluginError::config(path, e.to_string()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PluginError::config("<inline>", e.to_string()))
    }

    /// Apply overrides from a variable lookup (the environment in [`load`](Self::load))
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var("VOID_PLUGIN_DIR").filter(|d| !d.is_empty()) {
            log::info!("Plugin directory from env: {}", dir);
            self.plugins.dir = PathBuf::from(dir);
        }

        if let Some(list) = var("VOID_PLUGIN_BLACKLIST") {
            self.plugins.blacklist.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from),
            );
        }

        if let Some(flag) = var("VOID_LOAD_PLUGINS") {
            self.plugins.load_dynamic = !matches!(flag.trim(), "0" | "false" | "no" | "off");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.plugins.dir, PathBuf::from("plugins"));
        assert!(config.plugins.blacklist.is_empty());
        assert!(config.plugins.load_dynamic);
    }

    #[test]
    fn test_parse_toml() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [plugins]
            dir = "mods"
            blacklist = ["audio", "net"]

            [settings.window]
            title = "Void"
            "#,
        )
        .unwrap();

        assert_eq!(config.plugins.dir, PathBuf::from("mods"));
        assert!(config.plugins.blacklist.contains("net"));
        assert!(config.plugins.load_dynamic);
        assert!(config.settings.contains_key("window"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = RuntimeConfig::from_toml_str("[plugins\ndir = 3").unwrap_err();
        assert!(matches!(err, PluginError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VOID_PLUGIN_DIR", "/opt/void/plugins"),
            ("VOID_PLUGIN_BLACKLIST", "audio, ,physics"),
            ("VOID_LOAD_PLUGINS", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = RuntimeConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.plugins.dir, PathBuf::from("/opt/void/plugins"));
        assert_eq!(config.plugins.blacklist.len(), 2);
        assert!(config.plugins.blacklist.contains("physics"));
        assert!(!config.plugins.load_dynamic);
    }

    #[test]
    fn test_resolve_dir() {
        let config = PluginConfig::default();
        assert_eq!(
            config.resolve_dir(Path::new("/usr/lib/void")),
            PathBuf::from("/usr/lib/void/plugins")
        );
    }
}
