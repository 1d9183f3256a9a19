//! The process-wide manager holder
//!
//! [`Managers`] aggregates the top-level services every plugin and manager
//! can reach: configuration and the runtime paths. It is shared as an
//! `Arc<Managers>`, handed to plugin entry points by pointer and to each
//! manager through [`Manager::set_managers`](crate::Manager::set_managers).
//!
//! A plugin library links its own copy of `log`, with no logger installed.
//! The holder carries the host's logger so plugin entry points can route
//! their records to it (see [`HostLogger`]).

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use crate::config::RuntimeConfig;
use crate::error::{PluginError, Result};

/// Name under which the runtime `[settings]` table is registered
pub const RUNTIME_SETTINGS: &str = "runtime";

/// Named TOML documents with typed lookups by dotted key
#[derive(Debug, Default)]
pub struct ConfigManager {
    documents: RwLock<HashMap<String, toml::Table>>,
}

impl ConfigManager {
    /// Create an empty config manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the TOML file at `path` and register it as `name`
    pub fn load(&self, path: impl AsRef<Path>, name: &str) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content)
            .map_err(|e| PluginError::config(path, e.to_string()))?;
        self.insert(name, table);
        log::debug!("Loaded config '{}' from {}", name, path.display());
        Ok(())
    }

    /// Register a parsed document as `name`, replacing any previous one
    pub fn insert(&self, name: &str, table: toml::Table) {
        self.documents.write().insert(name.to_string(), table);
    }

    /// Check whether a document is registered
    pub fn contains(&self, name: &str) -> bool {
        self.documents.read().contains_key(name)
    }

    /// Look up `key` (dotted, e.g. `"window.title"`) in document `name`
    pub fn get(&self, name: &str, key: &str) -> Option<toml::Value> {
        let documents = self.documents.read();
        let mut parts = key.split('.');
        let mut value = documents.get(name)?.get(parts.next()?)?;
        for part in parts {
            value = value.as_table()?.get(part)?;
        }
        Some(value.clone())
    }

    /// String value
    pub fn get_string(&self, name: &str, key: &str) -> Option<String> {
        match self.get(name, key)? {
            toml::Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean value
    pub fn get_bool(&self, name: &str, key: &str) -> Option<bool> {
        self.get(name, key)?.as_bool()
    }

    /// Float value; integers are widened
    pub fn get_float(&self, name: &str, key: &str) -> Option<f64> {
        match self.get(name, key)? {
            toml::Value::Float(f) => Some(f),
            toml::Value::Integer(i) => Some(i as f64),
            _ => None,
        }
    }

    /// Integer value
    pub fn get_int(&self, name: &str, key: &str) -> Option<i64> {
        self.get(name, key)?.as_integer()
    }

    /// Deserialize the value at `key` into `T`
    pub fn get_as<T: DeserializeOwned>(&self, name: &str, key: &str) -> Option<T> {
        self.get(name, key)?.try_into().ok()
    }
}

/// The host's logger and level filter, as captured when the holder is built
#[derive(Clone, Copy)]
pub struct HostLogger {
    logger: &'static dyn log::Log,
    level: log::LevelFilter,
}

impl HostLogger {
    /// Wrap an explicit logger
    pub const fn new(logger: &'static dyn log::Log, level: log::LevelFilter) -> Self {
        Self { logger, level }
    }

    /// The logger and level currently installed in this module's `log`
    pub fn capture() -> Self {
        Self::new(log::logger(), log::max_level())
    }

    /// Level filter to apply
    pub fn level(&self) -> log::LevelFilter {
        self.level
    }

    /// Install the logger into the calling module's `log`.
    ///
    /// Returns false when host logging is off or a logger is already
    /// installed, which is always the case inside the host itself.
    pub fn install(&self) -> bool {
        if self.level == log::LevelFilter::Off {
            return false;
        }
        if log::set_logger(self.logger).is_err() {
            return false;
        }
        log::set_max_level(self.level);
        true
    }
}

impl fmt::Debug for HostLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostLogger").field("level", &self.level).finish()
    }
}

/// Process-wide aggregate of the runtime's top-level services
#[derive(Debug)]
pub struct Managers {
    config: ConfigManager,
    exe_dir: PathBuf,
    plugin_dir: PathBuf,
    logger: HostLogger,
}

impl Managers {
    /// Build the holder for `config`, resolving paths against the executable
    pub fn new(config: &RuntimeConfig) -> Self {
        let exe_dir = executable_dir();
        let plugin_dir = config.plugins.resolve_dir(&exe_dir);
        let managers = Self::with_paths(exe_dir, plugin_dir);
        managers.config.insert(RUNTIME_SETTINGS, config.settings.clone());
        managers
    }

    /// Build the holder with explicit paths
    pub fn with_paths(exe_dir: impl Into<PathBuf>, plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: ConfigManager::new(),
            exe_dir: exe_dir.into(),
            plugin_dir: plugin_dir.into(),
            logger: HostLogger::capture(),
        }
    }

    /// Replace the logger handed to plugin libraries
    pub fn with_logger(mut self, logger: HostLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Configuration documents
    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// Directory of the running executable
    pub fn exe_dir(&self) -> &Path {
        &self.exe_dir
    }

    /// Directory scanned for plugin libraries
    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Logger that plugin libraries forward their records to
    pub fn host_logger(&self) -> HostLogger {
        self.logger
    }
}

/// Directory containing the running executable, or `.` if unknown
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigManager {
        let config = ConfigManager::new();
        let table: toml::Table = toml::from_str(
            r#"
            title = "Void"
            [physics]
            substeps = 4
            gravity = -9.81
            enabled = true
            layers = ["static", "dynamic"]
            "#,
        )
        .unwrap();
        config.insert("game", table);
        config
    }

    #[test]
    fn test_typed_getters() {
        let config = sample();
        assert_eq!(config.get_string("game", "title").as_deref(), Some("Void"));
        assert_eq!(config.get_int("game", "physics.substeps"), Some(4));
        assert_eq!(config.get_float("game", "physics.gravity"), Some(-9.81));
        assert_eq!(config.get_float("game", "physics.substeps"), Some(4.0));
        assert_eq!(config.get_bool("game", "physics.enabled"), Some(true));
    }

    #[test]
    fn test_missing_and_mismatched() {
        let config = sample();
        assert!(config.get_string("game", "physics.substeps").is_none());
        assert!(config.get_int("game", "physics.missing").is_none());
        assert!(config.get_int("other", "title").is_none());
        assert!(config.get_bool("game", "title.deeper").is_none());
    }

    #[test]
    fn test_get_as() {
        let config = sample();
        let layers: Vec<String> = config.get_as("game", "physics.layers").unwrap();
        assert_eq!(layers, vec!["static".to_string(), "dynamic".to_string()]);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio.toml");
        std::fs::write(&path, "volume = 0.5\n").unwrap();

        let config = ConfigManager::new();
        config.load(&path, "audio").unwrap();
        assert!(config.contains("audio"));
        assert_eq!(config.get_float("audio", "volume"), Some(0.5));

        std::fs::write(&path, "volume = ").unwrap();
        assert!(config.load(&path, "broken").is_err());
        assert!(config.load(dir.path().join("none.toml"), "none").is_err());
    }

    #[test]
    fn test_managers_settings() {
        let mut runtime = RuntimeConfig::default();
        runtime.settings.insert("name".into(), toml::Value::String("host".into()));

        let managers = Managers::new(&runtime);
        assert_eq!(managers.config().get_string(RUNTIME_SETTINGS, "name").as_deref(), Some("host"));
        assert!(managers.plugin_dir().ends_with("plugins"));
    }

    struct CountingLogger {
        records: parking_lot::Mutex<Vec<String>>,
    }

    impl log::Log for CountingLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            self.records.lock().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    static COUNTING: CountingLogger = CountingLogger {
        records: parking_lot::Mutex::new(Vec::new()),
    };

    #[test]
    fn test_host_logger_install() {
        assert!(!HostLogger::new(&COUNTING, log::LevelFilter::Off).install());

        let host = HostLogger::new(&COUNTING, log::LevelFilter::Debug);
        let managers = Managers::with_paths(".", "plugins").with_logger(host);
        assert_eq!(managers.host_logger().level(), log::LevelFilter::Debug);

        // Only the first install in a module wins
        assert!(managers.host_logger().install());
        assert!(!managers.host_logger().install());

        log::debug!("routed to the host");
        assert!(COUNTING.records.lock().iter().any(|r| r == "routed to the host"));
        assert_eq!(HostLogger::capture().level(), log::LevelFilter::Debug);
    }
}
