//! Plugin manager - discovers, loads and registers plugins
//!
//! Dynamic plugins are shared libraries found in the plugin directory. Each
//! gets its own plugin namespace (ids 1, 2, ... in load order) and hands one
//! manager to the [`ControllerManager`]. Static plugins are compiled in and
//! share the [`STATIC_PLUGIN_ID`] namespace.
//!
//! A plugin that cannot be loaded is skipped with a warning; discovery
//! carries on with the next candidate.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use void_core::{Namespace, PluginId, TypeKey};

use crate::config::PluginConfig;
use crate::controller::ControllerManager;
use crate::discovery::{list_libraries, plugin_name};
use crate::error::{PluginError, Result};
use crate::library::PluginLibrary;
use crate::manager::Manager;

/// Name of the pseudo-plugin owning compiled-in plugins
pub const STATIC_PLUGIN: &str = "static";

/// Plugin id of the pseudo-plugin owning compiled-in plugins
pub const STATIC_PLUGIN_ID: PluginId = 0;

/// Where a plugin came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOrigin {
    /// Compiled into the host
    Static,
    /// Loaded from a shared library
    Dynamic(PathBuf),
}

/// Metadata about a registered plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub namespace: Namespace,
    pub manager: TypeKey,
    pub origin: PluginOrigin,
}

struct PluginRecord {
    info: PluginInfo,
    /// Kept open for as long as the plugin is registered
    library: Option<PluginLibrary>,
}

/// Discovers and registers plugins
pub struct PluginManager {
    plugin_dir: PathBuf,
    load_dynamic: bool,
    blacklist: BTreeSet<String>,
    plugins: BTreeMap<String, PluginRecord>,
    next_plugin_id: PluginId,
}

impl PluginManager {
    /// Create a plugin manager scanning `plugin_dir`
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            load_dynamic: true,
            blacklist: BTreeSet::new(),
            plugins: BTreeMap::new(),
            next_plugin_id: STATIC_PLUGIN_ID + 1,
        }
    }

    /// Create a plugin manager from configuration
    pub fn from_config(config: &PluginConfig, plugin_dir: impl Into<PathBuf>) -> Self {
        let mut plugins = Self::new(plugin_dir);
        plugins.set_black_list(config.blacklist.iter().cloned());
        plugins.load_dynamic = config.load_dynamic;
        plugins
    }

    /// Refuse every plugin whose name is in `names`
    pub fn set_black_list(&mut self, names: impl IntoIterator<Item = String>) {
        self.blacklist = names.into_iter().collect();
    }

    /// Check whether `name` is blacklisted
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(name)
    }

    /// Directory scanned for plugin libraries
    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Register a compiled-in plugin providing manager `T`
    pub fn add<T: Manager + Default>(&mut self, controllers: &mut ControllerManager) -> Result<()> {
        let type_key = TypeKey::of::<T>();
        let name = type_key.short_name().to_string();

        if self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyLoaded(name));
        }

        let namespace = Namespace::plugin(STATIC_PLUGIN_ID);
        if controllers.add(T::default(), namespace).is_err() {
            return Err(PluginError::DuplicateManager(type_key.name().to_string()));
        }

        log::info!("Registered {} plugin '{}'", STATIC_PLUGIN, name);
        self.plugins.insert(
            name.clone(),
            PluginRecord {
                info: PluginInfo {
                    name,
                    namespace,
                    manager: type_key,
                    origin: PluginOrigin::Static,
                },
                library: None,
            },
        );
        Ok(())
    }

    /// Discover and load every plugin in the plugin directory.
    ///
    /// Returns the number of plugins loaded. Failures are logged and skipped.
    pub fn on_pre_init(&mut self, controllers: &mut ControllerManager) -> usize {
        if !self.load_dynamic {
            log::info!("Dynamic plugin loading is disabled");
            return 0;
        }

        let candidates = match list_libraries(&self.plugin_dir) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("Cannot scan plugin directory {}: {}", self.plugin_dir.display(), e);
                return 0;
            }
        };

        let mut loaded = 0;
        for path in candidates {
            match self.load_plugin(&path, controllers) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("Skipping plugin {}: {}", path.display(), e),
            }
        }

        log::info!("Loaded {} plugin(s) from {}", loaded, self.plugin_dir.display());
        loaded
    }

    /// Load the plugin library at `path` and register its manager.
    ///
    /// Returns the plugin name. On any failure the library is unloaded again.
    pub fn load_plugin(&mut self, path: &Path, controllers: &mut ControllerManager) -> Result<String> {
        let name = plugin_name(path).ok_or_else(|| PluginError::InvalidName(path.to_path_buf()))?;

        if self.is_blacklisted(&name) {
            return Err(PluginError::Blacklisted(name));
        }
        if self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyLoaded(name));
        }

        let library = PluginLibrary::open(path, name.as_str())?;
        let export = library.load_export(controllers.managers())?;
        let type_key = export.type_key;
        let namespace = Namespace::plugin(self.next_plugin_id);

        if let Err(rejected) = controllers.add_ext(type_key, export.manager, namespace) {
            // The type name and the manager's code live in the library
            let type_name = type_key.name().to_string();
            drop(rejected);
            drop(library);
            return Err(PluginError::DuplicateManager(type_name));
        }
        self.next_plugin_id += 1;

        log::info!(
            "Loaded plugin '{}' ({}) in namespace {}",
            name,
            type_key.short_name(),
            namespace
        );

        self.plugins.insert(
            name.clone(),
            PluginRecord {
                info: PluginInfo {
                    name: name.clone(),
                    namespace,
                    manager: type_key,
                    origin: PluginOrigin::Dynamic(path.to_path_buf()),
                },
                library: Some(library),
            },
        );
        Ok(name)
    }

    /// Release a dynamic plugin's namespace, then unload its library
    pub fn unload(&mut self, name: &str, controllers: &mut ControllerManager) -> Result<()> {
        let record = match self.plugins.get(name) {
            Some(record) => record,
            None => return Err(PluginError::NotFound(name.to_string())),
        };
        if record.info.origin == PluginOrigin::Static {
            return Err(PluginError::StaticPlugin(name.to_string()));
        }

        let namespace = record.info.namespace;
        controllers.on_release_namespace(namespace);
        self.plugins.remove(name);

        log::info!("Unloaded plugin '{}'", name);
        Ok(())
    }

    /// Check whether a plugin called `name` is registered
    pub fn is_loaded(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Namespace of the plugin called `name`
    pub fn namespace_of(&self, name: &str) -> Option<Namespace> {
        self.plugins.get(name).map(|record| record.info.namespace)
    }

    /// Metadata of the plugin called `name`
    pub fn info(&self, name: &str) -> Option<&PluginInfo> {
        self.plugins.get(name).map(|record| &record.info)
    }

    /// Names of all registered plugins, sorted
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        // Managers from these libraries may outlive us in the controller
        // manager, so registered libraries stay mapped until the process exits.
        for record in std::mem::take(&mut self.plugins).into_values() {
            if let Some(library) = record.library {
                std::mem::forget(library);
            }
        }
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugin_dir", &self.plugin_dir)
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .field("blacklist", &self.blacklist)
            .finish()
    }
}
