//! Dynamic library loading for plugins
//!
//! Handles opening a plugin's shared library, resolving its entry point and
//! calling it. The library is unloaded when the [`PluginLibrary`] is dropped,
//! so everything the plugin created must be dropped first.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::discovery::entry_symbol;
use crate::error::{PluginError, Result};
use crate::export::{PluginEntryFn, PluginExport};
use crate::managers::Managers;

/// An opened plugin shared library
pub struct PluginLibrary {
    /// The underlying library handle
    library: Library,
    /// Library file path
    path: PathBuf,
    /// Plugin name derived from the file name
    name: String,
}

impl PluginLibrary {
    /// Open the library at `path` as plugin `name`
    pub fn open(path: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();

        // Load the library, running its initializers
        let library = unsafe {
            Library::new(path).map_err(|e| PluginError::load_error(path, e.to_string()))?
        };

        Ok(Self {
            library,
            path: path.to_path_buf(),
            name: name.into(),
        })
    }

    /// Name of the entry point this plugin must export
    pub fn entry_symbol(&self) -> String {
        entry_symbol(&self.name)
    }

    /// Check whether the library exports `symbol`
    pub fn has_symbol(&self, symbol: &str) -> bool {
        unsafe { self.library.get::<*const ()>(symbol.as_bytes()).is_ok() }
    }

    /// Resolve and call the entry point, returning the plugin's export
    pub fn load_export(&self, managers: &Managers) -> Result<Box<PluginExport>> {
        let symbol = self.entry_symbol();

        let entry: Symbol<PluginEntryFn> = unsafe {
            self.library
                .get(symbol.as_bytes())
                .map_err(|_| PluginError::symbol_not_found(self.path.display().to_string(), &symbol))?
        };

        let raw = unsafe { entry(managers as *const Managers) };
        unsafe { PluginExport::from_raw(raw) }.ok_or_else(|| PluginError::EntryFailed {
            library: self.path.display().to_string(),
            symbol,
        })
    }

    /// Get the library path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the plugin name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PluginLibrary {
    fn drop(&mut self) {
        log::debug!("Unloading plugin library '{}'", self.name);
        // Library is automatically unloaded when dropped
    }
}

impl std::fmt::Debug for PluginLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLibrary")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}
