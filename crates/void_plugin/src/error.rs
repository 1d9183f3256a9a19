//! Error types for the plugin runtime

use std::path::PathBuf;
use thiserror::Error;

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors that can occur while loading or registering plugins
#[derive(Debug, Error)]
pub enum PluginError {
    /// Failed to open the dynamic library
    #[error("Failed to load library '{path}': {message}")]
    LoadError {
        path: PathBuf,
        message: String,
    },

    /// Library does not export the plugin entry point
    #[error("Symbol '{symbol}' not found in library '{library}'")]
    SymbolNotFound {
        library: String,
        symbol: String,
    },

    /// The entry point ran but produced no manager
    #[error("Entry point '{symbol}' of library '{library}' failed")]
    EntryFailed {
        library: String,
        symbol: String,
    },

    /// Plugin name is on the blacklist
    #[error("Plugin '{0}' is blacklisted")]
    Blacklisted(String),

    /// A plugin with the same name is already loaded
    #[error("Plugin '{0}' is already loaded")]
    AlreadyLoaded(String),

    /// Plugin not known to the manager
    #[error("Plugin '{0}' not found")]
    NotFound(String),

    /// Compiled-in plugins live as long as the process
    #[error("Plugin '{0}' is static and cannot be unloaded")]
    StaticPlugin(String),

    /// A manager of the same type is already registered
    #[error("Manager '{0}' is already registered")]
    DuplicateManager(String),

    /// No plugin name can be derived from the file name
    #[error("Cannot derive a plugin name from '{0}'")]
    InvalidName(PathBuf),

    /// Configuration could not be read
    #[error("Invalid configuration '{path}': {message}")]
    Config {
        path: PathBuf,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PluginError {
    /// Create a load error
    pub fn load_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PluginError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a symbol not found error
    pub fn symbol_not_found(library: impl Into<String>, symbol: impl Into<String>) -> Self {
        PluginError::SymbolNotFound {
            library: library.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a configuration error
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PluginError::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}
