//! # void_plugin - Plugins and Managers
//!
//! Loads plugins from shared libraries and owns the managers they provide.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │  Plugin Library │────▶│   libloading    │
//! │ (libphysics.so) │     │                 │
//! └─────────────────┘     └────────┬────────┘
//!                                  │ LoadphysicsPluginX64
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  PluginManager  │────▶│  PluginExport   │
//! │ (discovery)     │     │ (one Manager)   │
//! └────────┬────────┘     └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │ControllerManager│────▶│    Managers     │
//! │ (lifecycle)     │     │ (config, paths) │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! Every plugin gets its own [`Namespace`](void_core::Namespace). Unloading
//! a plugin releases the managers registered in its namespace before the
//! library goes away.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use void_plugin::{ControllerManager, Managers, PluginManager, RuntimeConfig};
//!
//! let config = RuntimeConfig::load();
//! let managers = Arc::new(Managers::new(&config));
//! let mut controllers = ControllerManager::new(managers.clone());
//!
//! let mut plugins = PluginManager::from_config(&config.plugins, managers.plugin_dir());
//! plugins.on_pre_init(&mut controllers);
//!
//! controllers.on_init();
//! controllers.on_update();
//! ```

pub mod config;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod export;
pub mod library;
pub mod manager;
pub mod managers;
pub mod plugin;

pub use config::{PluginConfig, RuntimeConfig};
pub use controller::ControllerManager;
pub use error::{PluginError, Result};
pub use export::{PluginEntryFn, PluginExport};
pub use library::PluginLibrary;
pub use manager::{Manager, Phase};
pub use managers::{ConfigManager, HostLogger, Managers};
pub use plugin::{PluginInfo, PluginManager, PluginOrigin, STATIC_PLUGIN, STATIC_PLUGIN_ID};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::RuntimeConfig;
    pub use crate::controller::ControllerManager;
    pub use crate::error::{PluginError, Result};
    pub use crate::manager::Manager;
    pub use crate::managers::Managers;
    pub use crate::plugin::PluginManager;
    pub use crate::{declare_plugin, manager_any};
    pub use void_core::prelude::*;
}
