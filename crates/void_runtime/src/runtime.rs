//! Runtime - owns the managers and the plugins that provide them
//!
//! Managers created by a plugin run code from its library, so every manager
//! is released and dropped before any library could be unloaded.

use std::sync::Arc;

use void_plugin::{
    ControllerManager, Manager, Managers, PluginError, PluginManager, Result, RuntimeConfig,
};

/// Lifecycle state of the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Created, plugins not yet discovered
    Created,
    /// Plugins discovered and registered
    Loaded,
    /// Managers initialized, updating
    Running,
    /// Managers released
    Stopped,
}

/// The module runtime
pub struct Runtime {
    /// Owned managers, dropped before the plugins
    controllers: ControllerManager,
    /// Loaded plugin libraries
    plugins: PluginManager,
    /// Shared manager holder
    managers: Arc<Managers>,
    state: RuntimeState,
    frame: u64,
}

impl Runtime {
    /// Create a runtime for `config`
    pub fn new(config: &RuntimeConfig) -> Self {
        log::info!("Creating Void runtime...");

        let managers = Arc::new(Managers::new(config));
        let controllers = ControllerManager::new(managers.clone());
        let plugins = PluginManager::from_config(&config.plugins, managers.plugin_dir());

        log::info!("Plugin directory: {}", managers.plugin_dir().display());

        Self {
            controllers,
            plugins,
            managers,
            state: RuntimeState::Created,
            frame: 0,
        }
    }

    /// Register a compiled-in plugin providing manager `M`
    pub fn add_static<M: Manager + Default>(&mut self) -> Result<()> {
        self.plugins.add::<M>(&mut self.controllers)
    }

    /// Discover and load dynamic plugins, returning how many were loaded
    pub fn pre_init(&mut self) -> usize {
        if self.state != RuntimeState::Created {
            log::warn!("pre_init called in state {:?}, ignoring", self.state);
            return 0;
        }

        let loaded = self.plugins.on_pre_init(&mut self.controllers);
        self.state = RuntimeState::Loaded;
        loaded
    }

    /// Initialize every registered manager
    pub fn init(&mut self) {
        match self.state {
            RuntimeState::Created => {
                self.pre_init();
            }
            RuntimeState::Loaded => {}
            RuntimeState::Running | RuntimeState::Stopped => {
                log::warn!("init called in state {:?}, ignoring", self.state);
                return;
            }
        }

        self.controllers.on_init();
        self.controllers.on_post_init();
        self.state = RuntimeState::Running;

        log::info!("Runtime initialized with {} manager(s)", self.controllers.len());
    }

    /// Run one frame of updates
    pub fn update(&mut self) {
        if self.state != RuntimeState::Running {
            return;
        }

        self.controllers.on_pre_update();
        self.controllers.on_update();
        self.controllers.on_post_update();
        self.frame += 1;
    }

    /// Release a dynamic plugin and everything it registered
    pub fn unload_plugin(&mut self, name: &str) -> Result<()> {
        if self.state == RuntimeState::Stopped {
            return Err(PluginError::NotFound(name.to_string()));
        }
        self.plugins.unload(name, &mut self.controllers)
    }

    /// Release and drop every manager
    pub fn shutdown(&mut self) {
        if self.state == RuntimeState::Stopped {
            return;
        }

        log::info!("Shutting down runtime after {} frame(s)...", self.frame);
        self.controllers.release_all();
        self.state = RuntimeState::Stopped;
    }

    /// Current lifecycle state
    pub fn state(&self) -> RuntimeState {
        self.state
    }

    /// Frames updated so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The shared manager holder
    pub fn managers(&self) -> &Arc<Managers> {
        &self.managers
    }

    /// Registered managers
    pub fn controllers(&self) -> &ControllerManager {
        &self.controllers
    }

    /// Registered plugins
    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    /// Status lines for the host
    pub fn status_text(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "state: {:?}, frame: {}, managers: {}",
            self.state,
            self.frame,
            self.controllers.len()
        )];
        for name in self.plugins.plugin_names() {
            if let Some(info) = self.plugins.info(&name) {
                lines.push(format!("  {} [{}] -> {}", name, info.namespace, info.manager.short_name()));
            }
        }
        lines
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.state)
            .field("frame", &self.frame)
            .field("controllers", &self.controllers)
            .field("plugins", &self.plugins)
            .finish()
    }
}
