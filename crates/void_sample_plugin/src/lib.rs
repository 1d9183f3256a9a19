//! Sample plugin
//!
//! Built as `libvoid_sample_plugin.so` (or `void_sample_plugin.dll`), it
//! exports `Loadvoid_sample_pluginPluginX64` and provides a
//! [`HeartbeatManager`]. Drop the library into the plugin directory to have
//! the host pick it up.
//!
//! The heartbeat period is read from the runtime settings:
//!
//! ```toml
//! [settings.sample]
//! heartbeat = 60
//! ```

use std::sync::Arc;

use void_plugin::managers::RUNTIME_SETTINGS;
use void_plugin::{declare_plugin, manager_any, Manager, Managers};

/// Frames between heartbeats when not configured
pub const DEFAULT_HEARTBEAT: u64 = 60;

/// Logs a heartbeat every few frames
#[derive(Debug)]
pub struct HeartbeatManager {
    period: u64,
    frames: u64,
    beats: u64,
    managers: Option<Arc<Managers>>,
}

impl HeartbeatManager {
    /// Create a manager beating every `period` frames
    pub fn new(period: u64) -> Self {
        Self {
            period: period.max(1),
            frames: 0,
            beats: 0,
            managers: None,
        }
    }

    /// Create a manager configured from `managers`
    pub fn from_managers(managers: &Managers) -> Self {
        let period = managers
            .config()
            .get_int(RUNTIME_SETTINGS, "sample.heartbeat")
            .and_then(|p| u64::try_from(p).ok())
            .unwrap_or(DEFAULT_HEARTBEAT);
        Self::new(period)
    }

    /// Frames between heartbeats
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Frames seen since init
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Heartbeats emitted so far
    pub fn beats(&self) -> u64 {
        self.beats
    }

    /// Whether the runtime has handed us the manager holder
    pub fn is_attached(&self) -> bool {
        self.managers.is_some()
    }
}

impl Default for HeartbeatManager {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT)
    }
}

impl Manager for HeartbeatManager {
    manager_any!();

    fn set_managers(&mut self, managers: Arc<Managers>) {
        self.managers = Some(managers);
    }

    fn on_init(&mut self) {
        self.frames = 0;
        log::info!("Heartbeat every {} frame(s)", self.period);
    }

    fn on_update(&mut self) {
        self.frames += 1;
        if self.frames % self.period == 0 {
            self.beats += 1;
            log::debug!("Heartbeat #{}", self.beats);
        }
    }

    fn on_release(&mut self) {
        log::info!("Heartbeat stopped after {} beat(s)", self.beats);
    }

    fn on_post_release(&mut self) {
        log::debug!("Heartbeat detached");
        self.managers = None;
    }
}

impl Drop for HeartbeatManager {
    fn drop(&mut self) {
        log::debug!("Heartbeat manager dropped");
    }
}

declare_plugin!(void_sample_plugin, HeartbeatManager::from_managers);
