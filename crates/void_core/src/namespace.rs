//! Two-level namespaces for plugin and addin scoped registration
//!
//! A [`Namespace`] pairs a plugin id with an addin id. Addin id `0` is
//! reserved: it means "no addin", so the namespace covers the whole plugin.

use core::fmt;

/// Identifier of a plugin
pub type PluginId = u32;

/// Identifier of an addin within a plugin (`0` means none)
pub type AddinId = u32;

/// Registration scope made of a plugin id and an addin id
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Namespace {
    /// Upper 32 bits: plugin, lower 32 bits: addin
    bits: u64,
}

impl Namespace {
    /// The core namespace: plugin 0, no addin
    pub const CORE: Self = Self::plugin(0);

    /// Create a namespace from a plugin id and an addin id
    #[inline]
    pub const fn new(plugin: PluginId, addin: AddinId) -> Self {
        Self {
            bits: (plugin as u64) << 32 | addin as u64,
        }
    }

    /// Create a plugin-only namespace
    #[inline]
    pub const fn plugin(plugin: PluginId) -> Self {
        Self::new(plugin, 0)
    }

    /// The plugin component
    #[inline]
    pub const fn plugin_id(&self) -> PluginId {
        (self.bits >> 32) as u32
    }

    /// The addin component (`0` when this namespace is plugin-wide)
    #[inline]
    pub const fn addin_id(&self) -> AddinId {
        self.bits as u32
    }

    /// Whether this namespace denotes an addin rather than a whole plugin
    #[inline]
    pub const fn is_addin(&self) -> bool {
        self.addin_id() != 0
    }

    /// The plugin-wide namespace this one belongs to
    #[inline]
    pub const fn plugin_namespace(&self) -> Self {
        Self::plugin(self.plugin_id())
    }

    /// The addin-only component, with the plugin part dropped
    #[inline]
    pub const fn addin(&self) -> Self {
        Self::new(0, self.addin_id())
    }

    /// Get the raw bits
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.bits
    }

    /// Create from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }
}

impl From<PluginId> for Namespace {
    fn from(plugin: PluginId) -> Self {
        Self::plugin(plugin)
    }
}

impl From<(PluginId, AddinId)> for Namespace {
    fn from((plugin, addin): (PluginId, AddinId)) -> Self {
        Self::new(plugin, addin)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_addin() {
            write!(f, "Namespace({}:{})", self.plugin_id(), self.addin_id())
        } else {
            write!(f, "Namespace({})", self.plugin_id())
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.plugin_id(), self.addin_id())
    }
}
