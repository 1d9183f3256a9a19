//! Plugin entry point contract
//!
//! A plugin library exports one function named
//! `Load<Name>PluginX<Bits>` (see [`entry_symbol`](crate::discovery::entry_symbol)).
//! It receives a pointer to the process' [`Managers`] and returns a heap
//! allocated [`PluginExport`]: the plugin's manager plus its [`TypeKey`].
//! A null return means the plugin failed to start.
//!
//! Plugins declare the entry point with [`declare_plugin!`](crate::declare_plugin):
//!
//! ```ignore
//! use void_plugin::{declare_plugin, manager_any, Manager};
//!
//! #[derive(Default)]
//! pub struct PhysicsManager;
//!
//! impl Manager for PhysicsManager {
//!     manager_any!();
//! }
//!
//! // Exported from libphysics.so as LoadphysicsPluginX64
//! declare_plugin!(physics, |_managers| PhysicsManager::default());
//! ```
//!
//! Host and plugins must be built with the same compiler and `void_plugin`
//! version, since the export carries Rust trait objects.
//!
//! The generated entry point installs the host's logger (carried by
//! [`Managers`]) into the plugin's own copy of `log` before the manager is
//! built, so `log` macros inside the plugin reach the host's output.

use std::panic::{catch_unwind, AssertUnwindSafe};

use void_core::TypeKey;

use crate::manager::Manager;
use crate::managers::Managers;

/// What a plugin entry point hands to the host
pub struct PluginExport {
    /// The plugin's manager
    pub manager: Box<dyn Manager>,
    /// Type identity of `manager`
    pub type_key: TypeKey,
}

impl PluginExport {
    /// Wrap a manager of a statically known type
    pub fn new<M: Manager>(manager: M) -> Self {
        Self {
            manager: Box::new(manager),
            type_key: TypeKey::of::<M>(),
        }
    }

    /// Take ownership of an export returned by an entry point
    ///
    /// # Safety
    /// `ptr` must be null or come from [`PluginExport::into_raw`], and must
    /// not be used afterwards.
    pub unsafe fn from_raw(ptr: *mut PluginExport) -> Option<Box<PluginExport>> {
        if ptr.is_null() {
            None
        } else {
            Some(Box::from_raw(ptr))
        }
    }

    /// Leak the export for the trip across the library boundary
    pub fn into_raw(self) -> *mut PluginExport {
        Box::into_raw(Box::new(self))
    }
}

impl std::fmt::Debug for PluginExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginExport")
            .field("type_key", &self.type_key)
            .finish()
    }
}

/// Signature of a plugin entry point
pub type PluginEntryFn = unsafe extern "C" fn(managers: *const Managers) -> *mut PluginExport;

/// Body of a generated entry point: hook up logging, then build the
/// manager, catching panics
///
/// # Safety
/// `managers` must be null or point to a live [`Managers`].
#[doc(hidden)]
pub unsafe fn enter<M, F>(managers: *const Managers, ctor: F) -> *mut PluginExport
where
    M: Manager,
    F: FnOnce(&Managers) -> M,
{
    if managers.is_null() {
        return std::ptr::null_mut();
    }
    let managers = &*managers;

    // Route this library's log records to the host
    managers.host_logger().install();

    match catch_unwind(AssertUnwindSafe(|| ctor(managers))) {
        Ok(manager) => PluginExport::new(manager).into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Export a plugin entry point named `Load<name>PluginX<bits>`
///
/// `$ctor` builds the plugin's manager from `&Managers`.
#[macro_export]
macro_rules! declare_plugin {
    ($name:ident, $ctor:expr) => {
        #[cfg(target_pointer_width = "64")]
        #[export_name = concat!("Load", stringify!($name), "PluginX64")]
        pub unsafe extern "C" fn __void_plugin_entry(
            managers: *const $crate::Managers,
        ) -> *mut $crate::PluginExport {
            $crate::export::enter(managers, $ctor)
        }

        #[cfg(target_pointer_width = "32")]
        #[export_name = concat!("Load", stringify!($name), "PluginX32")]
        pub unsafe extern "C" fn __void_plugin_entry(
            managers: *const $crate::Managers,
        ) -> *mut $crate::PluginExport {
            $crate::export::enter(managers, $ctor)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct DirManager {
        dir: String,
    }

    impl Manager for DirManager {
        crate::manager_any!();
    }

    #[test]
    fn test_enter_builds_export() {
        let managers = Managers::with_paths("/bin", "/bin/plugins");
        let raw = unsafe {
            enter(&managers, |m: &Managers| DirManager {
                dir: m.plugin_dir().display().to_string(),
            })
        };

        let export = unsafe { PluginExport::from_raw(raw) }.unwrap();
        assert_eq!(export.type_key, TypeKey::of::<DirManager>());
        let manager = export.manager.downcast_ref::<DirManager>().unwrap();
        assert_eq!(manager.dir, "/bin/plugins");
    }

    #[test]
    fn test_enter_catches_panics() {
        let managers = Managers::with_paths(".", "plugins");
        let raw = unsafe { enter::<DirManager, _>(&managers, |_| panic!("plugin failed to start")) };
        assert!(raw.is_null());
        assert!(unsafe { PluginExport::from_raw(raw) }.is_none());

        let raw = unsafe { enter(std::ptr::null(), |_| DirManager::default()) };
        assert!(raw.is_null());
    }
}
