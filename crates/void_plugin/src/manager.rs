//! The manager trait - long-lived services driven through lifecycle phases
//!
//! Every manager is a singleton per concrete type. The
//! [`ControllerManager`](crate::ControllerManager) calls the phase hooks on all
//! registered managers in registration order.

use std::any::Any;
use std::sync::Arc;

use void_core::TypeKey;

use crate::managers::Managers;

/// A long-lived service registered with the controller manager
pub trait Manager: Any + Send {
    /// Receive the shared manager holder, called once on registration
    fn set_managers(&mut self, managers: Arc<Managers>) {
        let _ = managers;
    }

    /// Called once after all startup plugins are registered
    fn on_init(&mut self) {}

    /// Called once after every manager ran `on_init`
    fn on_post_init(&mut self) {}

    /// Called at the start of every update
    fn on_pre_update(&mut self) {}

    /// Called every update
    fn on_update(&mut self) {}

    /// Called at the end of every update
    fn on_post_update(&mut self) {}

    /// Called when the manager is about to be torn down
    fn on_release(&mut self) {}

    /// Called after every manager being torn down ran `on_release`
    fn on_post_release(&mut self) {}

    /// Key of the concrete manager type
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// Get as Any reference (for downcasting)
    fn as_any(&self) -> &dyn Any;

    /// Get as mutable Any reference (for downcasting)
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Lifecycle phase dispatched by the controller manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    PostInit,
    PreUpdate,
    Update,
    PostUpdate,
    Release,
    PostRelease,
}

impl Phase {
    /// Invoke the hook for this phase on `manager`
    pub fn dispatch(self, manager: &mut dyn Manager) {
        match self {
            Phase::Init => manager.on_init(),
            Phase::PostInit => manager.on_post_init(),
            Phase::PreUpdate => manager.on_pre_update(),
            Phase::Update => manager.on_update(),
            Phase::PostUpdate => manager.on_post_update(),
            Phase::Release => manager.on_release(),
            Phase::PostRelease => manager.on_post_release(),
        }
    }
}

impl dyn Manager {
    /// Check whether this manager is a `T`.
    ///
    /// Matches by type name, so a manager created inside a plugin library is
    /// recognized as the host's `T` even though its `TypeId` differs.
    pub fn is<T: Manager>(&self) -> bool {
        self.type_key().is::<T>()
    }

    /// Downcast to a concrete type
    pub fn downcast_ref<T: Manager>(&self) -> Option<&T> {
        if !self.is::<T>() {
            return None;
        }
        // SAFETY: same type name means same type from the same source. Host and
        // plugins are built with one compiler, so the layouts agree.
        Some(unsafe { &*(self as *const dyn Manager as *const T) })
    }

    /// Downcast to a mutable concrete type
    pub fn downcast_mut<T: Manager>(&mut self) -> Option<&mut T> {
        if !self.is::<T>() {
            return None;
        }
        // SAFETY: see `downcast_ref`
        Some(unsafe { &mut *(self as *mut dyn Manager as *mut T) })
    }
}

/// Implement the `as_any` boilerplate of [`Manager`]
///
/// ```ignore
/// impl Manager for AudioManager {
///     void_plugin::manager_any!();
///     fn on_update(&mut self) { /* ... */ }
/// }
/// ```
#[macro_export]
macro_rules! manager_any {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}
