//! Controller manager - owns every registered manager
//!
//! Managers are stored in a [`NamespaceNamedStorage`] keyed by their
//! [`TypeKey`], so there is at most one manager per concrete type, and a
//! registration-ordered cache drives the lifecycle phases. Tearing down a
//! namespace releases its managers and clears the namespace, cascading into
//! any addins below it.
//!
//! The cache is not locked. Registration and namespace teardown take
//! `&mut self` and must be serialized by the owner.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard};
use void_core::{Namespace, NamespaceNamedStorage, TypeKey};

use crate::manager::{Manager, Phase};
use crate::managers::Managers;

/// Owns the process' managers and drives them through lifecycle phases
pub struct ControllerManager {
    /// Shared holder handed to every registered manager
    managers: Arc<Managers>,
    /// Owned managers by type
    storage: NamespaceNamedStorage<TypeKey, Box<dyn Manager>>,
    /// Registration order
    cache: Vec<TypeKey>,
}

impl ControllerManager {
    /// Create an empty controller manager
    pub fn new(managers: Arc<Managers>) -> Self {
        Self {
            managers,
            storage: NamespaceNamedStorage::new(),
            cache: Vec::new(),
        }
    }

    /// The shared manager holder
    pub fn managers(&self) -> &Arc<Managers> {
        &self.managers
    }

    /// Register `manager` as the instance of `type_key` in `ns`.
    ///
    /// Only one manager per type may exist. A duplicate is rejected, logged,
    /// and handed back in `Err`; the registered one stays authoritative.
    pub fn add_ext(
        &mut self,
        type_key: TypeKey,
        mut manager: Box<dyn Manager>,
        ns: Namespace,
    ) -> Result<(), Box<dyn Manager>> {
        debug_assert_eq!(manager.type_key(), type_key);

        if self.storage.has(&type_key) {
            log::error!(
                "Manager '{}' is already registered, ignoring registration from {}",
                type_key,
                ns
            );
            return Err(manager);
        }

        manager.set_managers(self.managers.clone());
        self.storage.add(manager, type_key, ns)?;
        self.cache.push(type_key);

        log::debug!("Registered manager '{}' in {}", type_key.short_name(), ns);
        Ok(())
    }

    /// Register a manager of a statically known type
    pub fn add<M: Manager>(&mut self, manager: M, ns: Namespace) -> Result<(), Box<dyn Manager>> {
        self.add_ext(TypeKey::of::<M>(), Box::new(manager), ns)
    }

    /// Borrow the manager of type `M`
    pub fn get<M: Manager>(&self) -> Option<MappedRwLockReadGuard<'_, M>> {
        let guard = self.storage.get(&TypeKey::of::<M>())?;
        MappedRwLockReadGuard::try_map(guard, |manager| (**manager).downcast_ref::<M>()).ok()
    }

    /// Mutably borrow the manager of type `M`
    pub fn get_mut<M: Manager>(&self) -> Option<MappedRwLockWriteGuard<'_, M>> {
        let guard = self.storage.get_mut(&TypeKey::of::<M>())?;
        MappedRwLockWriteGuard::try_map(guard, |manager| (**manager).downcast_mut::<M>()).ok()
    }

    /// Check whether a manager of type `M` is registered
    pub fn has<M: Manager>(&self) -> bool {
        self.contains(&TypeKey::of::<M>())
    }

    /// Check whether a manager is registered for `type_key`
    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.storage.has(type_key)
    }

    /// Namespace the manager of `type_key` was registered in
    pub fn namespace_of(&self, type_key: &TypeKey) -> Option<Namespace> {
        self.storage.namespace_of(type_key)
    }

    /// Registered manager types in registration order
    pub fn type_keys(&self) -> &[TypeKey] {
        &self.cache
    }

    /// Number of registered managers
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn dispatch(&self, phase: Phase) {
        for key in &self.cache {
            if let Some(mut manager) = self.storage.get_mut(key) {
                phase.dispatch(&mut **manager);
            }
        }
    }

    /// Run `on_init` on every manager
    pub fn on_init(&self) {
        self.dispatch(Phase::Init);
    }

    /// Run `on_post_init` on every manager
    pub fn on_post_init(&self) {
        self.dispatch(Phase::PostInit);
    }

    /// Run `on_pre_update` on every manager
    pub fn on_pre_update(&self) {
        self.dispatch(Phase::PreUpdate);
    }

    /// Run `on_update` on every manager
    pub fn on_update(&self) {
        self.dispatch(Phase::Update);
    }

    /// Run `on_post_update` on every manager
    pub fn on_post_update(&self) {
        self.dispatch(Phase::PostUpdate);
    }

    /// Run `on_release` on every manager
    pub fn on_release(&self) {
        self.dispatch(Phase::Release);
    }

    /// Run `on_post_release` on every manager
    pub fn on_post_release(&self) {
        self.dispatch(Phase::PostRelease);
    }

    /// Tear down every manager registered in `ns`.
    ///
    /// Each affected manager gets `on_release` then `on_post_release`, in
    /// registration order, before the namespace is cleared. A plugin
    /// namespace includes all of its addins.
    pub fn on_release_namespace(&mut self, ns: Namespace) {
        let owned: HashSet<TypeKey> = self.storage.names(ns).into_iter().collect();

        for key in self.cache.iter().filter(|key| owned.contains(key)) {
            if let Some(mut manager) = self.storage.get_mut(key) {
                manager.on_release();
                manager.on_post_release();
            }
        }
        self.cache.retain(|key| !owned.contains(key));
        self.storage.clear_namespace(ns);

        if !owned.is_empty() {
            log::info!("Released {} manager(s) from namespace {}", owned.len(), ns);
        }
    }

    /// Release every manager and drop them all
    pub fn release_all(&mut self) {
        self.on_release();
        self.on_post_release();
        self.clear();
    }

    /// Drop every manager, latest registration first
    fn clear(&mut self) {
        for key in self.cache.drain(..).rev() {
            self.storage.remove(&key);
        }
        self.storage.clear();
    }
}

impl Drop for ControllerManager {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for ControllerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerManager")
            .field("managers", &self.cache)
            .finish()
    }
}
