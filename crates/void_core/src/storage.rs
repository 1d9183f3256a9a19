//! Namespace partitioned named storage
//!
//! [`NamespaceNamedStorage`] owns every object added to it and indexes it
//! twice: globally by name, and by the [`Namespace`] that registered it.
//! Names are unique across all namespaces. Clearing a plugin namespace
//! cascades into every addin registered under that plugin.
//!
//! All operations take a single lock for their whole duration. Cascading
//! operations run on the already locked state, so nothing ever
//! re-acquires the lock.

use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use std::collections::{HashMap, HashSet};

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::namespace::{Namespace, PluginId};

/// Thread-safe, ownership-taking registry keyed by name and partitioned by namespace
pub struct NamespaceNamedStorage<N, T> {
    inner: RwLock<Partitions<N, T>>,
}

struct Partitions<N, T> {
    /// Owned objects by name
    objects: HashMap<N, T>,
    /// Namespace each name was registered under
    namespaces: HashMap<N, Namespace>,
    /// Names registered directly under a plugin
    plugin_names: HashMap<PluginId, HashSet<N>>,
    /// Names registered under an addin
    addin_names: HashMap<Namespace, HashSet<N>>,
    /// Addins known under each plugin
    plugin_addins: HashMap<PluginId, HashSet<Namespace>>,
}

impl<N, T> Partitions<N, T>
where
    N: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
            namespaces: HashMap::new(),
            plugin_names: HashMap::new(),
            addin_names: HashMap::new(),
            plugin_addins: HashMap::new(),
        }
    }

    fn add(&mut self, object: T, name: N, ns: Namespace) -> Result<(), (T, N)> {
        if self.objects.contains_key(&name) {
            return Err((object, name));
        }

        if ns.is_addin() {
            self.addin_names.entry(ns).or_default().insert(name.clone());
            self.plugin_addins
                .entry(ns.plugin_id())
                .or_default()
                .insert(ns);
        } else {
            self.plugin_names
                .entry(ns.plugin_id())
                .or_default()
                .insert(name.clone());
        }

        self.namespaces.insert(name.clone(), ns);
        self.objects.insert(name, object);
        Ok(())
    }

    fn remove<Q>(&mut self, name: &Q) -> Option<T>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let ns = self.namespaces.remove(name)?;

        if ns.is_addin() {
            let emptied = match self.addin_names.get_mut(&ns) {
                Some(names) => {
                    names.remove(name);
                    names.is_empty()
                }
                None => false,
            };
            if emptied {
                self.addin_names.remove(&ns);
                self.forget_addin(ns);
            }
        } else if let Some(names) = self.plugin_names.get_mut(&ns.plugin_id()) {
            names.remove(name);
            if names.is_empty() {
                self.plugin_names.remove(&ns.plugin_id());
            }
        }

        self.objects.remove(name)
    }

    /// Drop an addin from its plugin's known-addin set
    fn forget_addin(&mut self, ns: Namespace) {
        let plugin = ns.plugin_id();
        if let Some(addins) = self.plugin_addins.get_mut(&plugin) {
            addins.remove(&ns);
            if addins.is_empty() {
                self.plugin_addins.remove(&plugin);
            }
        }
    }

    fn take_names(&mut self, names: HashSet<N>, removed: &mut Vec<T>) {
        for name in names {
            self.namespaces.remove(&name);
            if let Some(object) = self.objects.remove(&name) {
                removed.push(object);
            }
        }
    }

    fn clear_addin(&mut self, ns: Namespace, removed: &mut Vec<T>) {
        if let Some(names) = self.addin_names.remove(&ns) {
            self.take_names(names, removed);
        }
        self.forget_addin(ns);
    }

    fn clear_plugin(&mut self, plugin: PluginId, removed: &mut Vec<T>) {
        if let Some(names) = self.plugin_names.remove(&plugin) {
            self.take_names(names, removed);
        }
        if let Some(addins) = self.plugin_addins.remove(&plugin) {
            for addin in addins {
                self.clear_addin(addin, removed);
            }
        }
    }

    fn clear_namespace(&mut self, ns: Namespace) -> Vec<T> {
        let mut removed = Vec::new();
        if ns.is_addin() {
            self.clear_addin(ns, &mut removed);
        } else {
            self.clear_plugin(ns.plugin_id(), &mut removed);
        }
        removed
    }

    fn names(&self, ns: Namespace) -> Vec<N> {
        if ns.is_addin() {
            return self
                .addin_names
                .get(&ns)
                .map(|names| names.iter().cloned().collect())
                .unwrap_or_default();
        }

        let plugin = ns.plugin_id();
        let mut result: Vec<N> = self
            .plugin_names
            .get(&plugin)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();

        if let Some(addins) = self.plugin_addins.get(&plugin) {
            for addin in addins {
                if let Some(names) = self.addin_names.get(addin) {
                    result.extend(names.iter().cloned());
                }
            }
        }
        result
    }
}

impl<N, T> NamespaceNamedStorage<N, T>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    /// Create an empty storage
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Partitions::new()),
        }
    }

    /// Store `object` under `name` in `ns`.
    ///
    /// The first registration of a name wins. On conflict the object is
    /// handed back untouched in `Err`, and ownership stays with the caller.
    pub fn add(&self, object: T, name: N, ns: Namespace) -> Result<(), T> {
        self.inner.write().add(object, name, ns).map_err(|(object, name)| {
            log::debug!("Name {:?} is already registered, rejecting registration in {}", name, ns);
            object
        })
    }

    /// Store `object` under `name` in the core namespace
    pub fn add_core(&self, object: T, name: N) -> Result<(), T> {
        self.add(object, name, Namespace::CORE)
    }

    /// Borrow the object registered under `name`
    pub fn get<Q>(&self, name: &Q) -> Option<MappedRwLockReadGuard<'_, T>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        RwLockReadGuard::try_map(self.inner.read(), |inner| inner.objects.get(name)).ok()
    }

    /// Mutably borrow the object registered under `name`
    pub fn get_mut<Q>(&self, name: &Q) -> Option<MappedRwLockWriteGuard<'_, T>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        RwLockWriteGuard::try_map(self.inner.write(), |inner| inner.objects.get_mut(name)).ok()
    }

    /// Check whether `name` is registered
    pub fn has<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.read().objects.contains_key(name)
    }

    /// Namespace `name` was registered under
    pub fn namespace_of<Q>(&self, name: &Q) -> Option<Namespace>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.read().namespaces.get(name).copied()
    }

    /// Destroy the object registered under `name`. Returns whether one existed.
    pub fn remove<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = self.inner.write().remove(name);
        removed.is_some()
    }

    /// Destroy every stored object
    pub fn clear(&self) {
        let removed = {
            let mut inner = self.inner.write();
            core::mem::replace(&mut *inner, Partitions::new())
        };
        drop(removed);
    }

    /// Destroy everything registered in `ns`.
    ///
    /// An addin namespace clears only that addin. A plugin namespace clears
    /// the plugin's own entries and every addin known under it.
    pub fn clear_namespace(&self, ns: Namespace) {
        // Dropped outside the lock; destructors may call back into the storage.
        let removed = self.inner.write().clear_namespace(ns);
        log::trace!("Cleared {} entries from namespace {}", removed.len(), ns);
        drop(removed);
    }

    /// Names registered in `ns`, including every addin under a plugin namespace
    pub fn names(&self, ns: Namespace) -> Vec<N> {
        self.inner.read().names(ns)
    }

    /// Every registered name
    pub fn all_names(&self) -> Vec<N> {
        self.inner.read().objects.keys().cloned().collect()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.inner.read().objects.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().objects.is_empty()
    }
}

impl<N, T> Default for NamespaceNamedStorage<N, T>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, T> fmt::Debug for NamespaceNamedStorage<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("NamespaceNamedStorage")
            .field("objects", &inner.objects.len())
            .field("plugins", &inner.plugin_names.len())
            .field("addins", &inner.addin_names.len())
            .finish()
    }
}
