//! Name based object factories
//!
//! - [`DynamicFactory`]: flat name to instantiator map, no locking. Meant for
//!   single-threaded setup phases.
//! - [`NamespaceDynamicFactory`]: instantiators kept in a
//!   [`NamespaceNamedStorage`], so they are thread-safe and unregistered in
//!   bulk when a plugin or addin goes away.
//! - [`NamespaceDynamicParamFactory`]: the same, for instantiators that take
//!   a construction parameter.

use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use std::collections::HashMap;

use parking_lot::MappedRwLockReadGuard;

use crate::instantiator::{
    BaseOf, Instantiator, ParamInstantiator, TypeInstantiator, TypeParamInstantiator,
};
use crate::namespace::Namespace;
use crate::storage::NamespaceNamedStorage;

/// Flat registry of instantiators keyed by name
pub struct DynamicFactory<N, B: ?Sized> {
    instantiators: HashMap<N, Box<dyn Instantiator<B>>>,
}

impl<N, B> DynamicFactory<N, B>
where
    N: Eq + Hash,
    B: ?Sized + 'static,
{
    /// Create an empty factory
    pub fn new() -> Self {
        Self {
            instantiators: HashMap::new(),
        }
    }

    /// Create an object of the type registered under `name`
    pub fn create_instance<Q>(&self, name: &Q) -> Option<Box<B>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.instantiators.get(name).map(|inst| inst.create())
    }

    /// Register `T` under `name`. Returns false if the name is taken.
    pub fn register<T>(&mut self, name: N) -> bool
    where
        T: Default + 'static,
        B: BaseOf<T>,
    {
        self.register_ext(Box::new(TypeInstantiator::<T, B>::new()), name)
            .is_ok()
    }

    /// Register an instantiator under `name`.
    ///
    /// On conflict the instantiator is handed back in `Err`.
    pub fn register_ext(
        &mut self,
        instantiator: Box<dyn Instantiator<B>>,
        name: N,
    ) -> Result<(), Box<dyn Instantiator<B>>> {
        if self.instantiators.contains_key(&name) {
            return Err(instantiator);
        }
        self.instantiators.insert(name, instantiator);
        Ok(())
    }

    /// Remove the instantiator registered under `name`
    pub fn unregister<Q>(&mut self, name: &Q)
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.instantiators.remove(name);
    }

    /// Check whether `name` is registered
    pub fn is_registered<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.instantiators.contains_key(name)
    }

    /// Registered names
    pub fn names(&self) -> impl Iterator<Item = &N> {
        self.instantiators.keys()
    }

    /// Number of registered instantiators
    pub fn len(&self) -> usize {
        self.instantiators.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.instantiators.is_empty()
    }
}

impl<N, B> Default for DynamicFactory<N, B>
where
    N: Eq + Hash,
    B: ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, B> Clone for DynamicFactory<N, B>
where
    N: Eq + Hash + Clone,
    B: ?Sized + 'static,
{
    fn clone(&self) -> Self {
        Self {
            instantiators: self
                .instantiators
                .iter()
                .map(|(name, inst)| (name.clone(), inst.copy()))
                .collect(),
        }
    }
}

impl<N: fmt::Debug, B: ?Sized> fmt::Debug for DynamicFactory<N, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicFactory")
            .field("names", &self.instantiators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Namespace scoped factory.
///
/// `I` is the stored instantiator kind; it defaults to [`Instantiator<B>`].
/// Every lookup, removal and cascading clear behaves exactly like the
/// underlying [`NamespaceNamedStorage`].
pub struct NamespaceDynamicFactory<N, B: ?Sized, I: ?Sized = dyn Instantiator<B>> {
    storage: NamespaceNamedStorage<N, Box<I>>,
    _base: PhantomData<fn() -> Box<B>>,
}

/// Namespace scoped factory building objects from a `P`
pub type NamespaceDynamicParamFactory<N, B, P> =
    NamespaceDynamicFactory<N, B, dyn ParamInstantiator<B, P>>;

impl<N, B, I> NamespaceDynamicFactory<N, B, I>
where
    N: Eq + Hash + Clone + fmt::Debug,
    B: ?Sized,
    I: ?Sized,
{
    /// Create an empty factory
    pub fn new() -> Self {
        Self {
            storage: NamespaceNamedStorage::new(),
            _base: PhantomData,
        }
    }

    /// Register an instantiator under `name` in `ns`.
    ///
    /// On conflict the instantiator is handed back in `Err`.
    pub fn register_ext(&self, instantiator: Box<I>, name: N, ns: Namespace) -> Result<(), Box<I>> {
        self.storage.add(instantiator, name, ns)
    }

    /// Borrow the instantiator registered under `name`
    pub fn get<Q>(&self, name: &Q) -> Option<MappedRwLockReadGuard<'_, Box<I>>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.get(name)
    }

    /// Names registered in `ns`, including addins under a plugin namespace
    pub fn get_by_namespace(&self, ns: Namespace) -> Vec<N> {
        self.storage.names(ns)
    }

    /// Check whether `name` is registered
    pub fn has<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.has(name)
    }

    /// Remove the instantiator registered under `name`
    pub fn remove<Q>(&self, name: &Q) -> bool
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.remove(name)
    }

    /// Remove everything registered in `ns`, cascading into addins
    pub fn clear_namespace(&self, ns: Namespace) {
        self.storage.clear_namespace(ns);
    }

    /// Remove every instantiator
    pub fn clear(&self) {
        self.storage.clear();
    }

    /// Number of registered instantiators
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl<N, B> NamespaceDynamicFactory<N, B>
where
    N: Eq + Hash + Clone + fmt::Debug,
    B: ?Sized + 'static,
{
    /// Create an object of the type registered under `name`
    pub fn create<Q>(&self, name: &Q) -> Option<Box<B>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.get(name).map(|inst| inst.create())
    }

    /// Register `T` under `name` in `ns`. Returns false if the name is taken.
    pub fn register<T>(&self, name: N, ns: Namespace) -> bool
    where
        T: Default + 'static,
        B: BaseOf<T>,
    {
        self.register_ext(Box::new(TypeInstantiator::<T, B>::new()), name, ns)
            .is_ok()
    }

    /// An owned copy of the instantiator registered under `name`
    pub fn instantiator<Q>(&self, name: &Q) -> Option<Box<dyn Instantiator<B>>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.get(name).map(|inst| inst.copy())
    }
}

impl<N, B, P> NamespaceDynamicFactory<N, B, dyn ParamInstantiator<B, P>>
where
    N: Eq + Hash + Clone + fmt::Debug,
    B: ?Sized + 'static,
    P: 'static,
{
    /// Create an object of the type registered under `name` from `param`
    pub fn create_instance<Q>(&self, name: &Q, param: P) -> Option<Box<B>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.get(name).map(|inst| inst.create_instance(param))
    }

    /// Register `T`, built from a `P`, under `name` in `ns`
    pub fn register<T>(&self, name: N, ns: Namespace) -> bool
    where
        T: From<P> + 'static,
        B: BaseOf<T>,
    {
        self.register_ext(Box::new(TypeParamInstantiator::<T, P, B>::new()), name, ns)
            .is_ok()
    }

    /// An owned copy of the instantiator registered under `name`
    pub fn instantiator<Q>(&self, name: &Q) -> Option<Box<dyn ParamInstantiator<B, P>>>
    where
        N: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.storage.get(name).map(|inst| inst.copy())
    }
}

impl<N, B, I> Default for NamespaceDynamicFactory<N, B, I>
where
    N: Eq + Hash + Clone + fmt::Debug,
    B: ?Sized,
    I: ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, B: ?Sized, I: ?Sized> fmt::Debug for NamespaceDynamicFactory<N, B, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceDynamicFactory")
            .field("storage", &self.storage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instantiator::FnInstantiator;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    trait Widget: Send {
        fn kind(&self) -> String;
    }

    crate::impl_base_of!(Widget);

    #[derive(Default)]
    struct Button;

    impl Widget for Button {
        fn kind(&self) -> String {
            "button".into()
        }
    }

    #[derive(Default)]
    struct Slider;

    impl Widget for Slider {
        fn kind(&self) -> String {
            "slider".into()
        }
    }

    struct Label(String);

    impl From<&'static str> for Label {
        fn from(text: &'static str) -> Self {
            Label(text.to_string())
        }
    }

    impl Widget for Label {
        fn kind(&self) -> String {
            format!("label:{}", self.0)
        }
    }

    /// Counts how many instantiators are alive
    struct CountingInstantiator(Arc<AtomicUsize>);

    impl CountingInstantiator {
        fn boxed(live: &Arc<AtomicUsize>) -> Box<dyn Instantiator<dyn Widget>> {
            live.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingInstantiator(live.clone()))
        }
    }

    impl Drop for CountingInstantiator {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl Instantiator<dyn Widget> for CountingInstantiator {
        fn create(&self) -> Box<dyn Widget> {
            Box::new(Button)
        }

        fn copy(&self) -> Box<dyn Instantiator<dyn Widget>> {
            CountingInstantiator::boxed(&self.0)
        }
    }

    #[test]
    fn test_flat_factory() {
        let mut factory = DynamicFactory::<String, dyn Widget>::new();
        assert!(factory.register::<Button>("button".into()));
        assert!(!factory.register::<Slider>("button".into()));

        assert_eq!(factory.create_instance("button").unwrap().kind(), "button");
        assert!(factory.create_instance("slider").is_none());
        assert!(factory.is_registered("button"));

        factory.unregister("button");
        factory.unregister("button");
        assert!(!factory.is_registered("button"));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_flat_factory_rejection_keeps_ownership() {
        let live = Arc::new(AtomicUsize::new(0));
        let mut factory = DynamicFactory::<&str, dyn Widget>::new();
        assert!(factory.register_ext(CountingInstantiator::boxed(&live), "w").is_ok());

        let rejected = factory.register_ext(CountingInstantiator::boxed(&live), "w");
        assert_eq!(live.load(Ordering::SeqCst), 2);
        let rejected = rejected.err().unwrap();
        assert_eq!(rejected.create().kind(), "button");

        drop(rejected);
        drop(factory);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flat_factory_clone_copies_instantiators() {
        let live = Arc::new(AtomicUsize::new(0));
        let mut factory = DynamicFactory::<&str, dyn Widget>::new();
        factory.register_ext(CountingInstantiator::boxed(&live), "w").ok().unwrap();

        let copy = factory.clone();
        assert_eq!(live.load(Ordering::SeqCst), 2);
        drop(factory);
        assert_eq!(copy.create_instance("w").unwrap().kind(), "button");
    }

    #[test]
    fn test_namespace_factory_round_trip() {
        let factory = NamespaceDynamicFactory::<String, dyn Widget>::new();
        assert!(factory.register::<Slider>("slider".into(), Namespace::new(2, 1)));
        assert!(!factory.register::<Button>("slider".into(), Namespace::plugin(3)));

        assert_eq!(factory.create("slider").unwrap().kind(), "slider");
        assert!(factory.create("missing").is_none());
        assert_eq!(factory.get_by_namespace(Namespace::plugin(2)), vec!["slider".to_string()]);
        assert_eq!(factory.instantiator("slider").unwrap().create().kind(), "slider");
    }

    #[test]
    fn test_namespace_factory_cascading_clear() {
        let factory = NamespaceDynamicFactory::<&str, dyn Widget>::new();
        factory.register::<Button>("a", Namespace::plugin(7));
        factory.register::<Button>("b", Namespace::new(7, 1));
        factory
            .register_ext(
                Box::new(FnInstantiator::new(|| Box::new(Slider) as Box<dyn Widget>)),
                "c",
                Namespace::new(7, 2),
            )
            .ok()
            .unwrap();

        factory.clear_namespace(Namespace::new(7, 1));
        assert!(factory.has("a") && !factory.has("b") && factory.has("c"));

        factory.clear_namespace(Namespace::plugin(7));
        assert!(factory.is_empty());
    }

    #[test]
    fn test_namespace_factory_rejection_keeps_ownership() {
        let live = Arc::new(AtomicUsize::new(0));
        let factory = NamespaceDynamicFactory::<&str, dyn Widget>::new();
        factory
            .register_ext(CountingInstantiator::boxed(&live), "w", Namespace::CORE)
            .ok()
            .unwrap();

        let rejected = factory.register_ext(CountingInstantiator::boxed(&live), "w", Namespace::CORE);
        assert_eq!(live.load(Ordering::SeqCst), 2);
        drop(rejected);
        assert_eq!(live.load(Ordering::SeqCst), 1);

        assert!(factory.remove("w"));
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_param_factory() {
        let factory = NamespaceDynamicParamFactory::<&str, dyn Widget, &'static str>::new();
        assert!(factory.register::<Label>("label", Namespace::plugin(1)));

        let widget = factory.create_instance("label", "hello").unwrap();
        assert_eq!(widget.kind(), "label:hello");
        assert!(factory.create_instance("nothing", "x").is_none());
        assert_eq!(
            factory.instantiator("label").unwrap().create_instance("again").kind(),
            "label:again"
        );

        factory.clear();
        assert!(!factory.has("label"));
    }
}
