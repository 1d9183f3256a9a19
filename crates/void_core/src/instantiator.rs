//! Object creation strategies
//!
//! An [`Instantiator`] builds one concrete type behind a base type, usually a
//! trait object. A [`ParamInstantiator`] does the same from one argument.
//! Factories store them type-erased and [`copy`](Instantiator::copy) them
//! when a registration has to be duplicated.
//!
//! The "concrete type is a base" relation is the [`BaseOf`] trait, so wiring
//! a type to a base it does not implement fails to compile.

use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;

/// `Self` is a base of `T`: a boxed `T` converts into a boxed `Self`.
///
/// Implement it for trait objects with [`impl_base_of!`](crate::impl_base_of).
pub trait BaseOf<T>: 'static {
    /// Convert a boxed derived value into its base
    fn from_derived(value: Box<T>) -> Box<Self>;
}

/// Declare a trait object as the base of every type implementing the trait
///
/// ```ignore
/// trait Shape: Send { fn area(&self) -> f32; }
/// void_core::impl_base_of!(Shape);
/// void_core::impl_base_of!(Shape + Sync);
/// ```
#[macro_export]
macro_rules! impl_base_of {
    ($($base:tt)+) => {
        impl<T: $($base)+ + 'static> $crate::BaseOf<T> for dyn $($base)+ {
            fn from_derived(value: ::std::boxed::Box<T>) -> ::std::boxed::Box<Self> {
                value
            }
        }
    };
}

impl<T: Any> BaseOf<T> for dyn Any {
    fn from_derived(value: Box<T>) -> Box<Self> {
        value
    }
}

impl<T: Any + Send> BaseOf<T> for dyn Any + Send {
    fn from_derived(value: Box<T>) -> Box<Self> {
        value
    }
}

impl<T: Any + Send + Sync> BaseOf<T> for dyn Any + Send + Sync {
    fn from_derived(value: Box<T>) -> Box<Self> {
        value
    }
}

/// Creates objects of one concrete type as a `B`
pub trait Instantiator<B: ?Sized>: Send + Sync {
    /// Create a new object
    fn create(&self) -> Box<B>;

    /// A new instantiator of the same concrete kind
    fn copy(&self) -> Box<dyn Instantiator<B>>;
}

/// Creates objects of one concrete type from a `P` as a `B`
pub trait ParamInstantiator<B: ?Sized, P>: Send + Sync {
    /// Create a new object from `param`
    fn create_instance(&self, param: P) -> Box<B>;

    /// A new instantiator of the same concrete kind
    fn copy(&self) -> Box<dyn ParamInstantiator<B, P>>;
}

/// Instantiator building `T::default()`
pub struct TypeInstantiator<T, B: ?Sized> {
    _marker: PhantomData<fn() -> (T, Box<B>)>,
}

impl<T, B> TypeInstantiator<T, B>
where
    T: Default + 'static,
    B: ?Sized + BaseOf<T>,
{
    /// Create a new instantiator
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T, B> Default for TypeInstantiator<T, B>
where
    T: Default + 'static,
    B: ?Sized + BaseOf<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, B> Instantiator<B> for TypeInstantiator<T, B>
where
    T: Default + 'static,
    B: ?Sized + BaseOf<T>,
{
    fn create(&self) -> Box<B> {
        B::from_derived(Box::new(T::default()))
    }

    fn copy(&self) -> Box<dyn Instantiator<B>> {
        Box::new(Self::new())
    }
}

impl<T, B: ?Sized> fmt::Debug for TypeInstantiator<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInstantiator<{}>", core::any::type_name::<T>())
    }
}

/// Instantiator building `T::from(param)`
pub struct TypeParamInstantiator<T, P, B: ?Sized> {
    _marker: PhantomData<fn(P) -> (T, Box<B>)>,
}

impl<T, P, B> TypeParamInstantiator<T, P, B>
where
    T: From<P> + 'static,
    P: 'static,
    B: ?Sized + BaseOf<T>,
{
    /// Create a new instantiator
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T, P, B> Default for TypeParamInstantiator<T, P, B>
where
    T: From<P> + 'static,
    P: 'static,
    B: ?Sized + BaseOf<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> ParamInstantiator<B, P> for TypeParamInstantiator<T, P, B>
where
    T: From<P> + 'static,
    P: 'static,
    B: ?Sized + BaseOf<T>,
{
    fn create_instance(&self, param: P) -> Box<B> {
        B::from_derived(Box::new(T::from(param)))
    }

    fn copy(&self) -> Box<dyn ParamInstantiator<B, P>> {
        Box::new(Self::new())
    }
}

impl<T, P, B: ?Sized> fmt::Debug for TypeParamInstantiator<T, P, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypeParamInstantiator<{}, {}>",
            core::any::type_name::<T>(),
            core::any::type_name::<P>()
        )
    }
}

/// Instantiator backed by a constructor closure
pub struct FnInstantiator<B: ?Sized> {
    ctor: Arc<dyn Fn() -> Box<B> + Send + Sync>,
}

impl<B: ?Sized + 'static> FnInstantiator<B> {
    /// Wrap a constructor
    pub fn new(ctor: impl Fn() -> Box<B> + Send + Sync + 'static) -> Self {
        Self { ctor: Arc::new(ctor) }
    }
}

impl<B: ?Sized + 'static> Instantiator<B> for FnInstantiator<B> {
    fn create(&self) -> Box<B> {
        (self.ctor)()
    }

    fn copy(&self) -> Box<dyn Instantiator<B>> {
        Box::new(Self { ctor: self.ctor.clone() })
    }
}

/// Parameterized instantiator backed by a constructor closure
pub struct FnParamInstantiator<B: ?Sized, P> {
    ctor: Arc<dyn Fn(P) -> Box<B> + Send + Sync>,
}

impl<B: ?Sized + 'static, P: 'static> FnParamInstantiator<B, P> {
    /// Wrap a constructor
    pub fn new(ctor: impl Fn(P) -> Box<B> + Send + Sync + 'static) -> Self {
        Self { ctor: Arc::new(ctor) }
    }
}

impl<B: ?Sized + 'static, P: 'static> ParamInstantiator<B, P> for FnParamInstantiator<B, P> {
    fn create_instance(&self, param: P) -> Box<B> {
        (self.ctor)(param)
    }

    fn copy(&self) -> Box<dyn ParamInstantiator<B, P>> {
        Box::new(Self { ctor: self.ctor.clone() })
    }
}
