//! # void_core - Void Engine Core
//!
//! Registry primitives shared by every module of the engine runtime:
//!
//! - [`Namespace`]: the plugin x addin scope every registration lives in
//! - [`NamespaceNamedStorage`]: thread-safe, ownership-taking named registry
//!   with cascading removal by namespace
//! - [`Instantiator`] / [`ParamInstantiator`]: type-erased object creation
//! - [`DynamicFactory`], [`NamespaceDynamicFactory`],
//!   [`NamespaceDynamicParamFactory`]: create objects by name
//! - [`TypeKey`]: runtime type identity for singleton-per-type registries
//!
//! ## Philosophy
//! "Everything is a Plugin" - plugins and their addins register objects under
//! their own namespace, and unloading a namespace tears all of it down.

pub mod namespace;
pub mod type_key;
pub mod storage;
pub mod instantiator;
pub mod factory;

pub use namespace::*;
pub use type_key::*;
pub use storage::*;
pub use instantiator::*;
pub use factory::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::namespace::{AddinId, Namespace, PluginId};
    pub use crate::type_key::TypeKey;
    pub use crate::storage::NamespaceNamedStorage;
    pub use crate::instantiator::{BaseOf, Instantiator, ParamInstantiator};
    pub use crate::factory::{DynamicFactory, NamespaceDynamicFactory, NamespaceDynamicParamFactory};
}
