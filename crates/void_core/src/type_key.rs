//! Stable per-type keys
//!
//! [`TypeKey`] identifies a concrete Rust type at runtime. It is what
//! singleton-per-type registries index by.
//!
//! Keys compare by fully qualified type name rather than `TypeId`: a type
//! compiled into a plugin library gets a different `TypeId` than the same
//! type compiled into the host, but keeps its name.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Runtime identity of a concrete type
#[derive(Clone, Copy)]
pub struct TypeKey {
    name: &'static str,
}

impl TypeKey {
    /// Key for a concrete type
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(core::any::type_name::<T>())
    }

    /// Key for the type whose fully qualified name is `name`
    #[inline]
    pub const fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// Check whether this is the key of `T`
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.name == core::any::type_name::<T>()
    }

    /// Fully qualified type name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

/// Strip the module path from a type name, keeping generic arguments intact
pub fn short_type_name(name: &str) -> &str {
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
