/// Asset identifiers, typed handles and the common asset contract

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Index into an `AssetContainer`; never reused once issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

impl AssetId {
    pub const INVALID: AssetId = AssetId(u32::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#invalid")
        }
    }
}

/// Typed, copyable reference to an asset of kind `T`
///
/// Owns nothing: the owning container resolves it, falling back to the
/// container's default asset when the target is missing or invalid.
pub struct AssetHandle<T> {
    id: AssetId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AssetHandle<T> {
    pub const INVALID: Self = Self { id: AssetId::INVALID, _marker: PhantomData };

    pub fn new(id: AssetId) -> Self {
        Self { id, _marker: PhantomData }
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    /// True when the handle carries an id (not whether the asset is usable)
    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AssetHandle<T> {}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Default for AssetHandle<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetHandle({})", self.id)
    }
}

/// Contract shared by every asset kind stored in an `AssetContainer`
pub trait Asset {
    /// Kind name used in log lines ("Texture", "Mesh", ...)
    fn type_name() -> &'static str;

    /// Placeholder registered for names that were requested but never loaded
    fn empty(name: String) -> Self;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Whether the asset can be used as is; invalid assets resolve to the default
    fn valid(&self) -> bool;
}
