/// Name-keyed, append-only registry for one asset kind.
///
/// Names are unique: adding a duplicate renames the newcomer to `name_1`,
/// `name_2`, ... Requests for unknown names register a placeholder so the
/// error is logged once and every later lookup gets the same id.
///
/// The container is plain data mutated through `&mut self`; concurrent users
/// share the owning `AssetManager` behind one `Mutex`.

use rustc_hash::FxHashMap;
use crate::asset::{Asset, AssetHandle, AssetId};
use crate::{engine_error, engine_info};

pub struct AssetContainer<T: Asset> {
    assets: Vec<T>,
    names: FxHashMap<String, AssetId>,
    default_asset: AssetHandle<T>,
    /// Returned by `resolve` until a default asset is installed
    fallback: T,
}

impl<T: Asset> AssetContainer<T> {
    pub fn new() -> Self {
        Self {
            assets: Vec::new(),
            names: FxHashMap::default(),
            default_asset: AssetHandle::INVALID,
            fallback: T::empty(format!("__fallback{}", T::type_name())),
        }
    }

    /// Register an asset, renaming it on collision
    pub fn add(&mut self, mut asset: T) -> AssetId {
        if self.names.contains_key(asset.name()) {
            let base = asset.name().to_string();
            let mut suffix = 1u32;
            let mut key = format!("{}_{}", base, suffix);
            while self.names.contains_key(&key) {
                suffix += 1;
                key = format!("{}_{}", base, suffix);
            }
            engine_info!(
                "galaxy3d::AssetContainer",
                "{} name duplication detected. Using {} instead of {}.",
                T::type_name(),
                key,
                base
            );
            asset.set_name(key);
        }

        let id = AssetId(self.assets.len() as u32);
        self.names.insert(asset.name().to_string(), id);
        self.assets.push(asset);
        id
    }

    /// Id for `name`, registering an empty placeholder when it is unknown
    pub fn translate(&mut self, name: &str) -> AssetId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        engine_error!(
            "galaxy3d::AssetContainer",
            "Requested {} {} not found. Replacing with default asset.",
            T::type_name(),
            name
        );
        let id = AssetId(self.assets.len() as u32);
        self.assets.push(T::empty(name.to_string()));
        self.names.insert(name.to_string(), id);
        id
    }

    /// Id for `name`, or `AssetId::INVALID`
    pub fn translate_if_exists(&self, name: &str) -> AssetId {
        self.names.get(name).copied().unwrap_or(AssetId::INVALID)
    }

    pub fn get(&self, id: AssetId) -> Option<&T> {
        self.assets.get(id.index())
    }

    pub fn get_mut(&mut self, id: AssetId) -> Option<&mut T> {
        self.assets.get_mut(id.index())
    }

    /// Id `resolve` would read for `handle`; `INVALID` when even the
    /// default asset is unavailable
    pub fn resolved_id(&self, handle: AssetHandle<T>) -> AssetId {
        let usable = |id: AssetId| self.get(id).is_some_and(|a| a.valid());
        if usable(handle.id()) {
            handle.id()
        } else if self.get(self.default_asset.id()).is_some() {
            self.default_asset.id()
        } else {
            AssetId::INVALID
        }
    }

    /// Asset behind `handle`, or the default asset when it is missing or invalid
    pub fn resolve(&self, handle: AssetHandle<T>) -> &T {
        match self.get(self.resolved_id(handle)) {
            Some(asset) => asset,
            None => &self.fallback,
        }
    }

    pub fn resolve_mut(&mut self, handle: AssetHandle<T>) -> &mut T {
        let id = self.resolved_id(handle);
        match self.assets.get_mut(id.index()) {
            Some(asset) => asset,
            None => &mut self.fallback,
        }
    }

    pub fn default_handle(&self) -> AssetHandle<T> {
        self.default_asset
    }

    pub fn set_default(&mut self, handle: AssetHandle<T>) {
        self.default_asset = handle;
    }

    pub fn size(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Every registered name, sorted
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetId, &T)> {
        self.assets.iter().enumerate().map(|(i, a)| (AssetId(i as u32), a))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AssetId, &mut T)> {
        self.assets.iter_mut().enumerate().map(|(i, a)| (AssetId(i as u32), a))
    }
}

impl<T: Asset> Default for AssetContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Asset> std::ops::Index<AssetId> for AssetContainer<T> {
    type Output = T;

    fn index(&self, id: AssetId) -> &T {
        &self.assets[id.index()]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "asset_container_tests.rs"]
mod tests;
