/// AssetLoader - discovers asset files under root directories and loads
/// composite meshes on demand.
///
/// `collect_files` registers one unloaded composite mesh per recognised file,
/// named by its path relative to the root. `validate_assets` loads the named
/// composites through the loader registered for their extension.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::asset::{Asset, AssetManager, CompositeMesh};
use crate::error::Result;
use crate::loader::{gltf_loader, obj_loader, LoadProgress};
use crate::{engine_debug, engine_error, engine_info, engine_warn};

/// File formats the loader can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    Obj,
    Glb,
    Gltf,
}

pub struct AssetLoader {
    roots: Vec<PathBuf>,
    /// Lower-case extension (without dot) to loader
    loaders: FxHashMap<String, LoaderKind>,
    progress: Arc<LoadProgress>,
}

impl AssetLoader {
    pub fn new() -> Self {
        let mut loaders = FxHashMap::default();
        loaders.insert("obj".to_string(), LoaderKind::Obj);
        loaders.insert("glb".to_string(), LoaderKind::Glb);
        loaders.insert("gltf".to_string(), LoaderKind::Gltf);
        Self {
            roots: Vec::new(),
            loaders,
            progress: Arc::new(LoadProgress::new()),
        }
    }

    pub fn add_root_directory(&mut self, directory: impl Into<PathBuf>) {
        self.roots.push(directory.into());
    }

    pub fn root_directories(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Shared progress counters, pollable from other threads
    pub fn progress(&self) -> Arc<LoadProgress> {
        Arc::clone(&self.progress)
    }

    /// Loader for `path`, by case-insensitive extension
    pub fn loader_for(&self, path: &Path) -> Option<LoaderKind> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.loaders.get(&extension).copied()
    }

    /// Register an unloaded composite mesh for every recognised file under
    /// the root directories; returns how many were added
    ///
    /// Files already registered under the same name are skipped. A root that
    /// cannot be read is logged and skipped.
    pub fn collect_files(&self, manager: &mut AssetManager) -> Result<usize> {
        let mut added = 0;
        for root in &self.roots {
            let mut files = Vec::new();
            if let Err(e) = walk_directory(root, &mut files) {
                engine_error!("galaxy3d::AssetLoader", "Cannot scan root directory {}: {}", root.display(), e);
                continue;
            }
            files.sort();

            for path in files {
                if self.loader_for(&path).is_none() {
                    continue;
                }
                let Some(name) = relative_name(root, &path) else {
                    continue;
                };
                if manager.get_composite_mesh_if_exists(&name).is_valid() {
                    continue;
                }
                engine_debug!("galaxy3d::AssetLoader", "Found {}", name);
                manager.add_composite_mesh(CompositeMesh::with_path(name, path));
                added += 1;
            }
        }
        engine_info!("galaxy3d::AssetLoader", "Collected {} asset files", added);
        Ok(added)
    }

    /// Load (or just prepare, when already loaded) the named composite meshes
    ///
    /// Unknown names register an empty composite (resolving to the default);
    /// unknown extensions are logged and skipped. Each file is read at most
    /// once, even when it yields no submesh. A failing asset does not stop
    /// the batch: the remaining names are still validated and the first
    /// error is returned at the end.
    pub fn validate_assets<S: AsRef<str>>(&self, manager: &mut AssetManager, names: &[S]) -> Result<()> {
        self.progress.begin_batch(names.len());
        let mut first_error = None;
        for name in names {
            let name = name.as_ref();
            if let Err(e) = self.validate_asset(manager, name) {
                engine_error!("galaxy3d::AssetLoader", "Validating {} failed: {}", name, e);
                first_error.get_or_insert(e);
            }
            self.progress.complete_one();
        }
        self.progress.end_batch(names.len());
        first_error.map_or(Ok(()), Err)
    }

    fn validate_asset(&self, manager: &mut AssetManager, name: &str) -> Result<()> {
        let handle = manager.get_composite_mesh(name);
        let Some(composite) = manager.composite_meshes().get(handle.id()) else {
            return Ok(());
        };
        let (path, loaded) = (composite.path.clone(), composite.valid() || composite.load_attempted);
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        if loaded {
            return manager.prepare_composite_mesh(handle);
        }

        let Some(kind) = self.loader_for(&path) else {
            engine_warn!(
                "galaxy3d::AssetLoader",
                "{} not recognized from {}",
                path.extension().map(|e| e.to_string_lossy()).unwrap_or_default(),
                path.display()
            );
            return Ok(());
        };

        if manager.log_asset_loading() {
            engine_info!("galaxy3d::AssetLoader", "Validating {} - {}", CompositeMesh::type_name(), name);
        }
        if let Some(composite) = manager.composite_mesh_mut(handle) {
            composite.load_attempted = true;
        }
        match kind {
            LoaderKind::Obj => obj_loader::load_obj(manager, &self.roots, handle)?,
            LoaderKind::Glb | LoaderKind::Gltf => gltf_loader::load_gltf(manager, handle)?,
        }
        manager.prepare_composite_mesh(handle)
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Every regular file below `directory`, recursively
fn walk_directory(directory: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_directory(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}

/// `path` relative to `root`, with forward slashes
fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "asset_loader_tests.rs"]
mod tests;
