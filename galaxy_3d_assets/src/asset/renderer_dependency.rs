/// Renderer dependency provider: deduplicated (layout, transparency) pairs
///
/// Each distinct pair gets a stable index that the renderer uses to select a
/// pipeline variant. Indices are never removed or reordered.

use crate::asset::MeshDataLayout;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RendererDependency {
    pub layout: MeshDataLayout,
    pub transparent: bool,
}

#[derive(Debug, Default)]
pub struct RendererDependencyProvider {
    dependencies: Vec<RendererDependency>,
}

impl RendererDependencyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the matching dependency, appending it when it is new
    pub fn add_dependency(&mut self, layout: &MeshDataLayout, transparent: bool) -> usize {
        if let Some(index) = self
            .dependencies
            .iter()
            .position(|d| d.transparent == transparent && d.layout == *layout)
        {
            return index;
        }
        self.dependencies.push(RendererDependency {
            layout: layout.clone(),
            transparent,
        });
        self.dependencies.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&RendererDependency> {
        self.dependencies.get(index)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RendererDependency> {
        self.dependencies.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "renderer_dependency_tests.rs"]
mod tests;
