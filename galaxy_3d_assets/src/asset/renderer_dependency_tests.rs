/// Tests for RendererDependencyProvider

use super::*;
use crate::asset::{MeshDataInfo, VertexDataElem};

fn position_layout(stride: u16) -> MeshDataLayout {
    let mut layout = MeshDataLayout::default();
    layout.infos.insert(VertexDataElem::Position, MeshDataInfo::new(stride, 3, 4));
    layout
}

#[test]
fn test_same_dependency_returns_same_index() {
    let mut provider = RendererDependencyProvider::new();

    let a = provider.add_dependency(&position_layout(24), false);
    let b = provider.add_dependency(&position_layout(24), false);

    assert_eq!(a, 0);
    assert_eq!(b, 0);
    assert_eq!(provider.len(), 1);
}

#[test]
fn test_transparency_distinguishes_dependencies() {
    let mut provider = RendererDependencyProvider::new();

    let opaque = provider.add_dependency(&position_layout(24), false);
    let transparent = provider.add_dependency(&position_layout(24), true);

    assert_ne!(opaque, transparent);
    assert_eq!(provider.len(), 2);
    assert!(provider.get(transparent).unwrap().transparent);
}

#[test]
fn test_layout_distinguishes_dependencies() {
    let mut provider = RendererDependencyProvider::new();

    let a = provider.add_dependency(&position_layout(24), false);
    let b = provider.add_dependency(&position_layout(48), false);
    let again = provider.add_dependency(&position_layout(24), false);

    assert_eq!(a, 0);
    assert_eq!(b, 1);
    assert_eq!(again, 0);
}

#[test]
fn test_get_out_of_range() {
    let provider = RendererDependencyProvider::new();
    assert!(provider.is_empty());
    assert!(provider.get(0).is_none());
}
