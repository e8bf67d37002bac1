use super::*;

// ============================================================================
// Test asset
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Thing {
    name: String,
    payload: u32,
}

impl Thing {
    fn new(name: &str, payload: u32) -> Self {
        Self { name: name.to_string(), payload }
    }
}

impl Asset for Thing {
    fn type_name() -> &'static str {
        "Thing"
    }

    fn empty(name: String) -> Self {
        Self { name, payload: 0 }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn valid(&self) -> bool {
        self.payload != 0
    }
}

// ============================================================================
// add / dedup
// ============================================================================

#[test]
fn test_add_assigns_sequential_ids() {
    let mut c = AssetContainer::new();
    assert_eq!(c.add(Thing::new("a", 1)), AssetId(0));
    assert_eq!(c.add(Thing::new("b", 2)), AssetId(1));
    assert_eq!(c.size(), 2);
}

#[test]
fn test_duplicate_names_are_suffixed() {
    let mut c = AssetContainer::new();
    let a = c.add(Thing::new("foo", 1));
    let b = c.add(Thing::new("foo", 2));
    let d = c.add(Thing::new("foo", 3));

    assert_eq!(c[a].name, "foo");
    assert_eq!(c[b].name, "foo_1");
    assert_eq!(c[d].name, "foo_2");
    assert_eq!(c.translate_if_exists("foo_1"), b);
    assert_eq!(c.available_names(), vec!["foo", "foo_1", "foo_2"]);
}

#[test]
fn test_suffix_skips_taken_names() {
    let mut c = AssetContainer::new();
    c.add(Thing::new("foo_1", 1));
    c.add(Thing::new("foo", 1));
    let id = c.add(Thing::new("foo", 1));
    assert_eq!(c[id].name, "foo_2");
}

// ============================================================================
// translate
// ============================================================================

#[test]
fn test_translate_existing() {
    let mut c = AssetContainer::new();
    let id = c.add(Thing::new("x", 5));
    assert_eq!(c.translate("x"), id);
    assert_eq!(c.size(), 1);
}

#[test]
fn test_translate_missing_registers_stable_placeholder() {
    let mut c: AssetContainer<Thing> = AssetContainer::new();
    let first = c.translate("ghost");
    let second = c.translate("ghost");

    assert_eq!(first, second);
    assert_eq!(c.size(), 1);
    assert!(!c[first].valid());
}

#[test]
fn test_translate_if_exists_does_not_register() {
    let c: AssetContainer<Thing> = AssetContainer::new();
    assert_eq!(c.translate_if_exists("ghost"), AssetId::INVALID);
    assert!(c.is_empty());
}

// ============================================================================
// resolve
// ============================================================================

#[test]
fn test_resolve_valid_asset() {
    let mut c = AssetContainer::new();
    let id = c.add(Thing::new("real", 9));
    assert_eq!(c.resolve(AssetHandle::new(id)).payload, 9);
}

#[test]
fn test_resolve_invalid_falls_back_to_default() {
    let mut c = AssetContainer::new();
    let default = c.add(Thing::new("__default", 42));
    c.set_default(AssetHandle::new(default));
    let placeholder = c.translate("missing");

    assert_eq!(c.resolve(AssetHandle::new(placeholder)).payload, 42);
    assert_eq!(c.resolve(AssetHandle::INVALID).payload, 42);
    assert_eq!(c.resolve(AssetHandle::new(AssetId(999))).payload, 42);
    assert_eq!(c.resolved_id(AssetHandle::new(placeholder)), default);
}

#[test]
fn test_resolve_without_default_never_fails() {
    let c: AssetContainer<Thing> = AssetContainer::new();
    let thing = c.resolve(AssetHandle::INVALID);
    assert_eq!(thing.name, "__fallbackThing");
    assert_eq!(c.resolved_id(AssetHandle::INVALID), AssetId::INVALID);
}

#[test]
fn test_resolve_mut_edits_target() {
    let mut c = AssetContainer::new();
    let id = c.add(Thing::new("a", 1));
    c.resolve_mut(AssetHandle::new(id)).payload = 7;
    assert_eq!(c.get(id).unwrap().payload, 7);
}

#[test]
fn test_iter_yields_ids_in_order() {
    let mut c = AssetContainer::new();
    c.add(Thing::new("a", 1));
    c.add(Thing::new("b", 2));
    let ids: Vec<AssetId> = c.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![AssetId(0), AssetId(1)]);
}
