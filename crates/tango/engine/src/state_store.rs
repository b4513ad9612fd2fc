//! State store: runtime values injected into elements
//!
//! Each element id owns an entry of named values. Writes merge shallowly,
//! so setting one key never disturbs the others, and reads hand out
//! clones. Entries are created on first write and dropped when the
//! element is removed.

use crate::context_store::ContextRecord;
use crate::Workspace;
use std::collections::{BTreeMap, HashMap};
use tango_types::ElementId;

/// Key holding the engine mode (`"design"`, `"preview"`, ...)
pub const MODE_KEY: &str = "tg_mode";

/// Key set to `true` on the element currently highlighted as drop target
pub const DROP_PLACEHOLDER_KEY: &str = "tg_dropPlaceholder";

/// Key holding the [`ContextSetter`] an element uses to publish context
pub const SET_CONTEXT_VALUES_KEY: &str = "tg_setContextValues";

/// Capability to publish context values on behalf of one element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextSetter {
    element: ElementId,
}

impl ContextSetter {
    pub fn new(element: ElementId) -> Self {
        Self { element }
    }

    /// The element this setter publishes for
    pub fn element(&self) -> &ElementId {
        &self.element
    }

    /// Merge `record` into the bound element's context value
    pub fn publish(&self, workspace: &mut Workspace, record: ContextRecord) {
        workspace.set_context_value(&self.element, record);
    }
}

/// One value in a state entry
#[derive(Clone, Debug, PartialEq)]
pub enum StateValue {
    /// Plain data
    Value(serde_json::Value),
    /// Injected context publishing capability
    ContextSetter(ContextSetter),
}

impl StateValue {
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::ContextSetter(_) => None,
        }
    }

    pub fn as_context_setter(&self) -> Option<&ContextSetter> {
        match self {
            Self::ContextSetter(setter) => Some(setter),
            Self::Value(_) => None,
        }
    }
}

impl From<serde_json::Value> for StateValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

impl From<ContextSetter> for StateValue {
    fn from(setter: ContextSetter) -> Self {
        Self::ContextSetter(setter)
    }
}

/// Named values of one element
pub type StateEntry = BTreeMap<String, StateValue>;

/// A batch of state writes keyed by element id
pub type StatePatch = BTreeMap<ElementId, StateEntry>;

/// Build a patch that sets a single key on a single element
pub fn state_patch(id: ElementId, key: impl Into<String>, value: impl Into<StateValue>) -> StatePatch {
    let mut entry = StateEntry::new();
    entry.insert(key.into(), value.into());
    let mut patch = StatePatch::new();
    patch.insert(id, entry);
    patch
}

/// Per-element state, owned by the workspace
#[derive(Clone, Debug, Default)]
pub struct StateStore {
    entries: HashMap<ElementId, StateEntry>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `entry` into the state of `id`, key by key
    pub fn merge(&mut self, id: &ElementId, entry: StateEntry) {
        self.entries.entry(id.clone()).or_default().extend(entry);
    }

    /// Cloned state of `id`, empty when nothing was set
    pub fn get(&self, id: &ElementId) -> StateEntry {
        self.entries.get(id).cloned().unwrap_or_default()
    }

    pub fn value(&self, id: &ElementId, key: &str) -> Option<StateValue> {
        self.entries.get(id).and_then(|e| e.get(key)).cloned()
    }

    pub fn remove(&mut self, id: &ElementId) -> Option<StateEntry> {
        self.entries.remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of elements with state
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(pairs: &[(&str, serde_json::Value)]) -> StateEntry {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), StateValue::from(v.clone())))
            .collect()
    }

    #[test]
    fn test_shallow_merge() {
        let mut store = StateStore::new();
        let id = ElementId::new("btn");
        store.merge(&id, entry(&[("a", json!(1))]));
        store.merge(&id, entry(&[("b", json!(2))]));
        assert_eq!(store.get(&id), entry(&[("a", json!(1)), ("b", json!(2))]));

        store.merge(&id, entry(&[("a", json!({"nested": true}))]));
        assert_eq!(store.value(&id, "a"), Some(StateValue::from(json!({"nested": true}))));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut store = StateStore::new();
        let id = ElementId::new("btn");
        store.merge(&id, entry(&[("a", json!(1))]));
        let once = store.get(&id);
        store.merge(&id, entry(&[("a", json!(1))]));
        assert_eq!(store.get(&id), once);
    }

    #[test]
    fn test_reads_are_clones() {
        let mut store = StateStore::new();
        let id = ElementId::new("btn");
        store.merge(&id, entry(&[("a", json!(1))]));
        let mut copy = store.get(&id);
        copy.insert("b".into(), json!(2).into());
        assert_eq!(store.get(&id).len(), 1);
    }

    #[test]
    fn test_missing_entry_is_empty() {
        let store = StateStore::new();
        assert!(store.get(&"nobody".into()).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_state_patch_helper() {
        let patch = state_patch("x".into(), MODE_KEY, json!("design"));
        assert_eq!(patch.len(), 1);
        let setter = ContextSetter::new("x".into());
        assert_eq!(StateValue::from(setter.clone()).as_context_setter(), Some(&setter));
    }
}
