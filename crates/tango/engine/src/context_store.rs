//! Context store: records elements publish for flow logic to read
//!
//! A record is a JSON object, conventionally
//! `{ variables, contextValues, methods }`. Publishing merges shallowly
//! into what is already there; later writes win per key.

use serde_json::Value;
use std::collections::HashMap;
use tango_types::ElementId;

/// A published context record
pub type ContextRecord = serde_json::Map<String, Value>;

/// Per-element context records, owned by the workspace
#[derive(Clone, Debug, Default)]
pub struct ContextStore {
    records: HashMap<ElementId, ContextRecord>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-merge `record` into the record of `id`
    pub fn merge(&mut self, id: &ElementId, record: ContextRecord) {
        let current = self.records.entry(id.clone()).or_default();
        for (key, value) in record {
            current.insert(key, value);
        }
    }

    /// Cloned record of `id`, `{}` when nothing was published
    pub fn get(&self, id: &ElementId) -> ContextRecord {
        self.records.get(id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.records.contains_key(id)
    }

    pub fn remove(&mut self, id: &ElementId) -> Option<ContextRecord> {
        self.records.remove(id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Resolve a dotted path `elementId.key.sub...`
    ///
    /// Element ids may contain dots themselves; the longest prefix naming a
    /// published record is taken as the id. Numeric segments index into
    /// arrays. Returns `None` when any segment is missing.
    pub fn resolve_path(&self, path: &str) -> Option<Value> {
        let (record, rest) = self.split_path(path)?;
        let Some(rest) = rest else {
            return Some(Value::Object(record.clone()));
        };

        let mut segments = rest.split('.');
        let mut current = record.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }

    fn split_path<'p>(&self, path: &'p str) -> Option<(&ContextRecord, Option<&'p str>)> {
        if let Some(record) = self.records.get(&ElementId::new(path)) {
            return Some((record, None));
        }
        path.rmatch_indices('.').find_map(|(dot, _)| {
            self.records
                .get(&ElementId::new(&path[..dot]))
                .map(|record| (record, Some(&path[dot + 1..])))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ContextRecord {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_merge_keeps_both_keys() {
        let mut store = ContextStore::new();
        let id = ElementId::new("form");
        store.merge(&id, record(json!({ "variables": ["x"] })));
        store.merge(&id, record(json!({ "methods": ["y"] })));
        assert_eq!(
            Value::Object(store.get(&id)),
            json!({ "variables": ["x"], "methods": ["y"] })
        );
    }

    #[test]
    fn test_later_write_wins() {
        let mut store = ContextStore::new();
        let id = ElementId::new("form");
        store.merge(&id, record(json!({ "variables": ["x"] })));
        store.merge(&id, record(json!({ "variables": ["z"] })));
        assert_eq!(store.get(&id)["variables"], json!(["z"]));
    }

    #[test]
    fn test_default_is_empty() {
        let store = ContextStore::new();
        assert!(store.get(&"missing".into()).is_empty());
    }

    #[test]
    fn test_resolve_path() {
        let mut store = ContextStore::new();
        store.merge(
            &"table".into(),
            record(json!({ "rows": [{ "name": "a" }, { "name": "b" }], "count": 2 })),
        );

        assert_eq!(store.resolve_path("table.count"), Some(json!(2)));
        assert_eq!(store.resolve_path("table.rows.1.name"), Some(json!("b")));
        assert_eq!(store.resolve_path("table.rows.9"), None);
        assert_eq!(store.resolve_path("table.count.deeper"), None);
        assert_eq!(store.resolve_path("ghost.count"), None);
        assert!(store.resolve_path("table").unwrap().is_object());
    }

    #[test]
    fn test_resolve_path_with_dotted_ids() {
        let mut store = ContextStore::new();
        store.merge(&"form".into(), record(json!({ "count": 1 })));
        store.merge(&"form.v2".into(), record(json!({ "count": 2, "fields": ["email"] })));

        assert_eq!(store.resolve_path("form.v2.count"), Some(json!(2)));
        assert_eq!(store.resolve_path("form.v2.fields.0"), Some(json!("email")));
        assert_eq!(store.resolve_path("form.count"), Some(json!(1)));
        assert_eq!(
            store.resolve_path("form.v2"),
            Some(json!({ "count": 2, "fields": ["email"] }))
        );
    }
}
