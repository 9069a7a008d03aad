//! Read-only data store.
//!
//! Base documents live under `data`. Rules shadow store paths: a reference is only read from the store when no rule
//! matches it.

use std::fmt;

use super::Value;

/// Read access to base documents.
pub trait Store: Send + Sync + fmt::Debug {
    /// Read the document at `path` (segments below `data`). An empty path is the whole tree.
    fn read(&self, path: &[String]) -> Option<Value>;
}

/// A store holding one JSON document tree.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    root: serde_json::Value,
}

impl InMemoryStore {
    /// An empty store (`data` is `{}`).
    pub fn new() -> Self {
        Self {
            root: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn from_json(root: serde_json::Value) -> Self {
        let mut store = Self::new();
        store.merge(root);
        store
    }

    /// Deep-merge `doc` into the tree. Objects merge key by key; anything else replaces what was there.
    pub fn merge(&mut self, doc: serde_json::Value) {
        merge_into(&mut self.root, doc);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_into(target: &mut serde_json::Value, doc: serde_json::Value) {
    match (target, doc) {
        (serde_json::Value::Object(existing), serde_json::Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, doc) => {
            if !slot.is_null() && !slot.is_object() {
                tracing::debug!("store: replacing non-object document");
            }
            *slot = doc;
        }
    }
}

impl Store for InMemoryStore {
    fn read(&self, path: &[String]) -> Option<Value> {
        let mut node = &self.root;
        for segment in path {
            node = match node {
                serde_json::Value::Object(map) => map.get(segment)?,
                serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(Value::from(node.clone()))
    }
}
