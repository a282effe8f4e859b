//! In-process document store holding the whole tree in one JSON value.
//!
//! Used when no store URL is configured and by tests. Semantics follow the
//! hosted store: `null` and empty objects are absent, and removing the last
//! child of a node removes the node.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::domain::ports::{DocumentStore, DocumentStoreError, StoragePath, WriteBatch};

/// Tree-in-memory [`DocumentStore`].
///
/// # Examples
/// ```
/// use booking::domain::ports::{DocumentStore, StoragePath};
/// use booking::outbound::document_store::InMemoryDocumentStore;
/// use serde_json::json;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryDocumentStore::new();
/// let path = StoragePath::root().child("HallNames").expect("valid segment");
/// store.write(&path, &json!({"Rose Hall": {"2025-06-15": {}}})).await.expect("write");
/// // Empty objects count as absent, so nothing was stored.
/// assert!(store.read(&path).await.expect("read").is_none());
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    root: RwLock<Value>,
    atomic_updates: bool,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Empty store supporting atomic multi-path updates.
    pub fn new() -> Self {
        Self::with_contents(Value::Null)
    }

    /// Store seeded with `contents` as its root node.
    pub fn with_contents(contents: Value) -> Self {
        Self {
            root: RwLock::new(prune(contents).unwrap_or(Value::Null)),
            atomic_updates: true,
        }
    }

    /// Disable [`DocumentStore::update`], forcing sequential writes.
    pub fn without_atomic_updates(mut self) -> Self {
        self.atomic_updates = false;
        self
    }

    /// Copy of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }
}

/// Drop nulls and empty objects recursively; `None` when nothing remains.
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, child)| prune(child).map(|child| (key, child)))
                .collect();
            (!pruned.is_empty()).then_some(Value::Object(pruned))
        }
        other => Some(other),
    }
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Set or remove the node at `segments`, creating or pruning parents.
fn apply(root: &mut Value, segments: &[String], value: Option<Value>) {
    let value = value.and_then(prune);
    let Some((first, rest)) = segments.split_first() else {
        *root = value.unwrap_or(Value::Null);
        return;
    };

    if value.is_none() && !root.is_object() {
        return;
    }
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    let Value::Object(map) = root else {
        return;
    };

    let mut child = map.remove(first).unwrap_or(Value::Null);
    apply(&mut child, rest, value);
    if !is_absent(&child) {
        map.insert(first.clone(), child);
    }
    if map.is_empty() {
        *root = Value::Null;
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn read(&self, path: &StoragePath) -> Result<Option<Value>, DocumentStoreError> {
        let root = self.root.read().await;
        Ok(lookup(&root, path.segments())
            .filter(|value| !is_absent(value))
            .cloned())
    }

    async fn list_keys(&self, path: &StoragePath) -> Result<Vec<String>, DocumentStoreError> {
        let root = self.root.read().await;
        Ok(lookup(&root, path.segments())
            .and_then(Value::as_object)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn write(&self, path: &StoragePath, value: &Value) -> Result<(), DocumentStoreError> {
        let mut root = self.root.write().await;
        apply(&mut root, path.segments(), Some(value.clone()));
        Ok(())
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), DocumentStoreError> {
        let mut root = self.root.write().await;
        apply(&mut root, path.segments(), None);
        Ok(())
    }

    async fn update(&self, batch: &WriteBatch) -> Result<(), DocumentStoreError> {
        if !self.atomic_updates {
            return Err(DocumentStoreError::unsupported(
                "multi-path updates are disabled for this store",
            ));
        }
        let mut root = self.root.write().await;
        for (path, value) in batch.changes() {
            apply(&mut root, path.segments(), value.clone());
        }
        Ok(())
    }

    fn supports_atomic_update(&self) -> bool {
        self.atomic_updates
    }
}
