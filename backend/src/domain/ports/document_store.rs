//! Port for the hierarchical key-path document store.
//!
//! The store is a tree of JSON values addressed by `/`-separated paths. An
//! absent node and a JSON `null` are the same thing. Every call is one network
//! round trip; there is no multi-call transaction, only the optional atomic
//! multi-path [`DocumentStore::update`].

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// The store answered but refused the operation (permission, quota, bad request).
        Rejected { message: String } =>
            "document store rejected the request: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "document store request timed out: {message}",
        /// The store answered with a body that could not be decoded.
        Decode { message: String } =>
            "document store response could not be decoded: {message}",
        /// The adapter does not implement the requested capability.
        Unsupported { message: String } =>
            "document store operation unsupported: {message}",
    }
}

/// Validation errors for [`StoragePath`] segments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoragePathError {
    /// A segment was empty.
    #[error("storage path segments must not be empty")]
    EmptySegment,
    /// A segment contained the path separator.
    #[error("storage path segment '{segment}' must not contain '/'")]
    Separator { segment: String },
}

/// Path to a node in the document store.
///
/// ## Invariants
/// - Every segment is non-empty and free of `/`.
/// - The root path has zero segments.
///
/// # Examples
/// ```
/// use booking::domain::ports::StoragePath;
///
/// let path = StoragePath::root()
///     .child("HallNames")
///     .and_then(|path| path.child("Rose Hall"))
///     .expect("valid segments");
/// assert_eq!(path.to_string(), "HallNames/Rose Hall");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoragePath {
    segments: Vec<String>,
}

impl StoragePath {
    /// The root of the store.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Append one segment.
    pub fn child(mut self, segment: impl Into<String>) -> Result<Self, StoragePathError> {
        let segment = segment.into();
        if segment.is_empty() {
            return Err(StoragePathError::EmptySegment);
        }
        if segment.contains('/') {
            return Err(StoragePathError::Separator { segment });
        }
        self.segments.push(segment);
        Ok(self)
    }

    /// Append a segment already validated as a store key, such as an
    /// entity name or canonical date.
    pub(crate) fn trusted_child(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        debug_assert!(!segment.is_empty() && !segment.contains('/'));
        self.segments.push(segment);
        self
    }

    /// Path segments from the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment, `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Whether this is the store root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Ordered set of path changes applied by [`DocumentStore::update`].
///
/// `None` removes the node at that path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    changes: Vec<(StoragePath, Option<Value>)>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write of `value` at `path`.
    pub fn set(mut self, path: StoragePath, value: Value) -> Self {
        self.changes.push((path, Some(value)));
        self
    }

    /// Queue removal of the node at `path`.
    pub fn remove(mut self, path: StoragePath) -> Self {
        self.changes.push((path, None));
        self
    }

    /// Queued changes in insertion order.
    pub fn changes(&self) -> &[(StoragePath, Option<Value>)] {
        &self.changes
    }

    /// Whether the batch holds no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Path-addressed read/write/delete access to the document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the node at `path`; `None` when absent.
    async fn read(&self, path: &StoragePath) -> Result<Option<Value>, DocumentStoreError>;

    /// Child keys of the node at `path`, without their values. Empty when absent.
    async fn list_keys(&self, path: &StoragePath) -> Result<Vec<String>, DocumentStoreError>;

    /// Replace the node at `path` with `value`.
    async fn write(&self, path: &StoragePath, value: &Value) -> Result<(), DocumentStoreError>;

    /// Remove the node at `path`. Removing an absent node succeeds.
    async fn delete(&self, path: &StoragePath) -> Result<(), DocumentStoreError>;

    /// Apply every change in `batch` atomically: all or none become visible.
    async fn update(&self, batch: &WriteBatch) -> Result<(), DocumentStoreError>;

    /// Whether [`DocumentStore::update`] is available on this adapter.
    fn supports_atomic_update(&self) -> bool;
}
