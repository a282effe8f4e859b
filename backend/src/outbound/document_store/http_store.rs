//! Reqwest-backed document store speaking the realtime-database REST shape.
//!
//! Every node is addressed as `{base}/{segments}.json`. `GET` returns the
//! node or `null`, `?shallow=true` returns child keys only, `PUT` replaces,
//! `DELETE` removes, and `PATCH {base}/.json` with `{"a/b": value | null}`
//! applies a multi-path update atomically.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::ports::{DocumentStore, DocumentStoreError, StoragePath, WriteBatch};

/// Connection settings for [`HttpDocumentStore`].
#[derive(Debug, Clone)]
pub struct HttpDocumentStoreConfig {
    /// Database root, for example `https://example-rtdb.firebaseio.com/`.
    pub base_url: Url,
    /// Appended to every request as the `auth` query parameter.
    pub auth_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Whether multi-path `PATCH` updates may be used.
    pub atomic_updates: bool,
}

/// Document store adapter performing one HTTP request per operation.
pub struct HttpDocumentStore {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
    atomic_updates: bool,
}

impl HttpDocumentStore {
    /// Build an adapter with a reqwest client using the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Rejected`] when the base URL cannot carry
    /// path segments and [`DocumentStoreError::Connection`] when the client
    /// cannot be constructed.
    pub fn new(config: HttpDocumentStoreConfig) -> Result<Self, DocumentStoreError> {
        if config.base_url.cannot_be_a_base() {
            return Err(DocumentStoreError::rejected(format!(
                "store url {} cannot carry a path",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| DocumentStoreError::connection(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url,
            auth_token: config.auth_token,
            atomic_updates: config.atomic_updates,
        })
    }

    fn node_url(&self, path: &StoragePath, shallow: bool) -> Url {
        let mut url = node_url(&self.base_url, path);
        {
            let mut query = url.query_pairs_mut();
            if let Some(token) = &self.auth_token {
                query.append_pair("auth", token);
            }
            if shallow {
                query.append_pair("shallow", "true");
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }

    fn request(&self, method: Method, path: &StoragePath, shallow: bool) -> RequestBuilder {
        self.client
            .request(method, self.node_url(path, shallow))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        path: &StoragePath,
    ) -> Result<Value, DocumentStoreError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(%path, status = status.as_u16(), bytes = body.len(), "document store round trip");
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(body.as_ref()).map_err(|err| {
            DocumentStoreError::decode(format!("invalid JSON at {path}: {err}"))
        })
    }
}

/// `{base}/{segments}.json` with each segment percent-encoded.
fn node_url(base: &Url, path: &StoragePath) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        match path.segments().split_last() {
            Some((last, parents)) => {
                segments.extend(parents);
                segments.push(&format!("{last}.json"));
            }
            None => {
                segments.push(".json");
            }
        }
    }
    url
}

fn shallow_keys(value: Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.into_iter().map(|(key, _)| key).collect(),
        _ => Vec::new(),
    }
}

fn batch_body(batch: &WriteBatch) -> Value {
    let map: Map<String, Value> = batch
        .changes()
        .iter()
        .map(|(path, value)| (path.to_string(), value.clone().unwrap_or(Value::Null)))
        .collect();
    Value::Object(map)
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn read(&self, path: &StoragePath) -> Result<Option<Value>, DocumentStoreError> {
        let value = self
            .execute(self.request(Method::GET, path, false), path)
            .await?;
        Ok(Some(value).filter(|value| !value.is_null()))
    }

    async fn list_keys(&self, path: &StoragePath) -> Result<Vec<String>, DocumentStoreError> {
        let value = self
            .execute(self.request(Method::GET, path, true), path)
            .await?;
        Ok(shallow_keys(value))
    }

    async fn write(&self, path: &StoragePath, value: &Value) -> Result<(), DocumentStoreError> {
        self.execute(self.request(Method::PUT, path, false).json(value), path)
            .await
            .map(drop)
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), DocumentStoreError> {
        self.execute(self.request(Method::DELETE, path, false), path)
            .await
            .map(drop)
    }

    async fn update(&self, batch: &WriteBatch) -> Result<(), DocumentStoreError> {
        if !self.atomic_updates {
            return Err(DocumentStoreError::unsupported(
                "multi-path updates are disabled for this store",
            ));
        }
        if batch.is_empty() {
            return Ok(());
        }
        let root = StoragePath::root();
        self.execute(
            self.request(Method::PATCH, &root, false)
                .json(&batch_body(batch)),
            &root,
        )
        .await
        .map(drop)
    }

    fn supports_atomic_update(&self) -> bool {
        self.atomic_updates
    }
}

fn map_transport_error(error: reqwest::Error) -> DocumentStoreError {
    if error.is_timeout() {
        DocumentStoreError::timeout(error.to_string())
    } else {
        DocumentStoreError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DocumentStoreError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            DocumentStoreError::timeout(message)
        }
        _ if status.is_client_error() => DocumentStoreError::rejected(message),
        _ => DocumentStoreError::connection(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
