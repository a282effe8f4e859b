//! Document-store-backed `ReservationRepository`.
//!
//! This is the only code that knows both physical paths of a reservation:
//! `{Kind}Names/{entity}/{date}` and `{Kind}Bookings/{date}_{entity}`. Every
//! mutation is expressed as one [`WriteBatch`] and applied either as a single
//! atomic update or as ordered single-path writes with compensation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    DocumentStore, DocumentStoreError, ReservationRepository, ReservationRepositoryError,
    StoragePath, WriteBatch,
};
use crate::domain::{
    CanonicalDate, EntityKind, EntityName, IndexAuditReport, IndexEntry, ReservationKey,
    ReservationRecord, normalize,
};

/// How a multi-path mutation reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// One atomic multi-path update per operation.
    Atomic,
    /// Ordered single-path writes; earlier writes are restored when a later
    /// one fails.
    Sequential,
}

/// Reservation repository fanning each record out to both indexes.
pub struct DocumentReservationRepository<S: ?Sized> {
    store: Arc<S>,
    strategy: WriteStrategy,
}

impl<S: ?Sized> Clone for DocumentReservationRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            strategy: self.strategy,
        }
    }
}

impl<S: DocumentStore + ?Sized> DocumentReservationRepository<S> {
    /// Use atomic updates when the store supports them.
    pub fn new(store: Arc<S>) -> Self {
        let strategy = if store.supports_atomic_update() {
            WriteStrategy::Atomic
        } else {
            WriteStrategy::Sequential
        };
        Self::with_strategy(store, strategy)
    }

    /// Force a write strategy.
    pub fn with_strategy(store: Arc<S>, strategy: WriteStrategy) -> Self {
        Self { store, strategy }
    }

    /// Write strategy in effect for this repository.
    pub fn strategy(&self) -> WriteStrategy {
        self.strategy
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), ReservationRepositoryError> {
        debug!(strategy = ?self.strategy, changes = batch.changes().len(), "applying index batch");
        match self.strategy {
            WriteStrategy::Atomic => self.store.update(&batch).await.map_err(map_store_error),
            WriteStrategy::Sequential => self.apply_sequentially(&batch).await,
        }
    }

    async fn apply_sequentially(&self, batch: &WriteBatch) -> Result<(), ReservationRepositoryError> {
        let mut applied: Vec<(&StoragePath, Option<Value>)> = Vec::new();
        for (path, value) in batch.changes() {
            match self.apply_one(path, value.as_ref()).await {
                Ok(previous) => applied.push((path, previous)),
                Err(cause) if applied.is_empty() => return Err(map_store_error(cause)),
                Err(cause) => return Err(self.compensate(applied, cause).await),
            }
        }
        Ok(())
    }

    /// Apply one change and return the value it replaced.
    async fn apply_one(
        &self,
        path: &StoragePath,
        value: Option<&Value>,
    ) -> Result<Option<Value>, DocumentStoreError> {
        let previous = self.store.read(path).await?;
        match value {
            Some(value) => self.store.write(path, value).await?,
            None => self.store.delete(path).await?,
        }
        Ok(previous)
    }

    /// Restore applied changes newest first.
    async fn compensate(
        &self,
        applied: Vec<(&StoragePath, Option<Value>)>,
        cause: DocumentStoreError,
    ) -> ReservationRepositoryError {
        warn!(error = %cause, steps = applied.len(), "index write failed; restoring previous values");
        let mut unrestored = Vec::new();
        for (path, previous) in applied.into_iter().rev() {
            let restored = match &previous {
                Some(value) => self.store.write(path, value).await,
                None => self.store.delete(path).await,
            };
            if let Err(err) = restored {
                error!(
                    path = %path,
                    error = %err,
                    "compensating write failed; reservation indexes diverged"
                );
                unrestored.push(path.to_string());
            }
        }
        if unrestored.is_empty() {
            map_store_error(cause)
        } else {
            ReservationRepositoryError::partial_write(format!(
                "{cause}; unrestored paths: {}",
                unrestored.join(", ")
            ))
        }
    }

    async fn read_object(
        &self,
        path: &StoragePath,
    ) -> Result<serde_json::Map<String, Value>, ReservationRepositoryError> {
        match self.store.read(path).await.map_err(map_store_error)? {
            Some(Value::Object(map)) => Ok(map),
            Some(_) | None => Ok(serde_json::Map::new()),
        }
    }
}

fn map_store_error(error: DocumentStoreError) -> ReservationRepositoryError {
    match error {
        DocumentStoreError::Connection { message } | DocumentStoreError::Timeout { message } => {
            ReservationRepositoryError::connection(message)
        }
        DocumentStoreError::Rejected { message } | DocumentStoreError::Unsupported { message } => {
            ReservationRepositoryError::query(message)
        }
        DocumentStoreError::Decode { message } => ReservationRepositoryError::decode(message),
    }
}

fn encode(record: &ReservationRecord) -> Result<Value, ReservationRepositoryError> {
    serde_json::to_value(record)
        .map_err(|err| ReservationRepositoryError::query(format!("serialise reservation: {err}")))
}

fn decode(path: &StoragePath, value: Value) -> Result<ReservationRecord, ReservationRepositoryError> {
    serde_json::from_value(value)
        .map_err(|err| ReservationRepositoryError::decode(format!("{path}: {err}")))
}

fn index_root(kind: EntityKind) -> StoragePath {
    StoragePath::root().trusted_child(kind.entity_index_root())
}

/// Composite segments grouped by entity name, with normalised dates.
fn composite_entries(map: serde_json::Map<String, Value>) -> Vec<(IndexEntry, String, Value)> {
    map.into_iter()
        .map(|(segment, value)| {
            let entry = match ReservationKey::split_composite_segment(&segment) {
                Some((date, entity)) => IndexEntry::new(entity, normalize(date).as_str()),
                None => IndexEntry::new("", segment.as_str()),
            };
            (entry, segment, value)
        })
        .collect()
}

#[async_trait]
impl<S: DocumentStore + ?Sized> ReservationRepository for DocumentReservationRepository<S> {
    async fn exists(&self, key: &ReservationKey) -> Result<bool, ReservationRepositoryError> {
        let found = self
            .store
            .read(&key.entity_scoped_path())
            .await
            .map_err(map_store_error)?;
        if found.is_some() {
            return Ok(true);
        }
        // Legacy records are keyed by the day-first display form.
        let legacy = ReservationKey::entity_collection_path(key.kind(), key.entity())
            .trusted_child(key.date().display_form());
        let found = self.store.read(&legacy).await.map_err(map_store_error)?;
        Ok(found.is_some())
    }

    async fn find(
        &self,
        key: &ReservationKey,
    ) -> Result<Option<ReservationRecord>, ReservationRepositoryError> {
        let path = key.entity_scoped_path();
        self.store
            .read(&path)
            .await
            .map_err(map_store_error)?
            .map(|value| decode(&path, value))
            .transpose()
    }

    async fn list_same_month(
        &self,
        kind: EntityKind,
        entity: &EntityName,
        date: &CanonicalDate,
    ) -> Result<Vec<CanonicalDate>, ReservationRepositoryError> {
        let keys = self
            .store
            .list_keys(&ReservationKey::entity_collection_path(kind, entity))
            .await
            .map_err(map_store_error)?;
        let wanted = date.year_month();
        let mut dates: Vec<CanonicalDate> = keys
            .iter()
            .filter_map(|key| normalize(key).into_canonical())
            .filter(|candidate| candidate.year_month() == wanted)
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    async fn list_all(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<ReservationRecord>, ReservationRepositoryError> {
        let root = ReservationKey::composite_root(kind);
        let entries = self.read_object(&root).await?;
        let mut records = Vec::with_capacity(entries.len());
        for (segment, value) in entries {
            let path = root.clone().trusted_child(segment);
            match decode(&path, value) {
                Ok(record) => records.push(record),
                Err(err) => warn!(%path, error = %err, "skipping undecodable reservation"),
            }
        }
        Ok(records)
    }

    async fn save(&self, record: &ReservationRecord) -> Result<(), ReservationRepositoryError> {
        let value = encode(record)?;
        let key = record.key();
        self.apply(
            WriteBatch::new()
                .set(key.entity_scoped_path(), value.clone())
                .set(key.composite_path(), value),
        )
        .await
    }

    async fn relocate(
        &self,
        from: &ReservationKey,
        record: &ReservationRecord,
    ) -> Result<(), ReservationRepositoryError> {
        if from == record.key() {
            return self.save(record).await;
        }
        let value = encode(record)?;
        let to = record.key();
        self.apply(
            WriteBatch::new()
                .remove(from.entity_scoped_path())
                .remove(from.composite_path())
                .set(to.entity_scoped_path(), value.clone())
                .set(to.composite_path(), value),
        )
        .await
    }

    async fn delete(&self, key: &ReservationKey) -> Result<(), ReservationRepositoryError> {
        self.apply(
            WriteBatch::new()
                .remove(key.entity_scoped_path())
                .remove(key.composite_path()),
        )
        .await
    }

    async fn delete_entity(
        &self,
        kind: EntityKind,
        entity: &EntityName,
    ) -> Result<usize, ReservationRepositoryError> {
        let collection = ReservationKey::entity_collection_path(kind, entity);
        let scoped_dates = self
            .store
            .list_keys(&collection)
            .await
            .map_err(map_store_error)?;
        let composite_root = ReservationKey::composite_root(kind);
        let composite_segments: Vec<(String, String)> = self
            .store
            .list_keys(&composite_root)
            .await
            .map_err(map_store_error)?
            .into_iter()
            .filter_map(|segment| {
                let (date, name) = ReservationKey::split_composite_segment(&segment)?;
                (name == entity.as_ref()).then(|| (date.to_owned(), segment.clone()))
            })
            .collect();

        let removed: BTreeSet<String> = scoped_dates
            .iter()
            .map(String::as_str)
            .chain(composite_segments.iter().map(|(date, _)| date.as_str()))
            .map(|date| normalize(date).as_str().to_owned())
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }

        let batch = composite_segments.into_iter().fold(
            WriteBatch::new().remove(collection),
            |batch, (_, segment)| batch.remove(composite_root.clone().trusted_child(segment)),
        );
        self.apply(batch).await?;
        info!(entity_kind = %kind, entity = %entity, removed = removed.len(), "entity indexes removed");
        Ok(removed.len())
    }

    async fn audit(
        &self,
        kind: EntityKind,
    ) -> Result<IndexAuditReport, ReservationRepositoryError> {
        let mut scoped: BTreeMap<IndexEntry, Value> = BTreeMap::new();
        for (entity, dates) in self.read_object(&index_root(kind)).await? {
            let Value::Object(dates) = dates else {
                continue;
            };
            for (date, value) in dates {
                scoped.insert(IndexEntry::new(entity.as_str(), normalize(&date).as_str()), value);
            }
        }
        let composite = self
            .read_object(&ReservationKey::composite_root(kind))
            .await?;

        let mut consistent = 0;
        let mut mismatched = Vec::new();
        let mut composite_only = Vec::new();
        for (entry, _segment, value) in composite_entries(composite) {
            match scoped.remove(&entry) {
                Some(scoped_value) if scoped_value == value => consistent += 1,
                Some(_) => mismatched.push(entry),
                None => composite_only.push(entry),
            }
        }
        let entity_only = scoped.into_keys().collect();
        Ok(IndexAuditReport::new(
            kind,
            consistent,
            entity_only,
            composite_only,
            mismatched,
        ))
    }
}

#[cfg(test)]
#[path = "document_reservation_repository_tests.rs"]
mod tests;
