//! Port for reservation persistence across both storage indexes.
//!
//! Implementations own the fan-out to the entity-scoped and composite
//! indexes. Callers never address either path directly.

use async_trait::async_trait;

use crate::domain::{
    CanonicalDate, EntityKind, EntityName, IndexAuditReport, ReservationKey, ReservationRecord,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reservation repository adapters.
    pub enum ReservationRepositoryError {
        /// The backing store could not be reached or timed out.
        Connection { message: String } =>
            "reservation repository connection failed: {message}",
        /// The backing store refused or failed the operation.
        Query { message: String } =>
            "reservation repository query failed: {message}",
        /// A stored document could not be decoded.
        Decode { message: String } =>
            "reservation document could not be decoded: {message}",
        /// A write failed and its compensating action failed too, leaving
        /// the two indexes diverged.
        PartialWrite { message: String } =>
            "reservation indexes diverged after a partial write: {message}",
    }
}

/// Port for reading and writing reservations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Whether a node exists at the key's entity-scoped path, under either
    /// the canonical or the legacy day-first date segment.
    async fn exists(&self, key: &ReservationKey) -> Result<bool, ReservationRepositoryError>;

    /// Read the record at the key's entity-scoped path.
    async fn find(
        &self,
        key: &ReservationKey,
    ) -> Result<Option<ReservationRecord>, ReservationRepositoryError>;

    /// Booked dates of `entity` sharing the year and month of `date`,
    /// sorted ascending.
    async fn list_same_month(
        &self,
        kind: EntityKind,
        entity: &EntityName,
        date: &CanonicalDate,
    ) -> Result<Vec<CanonicalDate>, ReservationRepositoryError>;

    /// Every decodable record in the composite index of `kind`.
    async fn list_all(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<ReservationRecord>, ReservationRepositoryError>;

    /// Write `record` to both indexes at its key.
    async fn save(&self, record: &ReservationRecord) -> Result<(), ReservationRepositoryError>;

    /// Remove both entries at `from` and write `record` at its own key.
    async fn relocate(
        &self,
        from: &ReservationKey,
        record: &ReservationRecord,
    ) -> Result<(), ReservationRepositoryError>;

    /// Remove both entries at `key`.
    async fn delete(&self, key: &ReservationKey) -> Result<(), ReservationRepositoryError>;

    /// Remove every reservation of `entity`; returns how many were removed.
    async fn delete_entity(
        &self,
        kind: EntityKind,
        entity: &EntityName,
    ) -> Result<usize, ReservationRepositoryError>;

    /// Compare both indexes of `kind` without modifying either.
    async fn audit(&self, kind: EntityKind)
    -> Result<IndexAuditReport, ReservationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReservationRepository;

#[async_trait]
impl ReservationRepository for FixtureReservationRepository {
    async fn exists(&self, _key: &ReservationKey) -> Result<bool, ReservationRepositoryError> {
        Ok(false)
    }

    async fn find(
        &self,
        _key: &ReservationKey,
    ) -> Result<Option<ReservationRecord>, ReservationRepositoryError> {
        Ok(None)
    }

    async fn list_same_month(
        &self,
        _kind: EntityKind,
        _entity: &EntityName,
        _date: &CanonicalDate,
    ) -> Result<Vec<CanonicalDate>, ReservationRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_all(
        &self,
        _kind: EntityKind,
    ) -> Result<Vec<ReservationRecord>, ReservationRepositoryError> {
        Ok(Vec::new())
    }

    async fn save(&self, _record: &ReservationRecord) -> Result<(), ReservationRepositoryError> {
        Ok(())
    }

    async fn relocate(
        &self,
        _from: &ReservationKey,
        _record: &ReservationRecord,
    ) -> Result<(), ReservationRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _key: &ReservationKey) -> Result<(), ReservationRepositoryError> {
        Ok(())
    }

    async fn delete_entity(
        &self,
        _kind: EntityKind,
        _entity: &EntityName,
    ) -> Result<usize, ReservationRepositoryError> {
        Ok(0)
    }

    async fn audit(
        &self,
        kind: EntityKind,
    ) -> Result<IndexAuditReport, ReservationRepositoryError> {
        Ok(IndexAuditReport::new(kind, 0, Vec::new(), Vec::new(), Vec::new()))
    }
}
