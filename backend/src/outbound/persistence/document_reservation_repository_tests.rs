//! Tests for the dual-index write protocol over the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::{ReservationDetails, ReservationDraft};
use crate::outbound::document_store::InMemoryDocumentStore;

fn record(kind: EntityKind, entity: &str, date: &str) -> ReservationRecord {
    let draft = ReservationDraft {
        entity_type: kind,
        entity_name: entity.to_owned(),
        date: date.to_owned(),
        customer_name: "Layla Haddad".to_owned(),
        customer_phone: "0790000000".to_owned(),
        customer_email: "layla@example.com".to_owned(),
        owner_email: "owner@example.com".to_owned(),
        event_kind: "wedding".to_owned(),
        guest_count: (kind == EntityKind::Hall).then_some(200),
        price: (kind == EntityKind::Singer).then_some(1_500),
        notes: None,
    };
    let details = ReservationDetails::try_from(draft).expect("valid draft");
    let created_at = Utc
        .with_ymd_and_hms(2025, 5, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    ReservationRecord::new(details, created_at)
}

fn hall(entity: &str, date: &str) -> ReservationRecord {
    record(EntityKind::Hall, entity, date)
}

fn name(raw: &str) -> EntityName {
    EntityName::new(raw).expect("valid name")
}

fn date(raw: &str) -> CanonicalDate {
    CanonicalDate::parse(raw).expect("valid date")
}

fn path(segments: &[&str]) -> StoragePath {
    segments
        .iter()
        .try_fold(StoragePath::root(), |path, segment| path.child(*segment))
        .expect("valid segments")
}

fn repository(
    strategy: WriteStrategy,
) -> (
    Arc<InMemoryDocumentStore>,
    DocumentReservationRepository<InMemoryDocumentStore>,
) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let repo = DocumentReservationRepository::with_strategy(Arc::clone(&store), strategy);
    (store, repo)
}

/// Store wrapper failing mutations on demand.
struct FlakyStore {
    inner: InMemoryDocumentStore,
    failing_prefix: Option<&'static str>,
    mutations_left: AtomicUsize,
}

impl FlakyStore {
    fn failing_under(inner: InMemoryDocumentStore, prefix: &'static str) -> Self {
        Self {
            inner,
            failing_prefix: Some(prefix),
            mutations_left: AtomicUsize::new(usize::MAX),
        }
    }

    fn failing_after(inner: InMemoryDocumentStore, mutations: usize) -> Self {
        Self {
            inner,
            failing_prefix: None,
            mutations_left: AtomicUsize::new(mutations),
        }
    }

    fn check(&self, path: &StoragePath) -> Result<(), DocumentStoreError> {
        let blocked = self
            .failing_prefix
            .is_some_and(|prefix| path.segments().first().is_some_and(|first| first == prefix));
        let exhausted = self
            .mutations_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_err();
        if blocked || exhausted {
            Err(DocumentStoreError::connection(format!("refused write to {path}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn read(&self, path: &StoragePath) -> Result<Option<Value>, DocumentStoreError> {
        self.inner.read(path).await
    }

    async fn list_keys(&self, path: &StoragePath) -> Result<Vec<String>, DocumentStoreError> {
        self.inner.list_keys(path).await
    }

    async fn write(&self, path: &StoragePath, value: &Value) -> Result<(), DocumentStoreError> {
        self.check(path)?;
        self.inner.write(path, value).await
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), DocumentStoreError> {
        self.check(path)?;
        self.inner.delete(path).await
    }

    async fn update(&self, batch: &WriteBatch) -> Result<(), DocumentStoreError> {
        for (path, _) in batch.changes() {
            self.check(path)?;
        }
        self.inner.update(batch).await
    }

    fn supports_atomic_update(&self) -> bool {
        self.inner.supports_atomic_update()
    }
}

#[fixture]
fn seeded() -> InMemoryDocumentStore {
    let existing = serde_json::to_value(hall("Rose Hall", "2025-06-02")).expect("encode");
    InMemoryDocumentStore::with_contents(json!({
        "HallNames": {"Rose Hall": {"2025-06-02": existing.clone()}},
        "HallsBookings": {"2025-06-02_Rose Hall": existing},
    }))
}

#[rstest]
fn strategy_follows_store_capability() {
    let atomic = DocumentReservationRepository::new(Arc::new(InMemoryDocumentStore::new()));
    let sequential = DocumentReservationRepository::new(Arc::new(
        InMemoryDocumentStore::new().without_atomic_updates(),
    ));

    assert_eq!(atomic.strategy(), WriteStrategy::Atomic);
    assert_eq!(sequential.strategy(), WriteStrategy::Sequential);
}

#[rstest]
#[case::atomic(WriteStrategy::Atomic)]
#[case::sequential(WriteStrategy::Sequential)]
#[tokio::test]
async fn save_writes_identical_documents_to_both_indexes(#[case] strategy: WriteStrategy) {
    let (store, repo) = repository(strategy);
    let booking = hall("Rose Hall", "2025-06-15");

    repo.save(&booking).await.expect("save succeeds");

    let scoped = store
        .read(&path(&["HallNames", "Rose Hall", "2025-06-15"]))
        .await
        .expect("read");
    let composite = store
        .read(&path(&["HallsBookings", "2025-06-15_Rose Hall"]))
        .await
        .expect("read");
    assert!(scoped.is_some());
    assert_eq!(scoped, composite);
    assert!(repo.exists(booking.key()).await.expect("exists"));
    assert_eq!(repo.find(booking.key()).await.expect("find"), Some(booking));
}

#[rstest]
#[case::canonical("2025-06-15", true)]
#[case::legacy("2025-06-02", true)]
#[case::free("2025-06-03", false)]
#[tokio::test]
async fn exists_finds_canonical_and_legacy_keys(#[case] candidate: &str, #[case] booked: bool) {
    let value = json!({"customerName": "legacy"});
    let store = InMemoryDocumentStore::with_contents(json!({
        "HallNames": {"Rose Hall": {
            "2025-06-15": value.clone(),
            "02-06-2025": value,
        }}
    }));
    let repo = DocumentReservationRepository::new(Arc::new(store));
    let key = ReservationKey::new(EntityKind::Hall, name("Rose Hall"), date(candidate));

    assert_eq!(repo.exists(&key).await.expect("lookup succeeds"), booked);
}

#[rstest]
#[tokio::test]
async fn same_month_dates_include_legacy_keys() {
    let value = json!({"customerName": "legacy"});
    let store = InMemoryDocumentStore::with_contents(json!({
        "HallNames": {"Rose Hall": {
            "2025-06-20": value.clone(),
            "02-06-2025": value.clone(),
            "2025-07-01": value.clone(),
            "not a date": value,
        }}
    }));
    let repo = DocumentReservationRepository::new(Arc::new(store));

    let dates = repo
        .list_same_month(EntityKind::Hall, &name("Rose Hall"), &date("2025-06-15"))
        .await
        .expect("listing succeeds");

    assert_eq!(dates, vec![date("2025-06-02"), date("2025-06-20")]);
}

#[rstest]
#[case::atomic(WriteStrategy::Atomic)]
#[case::sequential(WriteStrategy::Sequential)]
#[tokio::test]
async fn relocate_moves_both_entries(#[case] strategy: WriteStrategy) {
    let (store, repo) = repository(strategy);
    let original = hall("Rose Hall", "2025-06-15");
    repo.save(&original).await.expect("seed");
    let moved = hall("Rose Hall", "2025-07-01");

    repo.relocate(original.key(), &moved).await.expect("relocate");

    assert_eq!(
        store.snapshot().await,
        json!({
            "HallNames": {"Rose Hall": {"2025-07-01": serde_json::to_value(&moved).expect("encode")}},
            "HallsBookings": {"2025-07-01_Rose Hall": serde_json::to_value(&moved).expect("encode")},
        })
    );
}

#[rstest]
#[case::atomic(WriteStrategy::Atomic)]
#[case::sequential(WriteStrategy::Sequential)]
#[tokio::test]
async fn delete_removes_both_entries(#[case] strategy: WriteStrategy) {
    let (store, repo) = repository(strategy);
    let booking = hall("Rose Hall", "2025-06-15");
    repo.save(&booking).await.expect("seed");

    repo.delete(booking.key()).await.expect("delete");

    assert_eq!(store.snapshot().await, Value::Null);
    assert!(!repo.exists(booking.key()).await.expect("exists"));
}

#[rstest]
#[tokio::test]
async fn delete_entity_leaves_other_entities_alone() {
    let (store, repo) = repository(WriteStrategy::Atomic);
    for booking in [
        hall("Rose Hall", "2025-06-15"),
        hall("Rose Hall", "2025-06-20"),
        hall("Rose Garden", "2025-06-15"),
    ] {
        repo.save(&booking).await.expect("seed");
    }

    let removed = repo
        .delete_entity(EntityKind::Hall, &name("Rose Hall"))
        .await
        .expect("delete entity");

    assert_eq!(removed, 2);
    assert_eq!(
        store
            .list_keys(&path(&["HallsBookings"]))
            .await
            .expect("list"),
        vec!["2025-06-15_Rose Garden".to_owned()]
    );
    assert_eq!(
        store.list_keys(&path(&["HallNames"])).await.expect("list"),
        vec!["Rose Garden".to_owned()]
    );
}

#[rstest]
#[tokio::test]
async fn delete_entity_without_bookings_is_a_no_op() {
    let (_store, repo) = repository(WriteStrategy::Sequential);

    let removed = repo
        .delete_entity(EntityKind::Singer, &name("Omar"))
        .await
        .expect("delete entity");

    assert_eq!(removed, 0);
}

#[rstest]
#[tokio::test]
async fn sequential_failure_restores_the_entity_index(seeded: InMemoryDocumentStore) {
    let before = seeded.snapshot().await;
    let store = Arc::new(FlakyStore::failing_under(seeded, "HallsBookings"));
    let repo = DocumentReservationRepository::with_strategy(Arc::clone(&store), WriteStrategy::Sequential);

    let err = repo
        .save(&hall("Rose Hall", "2025-06-15"))
        .await
        .expect_err("composite write fails");

    assert!(matches!(err, ReservationRepositoryError::Connection { .. }));
    assert_eq!(store.inner.snapshot().await, before);
}

#[rstest]
#[tokio::test]
async fn sequential_relocation_reports_unrestored_steps(seeded: InMemoryDocumentStore) {
    let before = seeded.snapshot().await;
    let store = Arc::new(FlakyStore::failing_after(seeded, 3));
    let repo = DocumentReservationRepository::with_strategy(Arc::clone(&store), WriteStrategy::Sequential);
    let original = hall("Rose Hall", "2025-06-02");

    let err = repo
        .relocate(original.key(), &hall("Rose Hall", "2025-06-09"))
        .await;

    // Three steps succeed, the fourth fails and every restore is refused.
    assert!(matches!(err, Err(ReservationRepositoryError::PartialWrite { .. })));
    assert_ne!(store.inner.snapshot().await, before);
}

#[rstest]
#[tokio::test]
async fn failed_compensation_reports_a_partial_write() {
    let store = Arc::new(FlakyStore::failing_after(InMemoryDocumentStore::new(), 1));
    let repo = DocumentReservationRepository::with_strategy(Arc::clone(&store), WriteStrategy::Sequential);

    let err = repo
        .save(&hall("Rose Hall", "2025-06-15"))
        .await
        .expect_err("second write fails");

    let ReservationRepositoryError::PartialWrite { message } = err else {
        panic!("expected a partial write, got {err:?}");
    };
    assert!(message.contains("HallNames/Rose Hall/2025-06-15"));
}

#[rstest]
#[tokio::test]
async fn atomic_failure_writes_nothing(seeded: InMemoryDocumentStore) {
    let before = seeded.snapshot().await;
    let store = Arc::new(FlakyStore::failing_under(seeded, "HallsBookings"));
    let repo = DocumentReservationRepository::new(Arc::clone(&store));

    let err = repo
        .save(&hall("Rose Hall", "2025-06-15"))
        .await
        .expect_err("batch rejected");

    assert!(matches!(err, ReservationRepositoryError::Connection { .. }));
    assert_eq!(store.inner.snapshot().await, before);
}

#[rstest]
#[tokio::test]
async fn list_all_skips_undecodable_documents(seeded: InMemoryDocumentStore) {
    seeded
        .write(&path(&["HallsBookings", "2025-06-03_Broken"]), &json!({"oops": 1}))
        .await
        .expect("seed");
    let repo = DocumentReservationRepository::new(Arc::new(seeded));

    let records = repo.list_all(EntityKind::Hall).await.expect("listing");

    assert_eq!(records, vec![hall("Rose Hall", "2025-06-02")]);
}

#[rstest]
#[tokio::test]
async fn audit_reports_each_kind_of_divergence(seeded: InMemoryDocumentStore) {
    let orphan = serde_json::to_value(hall("Rose Hall", "2025-06-20")).expect("encode");
    let changed = serde_json::to_value(hall("Ivory Hall", "2025-06-21")).expect("encode");
    seeded
        .write(&path(&["HallNames", "Rose Hall", "2025-06-20"]), &orphan)
        .await
        .expect("seed");
    seeded
        .write(&path(&["HallsBookings", "2025-06-25_Lotus Hall"]), &orphan)
        .await
        .expect("seed");
    seeded
        .write(&path(&["HallNames", "Ivory Hall", "2025-06-21"]), &changed)
        .await
        .expect("seed");
    seeded
        .write(
            &path(&["HallsBookings", "2025-06-21_Ivory Hall"]),
            &json!({"customerName": "someone else"}),
        )
        .await
        .expect("seed");
    let repo = DocumentReservationRepository::new(Arc::new(seeded));

    let report = repo.audit(EntityKind::Hall).await.expect("audit");

    assert_eq!(report.consistent, 1);
    assert_eq!(
        report.entity_index_only,
        vec![IndexEntry::new("Rose Hall", "2025-06-20")]
    );
    assert_eq!(
        report.composite_index_only,
        vec![IndexEntry::new("Lotus Hall", "2025-06-25")]
    );
    assert_eq!(
        report.mismatched,
        vec![IndexEntry::new("Ivory Hall", "2025-06-21")]
    );
    assert!(!report.is_consistent());
}

#[rstest]
#[tokio::test]
async fn audit_of_empty_store_is_consistent() {
    let (_store, repo) = repository(WriteStrategy::Atomic);

    let report = repo.audit(EntityKind::Singer).await.expect("audit");

    assert!(report.is_consistent());
    assert_eq!(report.consistent, 0);
}
