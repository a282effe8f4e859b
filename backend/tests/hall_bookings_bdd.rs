//! Behaviour tests for hall conflict checks and dual-index writes against the
//! in-memory document store.

use std::sync::Arc;

use booking::domain::ports::{
    BookingCommand, BookingQuery, CheckAvailabilityRequest, CheckAvailabilityResponse,
    CommitReservationRequest, DocumentStore, RelocateReservationRequest, ReservationRepository,
    ReservationRepositoryError, StoragePath,
};
use booking::domain::{
    BookingCommandService, BookingQueryService, Caller, CanonicalDate, EntityKind, EntityName,
    Error, ErrorCode, ReservationDetails, ReservationDraft, ReservationKey, ReservationRecord,
};
use booking::outbound::document_store::InMemoryDocumentStore;
use booking::outbound::notifier::TracingBookingNotifier;
use booking::outbound::persistence::DocumentReservationRepository;
use chrono::Utc;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

const HALL: &str = "Rose Hall";

type Repo = DocumentReservationRepository<InMemoryDocumentStore>;

struct HallBookingWorld {
    runtime: Runtime,
    store: Arc<InMemoryDocumentStore>,
    repo: Arc<Repo>,
    command: BookingCommandService<Repo, TracingBookingNotifier>,
    query: BookingQueryService<Repo>,
    availability: Option<CheckAvailabilityResponse>,
    move_result: Option<Result<(), Error>>,
    concurrent: Option<(
        Result<(), ReservationRepositoryError>,
        Result<(), ReservationRepositoryError>,
    )>,
}

impl HallBookingWorld {
    fn over(store: InMemoryDocumentStore) -> Self {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let store = Arc::new(store);
        let repo = Arc::new(DocumentReservationRepository::new(Arc::clone(&store)));
        let command = BookingCommandService::new(
            Arc::clone(&repo),
            Arc::new(TracingBookingNotifier::new()),
            Arc::new(DefaultClock),
        );
        let query = BookingQueryService::new(Arc::clone(&repo));
        Self {
            runtime,
            store,
            repo,
            command,
            query,
            availability: None,
            move_result: None,
            concurrent: None,
        }
    }

    fn read(&self, path: &StoragePath) -> Option<Value> {
        self.runtime
            .block_on(self.store.read(path))
            .expect("store read")
    }
}

fn draft(date: &str, customer: &str) -> ReservationDraft {
    ReservationDraft {
        entity_type: EntityKind::Hall,
        entity_name: HALL.to_owned(),
        date: date.to_owned(),
        customer_name: customer.to_owned(),
        customer_phone: "0790000000".to_owned(),
        customer_email: "guest@example.com".to_owned(),
        owner_email: "rose@example.com".to_owned(),
        event_kind: "wedding".to_owned(),
        guest_count: Some(250),
        ..ReservationDraft::default()
    }
}

fn key(date: &str) -> ReservationKey {
    ReservationKey::new(
        EntityKind::Hall,
        EntityName::new(HALL).expect("valid hall name"),
        CanonicalDate::parse(date).expect("canonical date"),
    )
}

#[fixture]
fn world() -> HallBookingWorld {
    HallBookingWorld::over(InMemoryDocumentStore::new())
}

#[given("an empty booking store")]
fn an_empty_booking_store(world: &mut HallBookingWorld) {
    assert!(world.store.supports_atomic_update());
}

#[given("an empty booking store without atomic updates")]
fn an_empty_booking_store_without_atomic_updates(world: &mut HallBookingWorld) {
    *world = HallBookingWorld::over(InMemoryDocumentStore::new().without_atomic_updates());
}

#[given("Rose Hall is booked on {date}")]
fn rose_hall_is_booked_on(world: &mut HallBookingWorld, date: String) {
    let request = CommitReservationRequest {
        caller: Caller::Customer,
        draft: draft(&date, "Layla Haddad"),
    };
    world
        .runtime
        .block_on(world.command.commit_reservation(request))
        .expect("free date commits");
}

#[when("availability of Rose Hall on {date} is checked")]
fn availability_is_checked(world: &mut HallBookingWorld, date: String) {
    let request = CheckAvailabilityRequest {
        kind: EntityKind::Hall,
        entity: EntityName::new(HALL).expect("valid hall name"),
        date,
    };
    let response = world
        .runtime
        .block_on(world.query.check_availability(request))
        .expect("availability check");
    world.availability = Some(response);
}

#[when("the Rose Hall booking on {from} is moved to {to}")]
fn the_booking_is_moved(world: &mut HallBookingWorld, from: String, to: String) {
    let request = RelocateReservationRequest {
        caller: Caller::Admin,
        from: key(&from),
        draft: draft(&to, "Layla Haddad"),
    };
    let result = world
        .runtime
        .block_on(world.command.relocate_reservation(request))
        .map(|_| ());
    world.move_result = Some(result);
}

#[when("two reservations for Rose Hall on {date} are saved concurrently")]
fn two_reservations_are_saved_concurrently(world: &mut HallBookingWorld, date: String) {
    let record = |customer: &str| {
        let details = ReservationDetails::try_from(draft(&date, customer)).expect("valid draft");
        ReservationRecord::new(details, Utc::now())
    };
    let first = record("First Caller");
    let second = record("Second Caller");
    let outcome = world.runtime.block_on(async {
        futures::future::join(world.repo.save(&first), world.repo.save(&second)).await
    });
    world.concurrent = Some(outcome);
}

#[then("the date is free with no same-month dates")]
fn the_date_is_free(world: &mut HallBookingWorld) {
    let response = world.availability.as_ref().expect("availability checked");
    assert!(!response.report.is_booked());
    assert!(response.report.same_month_dates().is_empty());
    assert!(response.message.is_none());
}

#[then("the date is booked with same-month dates {dates}")]
fn the_date_is_booked(world: &mut HallBookingWorld, dates: String) {
    let response = world.availability.as_ref().expect("availability checked");
    let listed: Vec<String> = response
        .report
        .same_month_dates()
        .iter()
        .map(ToString::to_string)
        .collect();
    let expected: Vec<String> = dates.split(',').map(|d| d.trim().to_owned()).collect();
    assert!(response.report.is_booked());
    assert_eq!(listed, expected);
}

#[then("Rose Hall has no booking on {date} in either index")]
fn no_booking_in_either_index(world: &mut HallBookingWorld, date: String) {
    let key = key(&date);
    assert!(world.read(&key.entity_scoped_path()).is_none());
    assert!(world.read(&key.composite_path()).is_none());
}

#[then("Rose Hall has a booking on {date} in both indexes")]
fn booking_in_both_indexes(world: &mut HallBookingWorld, date: String) {
    let key = key(&date);
    let scoped = world.read(&key.entity_scoped_path()).expect("entity index entry");
    let composite = world.read(&key.composite_path()).expect("composite entry");
    assert_eq!(scoped, composite);
}

#[then("Rose Hall has an edited booking on {date} in both indexes")]
fn edited_booking_in_both_indexes(world: &mut HallBookingWorld, date: String) {
    assert!(matches!(world.move_result, Some(Ok(()))));
    booking_in_both_indexes(world, date.clone());
    let record = world
        .runtime
        .block_on(world.repo.find(&key(&date)))
        .expect("find")
        .expect("moved record");
    assert!(record.updated_at().is_some());
}

#[then("the move is rejected as a conflict")]
fn the_move_is_rejected(world: &mut HallBookingWorld) {
    match world.move_result.as_ref().expect("move attempted") {
        Err(err) => assert_eq!(err.code(), ErrorCode::Conflict),
        Ok(()) => panic!("move onto a taken date succeeded"),
    }
}

#[then("both writes succeed")]
fn both_writes_succeed(world: &mut HallBookingWorld) {
    let (first, second) = world.concurrent.as_ref().expect("writes attempted");
    assert!(first.is_ok() && second.is_ok());
    let stored = world
        .runtime
        .block_on(world.repo.find(&key("2025-06-15")))
        .expect("find")
        .expect("a record survives");
    assert!(
        ["First Caller", "Second Caller"].contains(&stored.details().customer_name()),
        "unexpected survivor {}",
        stored.details().customer_name()
    );
}

#[then("the booking indexes agree")]
fn the_booking_indexes_agree(world: &mut HallBookingWorld) {
    let report = world
        .runtime
        .block_on(world.repo.audit(EntityKind::Hall))
        .expect("audit");
    assert!(report.entity_index_only.is_empty());
    assert!(report.composite_index_only.is_empty());
    assert!(report.mismatched.is_empty());
    assert!(report.consistent >= 1);
}

#[scenario(
    path = "tests/features/hall_bookings.feature",
    name = "An unbooked hall is free"
)]
fn an_unbooked_hall_is_free(world: HallBookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/hall_bookings.feature",
    name = "A committed date is reported as booked"
)]
fn a_committed_date_is_reported_as_booked(world: HallBookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/hall_bookings.feature",
    name = "Same-month dates are only listed for a booked candidate"
)]
fn same_month_dates_are_only_listed_for_a_booked_candidate(world: HallBookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/hall_bookings.feature",
    name = "Relocating a booking moves it in both indexes"
)]
fn relocating_a_booking_moves_it_in_both_indexes(world: HallBookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/hall_bookings.feature",
    name = "Relocating without atomic updates moves it in both indexes"
)]
fn relocating_without_atomic_updates_moves_it_in_both_indexes(world: HallBookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/hall_bookings.feature",
    name = "Relocating onto a taken date keeps the original booking"
)]
fn relocating_onto_a_taken_date_keeps_the_original_booking(world: HallBookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/hall_bookings.feature",
    name = "Concurrent writes to one date both succeed and the last one wins"
)]
fn concurrent_writes_to_one_date_both_succeed(world: HallBookingWorld) {
    drop(world);
}
