//! End-to-end HTTP tests for the booking routes over the in-memory store.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use booking::Trace;
use booking::domain::BookingCommandService;
use booking::domain::BookingQueryService;
use booking::inbound::http::auth::{login, logout};
use booking::inbound::http::bookings;
use booking::inbound::http::state::HttpState;
use booking::outbound::document_store::InMemoryDocumentStore;
use booking::outbound::login::ConfiguredLoginService;
use booking::outbound::notifier::TracingBookingNotifier;
use booking::outbound::persistence::DocumentReservationRepository;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

const SINGER: &str = "/api/v1/singers/Omar%20Band";

fn http_state(store: InMemoryDocumentStore) -> web::Data<HttpState> {
    let repo = Arc::new(DocumentReservationRepository::new(Arc::new(store)));
    let command = BookingCommandService::new(
        Arc::clone(&repo),
        Arc::new(TracingBookingNotifier::new()),
        Arc::new(DefaultClock),
    );
    web::Data::new(HttpState::new(
        Arc::new(ConfiguredLoginService::new("owner", "s3cret")),
        Arc::new(command),
        Arc::new(BookingQueryService::new(repo)),
    ))
}

async fn booking_app(
    store: InMemoryDocumentStore,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(http_state(store))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .service(login)
                    .service(logout)
                    .configure(bookings::configure),
            ),
    )
    .await
}

async fn admin_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": "owner", "password": "s3cret"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie issued")
}

fn singer_draft(date: &str) -> Value {
    json!({
        "customerName": "Sara",
        "customerPhone": "0780000000",
        "customerEmail": "sara@example.com",
        "ownerEmail": "omar@example.com",
        "eventKind": "engagement",
        "price": 900,
        "date": date
    })
}

#[rstest]
#[case::atomic(InMemoryDocumentStore::new())]
#[case::sequential(InMemoryDocumentStore::new().without_atomic_updates())]
#[actix_web::test]
async fn singer_booking_lifecycle(#[case] store: InMemoryDocumentStore) {
    let app = booking_app(store).await;
    let cookie = admin_cookie(&app).await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("{SINGER}/bookings"))
            .set_json(singer_draft("15-06-2025"))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(created).await;
    assert_eq!(body["booking"]["entityType"], "Singer");
    assert_eq!(body["booking"]["date"], "2025-06-15");

    let availability: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("{SINGER}/availability?date=2025-06-15"))
            .to_request(),
    )
    .await;
    assert_eq!(availability["isBooked"], true);
    assert_eq!(availability["sameMonthDates"], json!(["2025-06-15"]));
    assert!(availability["message"].is_string());

    let forbidden = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("{SINGER}/bookings/2025-06-15"))
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let audit: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/singers/bookings/audit")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(audit["consistent"], 1);
    assert_eq!(audit["mismatched"], json!([]));

    let removed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::delete()
            .uri(&format!("{SINGER}/bookings"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(removed["removed"], 1);

    let after: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("{SINGER}/availability?date=15-06-2025"))
            .to_request(),
    )
    .await;
    assert_eq!(after["isBooked"], false);
    assert_eq!(after["sameMonthDates"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn double_booking_is_rejected_with_the_same_month_listing() {
    let app = booking_app(InMemoryDocumentStore::new()).await;
    for date in ["2025-06-02", "2025-06-15"] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("{SINGER}/bookings"))
                .set_json(singer_draft(date))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("{SINGER}/bookings"))
            .set_json(singer_draft("15-06-2025"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(res.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "conflict");
    let message = body["message"].as_str().expect("message");
    assert!(message.ends_with("\n- 2025-06-02\n- 2025-06-15"), "{message}");
    assert_eq!(
        body["details"]["sameMonthDates"],
        json!(["2025-06-02", "2025-06-15"])
    );
}
