//! Builders wiring the document store, repository and booking services into
//! HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};
use url::Url;

use booking::domain::ports::{DocumentStore, FixtureLoginService, LoginService};
use booking::domain::{BookingCommandService, BookingQueryService};
use booking::inbound::http::state::HttpState;
use booking::outbound::document_store::{
    HttpDocumentStore, HttpDocumentStoreConfig, InMemoryDocumentStore,
};
use booking::outbound::login::ConfiguredLoginService;
use booking::outbound::notifier::TracingBookingNotifier;
use booking::outbound::persistence::DocumentReservationRepository;

use super::AppSettings;

/// Choose the document store adapter.
///
/// A configured `store_url` selects the HTTP adapter; otherwise bookings live
/// in process memory and vanish on restart.
pub(crate) fn build_document_store(
    settings: &AppSettings,
) -> std::io::Result<Arc<dyn DocumentStore>> {
    let atomic_updates = settings.store_atomic_updates();
    match settings.store_url.as_deref() {
        Some(raw) => {
            let base_url = Url::parse(raw).map_err(|err| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid store url {raw}: {err}"),
                )
            })?;
            info!(store = %base_url, atomic_updates, "using HTTP document store");
            let store = HttpDocumentStore::new(HttpDocumentStoreConfig {
                base_url,
                auth_token: settings.store_auth_token.clone(),
                timeout: settings.store_timeout(),
                atomic_updates,
            })
            .map_err(|err| std::io::Error::other(err.to_string()))?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("no store url configured; bookings are kept in memory");
            let store = InMemoryDocumentStore::new();
            let store = if atomic_updates {
                store
            } else {
                store.without_atomic_updates()
            };
            Ok(Arc::new(store))
        }
    }
}

fn build_login_service(settings: &AppSettings) -> Arc<dyn LoginService> {
    match settings.admin_credentials() {
        Some((username, password)) => Arc::new(ConfiguredLoginService::new(username, password)),
        None => {
            warn!("administrator credentials not configured; login is disabled");
            Arc::new(FixtureLoginService)
        }
    }
}

/// Build the HTTP state over `store`.
pub(crate) fn build_http_state(
    settings: &AppSettings,
    store: Arc<dyn DocumentStore>,
) -> web::Data<HttpState> {
    let repo = Arc::new(DocumentReservationRepository::new(store));
    info!(strategy = ?repo.strategy(), "reservation repository ready");
    let command = BookingCommandService::new(
        Arc::clone(&repo),
        Arc::new(TracingBookingNotifier::new()),
        Arc::new(DefaultClock),
    );
    let query = BookingQueryService::new(repo);

    web::Data::new(HttpState::new(
        build_login_service(settings),
        Arc::new(command),
        Arc::new(query),
    ))
}
