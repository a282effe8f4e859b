//! Reservation aggregate: one booked slot for one entity on one date.
//!
//! A booking form produces a [`ReservationDraft`]. Validation turns it into
//! [`ReservationDetails`], and the writer stamps timestamps to produce the
//! stored [`ReservationRecord`]. The record serialises to the camelCase
//! document kept in both storage indexes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::openapi::{RefOr, schema::Schema};
use utoipa::{PartialSchema, ToSchema};

use crate::domain::ports::StoragePath;
use crate::domain::{
    CanonicalDate, EntityKind, EntityName, EntityNameValidationError, NormalizedDate, normalize,
};

/// Identity of a reservation: entity kind, entity name and canonical date.
///
/// Derives both physical storage paths.
///
/// # Examples
/// ```
/// use booking::domain::{CanonicalDate, EntityKind, EntityName, ReservationKey};
///
/// let key = ReservationKey::new(
///     EntityKind::Hall,
///     EntityName::new("Rose Hall").expect("valid name"),
///     CanonicalDate::parse("2025-06-15").expect("valid date"),
/// );
/// assert_eq!(key.entity_scoped_path().to_string(), "HallNames/Rose Hall/2025-06-15");
/// assert_eq!(key.composite_path().to_string(), "HallsBookings/2025-06-15_Rose Hall");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReservationKey {
    kind: EntityKind,
    entity: EntityName,
    date: CanonicalDate,
}

impl ReservationKey {
    /// Build a key from validated parts.
    pub fn new(kind: EntityKind, entity: EntityName, date: CanonicalDate) -> Self {
        Self { kind, entity, date }
    }

    /// Entity kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Entity display name.
    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    /// Canonical booking date.
    pub fn date(&self) -> &CanonicalDate {
        &self.date
    }

    /// `{Kind}Names/{entity}`: every reservation of one entity.
    pub fn entity_collection_path(kind: EntityKind, entity: &EntityName) -> StoragePath {
        StoragePath::root()
            .trusted_child(kind.entity_index_root())
            .trusted_child(entity.as_ref())
    }

    /// `{Kind}Names/{entity}/{date}`.
    pub fn entity_scoped_path(&self) -> StoragePath {
        Self::entity_collection_path(self.kind, &self.entity).trusted_child(self.date.as_str())
    }

    /// `{Kind}Bookings/{date}_{entity}`.
    pub fn composite_path(&self) -> StoragePath {
        Self::composite_root(self.kind).trusted_child(self.composite_segment())
    }

    /// Root of the flat composite index for `kind`.
    pub fn composite_root(kind: EntityKind) -> StoragePath {
        StoragePath::root().trusted_child(kind.composite_index_root())
    }

    /// Composite index key segment, `{date}_{entity}`.
    pub fn composite_segment(&self) -> String {
        format!("{}_{}", self.date, self.entity)
    }

    /// Split a composite segment into its raw date and entity parts.
    ///
    /// Dates never contain `_`, so the first underscore is the separator and
    /// entity names may contain further underscores.
    pub fn split_composite_segment(segment: &str) -> Option<(&str, &str)> {
        segment
            .split_once('_')
            .filter(|(date, entity)| !date.is_empty() && !entity.is_empty())
    }
}

/// Raw booking form input.
///
/// Strings default to empty so an incomplete form still deserialises and
/// validation can name every missing field at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationDraft {
    /// Hall or singer.
    pub entity_type: EntityKind,
    /// Display name of the hall or singer.
    pub entity_name: String,
    /// Booking date as typed: `YYYY-MM-DD` or `DD-MM-YYYY`.
    #[schema(example = "15-06-2025")]
    pub date: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    /// Contact address of the hall or singer owner.
    pub owner_email: String,
    /// Free-text event category, for example "wedding" or "engagement".
    pub event_kind: String,
    /// Expected guests; hall bookings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<u32>,
    /// Agreed fee in whole currency units; singer bookings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Validation errors raised when turning a draft into [`ReservationDetails`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationValidationError {
    /// Required fields were absent or blank; names are camelCase in form order.
    #[error("please fill in all required booking fields")]
    MissingFields { fields: Vec<&'static str> },
    /// The entity name is not a usable storage key.
    #[error("invalid entity name: {0}")]
    EntityName(#[from] EntityNameValidationError),
    /// The date matched neither accepted shape.
    #[error("date '{value}' must be YYYY-MM-DD or DD-MM-YYYY")]
    Date { value: String },
    /// A field was supplied for the wrong entity kind.
    #[error("{field} does not apply to {kind} bookings")]
    NotApplicable {
        field: &'static str,
        kind: EntityKind,
    },
}

/// Validated booking fields without storage timestamps.
///
/// ## Invariants
/// - Every required text field is trimmed and non-empty.
/// - `guest_count` is only set for halls and `price` only for singers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReservationDraft", into = "ReservationDraft")]
pub struct ReservationDetails {
    key: ReservationKey,
    customer_name: String,
    customer_phone: String,
    customer_email: String,
    owner_email: String,
    event_kind: String,
    guest_count: Option<u32>,
    price: Option<u64>,
    notes: Option<String>,
}

impl ReservationDetails {
    /// Reservation identity.
    pub fn key(&self) -> &ReservationKey {
        &self.key
    }

    /// Name of the person booking.
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// Contact phone number.
    pub fn customer_phone(&self) -> &str {
        &self.customer_phone
    }

    /// Contact email of the customer.
    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    /// Email of the hall or singer owner.
    pub fn owner_email(&self) -> &str {
        &self.owner_email
    }

    /// Kind of occasion, such as `wedding`.
    pub fn event_kind(&self) -> &str {
        &self.event_kind
    }

    /// Expected guests; halls only.
    pub fn guest_count(&self) -> Option<u32> {
        self.guest_count
    }

    /// Agreed price; singers only.
    pub fn price(&self) -> Option<u64> {
        self.price
    }

    /// Free-form notes.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

// Documented with the draft schema since that is the serialised shape.
impl PartialSchema for ReservationDetails {
    fn schema() -> RefOr<Schema> {
        ReservationDraft::schema()
    }
}

impl ToSchema for ReservationDetails {}

fn required(value: String, field: &'static str, missing: &mut Vec<&'static str>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        missing.push(field);
    }
    trimmed.to_owned()
}

impl TryFrom<ReservationDraft> for ReservationDetails {
    type Error = ReservationValidationError;

    fn try_from(draft: ReservationDraft) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let entity_name = required(draft.entity_name, "entityName", &mut missing);
        let date = required(draft.date, "date", &mut missing);
        let customer_name = required(draft.customer_name, "customerName", &mut missing);
        let customer_phone = required(draft.customer_phone, "customerPhone", &mut missing);
        let customer_email = required(draft.customer_email, "customerEmail", &mut missing);
        let owner_email = required(draft.owner_email, "ownerEmail", &mut missing);
        let event_kind = required(draft.event_kind, "eventKind", &mut missing);
        if !missing.is_empty() {
            return Err(ReservationValidationError::MissingFields { fields: missing });
        }

        let kind = draft.entity_type;
        let entity = EntityName::new(entity_name)?;
        let date = match normalize(&date) {
            NormalizedDate::Canonical(date) => date,
            NormalizedDate::Passthrough(_) => {
                return Err(ReservationValidationError::Date { value: date });
            }
        };
        if kind == EntityKind::Singer && draft.guest_count.is_some() {
            return Err(ReservationValidationError::NotApplicable {
                field: "guestCount",
                kind,
            });
        }
        if kind == EntityKind::Hall && draft.price.is_some() {
            return Err(ReservationValidationError::NotApplicable {
                field: "price",
                kind,
            });
        }

        Ok(Self {
            key: ReservationKey::new(kind, entity, date),
            customer_name,
            customer_phone,
            customer_email,
            owner_email,
            event_kind,
            guest_count: draft.guest_count,
            price: draft.price,
            notes: draft
                .notes
                .map(|notes| notes.trim().to_owned())
                .filter(|notes| !notes.is_empty()),
        })
    }
}

impl From<ReservationDetails> for ReservationDraft {
    fn from(details: ReservationDetails) -> Self {
        let ReservationKey { kind, entity, date } = details.key;
        Self {
            entity_type: kind,
            entity_name: entity.to_string(),
            date: date.to_string(),
            customer_name: details.customer_name,
            customer_phone: details.customer_phone,
            customer_email: details.customer_email,
            owner_email: details.owner_email,
            event_kind: details.event_kind,
            guest_count: details.guest_count,
            price: details.price,
            notes: details.notes,
        }
    }
}

/// Stored reservation: validated details plus write timestamps.
///
/// Serialises to the document written, byte for byte, to both indexes.
///
/// # Examples
/// ```
/// use booking::domain::{EntityKind, ReservationDetails, ReservationDraft, ReservationRecord};
/// use chrono::Utc;
///
/// let draft = ReservationDraft {
///     entity_type: EntityKind::Hall,
///     entity_name: "Rose Hall".into(),
///     date: "15-06-2025".into(),
///     customer_name: "Layla".into(),
///     customer_phone: "0790000000".into(),
///     customer_email: "layla@example.com".into(),
///     owner_email: "owner@example.com".into(),
///     event_kind: "wedding".into(),
///     ..ReservationDraft::default()
/// };
/// let details = ReservationDetails::try_from(draft).expect("valid draft");
/// let record = ReservationRecord::new(details, Utc::now());
/// assert_eq!(record.key().date().as_str(), "2025-06-15");
/// assert!(record.updated_at().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    #[serde(flatten)]
    details: ReservationDetails,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl ReservationRecord {
    /// Create a fresh record stamped at `created_at`.
    pub fn new(details: ReservationDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            details,
            created_at,
            updated_at: None,
        }
    }

    /// Replace the details of an existing record, keeping `created_at`.
    pub fn edited(&self, details: ReservationDetails, updated_at: DateTime<Utc>) -> Self {
        Self {
            details,
            created_at: self.created_at,
            updated_at: Some(updated_at),
        }
    }

    /// Reservation identity.
    pub fn key(&self) -> &ReservationKey {
        self.details.key()
    }

    /// Validated booking details.
    pub fn details(&self) -> &ReservationDetails {
        &self.details
    }

    /// When the booking was first committed.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the booking was last edited, if ever.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[cfg(test)]
#[path = "reservation_tests.rs"]
mod tests;
