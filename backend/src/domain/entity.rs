//! Bookable entities: wedding halls and singers.
//!
//! An entity's display name doubles as its storage key, so names are
//! validated as store path segments before any reservation references them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Kind of bookable entity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum EntityKind {
    /// A wedding hall.
    #[default]
    Hall,
    /// A singer or band.
    Singer,
}

impl EntityKind {
    /// Root of the entity-scoped index (`{root}/{entity}/{date}`).
    pub fn entity_index_root(self) -> &'static str {
        match self {
            Self::Hall => "HallNames",
            Self::Singer => "SingerNames",
        }
    }

    /// Root of the flat composite index (`{root}/{date}_{entity}`).
    pub fn composite_index_root(self) -> &'static str {
        match self {
            Self::Hall => "HallsBookings",
            Self::Singer => "SingerBookings",
        }
    }

    /// URL path slug used by the HTTP adapter.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Hall => "halls",
            Self::Singer => "singers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hall => f.write_str("Hall"),
            Self::Singer => f.write_str("Singer"),
        }
    }
}

/// Error returned when parsing an [`EntityKind`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind '{0}'; expected halls or singers")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "hall" | "halls" => Ok(Self::Hall),
            "singer" | "singers" => Ok(Self::Singer),
            _ => Err(UnknownEntityKind(value.to_owned())),
        }
    }
}

/// Validation errors for [`EntityName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityNameValidationError {
    /// Name was blank once trimmed.
    #[error("entity name must not be empty")]
    Empty,
    /// Name contains a character the store forbids in keys.
    #[error("entity name must not contain '{character}'")]
    ForbiddenCharacter { character: char },
}

const FORBIDDEN_KEY_CHARACTERS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Display name of a hall or singer, usable as a storage key segment.
///
/// ## Invariants
/// - Trimmed and non-empty.
/// - Contains none of `/ . # $ [ ]` and no control characters.
///
/// # Examples
/// ```
/// use booking::domain::EntityName;
///
/// let name = EntityName::new("  Rose Hall ").expect("valid name");
/// assert_eq!(name.as_ref(), "Rose Hall");
/// assert!(EntityName::new("Rose/Hall").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityName(String);

impl EntityName {
    /// Validate and construct an entity name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EntityNameValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EntityNameValidationError::Empty);
        }
        if let Some(character) = trimmed
            .chars()
            .find(|c| FORBIDDEN_KEY_CHARACTERS.contains(c) || c.is_control())
        {
            return Err(EntityNameValidationError::ForbiddenCharacter { character });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for EntityName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
