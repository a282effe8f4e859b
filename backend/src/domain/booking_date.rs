//! Booking date keys.
//!
//! Reservations are stored under a canonical `YYYY-MM-DD` key. Booking forms
//! and some legacy records use `DD-MM-YYYY`, so every date passes through
//! [`normalize`] before it touches the store.
//!
//! Normalisation fails soft: input that matches neither shape comes back
//! lower-cased as [`NormalizedDate::Passthrough`] so substring searches over
//! partially typed dates keep working.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Validation errors raised by [`CanonicalDate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingDateError {
    /// The input is neither `YYYY-MM-DD` nor `DD-MM-YYYY`.
    #[error("date '{value}' must be YYYY-MM-DD or DD-MM-YYYY")]
    Unrecognised { value: String },
}

/// Calendar date in canonical `YYYY-MM-DD` form.
///
/// ## Invariants
/// - Always ten ASCII characters, zero padded, naming a real calendar day.
/// - Lexicographic order equals chronological order.
///
/// # Examples
/// ```
/// use booking::domain::CanonicalDate;
///
/// let date = CanonicalDate::parse("15-06-2025").expect("valid date");
/// assert_eq!(date.as_str(), "2025-06-15");
/// assert_eq!(date.display_form(), "15-06-2025");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(String);

impl CanonicalDate {
    /// Parse either accepted shape into the canonical form.
    pub fn parse(raw: &str) -> Result<Self, BookingDateError> {
        match normalize(raw) {
            NormalizedDate::Canonical(date) => Ok(date),
            NormalizedDate::Passthrough(_) => Err(BookingDateError::Unrecognised {
                value: raw.to_owned(),
            }),
        }
    }

    /// Canonical key string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Four digit year segment.
    pub fn year(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }

    /// Zero padded two digit month segment.
    pub fn month(&self) -> &str {
        self.0.split('-').nth(1).unwrap_or_default()
    }

    /// Year and month pair used for same-month scans.
    pub fn year_month(&self) -> YearMonth<'_> {
        YearMonth {
            year: self.year(),
            month: self.month(),
        }
    }

    /// `DD-MM-YYYY` rendering used by booking forms.
    pub fn display_form(&self) -> String {
        let mut parts = self.0.split('-');
        let (year, month, day) = (
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        );
        format!("{day}-{month}-{year}")
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalDate {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Year and month components of a canonical date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth<'a> {
    /// Four digit year.
    pub year: &'a str,
    /// Two digit month.
    pub month: &'a str,
}

/// Result of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    /// Input matched one of the accepted shapes.
    Canonical(CanonicalDate),
    /// Input matched neither shape; carries the lower-cased input.
    Passthrough(String),
}

impl NormalizedDate {
    /// String form: the canonical key or the lower-cased passthrough.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Canonical(date) => date.as_str(),
            Self::Passthrough(raw) => raw.as_str(),
        }
    }

    /// Canonical date, when the input was well formed.
    pub fn canonical(&self) -> Option<&CanonicalDate> {
        match self {
            Self::Canonical(date) => Some(date),
            Self::Passthrough(_) => None,
        }
    }

    /// Consume into the canonical date, when the input was well formed.
    pub fn into_canonical(self) -> Option<CanonicalDate> {
        match self {
            Self::Canonical(date) => Some(date),
            Self::Passthrough(_) => None,
        }
    }
}

/// Normalise a user supplied date string.
///
/// A four digit first segment selects `YYYY-MM-DD`; a four digit last segment
/// selects `DD-MM-YYYY`. Day and month may be one or two digits and are zero
/// padded. Anything else, including impossible calendar days, is returned
/// lower-cased and otherwise unchanged.
///
/// # Examples
/// ```
/// use booking::domain::{normalize, NormalizedDate};
///
/// assert_eq!(normalize("2025-06-15").as_str(), "2025-06-15");
/// assert_eq!(normalize("15-06-2025").as_str(), "2025-06-15");
/// assert!(matches!(normalize("2024-13"), NormalizedDate::Passthrough(_)));
/// ```
pub fn normalize(raw: &str) -> NormalizedDate {
    match parse_segments(raw.trim()) {
        Some(date) => NormalizedDate::Canonical(CanonicalDate(
            date.format("%Y-%m-%d").to_string(),
        )),
        None => NormalizedDate::Passthrough(raw.to_lowercase()),
    }
}

fn parse_segments(trimmed: &str) -> Option<NaiveDate> {
    let segments: Vec<&str> = trimmed.split('-').collect();
    let [first, second, third] = segments.as_slice() else {
        return None;
    };
    if !segments.iter().all(|segment| is_digits(segment)) {
        return None;
    }

    let (year, month, day) = if first.len() == 4 {
        (*first, *second, *third)
    } else if third.len() == 4 {
        (*third, *second, *first)
    } else {
        return None;
    };
    if !(1..=2).contains(&month.len()) || !(1..=2).contains(&day.len()) {
        return None;
    }

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn is_digits(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|byte| byte.is_ascii_digit())
}
