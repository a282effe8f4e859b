//! Read-only comparison of the entity-scoped and composite indexes.
//!
//! A crash between the two index writes leaves them diverged. The audit
//! reports such entries; repair is left to an operator.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::EntityKind;

/// Raw storage coordinates of one audited reservation.
///
/// Values are kept as stored so malformed legacy keys are still reported.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub entity_name: String,
    /// Canonical date when the stored key normalises, otherwise the raw key.
    pub date: String,
}

impl IndexEntry {
    /// Entry for `entity_name` on `date` as found in the index.
    pub fn new(entity_name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            date: date.into(),
        }
    }
}

/// Divergence between the two physical indexes of one entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexAuditReport {
    pub entity_type: EntityKind,
    /// Entries reachable in both indexes with identical documents.
    pub consistent: usize,
    /// Present under `{Kind}Names` only.
    pub entity_index_only: Vec<IndexEntry>,
    /// Present under `{Kind}Bookings` only.
    pub composite_index_only: Vec<IndexEntry>,
    /// Present in both with different documents.
    pub mismatched: Vec<IndexEntry>,
}

impl IndexAuditReport {
    /// Build a report; entry lists are sorted for stable output.
    pub fn new(
        entity_type: EntityKind,
        consistent: usize,
        mut entity_index_only: Vec<IndexEntry>,
        mut composite_index_only: Vec<IndexEntry>,
        mut mismatched: Vec<IndexEntry>,
    ) -> Self {
        entity_index_only.sort();
        composite_index_only.sort();
        mismatched.sort();
        Self {
            entity_type,
            consistent,
            entity_index_only,
            composite_index_only,
            mismatched,
        }
    }

    /// Whether both indexes agree on every entry.
    pub fn is_consistent(&self) -> bool {
        self.entity_index_only.is_empty()
            && self.composite_index_only.is_empty()
            && self.mismatched.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_report_is_consistent() {
        let report = IndexAuditReport::new(EntityKind::Hall, 3, vec![], vec![], vec![]);
        assert!(report.is_consistent());
    }

    #[rstest]
    fn entries_are_sorted() {
        let report = IndexAuditReport::new(
            EntityKind::Singer,
            0,
            vec![
                IndexEntry::new("Omar", "2025-07-01"),
                IndexEntry::new("Nour", "2025-08-01"),
            ],
            vec![],
            vec![],
        );

        assert!(!report.is_consistent());
        assert_eq!(report.entity_index_only[0].entity_name, "Nour");
    }
}
