//! Error taxonomy for the Thymos core.
//!
//! Every rejection an engine can produce is a distinct variant carrying
//! enough context for the caller to build a user-facing message (the
//! conflicting period's id and range, the offending date, and so on).
//! Validations run eagerly before any write, so a returned error always
//! means nothing was persisted.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Unified error type for all Thymos engines.
#[derive(Debug, Error)]
pub enum ThymosError {
    /// Referenced entity does not exist for the requesting user.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Chapter deletion blocked because periods still reference it.
    #[error("chapter {chapter_id} still owns {period_count} period(s)")]
    InUse { chapter_id: Uuid, period_count: u64 },

    /// A second open-ended period was attempted in the same chapter.
    #[error("chapter already has an active period: {period_id}")]
    ActivePeriodExists { period_id: Uuid },

    /// A closed range intersects an existing closed range in the chapter.
    #[error("period overlaps existing period {period_id} ({start} .. {end})")]
    PeriodOverlap {
        period_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Start date after end date.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Attempted to close a period that already has an end date.
    #[error("period {period_id} is already closed")]
    EventAlreadyClosed { period_id: Uuid },

    /// A supplied date is more than one day ahead of today in the
    /// relevant timezone.
    #[error("date {date} is too far in the future")]
    FutureDate { date: NaiveDate },

    /// An unparseable date input.
    #[error("invalid date input: `{input}`")]
    InvalidDate { input: String },

    /// A collaborator (store/provider) failed.
    #[error("store failure: {0}")]
    Store(String),
}

impl ThymosError {
    /// Shorthand for the `NotFound` variant.
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for wrapping a collaborator failure.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_id() {
        let id = Uuid::new_v4();
        let err = ThymosError::not_found("chapter", id);
        let msg = err.to_string();
        assert!(msg.contains("chapter"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn overlap_carries_conflicting_range() {
        let id = Uuid::new_v4();
        let start = Utc::now();
        let err = ThymosError::PeriodOverlap {
            period_id: id,
            start,
            end: start,
        };
        assert!(err.to_string().contains(&id.to_string()));
    }
}
