//! Chapters and their date-ranged periods.
//!
//! A chapter is a named container for one or more periods; a period is one
//! contiguous stretch of days, open-ended while the stretch is still
//! running. Period bounds persist as absolute instants pinned to local
//! midnight in the owning user's timezone, so every comparison happens in
//! one reference frame regardless of where the user lives.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::civil;

/// A named, categorized container for date-ranged periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Uuid,
}

/// One contiguous date range within a chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub id: Uuid,
    pub chapter_id: Uuid,

    /// Inclusive first day, as local midnight in the user's timezone.
    pub start: DateTime<Utc>,

    /// Inclusive last day, local midnight. `None` while the period is
    /// still running.
    pub end: Option<DateTime<Utc>>,

    pub comment: Option<String>,
}

impl Period {
    /// Whether the period is still open-ended.
    pub fn is_active(&self) -> bool {
        self.end.is_none()
    }

    /// Strict-inequality overlap against a closed candidate range.
    ///
    /// Open-ended periods never participate: they have no end to overlap
    /// with. A period ending on day N and one starting on day N share only
    /// a boundary and do NOT overlap, so a chapter can read as contiguous
    /// when the user splits a period at a date.
    pub fn overlaps_closed(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        match self.end {
            Some(own_end) => self.start < end && start < own_end,
            None => false,
        }
    }

    /// Whether `date` (in `tz`) falls inside this period, an open end
    /// running through `today`.
    pub fn contains_date(&self, date: NaiveDate, today: NaiveDate, tz: Tz) -> bool {
        let start = civil::civil_date_in(self.start, tz);
        let end = self
            .end
            .map(|e| civil::civil_date_in(e, tz))
            .unwrap_or(today);
        start <= date && date <= end
    }

    /// Whether this period starts on `date` in `tz`.
    pub fn starts_on(&self, date: NaiveDate, tz: Tz) -> bool {
        civil::civil_date_in(self.start, tz) == date
    }

    /// Whether this period ends on `date` in `tz`.
    pub fn ends_on(&self, date: NaiveDate, tz: Tz) -> bool {
        self.end
            .map(|e| civil::civil_date_in(e, tz) == date)
            .unwrap_or(false)
    }
}

/// Input for creating a period. Dates arrive date-only; the engine pins
/// them to the user's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodDraft {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub comment: Option<String>,
}

/// Partial update for a period. `None` keeps the stored value; there is no
/// way to null out an end date through an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodPatch {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub comment: Option<String>,
}

/// Partial update for a chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
}

/// A chapter with its periods re-expressed as date-only values in the
/// user's timezone — what mutation operations hand back to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub periods: Vec<PeriodView>,
}

/// One period in a [`ChapterView`], dates local to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodView {
    pub id: Uuid,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub comment: Option<String>,
}

impl ChapterView {
    /// Assembles a view from fresh store state, periods sorted by start.
    pub fn assemble(chapter: &Chapter, mut periods: Vec<Period>, tz: Tz) -> Self {
        periods.sort_by_key(|p| p.start);
        Self {
            id: chapter.id,
            title: chapter.title.clone(),
            description: chapter.description.clone(),
            category_id: chapter.category_id,
            periods: periods
                .into_iter()
                .map(|p| PeriodView {
                    id: p.id,
                    start: civil::civil_date_in(p.start, tz),
                    end: p.end.map(|e| civil::civil_date_in(e, tz)),
                    comment: p.comment,
                })
                .collect(),
        }
    }
}
