//! Historical "on this day" resolution.
//!
//! Given a base date with content, surfaces what the user recorded one
//! month, six months, and one year earlier. Subtraction is calendar-unit
//! with end-of-month clamping, so anniversaries of a month's last days
//! stay in the expected month instead of sliding. Candidates without
//! content are silently omitted — never replaced by a neighboring day.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use thymos_core::civil;
use thymos_core::{DayStore, MoodSnapshot, MoodStateProvider, ThymosError};

/// The fixed lookback intervals, in result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryOffset {
    OneMonth,
    SixMonths,
    OneYear,
}

impl MemoryOffset {
    /// All offsets in the order results are reported.
    pub const ALL: [MemoryOffset; 3] = [
        MemoryOffset::OneMonth,
        MemoryOffset::SixMonths,
        MemoryOffset::OneYear,
    ];

    fn months(self) -> u32 {
        match self {
            MemoryOffset::OneMonth => 1,
            MemoryOffset::SixMonths => 6,
            MemoryOffset::OneYear => 12,
        }
    }

    /// The historical date this offset points at, clamped to the last
    /// valid day of the target month.
    pub fn apply(self, base: NaiveDate) -> NaiveDate {
        civil::months_back(base, self.months())
    }
}

/// One historical day with content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayMemory {
    pub offset: MemoryOffset,
    pub date: NaiveDate,

    /// Mood snapshot, when the day carried one the provider still knows.
    pub mood: Option<MoodSnapshot>,
    pub media_count: usize,
    pub main_media_id: Option<Uuid>,
}

/// Aggregate of one historical week with at least one active day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekMemory {
    pub offset: MemoryOffset,

    /// Monday of the ISO week the candidate date falls in.
    pub week_start: NaiveDate,

    /// Sunday of that week.
    pub week_end: NaiveDate,

    /// Days in the week carrying a mood or media.
    pub active_days: usize,
    pub media_count: usize,
}

/// Read-only resolver over day records.
pub struct MemoryResolver {
    days: Arc<dyn DayStore>,
    moods: Arc<dyn MoodStateProvider>,
}

impl MemoryResolver {
    pub fn new(days: Arc<dyn DayStore>, moods: Arc<dyn MoodStateProvider>) -> Self {
        Self { days, moods }
    }

    /// Day-granularity memories for `base` (a `YYYY-MM-DD` string).
    ///
    /// Empty when the base day itself has no content; otherwise at most
    /// one entry per offset, in [1 month, 6 months, 1 year] order.
    pub async fn day_memories(
        &self,
        user_id: Uuid,
        base: &str,
    ) -> Result<Vec<DayMemory>, ThymosError> {
        let base_date = civil::parse_date(base)?;
        if !self.base_has_content(user_id, base_date).await? {
            return Ok(Vec::new());
        }

        let states = self.moods.mood_states(user_id).await?;
        let by_id: HashMap<Uuid, MoodSnapshot> = states
            .iter()
            .map(|s| (s.id, MoodSnapshot::from(s)))
            .collect();

        let mut memories = Vec::new();
        for offset in MemoryOffset::ALL {
            let candidate = offset.apply(base_date);
            let day = match self.days.day(user_id, candidate).await? {
                Some(day) if day.has_content() => day,
                _ => continue,
            };
            memories.push(DayMemory {
                offset,
                date: candidate,
                mood: day.mood_state_id.and_then(|id| by_id.get(&id).cloned()),
                media_count: day.media_count(),
                main_media_id: day.main_media_id,
            });
        }
        tracing::debug!(%user_id, base = %base_date, hits = memories.len(), "day memories resolved");
        Ok(memories)
    }

    /// Week-granularity memories: for each offset, the ISO week around
    /// the candidate date, reported when at least one of its days was
    /// active.
    pub async fn week_memories(
        &self,
        user_id: Uuid,
        base: &str,
    ) -> Result<Vec<WeekMemory>, ThymosError> {
        let base_date = civil::parse_date(base)?;
        if !self.base_has_content(user_id, base_date).await? {
            return Ok(Vec::new());
        }

        let mut memories = Vec::new();
        for offset in MemoryOffset::ALL {
            let candidate = offset.apply(base_date);
            let (week_start, week_end) = civil::week_bounds(candidate);
            let days = self.days.days_in_range(user_id, week_start, week_end).await?;
            let active: Vec<_> = days.iter().filter(|d| d.has_content()).collect();
            if active.is_empty() {
                continue;
            }
            memories.push(WeekMemory {
                offset,
                week_start,
                week_end,
                active_days: active.len(),
                media_count: active.iter().map(|d| d.media_count()).sum(),
            });
        }
        Ok(memories)
    }

    async fn base_has_content(
        &self,
        user_id: Uuid,
        base_date: NaiveDate,
    ) -> Result<bool, ThymosError> {
        Ok(self
            .days
            .day(user_id, base_date)
            .await?
            .map(|d| d.has_content())
            .unwrap_or(false))
    }
}
