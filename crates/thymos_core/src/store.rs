//! Collaborator contracts the engines consume.
//!
//! Persistence technology is not this core's business: engines talk to
//! whatever implements these traits. The one hard requirement is the
//! transaction boundary on [`TimelineStore`] — the consistency engine's
//! read–check–write sequence must run against state no concurrent mutation
//! can move under it, so `begin` must serialize mutations touching the
//! same user's chapters (a lock, a database transaction, anything with
//! that effect).

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use uuid::Uuid;

use crate::chapter::{Chapter, Period};
use crate::day::{Day, MediaItem};
use crate::error::ThymosError;
use crate::mood::{Category, MoodState};

pub type StoreResult<T> = Result<T, ThymosError>;

/// Period/chapter store. Read paths are lock-free; every mutation goes
/// through a [`TimelineTx`].
#[async_trait]
pub trait TimelineStore: Send + Sync {
    /// Opens a transaction serializing timeline mutations. Dropping the
    /// returned value without [`TimelineTx::commit`] abandons it.
    async fn begin(&self) -> StoreResult<Box<dyn TimelineTx>>;

    async fn chapter(&self, user_id: Uuid, chapter_id: Uuid) -> StoreResult<Option<Chapter>>;

    async fn chapters(&self, user_id: Uuid) -> StoreResult<Vec<Chapter>>;

    async fn periods_of(&self, chapter_id: Uuid) -> StoreResult<Vec<Period>>;

    async fn categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>>;
}

/// One unit of timeline work. All reads observe the transaction's isolated
/// state; all writes become visible atomically at commit.
#[async_trait]
pub trait TimelineTx: Send {
    async fn chapter(&mut self, user_id: Uuid, chapter_id: Uuid) -> StoreResult<Option<Chapter>>;

    async fn period(&mut self, user_id: Uuid, period_id: Uuid) -> StoreResult<Option<Period>>;

    /// Closed periods of a chapter, optionally excluding one period id
    /// (so an update can keep its own slot).
    async fn closed_periods(
        &mut self,
        chapter_id: Uuid,
        exclude: Option<Uuid>,
    ) -> StoreResult<Vec<Period>>;

    /// The chapter's open-ended period, if any, optionally excluding one
    /// period id.
    async fn active_period(
        &mut self,
        chapter_id: Uuid,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<Period>>;

    async fn periods_of(&mut self, chapter_id: Uuid) -> StoreResult<Vec<Period>>;

    async fn period_count(&mut self, chapter_id: Uuid) -> StoreResult<u64>;

    async fn category(&mut self, user_id: Uuid, category_id: Uuid)
        -> StoreResult<Option<Category>>;

    async fn insert_period(&mut self, period: Period) -> StoreResult<()>;

    async fn update_period(&mut self, period: Period) -> StoreResult<()>;

    async fn delete_period(&mut self, period_id: Uuid) -> StoreResult<()>;

    async fn insert_chapter(&mut self, chapter: Chapter) -> StoreResult<()>;

    async fn update_chapter(&mut self, chapter: Chapter) -> StoreResult<()>;

    async fn delete_chapter(&mut self, chapter_id: Uuid) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Day-record store. Upserts create the day on first write.
#[async_trait]
pub trait DayStore: Send + Sync {
    async fn day(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<Option<Day>>;

    /// Sets (or clears) the mood of a date, creating the day if needed.
    async fn set_mood(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        mood_state_id: Option<Uuid>,
    ) -> StoreResult<Day>;

    /// Attaches a media item to a date, creating the day if needed. The
    /// first attachment becomes the day's main media.
    async fn add_media(&self, user_id: Uuid, date: NaiveDate, media: MediaItem)
        -> StoreResult<Day>;

    /// Days in the inclusive date range, any content state.
    async fn days_in_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<Day>>;

    /// All days carrying a mood reference, ascending by date.
    async fn days_with_mood(&self, user_id: Uuid) -> StoreResult<Vec<Day>>;
}

/// Resolves per-user settings this core needs.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// The user's timezone; implementations default to UTC when unset.
    async fn timezone(&self, user_id: Uuid) -> StoreResult<Tz>;
}

/// Lists a user's mood states.
#[async_trait]
pub trait MoodStateProvider: Send + Sync {
    async fn mood_states(&self, user_id: Uuid) -> StoreResult<Vec<MoodState>>;
}
