//! `MemoryStore` — hash-map tables behind tokio sync primitives.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use thymos_core::{
    Category, Chapter, Day, DayStore, MediaItem, MoodState, MoodStateProvider, Period,
    StoreResult, ThymosError, TimelineStore, TimelineTx, UserProvider,
};

/// Timeline tables guarded together: chapter/period/category consistency
/// is exactly what the transaction boundary protects.
#[derive(Debug, Default)]
struct TimelineTables {
    chapters: HashMap<Uuid, Chapter>,
    periods: HashMap<Uuid, Period>,
    categories: HashMap<Uuid, Category>,
}

/// In-memory implementation of every Thymos collaborator contract.
#[derive(Clone, Default)]
pub struct MemoryStore {
    timeline: Arc<Mutex<TimelineTables>>,
    days: Arc<RwLock<HashMap<(Uuid, NaiveDate), Day>>>,
    moods: Arc<RwLock<HashMap<Uuid, Vec<MoodState>>>>,
    timezones: Arc<RwLock<HashMap<Uuid, Tz>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category for a user. Seeding helper for tests and the
    /// demo CLI; category CRUD proper lives with the (external) API layer.
    pub async fn seed_category(
        &self,
        user_id: Uuid,
        name: &str,
        color: &str,
        position: u32,
    ) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            color: color.to_string(),
            is_system: false,
            position,
        };
        let mut tables = self.timeline.lock().await;
        tables.categories.insert(category.id, category.clone());
        category
    }

    /// Registers a mood state for a user. Seeding helper.
    pub async fn seed_mood_state(
        &self,
        user_id: Uuid,
        name: &str,
        color: &str,
        score: f64,
        position: u32,
    ) -> MoodState {
        let state = MoodState {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            color: color.to_string(),
            score,
            is_system: false,
            position,
        };
        let mut moods = self.moods.write().await;
        moods.entry(user_id).or_default().push(state.clone());
        state
    }

    /// Pins a user's timezone. Unset users resolve to UTC.
    pub async fn set_timezone(&self, user_id: Uuid, tz: Tz) {
        self.timezones.write().await.insert(user_id, tz);
    }
}

// ============================================================================
// Timeline store
// ============================================================================

struct MemoryTx {
    tables: OwnedMutexGuard<TimelineTables>,
}

#[async_trait]
impl TimelineStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn TimelineTx>> {
        let tables = Arc::clone(&self.timeline).lock_owned().await;
        Ok(Box::new(MemoryTx { tables }))
    }

    async fn chapter(&self, user_id: Uuid, chapter_id: Uuid) -> StoreResult<Option<Chapter>> {
        let tables = self.timeline.lock().await;
        Ok(tables
            .chapters
            .get(&chapter_id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn chapters(&self, user_id: Uuid) -> StoreResult<Vec<Chapter>> {
        let tables = self.timeline.lock().await;
        let mut chapters: Vec<Chapter> = tables
            .chapters
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        chapters.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(chapters)
    }

    async fn periods_of(&self, chapter_id: Uuid) -> StoreResult<Vec<Period>> {
        let tables = self.timeline.lock().await;
        Ok(periods_of_chapter(&tables, chapter_id))
    }

    async fn categories(&self, user_id: Uuid) -> StoreResult<Vec<Category>> {
        let tables = self.timeline.lock().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.position.cmp(&b.position).then(a.name.cmp(&b.name)));
        Ok(categories)
    }
}

fn periods_of_chapter(tables: &TimelineTables, chapter_id: Uuid) -> Vec<Period> {
    let mut periods: Vec<Period> = tables
        .periods
        .values()
        .filter(|p| p.chapter_id == chapter_id)
        .cloned()
        .collect();
    periods.sort_by_key(|p| p.start);
    periods
}

#[async_trait]
impl TimelineTx for MemoryTx {
    async fn chapter(&mut self, user_id: Uuid, chapter_id: Uuid) -> StoreResult<Option<Chapter>> {
        Ok(self
            .tables
            .chapters
            .get(&chapter_id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn period(&mut self, user_id: Uuid, period_id: Uuid) -> StoreResult<Option<Period>> {
        let period = match self.tables.periods.get(&period_id) {
            Some(p) => p.clone(),
            None => return Ok(None),
        };
        let owned = self
            .tables
            .chapters
            .get(&period.chapter_id)
            .map(|c| c.user_id == user_id)
            .unwrap_or(false);
        Ok(owned.then_some(period))
    }

    async fn closed_periods(
        &mut self,
        chapter_id: Uuid,
        exclude: Option<Uuid>,
    ) -> StoreResult<Vec<Period>> {
        Ok(periods_of_chapter(&self.tables, chapter_id)
            .into_iter()
            .filter(|p| p.end.is_some() && Some(p.id) != exclude)
            .collect())
    }

    async fn active_period(
        &mut self,
        chapter_id: Uuid,
        exclude: Option<Uuid>,
    ) -> StoreResult<Option<Period>> {
        Ok(periods_of_chapter(&self.tables, chapter_id)
            .into_iter()
            .find(|p| p.end.is_none() && Some(p.id) != exclude))
    }

    async fn periods_of(&mut self, chapter_id: Uuid) -> StoreResult<Vec<Period>> {
        Ok(periods_of_chapter(&self.tables, chapter_id))
    }

    async fn period_count(&mut self, chapter_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .tables
            .periods
            .values()
            .filter(|p| p.chapter_id == chapter_id)
            .count() as u64)
    }

    async fn category(
        &mut self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<Option<Category>> {
        Ok(self
            .tables
            .categories
            .get(&category_id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn insert_period(&mut self, period: Period) -> StoreResult<()> {
        tracing::debug!(period_id = %period.id, chapter_id = %period.chapter_id, "insert period");
        self.tables.periods.insert(period.id, period);
        Ok(())
    }

    async fn update_period(&mut self, period: Period) -> StoreResult<()> {
        if !self.tables.periods.contains_key(&period.id) {
            return Err(ThymosError::not_found("period", period.id));
        }
        tracing::debug!(period_id = %period.id, "update period");
        self.tables.periods.insert(period.id, period);
        Ok(())
    }

    async fn delete_period(&mut self, period_id: Uuid) -> StoreResult<()> {
        if self.tables.periods.remove(&period_id).is_none() {
            return Err(ThymosError::not_found("period", period_id));
        }
        tracing::debug!(%period_id, "delete period");
        Ok(())
    }

    async fn insert_chapter(&mut self, chapter: Chapter) -> StoreResult<()> {
        tracing::debug!(chapter_id = %chapter.id, "insert chapter");
        self.tables.chapters.insert(chapter.id, chapter);
        Ok(())
    }

    async fn update_chapter(&mut self, chapter: Chapter) -> StoreResult<()> {
        if !self.tables.chapters.contains_key(&chapter.id) {
            return Err(ThymosError::not_found("chapter", chapter.id));
        }
        tracing::debug!(chapter_id = %chapter.id, "update chapter");
        self.tables.chapters.insert(chapter.id, chapter);
        Ok(())
    }

    async fn delete_chapter(&mut self, chapter_id: Uuid) -> StoreResult<()> {
        if self.tables.chapters.remove(&chapter_id).is_none() {
            return Err(ThymosError::not_found("chapter", chapter_id));
        }
        tracing::debug!(%chapter_id, "delete chapter");
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        // Writes applied in place under the guard; releasing it publishes
        // them.
        Ok(())
    }
}

// ============================================================================
// Day store
// ============================================================================

#[async_trait]
impl DayStore for MemoryStore {
    async fn day(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<Option<Day>> {
        let days = self.days.read().await;
        Ok(days.get(&(user_id, date)).cloned())
    }

    async fn set_mood(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        mood_state_id: Option<Uuid>,
    ) -> StoreResult<Day> {
        let mut days = self.days.write().await;
        let day = days
            .entry((user_id, date))
            .or_insert_with(|| Day::empty(user_id, date));
        day.mood_state_id = mood_state_id;
        Ok(day.clone())
    }

    async fn add_media(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        media: MediaItem,
    ) -> StoreResult<Day> {
        let mut days = self.days.write().await;
        let day = days
            .entry((user_id, date))
            .or_insert_with(|| Day::empty(user_id, date));
        if day.main_media_id.is_none() {
            day.main_media_id = Some(media.id);
        }
        day.media.push(media);
        Ok(day.clone())
    }

    async fn days_in_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<Day>> {
        let days = self.days.read().await;
        let mut hits: Vec<Day> = days
            .values()
            .filter(|d| d.user_id == user_id && d.date >= from && d.date <= to)
            .cloned()
            .collect();
        hits.sort_by_key(|d| d.date);
        Ok(hits)
    }

    async fn days_with_mood(&self, user_id: Uuid) -> StoreResult<Vec<Day>> {
        let days = self.days.read().await;
        let mut hits: Vec<Day> = days
            .values()
            .filter(|d| d.user_id == user_id && d.mood_state_id.is_some())
            .cloned()
            .collect();
        hits.sort_by_key(|d| d.date);
        Ok(hits)
    }
}

// ============================================================================
// Providers
// ============================================================================

#[async_trait]
impl UserProvider for MemoryStore {
    async fn timezone(&self, user_id: Uuid) -> StoreResult<Tz> {
        let timezones = self.timezones.read().await;
        Ok(timezones.get(&user_id).copied().unwrap_or(chrono_tz::UTC))
    }
}

#[async_trait]
impl MoodStateProvider for MemoryStore {
    async fn mood_states(&self, user_id: Uuid) -> StoreResult<Vec<MoodState>> {
        let moods = self.moods.read().await;
        let mut states = moods.get(&user_id).cloned().unwrap_or_default();
        states.sort_by(|a, b| a.position.cmp(&b.position).then(a.name.cmp(&b.name)));
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn upsert_creates_day_on_first_mood_write() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        assert!(store.day(user, date(2024, 1, 1)).await.unwrap().is_none());

        let mood = Uuid::new_v4();
        let day = store
            .set_mood(user, date(2024, 1, 1), Some(mood))
            .await
            .unwrap();
        assert_eq!(day.mood_state_id, Some(mood));
        assert!(store.day(user, date(2024, 1, 1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn first_media_becomes_main_media() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let first = MediaItem {
            id: Uuid::new_v4(),
            uri: "mem://a".into(),
            created_at: Utc::now(),
        };
        let second = MediaItem {
            id: Uuid::new_v4(),
            uri: "mem://b".into(),
            created_at: Utc::now(),
        };
        let first_id = first.id;
        store.add_media(user, date(2024, 1, 1), first).await.unwrap();
        let day = store
            .add_media(user, date(2024, 1, 1), second)
            .await
            .unwrap();
        assert_eq!(day.main_media_id, Some(first_id));
        assert_eq!(day.media_count(), 2);
    }

    #[tokio::test]
    async fn days_with_mood_sorts_ascending() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mood = Uuid::new_v4();
        for day in [date(2024, 1, 5), date(2024, 1, 1), date(2024, 1, 3)] {
            store.set_mood(user, day, Some(mood)).await.unwrap();
        }
        let days = store.days_with_mood(user).await.unwrap();
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 5)]);
    }

    #[tokio::test]
    async fn timezone_defaults_to_utc() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        assert_eq!(store.timezone(user).await.unwrap(), chrono_tz::UTC);
        store.set_timezone(user, chrono_tz::Asia::Tokyo).await;
        assert_eq!(store.timezone(user).await.unwrap(), chrono_tz::Asia::Tokyo);
    }

    #[tokio::test]
    async fn transaction_serializes_mutations() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let category = store.seed_category(user, "Work", "#336699", 0).await;
        let chapter = Chapter {
            id: Uuid::new_v4(),
            user_id: user,
            title: "First job".into(),
            description: None,
            category_id: category.id,
        };

        let mut tx = store.begin().await.unwrap();
        tx.insert_chapter(chapter.clone()).await.unwrap();

        // A second transaction cannot begin while the first holds the lock.
        let blocked = tokio::time::timeout(std::time::Duration::from_millis(20), store.begin());
        assert!(blocked.await.is_err());

        tx.commit().await.unwrap();
        let chapters = store.chapters(user).await.unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "First job");
    }
}
