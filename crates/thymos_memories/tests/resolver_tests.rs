//! Integration tests for the memory resolver against the in-memory store.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thymos_core::{DayStore, MediaItem, MoodStateProvider, ThymosError};
use thymos_memories::{MemoryOffset, MemoryResolver};
use thymos_store::MemoryStore;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn media(uri: &str) -> MediaItem {
    MediaItem {
        id: Uuid::new_v4(),
        uri: uri.to_string(),
        created_at: Utc::now(),
    }
}

struct Fixture {
    store: Arc<MemoryStore>,
    resolver: MemoryResolver,
    user: Uuid,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let resolver = MemoryResolver::new(
        store.clone() as Arc<dyn DayStore>,
        store.clone() as Arc<dyn MoodStateProvider>,
    );
    Fixture {
        store,
        resolver,
        user: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn garbage_input_is_rejected() {
    let fx = fixture();
    let err = fx
        .resolver
        .day_memories(fx.user, "yesterday-ish")
        .await
        .unwrap_err();
    assert!(matches!(err, ThymosError::InvalidDate { .. }));
}

#[tokio::test]
async fn silent_base_day_yields_nothing() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;
    // Rich history a month back, but the base day itself is empty.
    fx.store
        .set_mood(fx.user, date(2024, 5, 15), Some(mood.id))
        .await
        .unwrap();

    let memories = fx
        .resolver
        .day_memories(fx.user, "2024-06-15")
        .await
        .unwrap();
    assert!(memories.is_empty());
}

#[tokio::test]
async fn resolves_all_three_offsets_in_fixed_order() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;

    for day in [
        date(2024, 6, 15), // base
        date(2024, 5, 15), // 1 month
        date(2023, 12, 15), // 6 months
        date(2023, 6, 15), // 1 year
    ] {
        fx.store.set_mood(fx.user, day, Some(mood.id)).await.unwrap();
    }

    let memories = fx
        .resolver
        .day_memories(fx.user, "2024-06-15")
        .await
        .unwrap();
    let offsets: Vec<MemoryOffset> = memories.iter().map(|m| m.offset).collect();
    assert_eq!(
        offsets,
        vec![
            MemoryOffset::OneMonth,
            MemoryOffset::SixMonths,
            MemoryOffset::OneYear
        ]
    );
    assert_eq!(memories[0].date, date(2024, 5, 15));
    assert_eq!(memories[1].date, date(2023, 12, 15));
    assert_eq!(memories[2].date, date(2023, 6, 15));
}

#[tokio::test]
async fn missing_candidates_are_omitted_without_reordering() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;
    fx.store
        .set_mood(fx.user, date(2024, 6, 15), Some(mood.id))
        .await
        .unwrap();
    // Only the one-year candidate has content.
    fx.store
        .set_mood(fx.user, date(2023, 6, 15), Some(mood.id))
        .await
        .unwrap();
    // An empty day record at the six-month candidate must not count.
    fx.store
        .set_mood(fx.user, date(2023, 12, 15), None)
        .await
        .unwrap();

    let memories = fx
        .resolver
        .day_memories(fx.user, "2024-06-15")
        .await
        .unwrap();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].offset, MemoryOffset::OneYear);
    assert!(memories.len() <= 3);
}

#[tokio::test]
async fn month_subtraction_clamps_at_month_end() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;
    // Base 2024-03-31: the one-month candidate is leap-day 2024-02-29.
    fx.store
        .set_mood(fx.user, date(2024, 3, 31), Some(mood.id))
        .await
        .unwrap();
    fx.store
        .set_mood(fx.user, date(2024, 2, 29), Some(mood.id))
        .await
        .unwrap();

    let memories = fx
        .resolver
        .day_memories(fx.user, "2024-03-31")
        .await
        .unwrap();
    assert_eq!(memories[0].offset, MemoryOffset::OneMonth);
    assert_eq!(memories[0].date, date(2024, 2, 29));
}

#[tokio::test]
async fn leap_day_anniversary_lands_on_feb_28() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;
    fx.store
        .set_mood(fx.user, date(2024, 2, 29), Some(mood.id))
        .await
        .unwrap();
    fx.store
        .set_mood(fx.user, date(2023, 2, 28), Some(mood.id))
        .await
        .unwrap();

    let memories = fx
        .resolver
        .day_memories(fx.user, "2024-02-29")
        .await
        .unwrap();
    let year_back = memories
        .iter()
        .find(|m| m.offset == MemoryOffset::OneYear)
        .expect("one-year memory should resolve");
    assert_eq!(year_back.date, date(2023, 2, 28));
}

#[tokio::test]
async fn january_31_minus_one_month_is_december_31() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;
    fx.store
        .set_mood(fx.user, date(2024, 1, 31), Some(mood.id))
        .await
        .unwrap();
    fx.store
        .set_mood(fx.user, date(2023, 12, 31), Some(mood.id))
        .await
        .unwrap();

    let memories = fx
        .resolver
        .day_memories(fx.user, "2024-01-31")
        .await
        .unwrap();
    assert_eq!(memories[0].date, date(2023, 12, 31));
}

#[tokio::test]
async fn mood_only_and_media_only_days_both_surface() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;
    fx.store
        .set_mood(fx.user, date(2024, 6, 15), Some(mood.id))
        .await
        .unwrap();
    // One month back: mood, no media.
    fx.store
        .set_mood(fx.user, date(2024, 5, 15), Some(mood.id))
        .await
        .unwrap();
    // One year back: media, no mood.
    fx.store
        .add_media(fx.user, date(2023, 6, 15), media("mem://hike"))
        .await
        .unwrap();

    let memories = fx
        .resolver
        .day_memories(fx.user, "2024-06-15")
        .await
        .unwrap();
    assert_eq!(memories.len(), 2);

    let month = &memories[0];
    assert_eq!(month.offset, MemoryOffset::OneMonth);
    assert_eq!(month.mood.as_ref().unwrap().name, "Great");
    assert_eq!(month.media_count, 0);

    let year = &memories[1];
    assert_eq!(year.offset, MemoryOffset::OneYear);
    assert!(year.mood.is_none());
    assert_eq!(year.media_count, 1);
    assert!(year.main_media_id.is_some());
}

#[tokio::test]
async fn week_memories_aggregate_active_days_and_media() {
    let fx = fixture();
    let mood = fx
        .store
        .seed_mood_state(fx.user, "Great", "#44bb44", 9.0, 0)
        .await;
    fx.store
        .set_mood(fx.user, date(2024, 6, 15), Some(mood.id))
        .await
        .unwrap();

    // The week of 2024-05-15 (Mon 13th .. Sun 19th): two active days,
    // three photos total.
    fx.store
        .set_mood(fx.user, date(2024, 5, 13), Some(mood.id))
        .await
        .unwrap();
    fx.store
        .add_media(fx.user, date(2024, 5, 17), media("mem://a"))
        .await
        .unwrap();
    fx.store
        .add_media(fx.user, date(2024, 5, 17), media("mem://b"))
        .await
        .unwrap();
    fx.store
        .add_media(fx.user, date(2024, 5, 13), media("mem://c"))
        .await
        .unwrap();

    let memories = fx
        .resolver
        .week_memories(fx.user, "2024-06-15")
        .await
        .unwrap();
    assert_eq!(memories.len(), 1);
    let week = &memories[0];
    assert_eq!(week.offset, MemoryOffset::OneMonth);
    assert_eq!(week.week_start, date(2024, 5, 13));
    assert_eq!(week.week_end, date(2024, 5, 19));
    assert_eq!(week.active_days, 2);
    assert_eq!(week.media_count, 3);
}
