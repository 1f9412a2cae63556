//! The analytics aggregator: one read-only pass over a user's records
//! producing the full mood report.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use thymos_core::civil;
use thymos_core::{
    Category, Day, DayStore, MoodSnapshot, MoodStateProvider, Period, ThymosError, TimelineStore,
    UserProvider,
};

use crate::score::ScoreIndex;
use crate::weekday::{self, DaySample, WeekdayInsights};

/// Weekday insights need at least this many distinct mood-bearing days.
pub const WEEKDAY_INSIGHTS_MIN_DAYS: usize = 14;

/// How far back the trend reaches, today inclusive.
const TREND_WINDOW_DAYS: u64 = 30;

/// One observed mood with its share of all recorded moods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSlice {
    pub mood: MoodSnapshot,
    pub count: usize,

    /// `round(count / total * 100)`.
    pub percentage: u32,
}

/// Average mood inside one category's period ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub average_score: f64,

    /// Mood-bearing days that fell inside the category's ranges.
    pub sample_days: usize,
}

/// One point of the 30-day trend line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// The full analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodReport {
    pub total_days_with_mood: usize,
    pub average_mood_score: f64,
    pub mood_distribution: Vec<MoodSlice>,
    pub best_category: Option<CategoryScore>,
    pub worst_category: Option<CategoryScore>,
    pub trend_last_30_days: Vec<TrendPoint>,
    pub weekday_insights: Option<WeekdayInsights>,
}

/// Read-only analytics engine over day records and chapter periods.
pub struct InsightEngine {
    timeline: Arc<dyn TimelineStore>,
    days: Arc<dyn DayStore>,
    moods: Arc<dyn MoodStateProvider>,
    users: Arc<dyn UserProvider>,
}

impl InsightEngine {
    pub fn new(
        timeline: Arc<dyn TimelineStore>,
        days: Arc<dyn DayStore>,
        moods: Arc<dyn MoodStateProvider>,
        users: Arc<dyn UserProvider>,
    ) -> Self {
        Self {
            timeline,
            days,
            moods,
            users,
        }
    }

    /// Computes the full report from fresh store state.
    pub async fn mood_report(&self, user_id: Uuid) -> Result<MoodReport, ThymosError> {
        let tz = self.users.timezone(user_id).await?;
        let today = civil::today_in(tz);

        let states = self.moods.mood_states(user_id).await?;
        let index = ScoreIndex::new(&states);
        let mood_days = self.days.days_with_mood(user_id).await?;

        let total_days_with_mood = mood_days.len();
        let scores: Vec<f64> = mood_days
            .iter()
            .filter_map(|d| d.mood_state_id)
            .map(|id| index.score_of(id))
            .collect();
        let average_mood_score = ScoreIndex::average(&scores);

        let mood_distribution = distribution(&mood_days, &states);

        // Chapters and their periods feed both the category comparison
        // and the per-day activity scores; fetch them once.
        let chapters = self.timeline.chapters(user_id).await?;
        let mut chapter_periods: Vec<(Uuid, Vec<Period>)> = Vec::with_capacity(chapters.len());
        for chapter in &chapters {
            let periods = self.timeline.periods_of(chapter.id).await?;
            chapter_periods.push((chapter.category_id, periods));
        }
        let categories = self.timeline.categories(user_id).await?;
        let (best_category, worst_category) =
            category_comparison(&categories, &chapter_periods, &mood_days, &index, today, tz);

        let trend_last_30_days = self.trend(user_id, &index, today).await?;

        let distinct_days: BTreeSet<NaiveDate> = mood_days.iter().map(|d| d.date).collect();
        let weekday_insights = if distinct_days.len() >= WEEKDAY_INSIGHTS_MIN_DAYS {
            let samples = day_samples(&mood_days, &chapter_periods, &index, tz);
            Some(weekday::detect(&samples))
        } else {
            None
        };

        tracing::info!(
            %user_id,
            days = total_days_with_mood,
            average = average_mood_score,
            "mood report computed"
        );

        Ok(MoodReport {
            total_days_with_mood,
            average_mood_score,
            mood_distribution,
            best_category,
            worst_category,
            trend_last_30_days,
            weekday_insights,
        })
    }

    /// One point per mood-bearing day of the trailing 30 days whose
    /// resolved score is meaningful (score 0 marks an unmapped state).
    async fn trend(
        &self,
        user_id: Uuid,
        index: &ScoreIndex,
        today: NaiveDate,
    ) -> Result<Vec<TrendPoint>, ThymosError> {
        let from = today
            .checked_sub_days(Days::new(TREND_WINDOW_DAYS - 1))
            .unwrap_or(today);
        let days = self.days.days_in_range(user_id, from, today).await?;
        Ok(days
            .iter()
            .filter_map(|d| d.mood_state_id.map(|id| (d.date, index.score_of(id))))
            .filter(|(_, score)| *score != 0.0)
            .map(|(date, score)| TrendPoint { date, score })
            .collect())
    }
}

/// Counts per observed mood, sorted by count descending. Ties keep the
/// mood states' display order, so the report is stable across runs.
fn distribution(
    mood_days: &[Day],
    states: &[thymos_core::MoodState],
) -> Vec<MoodSlice> {
    let total = mood_days.len();
    if total == 0 {
        return Vec::new();
    }
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for day in mood_days {
        if let Some(id) = day.mood_state_id {
            *counts.entry(id).or_default() += 1;
        }
    }
    // Iterating states (already in display order) keeps ties stable
    // under the stable sort below. Records pointing at a state that no
    // longer exists have no snapshot to show and are left out.
    let mut slices: Vec<MoodSlice> = states
        .iter()
        .filter_map(|state| {
            counts.get(&state.id).map(|count| MoodSlice {
                mood: MoodSnapshot::from(state),
                count: *count,
                percentage: ((*count as f64 / total as f64) * 100.0).round() as u32,
            })
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count));
    slices
}

/// Per-category mood averages over the union of the category's period
/// ranges; open-ended periods run through today.
fn category_comparison(
    categories: &[Category],
    chapter_periods: &[(Uuid, Vec<Period>)],
    mood_days: &[Day],
    index: &ScoreIndex,
    today: NaiveDate,
    tz: Tz,
) -> (Option<CategoryScore>, Option<CategoryScore>) {
    let mut qualified: Vec<CategoryScore> = Vec::new();
    for category in categories {
        let ranges: Vec<&Period> = chapter_periods
            .iter()
            .filter(|(category_id, _)| *category_id == category.id)
            .flat_map(|(_, periods)| periods.iter())
            .collect();
        if ranges.is_empty() {
            continue;
        }
        let scores: Vec<f64> = mood_days
            .iter()
            .filter(|day| ranges.iter().any(|p| p.contains_date(day.date, today, tz)))
            .filter_map(|day| day.mood_state_id)
            .map(|id| index.score_of(id))
            .collect();
        if scores.is_empty() {
            continue;
        }
        qualified.push(CategoryScore {
            category_id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
            average_score: ScoreIndex::average(&scores),
            sample_days: scores.len(),
        });
    }

    // Stable sort: categories arrive in display order, so equal averages
    // keep that order.
    qualified.sort_by(|a, b| {
        b.average_score
            .partial_cmp(&a.average_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let best = qualified.first().cloned();
    let worst = if qualified.len() > 1 {
        qualified.last().cloned()
    } else {
        // A single qualifying category has nothing to contrast against.
        None
    };
    (best, worst)
}

/// Flattens mood days into weekday samples, activity being media count
/// plus period boundary events (starts and ends) on the date.
fn day_samples(
    mood_days: &[Day],
    chapter_periods: &[(Uuid, Vec<Period>)],
    index: &ScoreIndex,
    tz: Tz,
) -> Vec<DaySample> {
    let mut boundary_events: HashMap<NaiveDate, u32> = HashMap::new();
    for (_, periods) in chapter_periods {
        for period in periods {
            *boundary_events
                .entry(civil::civil_date_in(period.start, tz))
                .or_default() += 1;
            if let Some(end) = period.end {
                *boundary_events
                    .entry(civil::civil_date_in(end, tz))
                    .or_default() += 1;
            }
        }
    }
    mood_days
        .iter()
        .map(|day| {
            let score = day
                .mood_state_id
                .map(|id| index.score_of(id))
                .unwrap_or(0.0);
            let activity = day.media_count() as f64
                + boundary_events.get(&day.date).copied().unwrap_or(0) as f64;
            DaySample::new(day.date, score, activity)
        })
        .collect()
}
