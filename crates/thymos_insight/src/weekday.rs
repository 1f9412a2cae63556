//! Weekday insight detection.
//!
//! Groups a user's mood-bearing days by weekday (Monday = 0) and derives
//! behavioral signals: best/worst mood day, activity extremes, volatility,
//! a recovery index, and a burnout heuristic. Every derived field degrades
//! to `None` when no weekday qualifies; nothing here panics on thin data —
//! the only hard threshold (14 recorded days) is enforced by the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use thymos_core::civil;

use crate::score::round1;

/// Weekly mean slope below which a trend counts as a sustained decline
/// (score points per week).
const DECLINE_SLOPE_THRESHOLD: f64 = -0.15;

/// Workday activity at or above this multiple of the overall mean counts
/// as elevated.
const ELEVATED_ACTIVITY_RATIO: f64 = 1.2;

/// Number of trailing ISO weeks the burnout heuristic inspects.
const BURNOUT_WINDOW_WEEKS: usize = 6;

/// Minimum weekly data points before a slope is worth trusting.
const BURNOUT_MIN_WEEKS: usize = 3;

/// One mood-bearing day, flattened for weekday analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySample {
    pub date: NaiveDate,

    /// Weekday index, Monday = 0 through Sunday = 6.
    pub weekday: usize,

    /// Resolved mood score.
    pub score: f64,

    /// Activity score: media count plus period boundary events that day.
    pub activity: f64,
}

impl DaySample {
    pub fn new(date: NaiveDate, score: f64, activity: f64) -> Self {
        Self {
            date,
            weekday: civil::weekday_index(date),
            score,
            activity,
        }
    }
}

/// Aggregates for one weekday with at least one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStat {
    /// Weekday index, Monday = 0.
    pub weekday: usize,
    pub sample_size: usize,
    pub average_score: f64,
    pub average_activity: f64,

    /// Population standard deviation of the mood score.
    pub score_std_dev: f64,
}

/// The weekday whose occurrences most reliably improve on a preceding
/// trough day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoverySignal {
    pub weekday: usize,
    pub recovery_rate: f64,
    pub recovery_events: usize,
    pub total_occurrences: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurnoutKind {
    /// Sustained decline coinciding with elevated workday activity.
    Workload,
    /// Sustained decline without the activity signal.
    Decline,
}

/// Heuristic burnout flag. The confidence formula is a documented
/// approximation, not a calibrated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnoutPattern {
    pub detected: bool,
    pub kind: Option<BurnoutKind>,
    pub confidence: Option<f64>,
}

impl BurnoutPattern {
    fn none() -> Self {
        Self {
            detected: false,
            kind: None,
            confidence: None,
        }
    }
}

/// Full weekday insight report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekdayInsights {
    /// Per-weekday aggregates, ascending weekday index, populated
    /// weekdays only.
    pub weekdays: Vec<WeekdayStat>,
    pub best_mood_day: Option<WeekdayStat>,
    pub worst_mood_day: Option<WeekdayStat>,
    pub most_active_day: Option<WeekdayStat>,
    pub least_active_day: Option<WeekdayStat>,
    pub most_unstable_day: Option<WeekdayStat>,
    pub recovery_index: Option<RecoverySignal>,
    pub burnout_pattern: BurnoutPattern,
}

/// Derives weekday insights from samples sorted ascending by date.
pub fn detect(samples: &[DaySample]) -> WeekdayInsights {
    let weekdays = weekday_stats(samples);

    // Ties break toward the earliest weekday: `weekdays` ascends by
    // index and only strict comparisons replace the incumbent.
    let best_mood_day = pick(&weekdays, |a, b| a.average_score > b.average_score);
    let worst_mood_day = pick(&weekdays, |a, b| a.average_score < b.average_score);
    let most_active_day = pick(&weekdays, |a, b| a.average_activity > b.average_activity);
    let least_active_day = pick(&weekdays, |a, b| a.average_activity < b.average_activity);
    let most_unstable_day = pick(&weekdays, |a, b| a.score_std_dev > b.score_std_dev);

    let insights = WeekdayInsights {
        recovery_index: recovery_index(samples),
        burnout_pattern: burnout_pattern(samples),
        weekdays,
        best_mood_day,
        worst_mood_day,
        most_active_day,
        least_active_day,
        most_unstable_day,
    };
    tracing::debug!(
        weekdays = insights.weekdays.len(),
        burnout = insights.burnout_pattern.detected,
        "weekday insights computed"
    );
    insights
}

fn weekday_stats(samples: &[DaySample]) -> Vec<WeekdayStat> {
    (0..7)
        .filter_map(|weekday| {
            let scores: Vec<f64> = samples
                .iter()
                .filter(|s| s.weekday == weekday)
                .map(|s| s.score)
                .collect();
            if scores.is_empty() {
                return None;
            }
            let activities: Vec<f64> = samples
                .iter()
                .filter(|s| s.weekday == weekday)
                .map(|s| s.activity)
                .collect();
            Some(WeekdayStat {
                weekday,
                sample_size: scores.len(),
                average_score: round1(mean(&scores)),
                average_activity: round1(mean(&activities)),
                score_std_dev: population_std_dev(&scores),
            })
        })
        .collect()
}

fn pick(stats: &[WeekdayStat], better: impl Fn(&WeekdayStat, &WeekdayStat) -> bool) -> Option<WeekdayStat> {
    let mut chosen: Option<&WeekdayStat> = None;
    for stat in stats {
        match chosen {
            Some(current) if !better(stat, current) => {}
            _ => chosen = Some(stat),
        }
    }
    chosen.cloned()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by N): the recorded days are the
/// full population under analysis, not a draw from one.
fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Nearest-rank percentile of an unsorted slice.
fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    Some(sorted[rank.clamp(1, sorted.len()) - 1])
}

/// Recovery index: trough days are those at or below the 25th percentile
/// of the score distribution; for each weekday, how often its next
/// occurrence after a trough strictly improves on the trough score.
fn recovery_index(samples: &[DaySample]) -> Option<RecoverySignal> {
    let scores: Vec<f64> = samples.iter().map(|s| s.score).collect();
    let threshold = percentile(&scores, 25.0)?;
    let troughs: Vec<&DaySample> = samples.iter().filter(|s| s.score <= threshold).collect();
    if troughs.is_empty() {
        return None;
    }

    let mut strongest: Option<RecoverySignal> = None;
    for weekday in 0..7 {
        let mut recovery_events = 0usize;
        let mut total_occurrences = 0usize;
        for trough in &troughs {
            let next = samples
                .iter()
                .find(|s| s.date > trough.date && s.weekday == weekday);
            if let Some(next) = next {
                total_occurrences += 1;
                if next.score > trough.score {
                    recovery_events += 1;
                }
            }
        }
        if total_occurrences == 0 {
            continue;
        }
        let rate = recovery_events as f64 / total_occurrences as f64;
        let stronger = strongest
            .as_ref()
            .map(|s| rate > s.recovery_rate)
            .unwrap_or(true);
        if stronger {
            strongest = Some(RecoverySignal {
                weekday,
                recovery_rate: rate,
                recovery_events,
                total_occurrences,
            });
        }
    }
    strongest
}

/// Burnout heuristic: least-squares slope over the trailing six weekly
/// mean scores, flagged when the slope shows a sustained decline; the
/// decline is classified as workload-driven when Mon–Fri activity runs
/// elevated against the overall mean in the same window.
fn burnout_pattern(samples: &[DaySample]) -> BurnoutPattern {
    let last = match samples.last() {
        Some(s) => s,
        None => return BurnoutPattern::none(),
    };
    let (window_anchor, _) = civil::week_bounds(last.date);

    // Bucket samples into trailing ISO weeks: index 0 = oldest.
    let mut week_scores: Vec<Vec<f64>> = vec![Vec::new(); BURNOUT_WINDOW_WEEKS];
    let mut window: Vec<&DaySample> = Vec::new();
    for sample in samples {
        let (monday, _) = civil::week_bounds(sample.date);
        let weeks_back = (window_anchor - monday).num_days() / 7;
        if (0..BURNOUT_WINDOW_WEEKS as i64).contains(&weeks_back) {
            week_scores[BURNOUT_WINDOW_WEEKS - 1 - weeks_back as usize].push(sample.score);
            window.push(sample);
        }
    }

    let weekly_means: Vec<(f64, f64)> = week_scores
        .iter()
        .enumerate()
        .filter(|(_, scores)| !scores.is_empty())
        .map(|(week, scores)| (week as f64, mean(scores)))
        .collect();
    if weekly_means.len() < BURNOUT_MIN_WEEKS {
        return BurnoutPattern::none();
    }

    let slope = least_squares_slope(&weekly_means);
    if slope > DECLINE_SLOPE_THRESHOLD {
        return BurnoutPattern::none();
    }

    let overall_activity = mean(&window.iter().map(|s| s.activity).collect::<Vec<f64>>());
    let workday_activity = {
        let workdays: Vec<f64> = window
            .iter()
            .filter(|s| s.weekday < 5)
            .map(|s| s.activity)
            .collect();
        if workdays.is_empty() {
            0.0
        } else {
            mean(&workdays)
        }
    };
    let ratio = if overall_activity > 0.0 {
        workday_activity / overall_activity
    } else {
        0.0
    };
    let elevated = ratio >= ELEVATED_ACTIVITY_RATIO;

    let decline_term = (-slope / 0.5).min(1.0);
    let activity_term = if elevated { (ratio - 1.0).min(1.0) } else { 0.0 };
    let confidence = (0.6 * decline_term + 0.4 * activity_term).clamp(0.0, 1.0);

    BurnoutPattern {
        detected: true,
        kind: Some(if elevated {
            BurnoutKind::Workload
        } else {
            BurnoutKind::Decline
        }),
        confidence: Some(round1(confidence * 100.0) / 100.0),
    }
}

/// Least-squares slope of y over x.
fn least_squares_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let numerator: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let denominator: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Samples over consecutive days starting 2024-06-03 (a Monday).
    fn run(scores_and_activity: &[(f64, f64)]) -> Vec<DaySample> {
        let start = d(2024, 6, 3);
        scores_and_activity
            .iter()
            .enumerate()
            .map(|(i, (score, activity))| {
                let date = start.checked_add_days(Days::new(i as u64)).unwrap();
                DaySample::new(date, *score, *activity)
            })
            .collect()
    }

    #[test]
    fn empty_input_degrades_to_none() {
        let insights = detect(&[]);
        assert!(insights.weekdays.is_empty());
        assert!(insights.best_mood_day.is_none());
        assert!(insights.recovery_index.is_none());
        assert!(!insights.burnout_pattern.detected);
    }

    #[test]
    fn best_and_worst_mood_days() {
        // Mon 9, Tue 2, Wed 5.
        let samples = run(&[(9.0, 0.0), (2.0, 0.0), (5.0, 0.0)]);
        let insights = detect(&samples);
        assert_eq!(insights.best_mood_day.unwrap().weekday, 0);
        assert_eq!(insights.worst_mood_day.unwrap().weekday, 1);
    }

    #[test]
    fn mood_ties_break_to_earliest_weekday() {
        let samples = run(&[(5.0, 0.0), (5.0, 0.0), (5.0, 0.0)]);
        let insights = detect(&samples);
        assert_eq!(insights.best_mood_day.unwrap().weekday, 0);
        assert_eq!(insights.worst_mood_day.unwrap().weekday, 0);
    }

    #[test]
    fn activity_extremes() {
        // Mon..Wed with activities 1, 7, 3.
        let samples = run(&[(5.0, 1.0), (5.0, 7.0), (5.0, 3.0)]);
        let insights = detect(&samples);
        assert_eq!(insights.most_active_day.unwrap().weekday, 1);
        assert_eq!(insights.least_active_day.unwrap().weekday, 0);
    }

    #[test]
    fn volatility_uses_population_std_dev() {
        // Two Mondays far apart in score, two Tuesdays identical.
        let samples = vec![
            DaySample::new(d(2024, 6, 3), 1.0, 0.0),
            DaySample::new(d(2024, 6, 4), 5.0, 0.0),
            DaySample::new(d(2024, 6, 10), 9.0, 0.0),
            DaySample::new(d(2024, 6, 11), 5.0, 0.0),
        ];
        let insights = detect(&samples);
        let unstable = insights.most_unstable_day.unwrap();
        assert_eq!(unstable.weekday, 0);
        // Population form: sqrt(((1-5)^2 + (9-5)^2) / 2) = 4.
        assert!((unstable.score_std_dev - 4.0).abs() < 1e-9);
    }

    #[test]
    fn recovery_index_counts_improvements_after_troughs() {
        // Week pattern: Monday troughs (score 1), Tuesdays always bounce
        // back hard (score 8), Wednesdays stay low (score 1).
        let samples = vec![
            DaySample::new(d(2024, 6, 3), 1.0, 0.0),
            DaySample::new(d(2024, 6, 4), 8.0, 0.0),
            DaySample::new(d(2024, 6, 5), 1.0, 0.0),
            DaySample::new(d(2024, 6, 10), 1.0, 0.0),
            DaySample::new(d(2024, 6, 11), 8.0, 0.0),
            DaySample::new(d(2024, 6, 12), 1.0, 0.0),
        ];
        let insights = detect(&samples);
        let recovery = insights.recovery_index.unwrap();
        assert_eq!(recovery.weekday, 1);
        assert_eq!(recovery.recovery_rate, 1.0);
        assert!(recovery.recovery_events >= 2);
    }

    #[test]
    fn flat_history_detects_no_burnout() {
        let samples: Vec<DaySample> = (0..42)
            .map(|i| {
                DaySample::new(
                    d(2024, 5, 6).checked_add_days(Days::new(i)).unwrap(),
                    5.0,
                    2.0,
                )
            })
            .collect();
        let insights = detect(&samples);
        assert!(!insights.burnout_pattern.detected);
        assert!(insights.burnout_pattern.kind.is_none());
    }

    #[test]
    fn sustained_decline_with_workday_load_flags_workload_burnout() {
        // Six weeks sliding from 8.0 down to 3.0, heavy Mon-Fri activity.
        let start = d(2024, 5, 6); // a Monday
        let samples: Vec<DaySample> = (0..42)
            .map(|i| {
                let date = start.checked_add_days(Days::new(i)).unwrap();
                let week = i / 7;
                let score = 8.0 - week as f64;
                let weekday = civil::weekday_index(date);
                let activity = if weekday < 5 { 5.0 } else { 1.0 };
                DaySample::new(date, score, activity)
            })
            .collect();
        let insights = detect(&samples);
        let burnout = insights.burnout_pattern;
        assert!(burnout.detected);
        assert_eq!(burnout.kind, Some(BurnoutKind::Workload));
        let confidence = burnout.confidence.unwrap();
        assert!(confidence > 0.5 && confidence <= 1.0);
    }

    #[test]
    fn decline_without_activity_signal_is_plain_decline() {
        let start = d(2024, 5, 6);
        let samples: Vec<DaySample> = (0..42)
            .map(|i| {
                let date = start.checked_add_days(Days::new(i)).unwrap();
                let week = i / 7;
                DaySample::new(date, 8.0 - week as f64, 2.0)
            })
            .collect();
        let insights = detect(&samples);
        assert!(insights.burnout_pattern.detected);
        assert_eq!(insights.burnout_pattern.kind, Some(BurnoutKind::Decline));
    }
}
