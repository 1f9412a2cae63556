//! Mood analytics for Thymos.
//!
//! Read-only consumers of day records and chapter periods: the score
//! resolver, the report aggregator, and the weekday insight detector.
//! Everything here is deterministic closed-form statistics over one
//! user's records.

pub mod analytics;
pub mod score;
pub mod weekday;

pub use analytics::{
    CategoryScore, InsightEngine, MoodReport, MoodSlice, TrendPoint, WEEKDAY_INSIGHTS_MIN_DAYS,
};
pub use score::ScoreIndex;
pub use weekday::{
    BurnoutKind, BurnoutPattern, DaySample, RecoverySignal, WeekdayInsights, WeekdayStat,
};
