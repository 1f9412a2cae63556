//! Mood states and chapter categories.
//!
//! A mood state carries two unrelated numbers: `score` is the intensity
//! the analytics engines compute with, `position` is where the state sits
//! in pickers. They must never stand in for each other — a reordered
//! palette must not change a single statistic.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, colored grouping for chapters ("Work", "Travel", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,

    /// Display color, `#rrggbb`.
    pub color: String,

    /// Seeded by the system rather than created by the user.
    pub is_system: bool,

    /// Display order in pickers. Never used as a ranking signal.
    pub position: u32,
}

/// A named, colored, numerically-scored mood ("Great", "Terrible", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,

    /// Display color, `#rrggbb`.
    pub color: String,

    /// Intensity score (0–10 typical; the engines treat it as opaque).
    /// A score of exactly 0 is read as "scoreless" by trend analytics.
    pub score: f64,

    /// Seeded by the system rather than created by the user.
    pub is_system: bool,

    /// Display order in pickers. Never used as a ranking signal.
    pub position: u32,
}

/// Denormalized mood snapshot embedded in reports, so a report stays
/// readable even if the user later recolors or renames the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSnapshot {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl From<&MoodState> for MoodSnapshot {
    fn from(state: &MoodState) -> Self {
        Self {
            id: state.id,
            name: state.name.clone(),
            color: state.color.clone(),
        }
    }
}
