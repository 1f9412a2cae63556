//! Daily records: one row per user per calendar date.
//!
//! Days are upserted the first time a mood or a media item is set for a
//! date and never deleted by this core. Media content lives in external
//! object storage; only ids and counts matter here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to one media attachment of a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,

    /// Object-storage locator; opaque to this core.
    pub uri: String,

    pub created_at: DateTime<Utc>,
}

/// The atomic daily record: optional mood, optional media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub mood_state_id: Option<Uuid>,
    pub media: Vec<MediaItem>,

    /// The attachment shown as the day's cover, when any exist.
    pub main_media_id: Option<Uuid>,
}

impl Day {
    /// A fresh empty record for `date`, ready to be upserted into.
    pub fn empty(user_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            mood_state_id: None,
            media: Vec::new(),
            main_media_id: None,
        }
    }

    /// Whether the day carries anything worth surfacing: a mood or at
    /// least one media item.
    pub fn has_content(&self) -> bool {
        self.mood_state_id.is_some() || !self.media.is_empty()
    }

    pub fn media_count(&self) -> usize {
        self.media.len()
    }
}
