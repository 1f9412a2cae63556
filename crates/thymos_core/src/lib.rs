//! Core domain logic for Thymos, a daily mood journal.
//! This crate is the single source of truth for domain types, the error
//! taxonomy, civil-date arithmetic, and the collaborator contracts the
//! engine crates consume.

pub mod chapter;
pub mod civil;
pub mod day;
pub mod error;
pub mod mood;
pub mod store;

pub use chapter::{Chapter, ChapterPatch, ChapterView, Period, PeriodDraft, PeriodPatch, PeriodView};
pub use day::{Day, MediaItem};
pub use error::ThymosError;
pub use mood::{Category, MoodSnapshot, MoodState};
pub use store::{
    DayStore, MoodStateProvider, StoreResult, TimelineStore, TimelineTx, UserProvider,
};
