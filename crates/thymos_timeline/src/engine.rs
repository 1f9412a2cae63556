//! The timeline engine: every mutation of chapters and periods goes
//! through here, and nothing else writes period date ranges.
//!
//! # Invariants (enforced at mutation time, inside one store transaction)
//! - `start <= end` whenever an end is present.
//! - At most one open-ended period per chapter.
//! - No two closed periods of one chapter overlap; overlap is strict
//!   (`existing.start < new.end && new.start < existing.end`), so periods
//!   sharing a boundary day stay legal.
//! - A start may not sit more than one calendar day ahead of today in the
//!   user's timezone.
//!
//! Every check runs before the single write; a rejection means nothing
//! was persisted. Operations return the owning chapter re-read from the
//! store, dates re-expressed in the user's timezone.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use thymos_core::civil;
use thymos_core::{
    Chapter, ChapterPatch, ChapterView, Period, PeriodDraft, PeriodPatch, ThymosError,
    TimelineStore, TimelineTx, UserProvider,
};

/// Period consistency engine. Stateless between calls: every operation
/// begins a fresh transaction and re-reads before returning.
pub struct TimelineEngine {
    store: Arc<dyn TimelineStore>,
    users: Arc<dyn UserProvider>,
}

impl TimelineEngine {
    pub fn new(store: Arc<dyn TimelineStore>, users: Arc<dyn UserProvider>) -> Self {
        Self { store, users }
    }

    /// Creates a period in a chapter.
    pub async fn create_period(
        &self,
        user_id: Uuid,
        chapter_id: Uuid,
        draft: PeriodDraft,
    ) -> Result<ChapterView, ThymosError> {
        let tz = self.users.timezone(user_id).await?;
        let mut tx = self.store.begin().await?;

        let chapter = tx
            .chapter(user_id, chapter_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("chapter", chapter_id))?;

        reject_far_future(draft.start, tz)?;
        if let Some(end_date) = draft.end {
            if draft.start > end_date {
                return Err(ThymosError::InvalidDateRange {
                    start: draft.start,
                    end: end_date,
                });
            }
        }
        let start = civil::local_midnight_utc(draft.start, tz);
        let end = draft.end.map(|d| civil::local_midnight_utc(d, tz));

        match end {
            None => ensure_no_active(&mut *tx, chapter_id, None).await?,
            Some(end) => ensure_no_overlap(&mut *tx, chapter_id, start, end, None).await?,
        }

        let period = Period {
            id: Uuid::new_v4(),
            chapter_id,
            start,
            end,
            comment: draft.comment,
        };
        let period_id = period.id;
        tx.insert_period(period).await?;
        let periods = tx.periods_of(chapter_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %chapter_id, %period_id, "period created");
        Ok(ChapterView::assemble(&chapter, periods, tz))
    }

    /// Updates a period's dates and/or comment. Omitted fields keep their
    /// stored values; the full invariant set re-runs against the
    /// effective range, with the period itself excluded from comparisons
    /// so it may keep its own slot.
    pub async fn update_period(
        &self,
        user_id: Uuid,
        period_id: Uuid,
        patch: PeriodPatch,
    ) -> Result<ChapterView, ThymosError> {
        let tz = self.users.timezone(user_id).await?;
        let mut tx = self.store.begin().await?;

        let mut period = tx
            .period(user_id, period_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("period", period_id))?;
        let chapter = tx
            .chapter(user_id, period.chapter_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("chapter", period.chapter_id))?;

        // Future-date rule applies only to an explicitly supplied start.
        if let Some(new_start) = patch.start {
            reject_far_future(new_start, tz)?;
        }

        let start = patch
            .start
            .map(|d| civil::local_midnight_utc(d, tz))
            .unwrap_or(period.start);
        let end = patch
            .end
            .map(|d| civil::local_midnight_utc(d, tz))
            .or(period.end);
        if let Some(end) = end {
            if start > end {
                return Err(ThymosError::InvalidDateRange {
                    start: civil::civil_date_in(start, tz),
                    end: civil::civil_date_in(end, tz),
                });
            }
        }

        match end {
            None => ensure_no_active(&mut *tx, period.chapter_id, Some(period_id)).await?,
            Some(end) => {
                ensure_no_overlap(&mut *tx, period.chapter_id, start, end, Some(period_id)).await?
            }
        }

        period.start = start;
        period.end = end;
        if let Some(comment) = patch.comment {
            period.comment = Some(comment);
        }
        let chapter_id = period.chapter_id;
        tx.update_period(period).await?;
        let periods = tx.periods_of(chapter_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %period_id, "period updated");
        Ok(ChapterView::assemble(&chapter, periods, tz))
    }

    /// Closes the chapter's open period by giving it an end date.
    pub async fn close_period(
        &self,
        user_id: Uuid,
        period_id: Uuid,
        end: NaiveDate,
    ) -> Result<ChapterView, ThymosError> {
        let tz = self.users.timezone(user_id).await?;
        let mut tx = self.store.begin().await?;

        let mut period = tx
            .period(user_id, period_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("period", period_id))?;
        if period.end.is_some() {
            return Err(ThymosError::EventAlreadyClosed { period_id });
        }
        let chapter = tx
            .chapter(user_id, period.chapter_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("chapter", period.chapter_id))?;

        let end_instant = civil::local_midnight_utc(end, tz);
        if period.start > end_instant {
            return Err(ThymosError::InvalidDateRange {
                start: civil::civil_date_in(period.start, tz),
                end,
            });
        }
        ensure_no_overlap(
            &mut *tx,
            period.chapter_id,
            period.start,
            end_instant,
            Some(period_id),
        )
        .await?;

        period.end = Some(end_instant);
        let chapter_id = period.chapter_id;
        tx.update_period(period).await?;
        let periods = tx.periods_of(chapter_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %period_id, %end, "period closed");
        Ok(ChapterView::assemble(&chapter, periods, tz))
    }

    /// Deletes a period unconditionally. No downstream invariant can
    /// break by removing a range.
    pub async fn delete_period(&self, user_id: Uuid, period_id: Uuid) -> Result<(), ThymosError> {
        let mut tx = self.store.begin().await?;
        let period = tx
            .period(user_id, period_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("period", period_id))?;
        tx.delete_period(period.id).await?;
        tx.commit().await?;
        tracing::info!(%user_id, %period_id, "period deleted");
        Ok(())
    }

    /// Creates a chapter under an existing category.
    pub async fn create_chapter(
        &self,
        user_id: Uuid,
        title: String,
        description: Option<String>,
        category_id: Uuid,
    ) -> Result<ChapterView, ThymosError> {
        let tz = self.users.timezone(user_id).await?;
        let mut tx = self.store.begin().await?;

        tx.category(user_id, category_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("category", category_id))?;

        let chapter = Chapter {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            category_id,
        };
        tx.insert_chapter(chapter.clone()).await?;
        tx.commit().await?;

        tracing::info!(%user_id, chapter_id = %chapter.id, "chapter created");
        Ok(ChapterView::assemble(&chapter, Vec::new(), tz))
    }

    /// Updates a chapter's title, description, or category.
    pub async fn update_chapter(
        &self,
        user_id: Uuid,
        chapter_id: Uuid,
        patch: ChapterPatch,
    ) -> Result<ChapterView, ThymosError> {
        let tz = self.users.timezone(user_id).await?;
        let mut tx = self.store.begin().await?;

        let mut chapter = tx
            .chapter(user_id, chapter_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("chapter", chapter_id))?;
        if let Some(category_id) = patch.category_id {
            tx.category(user_id, category_id)
                .await?
                .ok_or_else(|| ThymosError::not_found("category", category_id))?;
            chapter.category_id = category_id;
        }
        if let Some(title) = patch.title {
            chapter.title = title;
        }
        if let Some(description) = patch.description {
            chapter.description = Some(description);
        }

        tx.update_chapter(chapter.clone()).await?;
        let periods = tx.periods_of(chapter_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %chapter_id, "chapter updated");
        Ok(ChapterView::assemble(&chapter, periods, tz))
    }

    /// Deletes a chapter, refused while it still owns periods.
    pub async fn delete_chapter(&self, user_id: Uuid, chapter_id: Uuid) -> Result<(), ThymosError> {
        let mut tx = self.store.begin().await?;
        tx.chapter(user_id, chapter_id)
            .await?
            .ok_or_else(|| ThymosError::not_found("chapter", chapter_id))?;

        let period_count = tx.period_count(chapter_id).await?;
        if period_count > 0 {
            return Err(ThymosError::InUse {
                chapter_id,
                period_count,
            });
        }
        tx.delete_chapter(chapter_id).await?;
        tx.commit().await?;
        tracing::info!(%user_id, %chapter_id, "chapter deleted");
        Ok(())
    }
}

/// Rejects a start date more than one calendar day ahead of today in the
/// user's timezone.
fn reject_far_future(start: NaiveDate, tz: Tz) -> Result<(), ThymosError> {
    let today = civil::today_in(tz);
    let limit = today.checked_add_days(Days::new(1)).unwrap_or(today);
    if start > limit {
        return Err(ThymosError::FutureDate { date: start });
    }
    Ok(())
}

/// Active-period invariant: the chapter may not already hold an open
/// period (other than `exclude`).
async fn ensure_no_active(
    tx: &mut dyn TimelineTx,
    chapter_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<(), ThymosError> {
    if let Some(active) = tx.active_period(chapter_id, exclude).await? {
        tracing::debug!(%chapter_id, active = %active.id, "rejecting second active period");
        return Err(ThymosError::ActivePeriodExists {
            period_id: active.id,
        });
    }
    Ok(())
}

/// No-overlap invariant for a closed candidate range, strict inequality.
async fn ensure_no_overlap(
    tx: &mut dyn TimelineTx,
    chapter_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Result<(), ThymosError> {
    for existing in tx.closed_periods(chapter_id, exclude).await? {
        if existing.overlaps_closed(start, end) {
            tracing::debug!(%chapter_id, conflicting = %existing.id, "rejecting overlapping period");
            return Err(ThymosError::PeriodOverlap {
                period_id: existing.id,
                start: existing.start,
                // Closed periods always carry an end.
                end: existing.end.unwrap_or(existing.start),
            });
        }
    }
    Ok(())
}
