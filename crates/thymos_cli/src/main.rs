use std::sync::Arc;

use anyhow::Context;
use chrono::{Days, Utc};
use clap::Parser;
use tracing::info;
use uuid::Uuid;

use thymos_core::civil;
use thymos_core::{
    DayStore, MediaItem, MoodStateProvider, PeriodDraft, TimelineStore, UserProvider,
};
use thymos_insight::InsightEngine;
use thymos_memories::MemoryResolver;
use thymos_store::MemoryStore;
use thymos_timeline::TimelineEngine;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print the full report as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// IANA timezone for the demo user
    #[arg(short, long, default_value = "UTC")]
    timezone: String,

    /// Days of sample history to seed
    #[arg(short, long, default_value_t = 45)]
    days: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let tz: chrono_tz::Tz = args
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown timezone: {}", args.timezone))?;

    let store = Arc::new(MemoryStore::new());
    let timeline = TimelineEngine::new(
        store.clone() as Arc<dyn TimelineStore>,
        store.clone() as Arc<dyn UserProvider>,
    );
    let insight = InsightEngine::new(
        store.clone() as Arc<dyn TimelineStore>,
        store.clone() as Arc<dyn DayStore>,
        store.clone() as Arc<dyn MoodStateProvider>,
        store.clone() as Arc<dyn UserProvider>,
    );
    let resolver = MemoryResolver::new(
        store.clone() as Arc<dyn DayStore>,
        store.clone() as Arc<dyn MoodStateProvider>,
    );

    if args.days < 8 {
        anyhow::bail!("--days must be at least 8 to seed a meaningful journal");
    }

    let user = Uuid::new_v4();
    store.set_timezone(user, tz).await;
    info!(%user, timezone = %tz, days = args.days, "seeding sample journal");
    seed_journal(&store, &timeline, user, args.days).await?;

    let report = insight.mood_report(user).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Mood report ({} days with mood)", report.total_days_with_mood);
    println!("  average score: {}", report.average_mood_score);
    println!("  distribution:");
    for slice in &report.mood_distribution {
        println!(
            "    {:<10} {:>3} day(s)  {:>3}%",
            slice.mood.name, slice.count, slice.percentage
        );
    }
    match (&report.best_category, &report.worst_category) {
        (Some(best), Some(worst)) => {
            println!("  best category:  {} ({})", best.name, best.average_score);
            println!("  worst category: {} ({})", worst.name, worst.average_score);
        }
        (Some(best), None) => println!("  best category:  {} (nothing to contrast)", best.name),
        _ => println!("  no category has scored days yet"),
    }
    println!("  trend points (30d): {}", report.trend_last_30_days.len());

    if let Some(insights) = &report.weekday_insights {
        if let Some(best) = &insights.best_mood_day {
            println!(
                "  best weekday:   {} (avg {})",
                civil::weekday_name(best.weekday),
                best.average_score
            );
        }
        if let Some(worst) = &insights.worst_mood_day {
            println!(
                "  worst weekday:  {} (avg {})",
                civil::weekday_name(worst.weekday),
                worst.average_score
            );
        }
        if let Some(recovery) = &insights.recovery_index {
            println!(
                "  recovery day:   {} ({:.0}% over {} trough(s))",
                civil::weekday_name(recovery.weekday),
                recovery.recovery_rate * 100.0,
                recovery.total_occurrences
            );
        }
        if insights.burnout_pattern.detected {
            println!(
                "  burnout signal: {:?} (confidence {:?})",
                insights.burnout_pattern.kind, insights.burnout_pattern.confidence
            );
        }
    } else {
        println!("  (weekday insights need 14 recorded days)");
    }

    // Yesterday always has seeded content, so it anchors the memories demo.
    let yesterday = civil::today_in(tz)
        .checked_sub_days(Days::new(1))
        .context("date arithmetic")?;
    let memories = resolver
        .day_memories(user, &yesterday.format("%Y-%m-%d").to_string())
        .await?;
    println!("Memories for {yesterday}:");
    if memories.is_empty() {
        println!("  none yet — not enough history");
    }
    for memory in memories {
        let mood = memory
            .mood
            .map(|m| m.name)
            .unwrap_or_else(|| "no mood".to_string());
        println!(
            "  {:?}: {} — {}, {} media",
            memory.offset, memory.date, mood, memory.media_count
        );
    }

    Ok(())
}

/// Seeds a deterministic sample journal: five mood states, two
/// categories with chapters and periods, and a repeating mood/media
/// pattern over the trailing `days` days.
async fn seed_journal(
    store: &Arc<MemoryStore>,
    timeline: &TimelineEngine,
    user: Uuid,
    days: u64,
) -> anyhow::Result<()> {
    let palette = [
        ("Great", "#2e7d32", 9.0),
        ("Good", "#7cb342", 7.0),
        ("Okay", "#fbc02d", 5.0),
        ("Low", "#f57c00", 3.0),
        ("Terrible", "#c62828", 1.0),
    ];
    let mut moods = Vec::new();
    for (position, (name, color, score)) in palette.into_iter().enumerate() {
        moods.push(
            store
                .seed_mood_state(user, name, color, score, position as u32)
                .await,
        );
    }

    let work = store.seed_category(user, "Work", "#4477aa", 0).await;
    let travel = store.seed_category(user, "Travel", "#aa7744", 1).await;
    let today = Utc::now().date_naive();
    let day_back = |n: u64| {
        today
            .checked_sub_days(Days::new(n))
            .context("sample history reaches before the calendar")
    };

    let job = timeline
        .create_chapter(user, "New team".into(), None, work.id)
        .await?;
    timeline
        .create_period(
            user,
            job.id,
            PeriodDraft {
                start: day_back(days)?,
                end: Some(day_back(days / 2)?),
                comment: Some("onboarding".into()),
            },
        )
        .await?;
    timeline
        .create_period(
            user,
            job.id,
            PeriodDraft {
                start: day_back(days / 2 - 1)?,
                end: None,
                comment: Some("own project".into()),
            },
        )
        .await?;

    let trip = timeline
        .create_chapter(user, "Spring trip".into(), None, travel.id)
        .await?;
    timeline
        .create_period(
            user,
            trip.id,
            PeriodDraft {
                start: day_back(days / 3)?,
                end: Some(day_back(days / 4)?),
                comment: None,
            },
        )
        .await?;

    // Repeating mood cycle with media every fifth day.
    let cycle = [1usize, 0, 2, 1, 3, 0, 2];
    for back in 1..=days {
        let date = day_back(back)?;
        let mood = &moods[cycle[(back as usize) % cycle.len()]];
        store.set_mood(user, date, Some(mood.id)).await?;
        if back % 5 == 0 {
            store
                .add_media(
                    user,
                    date,
                    MediaItem {
                        id: Uuid::new_v4(),
                        uri: format!("mem://photo-{back}"),
                        created_at: Utc::now(),
                    },
                )
                .await?;
        }
    }
    Ok(())
}
