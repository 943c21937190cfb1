//! `cargo run -p storage --features seed --bin seed -- --owner demo-user --entries 20`

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use progress_core::model::{NewProgress, OwnerId};
use storage::config::DEFAULT_SQLITE_URL;
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Populate a SQLite database with sample learning-progress entries.
#[derive(Debug, Parser)]
#[command(name = "seed")]
struct Args {
    /// SQLite URL
    #[arg(long = "db", env = "PROGRESS_DB_URL", default_value = DEFAULT_SQLITE_URL)]
    db_url: String,

    /// Post owner the entries belong to
    #[arg(long, env = "PROGRESS_OWNER", default_value = "demo-user")]
    owner: String,

    /// Number of entries to insert, one per day going back from `--now`
    #[arg(long, env = "PROGRESS_ENTRIES", default_value_t = 12)]
    entries: u32,

    /// Fixed current time (RFC3339) for deterministic seeding
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Delete the owner's existing entries first
    #[arg(long)]
    reset: bool,
}

const SAMPLES: [(&str, &str, &str); 5] = [
    ("Ownership basics", "Moves, copies and drops", "Rust"),
    ("Async runtimes", "Executors and wakers", "Rust"),
    ("Index design", "Compound indexes for range scans", "Databases"),
    ("Flexbox layouts", "Alignment along both axes", "Web"),
    ("Query planning", "Reading EXPLAIN output", "Databases"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("seed=info,storage=info")),
        )
        .init();

    let args = Args::parse();
    let owner = OwnerId::new(args.owner.clone()).context("invalid --owner")?;
    let now = args.now.unwrap_or_else(Utc::now);

    let storage = Storage::sqlite(&args.db_url)
        .await
        .with_context(|| format!("opening {}", args.db_url))?;

    if args.reset {
        let removed = storage.progress.delete_by_owner(&owner).await?;
        info!(%owner, removed, "cleared existing entries");
    }

    let samples = SAMPLES.iter().cycle().take(args.entries as usize);
    for (i, (title, description, category)) in samples.enumerate() {
        let days_ago = i64::try_from(i).context("too many entries")?;
        let draft = NewProgress::new(
            owner.clone(),
            now - Duration::days(days_ago),
            *title,
            *description,
            *category,
        )?;
        storage.progress.insert(draft).await?;
    }

    info!(
        %owner,
        entries = args.entries,
        db = %args.db_url,
        "seeded learning progress"
    );
    Ok(())
}
