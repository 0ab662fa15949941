use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use socialseed_core::config::Settings;
use socialseed_core::db::{Database, SqliteStore};
use socialseed_core::generate::cancellation;
use socialseed_core::pipeline::{self, LoadSummary};
use socialseed_core::verify::{verify_store, VerifyReport};
use socialseed_core::SeedError;
use socialseed_types::{EntityKind, ShortfallPolicy};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Socialseed Dataset Loader
///
/// Generates an internally consistent social graph (follows, comments,
/// likes, story views, tags) from seed profiles and writes it to SQLite.
#[derive(Parser, Debug)]
#[command(name = "socialseed")]
#[command(about = "Generate and load the socialseed dataset", long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(short, long, global = true, env = "SOCIALSEED_DATABASE_PATH")]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the seed files, generate every entity and persist them
    Load(LoadArgs),
    /// Check stored follow counters and story viewers against the edges
    Verify,
    /// Print the row count of every table
    Inspect,
}

#[derive(Args, Debug, Default)]
struct LoadArgs {
    /// Profile seed file (JSON array)
    #[arg(long, env = "SOCIALSEED_PROFILES_PATH")]
    profiles: Option<String>,

    /// Comment pool file (JSON array)
    #[arg(long, env = "SOCIALSEED_COMMENTS_PATH")]
    comments: Option<String>,

    /// Story media pool file (JSON array)
    #[arg(long, env = "SOCIALSEED_STORY_MEDIA_PATH")]
    story_media: Option<String>,

    /// Post media pool file (JSON array)
    #[arg(long, env = "SOCIALSEED_POST_MEDIA_PATH")]
    post_media: Option<String>,

    /// Fixed RNG seed for a reproducible dataset
    #[arg(long, env = "SOCIALSEED_RNG_SEED")]
    rng_seed: Option<u64>,

    /// Number of tag association workers
    #[arg(long)]
    tag_workers: Option<usize>,

    /// What to do when a target exceeds its eligible population: cap or fail
    #[arg(long, value_parser = parse_policy)]
    shortfall_policy: Option<ShortfallPolicy>,

    /// Drop and recreate every table before loading
    #[arg(long)]
    reset: bool,
}

impl LoadArgs {
    /// Command-line values win over file and environment settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.profiles {
            settings.seed.profiles_path = path.clone();
        }
        if let Some(path) = &self.comments {
            settings.seed.comments_path = path.clone();
        }
        if let Some(path) = &self.story_media {
            settings.seed.story_media_path = path.clone();
        }
        if let Some(path) = &self.post_media {
            settings.seed.post_media_path = path.clone();
        }
        if let Some(seed) = self.rng_seed {
            settings.generation.rng_seed = Some(seed);
        }
        if let Some(workers) = self.tag_workers {
            settings.generation.tag_workers = workers.max(1);
        }
        if let Some(policy) = self.shortfall_policy {
            settings.generation.shortfall_policy = policy;
        }
    }
}

fn parse_policy(s: &str) -> Result<ShortfallPolicy, String> {
    ShortfallPolicy::parse(s).ok_or_else(|| format!("unknown shortfall policy '{}' (expected cap or fail)", s))
}

/// Open the database file, creating it and its schema when absent
fn open_store(path: &str) -> Result<SqliteStore> {
    let db = Database::new(path).with_context(|| format!("Failed to open database {}", path))?;
    db.initialize().context("Failed to initialize database schema")?;
    Ok(SqliteStore::new(db))
}

/// Open an existing database without creating one
fn connect_existing(path: &str) -> Result<SqliteStore> {
    if path != ":memory:" && !Path::new(path).exists() {
        anyhow::bail!("Database file not found: {}", path);
    }
    open_store(path)
}

async fn run_load(mut settings: Settings, args: LoadArgs) -> Result<()> {
    args.apply(&mut settings);

    let store = open_store(&settings.database.path)?;
    if args.reset {
        store.database().reset().context("Failed to reset database")?;
        tracing::info!("Reset existing database {}", settings.database.path);
    }
    let populated = store
        .table_counts()?
        .into_iter()
        .any(|(_, count)| count > 0);
    if populated {
        anyhow::bail!(
            "Database {} already holds data; rerun with --reset to replace it",
            settings.database.path
        );
    }

    let (cancel_tx, cancel) = cancellation();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling generation");
                let _ = cancel_tx.send(true);
            }
            Err(err) => tracing::error!(?err, "Failed to listen for interrupt signal"),
        }
    });

    tracing::info!("Loading into {}", settings.database.path);
    let summary = pipeline::load(&store, &settings, cancel).await?;
    display_summary(&summary);
    Ok(())
}

fn run_verify(settings: &Settings) -> Result<()> {
    let store = connect_existing(&settings.database.path)?;
    let report = verify_store(&store)?;
    display_verification(&report);

    if !report.is_clean() {
        anyhow::bail!("Verification found {} mismatches", report.mismatches.len());
    }
    Ok(())
}

fn run_inspect(settings: &Settings) -> Result<()> {
    let store = connect_existing(&settings.database.path)?;

    println!("=== {} ===", settings.database.path);
    println!();
    for (kind, count) in store.table_counts()? {
        println!("{:<18} {}", kind.as_str(), count);
    }
    Ok(())
}

fn display_summary(summary: &LoadSummary) {
    println!();
    println!("Load Summary");
    println!("============");
    println!();
    for (kind, rows) in &summary.report.rows {
        println!("{:<18} {}", kind.as_str(), rows);
    }
    println!();
    println!("Chunks written: {}", summary.report.chunks);
    println!("Users reconciled: {}", summary.report.users_reconciled);
    println!("Posts reconciled: {}", summary.report.posts_reconciled);
    println!(
        "Users with follow counts off target: {} of {}",
        summary.run.divergences.len(),
        summary.run.dataset.count(EntityKind::Users)
    );
    println!();
    println!("Load completed successfully!");
}

fn display_verification(report: &VerifyReport) {
    println!();
    println!("Verification");
    println!("============");
    println!();
    println!("Users checked: {}", report.users_checked);
    println!("Stories checked: {}", report.stories_checked);
    println!("Views checked: {}", report.views_checked);

    if !report.mismatches.is_empty() {
        println!();
        println!("Mismatches: {}", report.mismatches.len());
        for (i, mismatch) in report.mismatches.iter().take(20).enumerate() {
            println!("  {}. {}", i + 1, mismatch);
        }
        if report.mismatches.len() > 20 {
            println!("  ... and {} more", report.mismatches.len() - 20);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socialseed_core=info,socialseed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::new().context("Failed to load settings")?;
    if let Some(path) = cli.database {
        settings.database.path = path;
    }

    let result = match cli.command {
        Command::Load(args) => run_load(settings, args).await,
        Command::Verify => run_verify(&settings),
        Command::Inspect => run_inspect(&settings),
    };

    if let Err(e) = &result {
        match e.downcast_ref::<SeedError>() {
            Some(seed_error) => tracing::error!("Run aborted ({} error): {}", seed_error.kind(), seed_error),
            None => tracing::error!("Run aborted: {:#}", e),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialseed_core::config::{BatchSizes, Database as DatabaseSettings, Generation, Seed};

    fn settings() -> Settings {
        Settings {
            database: DatabaseSettings {
                path: "socialseed.db".to_string(),
            },
            seed: Seed {
                profiles_path: "data/profiles.json".to_string(),
                comments_path: "data/comments.json".to_string(),
                story_media_path: "data/story_media.json".to_string(),
                post_media_path: "data/post_media.json".to_string(),
            },
            generation: Generation::default(),
            batches: BatchSizes::default(),
        }
    }

    #[test]
    fn test_load_flags_parse() {
        let cli = Cli::try_parse_from([
            "socialseed",
            "--database",
            "out.db",
            "load",
            "--profiles",
            "p.json",
            "--rng-seed",
            "7",
            "--shortfall-policy",
            "fail",
            "--reset",
        ])
        .expect("Failed to parse arguments");

        assert_eq!(cli.database.as_deref(), Some("out.db"));
        match cli.command {
            Command::Load(args) => {
                assert_eq!(args.profiles.as_deref(), Some("p.json"));
                assert_eq!(args.rng_seed, Some(7));
                assert_eq!(args.shortfall_policy, Some(ShortfallPolicy::FailOnShortfall));
                assert!(args.reset);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = Cli::try_parse_from(["socialseed", "load", "--shortfall-policy", "maybe"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = settings();
        let args = LoadArgs {
            comments: Some("c.json".to_string()),
            tag_workers: Some(0),
            rng_seed: Some(3),
            ..Default::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.seed.comments_path, "c.json");
        assert_eq!(settings.seed.profiles_path, "data/profiles.json");
        assert_eq!(settings.generation.tag_workers, 1);
        assert_eq!(settings.generation.rng_seed, Some(3));
    }

    #[test]
    fn test_verify_requires_existing_file() {
        let missing = std::env::temp_dir().join(format!("socialseed-missing-{}.db", std::process::id()));
        let result = connect_existing(missing.to_str().unwrap());
        assert!(result.is_err());
    }
}
