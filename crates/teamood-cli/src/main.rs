//! Tea & Mood Tracker CLI
//!
//! Thin wrapper around teamood-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Show store information
//! teamood info
//!
//! # Populate an empty store with three demo logs
//! teamood seed
//!
//! # Log a cup of tea for today
//! teamood add --mood happy --tea "black tea" --time afternoon
//!
//! # Today's summary and the trailing week
//! teamood today
//!
//! # Filtered history
//! teamood history --today --mood calm --oldest
//!
//! # Delete a log
//! teamood delete <log_id>
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use teamood_core::{
    demo_logs, AddLogForm, Clock, DailyBucket, FilterSelection, HistoryProjector, HistoryView,
    LogId, LogRecord, LogStore, Mood, SortOrder, Storage, SystemClock, TeaType, TimeOfDay,
    TodayProjector, TodayView,
};
use tracing::debug;

/// Name of the database file inside the data directory
const DB_FILE: &str = "teamood.redb";

/// Tea & Mood Tracker - daily tea and mood log
#[derive(Parser)]
#[command(name = "teamood")]
#[command(version = "0.1.0")]
#[command(about = "Tea & Mood Tracker - daily tea and mood log")]
#[command(
    long_about = "Log each cup of tea with how you felt, then review today's caffeine, the trailing week, and a filterable history."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Data directory (default: ~/.teamood/data)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print views as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store information
    Info,

    /// Add the demo logs to an empty store
    Seed,

    /// Log a cup of tea for today
    Add {
        /// How you felt (calm, happy, tired, stressed)
        #[arg(short, long, default_value = "calm")]
        mood: String,

        /// Tea drunk (green-tea, black-tea, oolong, herbal)
        #[arg(short, long, default_value = "green-tea")]
        tea: String,

        /// Time of day (morning, afternoon, evening)
        #[arg(long, default_value = "morning")]
        time: String,
    },

    /// Show today's summary and the trailing week
    Today,

    /// List logs with optional filters
    History {
        /// Only logs dated today
        #[arg(long)]
        today: bool,

        /// Only logs with this mood
        #[arg(short, long)]
        mood: Option<String>,

        /// Only logs at this time of day
        #[arg(long)]
        time: Option<String>,

        /// Oldest logs first
        #[arg(long)]
        oldest: bool,
    },

    /// Delete a log by id
    Delete {
        /// Log ID (ULID)
        log_id: String,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".teamood")
        .join("data")
}

fn open_store(data_dir: &Path) -> Result<LogStore> {
    let db_path = data_dir.join(DB_FILE);
    debug!(path = %db_path.display(), "Opening log database");
    let storage = Storage::new(&db_path)?;
    Ok(LogStore::open(storage)?)
}

/// Parse a log ID from ULID string
fn parse_log_id(s: &str) -> Result<LogId> {
    LogId::from_string(s).map_err(|e| anyhow::anyhow!("Invalid log ID '{}': {}", s, e))
}

fn parse_mood(s: &str) -> Result<Mood> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

fn parse_tea(s: &str) -> Result<TeaType> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

fn parse_time(s: &str) -> Result<TimeOfDay> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_log(log: &LogRecord) -> String {
    format!(
        "{} {} {:<8} {:<9} {:<9} {:>3} mg  {}",
        log.date,
        log.mood.emoji(),
        log.mood.label(),
        log.tea_type.label(),
        log.time_of_day.label(),
        log.caffeine_mg,
        log.id
    )
}

fn print_week(weekly: &[DailyBucket]) {
    let max = weekly.iter().map(|b| b.total_mg).max().unwrap_or(0);
    for bucket in weekly {
        // Scale bars to at most 20 cells
        let width = if max == 0 {
            0
        } else {
            (bucket.total_mg * 20 / max) as usize
        };
        println!(
            "  {} {} {:>4} mg {}",
            bucket.date.format("%a"),
            bucket.date,
            bucket.total_mg,
            "#".repeat(width)
        );
    }
}

fn print_today(view: &TodayView) {
    println!("Today ({})", view.date);
    println!();
    println!("  Logs: {}", view.summary.count);
    println!("  Caffeine: {} mg", view.summary.total_mg);
    match view.summary.dominant_mood {
        Some(mood) => println!("  Mood: {} {}", mood.emoji(), mood.label()),
        None => println!("  Mood: -"),
    }
    if !view.summary.teas.is_empty() {
        let teas: Vec<&str> = view.summary.teas.iter().map(|t| t.label()).collect();
        println!("  Teas: {}", teas.join(", "));
    }
    println!();
    println!(
        "This week: {} mg total, {} mg/day average",
        view.weekly_total_mg, view.weekly_average_mg
    );
    print_week(&view.weekly);
}

fn print_history(view: &HistoryView) {
    if view.is_empty_store() {
        println!("No logs yet.");
        return;
    }
    if view.has_no_matches() {
        println!("No logs match the current filters.");
        return;
    }

    println!(
        "Logs ({} of {}, {} mg, {} first):",
        view.filtered_count,
        view.total_log_count,
        view.filtered_total_mg,
        view.selection.sort_order.label()
    );
    println!();
    for log in &view.logs {
        println!("  {}", format_log(log));
    }
    println!();
    println!("Week:");
    print_week(&view.weekly);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let store = open_store(&data_dir)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match cli.command {
        Commands::Info => {
            let today = TodayProjector::new(&store, clock.clone());
            let history = HistoryProjector::new(store, clock);
            println!("Tea & Mood Tracker v0.1.0");
            println!();
            println!("Data directory: {}", data_dir.display());
            println!("Logs: {}", history.view().total_log_count);
            println!("Logs today: {}", today.view().summary.count);
            println!("Today: {}", today.view().date);
        }

        Commands::Seed => {
            let history = HistoryProjector::new(store.clone(), clock.clone());
            if !history.view().is_empty_store() {
                println!(
                    "Store already has {} logs; nothing seeded.",
                    history.view().total_log_count
                );
            } else {
                let logs = demo_logs(clock.today());
                let count = logs.len();
                for log in logs {
                    store.add(log)?;
                }
                println!("Seeded {} demo logs.", count);
            }
        }

        Commands::Add { mood, tea, time } => {
            let mut form = AddLogForm::new();
            form.select_mood(parse_mood(&mood)?);
            form.select_tea(parse_tea(&tea)?);
            form.select_time_of_day(parse_time(&time)?);

            let mut history = HistoryProjector::new(store.clone(), clock.clone());
            match form.save(&store, clock.as_ref())? {
                Some(id) => {
                    history.refresh();
                    if cli.json {
                        match history.view().logs.iter().find(|log| log.id == id) {
                            Some(log) => print_json(log)?,
                            None => anyhow::bail!("Log {} vanished after save", id),
                        }
                    } else {
                        println!(
                            "Added log: {} {} {}, {} ({} mg)",
                            form.mood.emoji(),
                            form.mood.label(),
                            form.tea_type.label(),
                            form.time_of_day.label(),
                            form.caffeine_preview_mg()
                        );
                        println!("  ID: {}", id);
                    }
                }
                None => anyhow::bail!("Log was not saved"),
            }
        }

        Commands::Today => {
            let projector = TodayProjector::new(&store, clock);
            if cli.json {
                print_json(projector.view())?;
            } else {
                print_today(projector.view());
            }
        }

        Commands::History {
            today,
            mood,
            time,
            oldest,
        } => {
            let selection = FilterSelection {
                today_only: today,
                mood: mood.as_deref().map(parse_mood).transpose()?,
                time_of_day: time.as_deref().map(parse_time).transpose()?,
                sort_order: if oldest {
                    SortOrder::Oldest
                } else {
                    SortOrder::Newest
                },
            };

            let mut projector = HistoryProjector::new(store, clock);
            projector.set_today_only(selection.today_only);
            projector.set_mood_filter(selection.mood);
            projector.set_time_filter(selection.time_of_day);
            projector.set_sort_order(selection.sort_order);

            if cli.json {
                print_json(projector.view())?;
            } else {
                print_history(projector.view());
            }
        }

        Commands::Delete { log_id } => {
            let id = parse_log_id(&log_id)?;
            let mut projector = HistoryProjector::new(store, clock);
            projector.delete_log(&id)?;
            println!("Deleted log: {}", id);
        }
    }

    Ok(())
}
