/// Main entry point for the habit and fasting tracker MCP server
///
/// This file sets up logging, parses command line arguments, loads the
/// optional config file and starts the MCP server. The server listens for
/// JSON-RPC requests over stdin/stdout following the MCP protocol.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use habit_fasting_tracker::{HabitTrackerServer, MemoryKvStore, NotifierKind, TrackerConfig};

const DATA_DIR: &str = ".habit_tracker";
const DB_FILE: &str = "tracker.db";

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(DATA_DIR);
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("habit_tracker");
            p
        }),
        // 3. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(DATA_DIR);
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join(DB_FILE));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_tracker");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push(DB_FILE);

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the tracker server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// Overrides the config file; defaults to ~/.habit_tracker/tracker.db
    #[arg(long)]
    database: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Notification backend (overrides the config file)
    #[arg(long, value_enum)]
    notifier: Option<NotifierKind>,

    /// Keep all state in memory; nothing is written to disk
    #[arg(long)]
    in_memory: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_fasting_tracker={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting habit and fasting tracker MCP server");

    let mut config = TrackerConfig::load(args.config.as_deref())?;
    if let Some(notifier) = args.notifier {
        config.notifier = notifier;
    }

    let server = if args.in_memory {
        info!("Using in-memory store");
        HabitTrackerServer::with_store(Arc::new(MemoryKvStore::new()), &config)
    } else {
        let db_path = match args.database.or_else(|| config.database.clone()) {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                path
            }
            None => get_default_database_path()?,
        };
        info!("Using database at: {}", db_path.display());
        HabitTrackerServer::new(db_path, &config)?
    };

    // Run the MCP server - this will handle JSON-RPC communication over stdin/stdout
    server.run().await?;

    info!("Tracker MCP server shutdown complete");
    Ok(())
}
