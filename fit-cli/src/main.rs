//! # fittogether
//!
//! Command-line client for FitTogether partner workouts.
//!
//! ## Commands
//!
//! - `init`: Create your profile and invite code
//! - `status`: Show profile and partner
//! - `connect`: Pair with a partner's invite code
//! - `share`: Print your invite message
//! - `log`: Log a workout
//! - `stats`: Weekly progress and streak
//! - `send`: Send a message, sticker, claps or voice note
//! - `claps`: Claps per day
//! - `reconcile`: Repair one-sided pairings
//!
//! ## Example
//!
//! ```bash
//! # Create a profile
//! fittogether init --name "Alex"
//!
//! # On your partner's machine (sharing the same database)
//! fittogether connect ABCD2345
//!
//! # Log a workout and cheer each other on
//! fittogether log --type cardio --minutes 45 --calories 400
//! fittogether send clap --count 3
//! fittogether stats --partner
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fit_client::LogWorkout;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;

use commands::send::SendKind;
use commands::{
    claps, connect, init, log, reconcile, send, share, stats, status, Reported, Session,
};

/// Command-line client for FitTogether.
#[derive(Parser, Debug)]
#[command(name = "fittogether")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the viewer file and default database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Settings file (default: fittogether.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the settings file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create your profile and invite code
    Init {
        /// Display name
        #[arg(long, short)]
        name: String,
    },

    /// Show profile and partner
    Status,

    /// Pair with a partner using their invite code
    Connect {
        /// Partner's invite code (case-insensitive)
        code: String,
    },

    /// Print your invite message and share link
    Share,

    /// Log a workout
    Log {
        /// Workout type (cardio, strength, flexibility, sports or anything else)
        #[arg(long = "type", short = 't')]
        activity_type: String,

        /// Duration in minutes (default from settings)
        #[arg(long, short)]
        minutes: Option<u32>,

        /// Calorie estimate
        #[arg(long, short)]
        calories: Option<u32>,

        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show weekly progress and streak
    Stats {
        /// Also show your partner's progress
        #[arg(long)]
        partner: bool,
    },

    /// Send encouragement to your partner
    Send {
        #[command(subcommand)]
        kind: SendKind,
    },

    /// Show claps per day
    Claps {
        /// Only show claps received on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Clear one-sided partner references
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let session = Session::open(&data_dir, cli.config.as_deref(), cli.database.as_deref()).await?;

    match dispatch(&session, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is::<Reported>() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}

async fn dispatch(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Init { name } => {
            init::run(session, &name).await?;
        }
        Commands::Status => {
            status::run(session).await?;
        }
        Commands::Connect { code } => {
            connect::run(session, &code).await?;
        }
        Commands::Share => {
            share::run(session).await?;
        }
        Commands::Log {
            activity_type,
            minutes,
            calories,
            notes,
        } => {
            let req = LogWorkout {
                activity_type,
                duration_minutes: minutes,
                calories,
                completed_at: None,
                notes,
            };
            log::run(session, req).await?;
        }
        Commands::Stats { partner } => {
            stats::run(session, partner).await?;
        }
        Commands::Send { kind } => {
            send::run(session, kind).await?;
        }
        Commands::Claps { date } => {
            claps::run(session, date.as_deref()).await?;
        }
        Commands::Reconcile => {
            reconcile::run(session).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for fittogether.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("app", "fittogether", "fittogether")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
