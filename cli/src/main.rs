mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::{
    LogArgs, cmd_delete, cmd_export, cmd_history, cmd_log, cmd_stats, cmd_trend, cmd_users,
};
use crate::config::Config;
use metabolic_core::models::{DEFAULT_USER, validate_user};
use metabolic_core::service::MetabolicService;

#[derive(Parser)]
#[command(
    name = "metabolic",
    version,
    about = "Track glucose, ketones, and weight",
    long_about = "Track glucose, ketones, and weight.\n\n\
        Each entry stores the glucose/ketone ratio at the time it was logged; \
        a ratio below 80 is in the therapeutic zone."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a new measurement
    Log {
        /// Blood glucose in mg/dL
        #[arg(short, long)]
        glucose: f64,
        /// Blood ketones in mmol/L
        #[arg(short, long)]
        ketones: f64,
        /// Body weight in lbs
        #[arg(short, long)]
        weight: f64,
        /// User the entry belongs to
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,
        /// Record as fed (default: fasted)
        #[arg(long)]
        fed: bool,
        /// Body fat percentage
        #[arg(long)]
        body_fat: Option<f64>,
        /// Blood pressure, e.g. "120/80"
        #[arg(long)]
        bp: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Time of day (HH:MM, default: now)
        #[arg(long)]
        time: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show logged entries, newest first
    History {
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show dashboard stats: current weight, change, and ratios
    Stats {
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight and ratio trend, oldest first
    Trend {
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry by ID
    Delete {
        /// Entry ID to delete
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a user's entries to CSV
    Export {
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,
        /// Directory to write the file into (default: current directory)
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
        /// Print the CSV instead of writing a file
        #[arg(long)]
        stdout: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List known users
    Users {
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(path = %config.db_path.display(), "opening store");
    let mut svc = MetabolicService::new(&config.db_path)?;

    match cli.command {
        Commands::Log {
            glucose,
            ketones,
            weight,
            user,
            fed,
            body_fat,
            bp,
            date,
            time,
            json,
        } => cmd_log(
            &mut svc,
            LogArgs {
                glucose,
                ketones,
                weight,
                user,
                fed,
                body_fat,
                bp,
                date,
                time,
                json,
            },
        ),
        Commands::History { user, json } => cmd_history(&svc, &validate_user(&user)?, json),
        Commands::Stats { user, json } => cmd_stats(&svc, &validate_user(&user)?, json),
        Commands::Trend { user, json } => cmd_trend(&svc, &validate_user(&user)?, json),
        Commands::Delete { id, yes, json } => cmd_delete(&mut svc, &id, yes, json),
        Commands::Export {
            user,
            out,
            stdout,
            json,
        } => cmd_export(&svc, &validate_user(&user)?, &out, stdout, json),
        Commands::Users { user, json } => cmd_users(&validate_user(&user)?, json),
    }
}
