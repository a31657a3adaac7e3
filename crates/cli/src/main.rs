mod commands;
mod config;
mod state;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{cmd_catalog, cmd_complete, cmd_level, cmd_stats, cmd_xp, CompleteArgs};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Bug Hunter progress engine.
#[derive(Parser)]
#[command(name = "bughunter", version, about = "Bug Hunter progress engine")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log engine activity to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Path to the config file (default: ./bughunter.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the state file (overrides store.state_file)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the level for a total XP value
    Level {
        /// Total XP
        xp: u64,
    },

    /// Compute the XP award for a solved challenge
    Xp {
        /// Base XP of the challenge
        #[arg(long)]
        base: u32,
        /// Seconds taken to solve (enables the time bonus check)
        #[arg(long)]
        time_taken: Option<u64>,
        /// Number of hints used
        #[arg(long, default_value = "0")]
        hints: u32,
        /// Streak multiplier (applied when greater than 1)
        #[arg(long, default_value = "1", value_parser = parse_multiplier)]
        streak_multiplier: f64,
    },

    /// Record a solved challenge and award achievements
    Complete {
        /// User id
        #[arg(long)]
        user: String,
        /// Course: html, css, or javascript
        #[arg(long)]
        course: String,
        /// Base XP of the challenge
        #[arg(long)]
        base_xp: u32,
        /// Seconds taken to solve
        #[arg(long)]
        time_taken: Option<u64>,
        /// Number of hints used
        #[arg(long, default_value = "0")]
        hints: u32,
        /// Streak multiplier (applied when greater than 1)
        #[arg(long, default_value = "1", value_parser = parse_multiplier)]
        streak_multiplier: f64,
    },

    /// Show aggregated stats for a user
    Stats {
        /// User id
        #[arg(long)]
        user: String,
    },

    /// List the achievement catalog
    Catalog,
}

fn parse_multiplier(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("streak multiplier must be a finite number, got '{}'", s))
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    if let Some(state) = cli.state {
        config.store.state_file = state;
    }

    match cli.command {
        Commands::Level { xp } => {
            cmd_level(xp, cli.output, cli.quiet);
        }
        Commands::Xp {
            base,
            time_taken,
            hints,
            streak_multiplier,
        } => {
            cmd_xp(
                &config,
                base,
                time_taken,
                hints,
                streak_multiplier,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Complete {
            user,
            course,
            base_xp,
            time_taken,
            hints,
            streak_multiplier,
        } => {
            cmd_complete(
                &config,
                CompleteArgs {
                    user: &user,
                    course: &course,
                    base_xp,
                    time_taken,
                    hints,
                    streak_multiplier,
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::Stats { user } => {
            cmd_stats(&config, &user, cli.output, cli.quiet);
        }
        Commands::Catalog => {
            cmd_catalog(&config, cli.output, cli.quiet);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Print a JSON value, pretty.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("serialization error: {}", e),
    }
}
