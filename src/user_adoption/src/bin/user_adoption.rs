use std::{num::NonZeroU32, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use user_adoption::config::{AdoptionConfig, FlagOverrides, layered_config};
use user_adoption::io::{
    adoption_frame, read_engagement_csv, read_visit_counts_csv, visit_counts_frame, write_csv,
};
use user_adoption::pipeline::{calculate_adoption, previous_week_visits};
use user_adoption::resolve::resolve_adoption;

#[derive(Parser)]
#[command(version, about = "User adoption from engagement logs")]
struct Cli {
    /// More output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compute each user's first adoption date.
    Adopt {
        #[command(flatten)]
        run: RunArgs,
        /// Adoption table destination.
        #[arg(long, value_name = "CSV")]
        output: Option<PathBuf>,
        /// Also export the windowed count table.
        #[arg(long, value_name = "CSV")]
        visits_output: Option<PathBuf>,
        /// Minimum windowed count that marks adoption.
        #[arg(long)]
        threshold: Option<NonZeroU32>,
        /// Print the run summary without writing files.
        #[arg(long)]
        dry_run: bool,
    },
    /// Export the windowed count table only.
    Visits {
        #[command(flatten)]
        run: RunArgs,
        /// Windowed count table destination.
        #[arg(long, value_name = "CSV")]
        output: Option<PathBuf>,
    },
    /// Resolve adoption dates from a previously exported count table.
    Resolve {
        /// TOML configuration file.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Windowed count table to read.
        #[arg(long, value_name = "CSV")]
        input: PathBuf,
        /// Adoption table destination.
        #[arg(long, value_name = "CSV")]
        output: PathBuf,
        /// Minimum windowed count that marks adoption.
        #[arg(long)]
        threshold: Option<NonZeroU32>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Engagement table (user_id, time_stamp).
    #[arg(long, value_name = "CSV")]
    input: Option<PathBuf>,
    /// Trailing window width in days.
    #[arg(long)]
    window_days: Option<NonZeroU32>,
    /// Count each active day once instead of every event.
    #[arg(long)]
    distinct_days: bool,
}

impl RunArgs {
    fn load_config(&self, threshold: Option<NonZeroU32>) -> Result<AdoptionConfig> {
        let flags = FlagOverrides {
            window_days: self.window_days,
            adoption_threshold: threshold,
            distinct_days: self.distinct_days,
        };
        layered_config(self.config.as_deref(), &flags)
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.cmd {
        Cmd::Adopt {
            run,
            output,
            visits_output,
            threshold,
            dry_run,
        } => {
            let cfg = run.load_config(threshold)?;
            let input = cfg.paths.engagement_or(run.input.clone())?;

            info!(path = %input.display(), "reading engagement data");
            let records = read_engagement_csv(&input)
                .with_context(|| format!("load engagement table {}", input.display()))?;

            info!("creating adoption dataset");
            let result = calculate_adoption(&records, &cfg)?;

            if dry_run {
                println!("{}", result.summary);
                return Ok(());
            }

            let output = cfg.paths.adoption_or(output)?;
            write_csv(&mut adoption_frame(&result.adoption)?, &output)
                .with_context(|| format!("write adoption table {}", output.display()))?;
            info!(path = %output.display(), rows = result.adoption.len(), "wrote adoption data");

            if let Some(path) = cfg.paths.visits_or(visits_output) {
                write_csv(&mut visit_counts_frame(&result.visits)?, &path)
                    .with_context(|| format!("write visits table {}", path.display()))?;
                info!(path = %path.display(), rows = result.visits.len(), "wrote visit counts");
            }
        }
        Cmd::Visits { run, output } => {
            let cfg = run.load_config(None)?;
            let input = cfg.paths.engagement_or(run.input.clone())?;
            let output = cfg
                .paths
                .visits_or(output)
                .context("no visits output: pass --output or set paths.visits_csv")?;

            info!(path = %input.display(), "reading engagement data");
            let records = read_engagement_csv(&input)
                .with_context(|| format!("load engagement table {}", input.display()))?;
            let counted = previous_week_visits(&records, &cfg.window_settings())?;

            write_csv(&mut visit_counts_frame(&counted)?, &output)
                .with_context(|| format!("write visits table {}", output.display()))?;
            info!(path = %output.display(), rows = counted.len(), "wrote visit counts");
        }
        Cmd::Resolve {
            config,
            input,
            output,
            threshold,
        } => {
            let flags = FlagOverrides {
                adoption_threshold: threshold,
                ..FlagOverrides::default()
            };
            let threshold = layered_config(config.as_deref(), &flags)?.adoption_threshold;

            let counted = read_visit_counts_csv(&input)
                .with_context(|| format!("load visits table {}", input.display()))?;
            let adoption = resolve_adoption(&counted, threshold)?;

            write_csv(&mut adoption_frame(&adoption)?, &output)
                .with_context(|| format!("write adoption table {}", output.display()))?;
            info!(path = %output.display(), rows = adoption.len(), "wrote adoption data");
        }
    }

    Ok(())
}
