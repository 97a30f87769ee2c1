//! CLI for the coursegen batch generation orchestrator.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coursegen_core::catalog::{CatalogFilter, Priority};
use coursegen_core::config;
use std::path::PathBuf;

use commands::{run_report, run_resume, run_retry, run_start, run_status};

/// Top-level CLI for the coursegen batch generation orchestrator.
#[derive(Debug, Parser)]
#[command(name = "coursegen")]
#[command(
    about = "coursegen: batch orchestration for AI course/book generation",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Enumerate the curriculum and run a fresh generation pass.
    Start {
        /// Path to the curriculum JSON document.
        #[arg(long, default_value = "curriculum.json")]
        curriculum: PathBuf,
        /// Override the configured worker count.
        #[arg(long)]
        workers: Option<usize>,
        /// Catalog ordering: enrollment-desc, creation-date-desc,
        /// alphabetical-asc, or random.
        #[arg(long)]
        priority: Option<Priority>,
        /// Shuffle seed for `--priority random`, for reproducible ordering.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Continue a persisted run in rate-limited batches.
    Resume {
        /// Re-enumerate this curriculum and merge it with persisted progress.
        /// Without it, the persisted task list is continued as-is.
        #[arg(long)]
        curriculum: Option<PathBuf>,
        /// Override the configured batch size.
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Reset failed tasks to pending and rerun them in batches.
    Retry {
        /// Override the configured batch size.
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Aggregate persisted results by subject and by level.
    Report,

    /// List every persisted task and the overall progress.
    Status,

    /// Generate artifacts for a single subject.
    Subject {
        /// Category name as it appears in the curriculum.
        name: String,
        /// Path to the curriculum JSON document.
        #[arg(long, default_value = "curriculum.json")]
        curriculum: PathBuf,
        /// Override the configured worker count.
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Generate artifacts for a single difficulty level.
    Level {
        /// Level name as it appears in the curriculum templates.
        level: String,
        /// Path to the curriculum JSON document.
        #[arg(long, default_value = "curriculum.json")]
        curriculum: PathBuf,
        /// Override the configured worker count.
        #[arg(long)]
        workers: Option<usize>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Start {
                curriculum,
                workers,
                priority,
                seed,
            } => {
                run_start(
                    &cfg,
                    &curriculum,
                    CatalogFilter::default(),
                    priority,
                    seed,
                    workers,
                )
                .await?;
            }
            CliCommand::Resume {
                curriculum,
                batch_size,
            } => run_resume(&cfg, curriculum.as_deref(), batch_size).await?,
            CliCommand::Retry { batch_size } => run_retry(&cfg, batch_size).await?,
            CliCommand::Report => run_report(&cfg)?,
            CliCommand::Status => run_status(&cfg)?,
            CliCommand::Subject {
                name,
                curriculum,
                workers,
            } => {
                run_start(
                    &cfg,
                    &curriculum,
                    CatalogFilter::by_subject(name),
                    None,
                    None,
                    workers,
                )
                .await?;
            }
            CliCommand::Level {
                level,
                curriculum,
                workers,
            } => {
                run_start(
                    &cfg,
                    &curriculum,
                    CatalogFilter::by_level(level),
                    None,
                    None,
                    workers,
                )
                .await?;
            }
        }

        Ok(())
    }
}
