pub mod run;
pub mod schema;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "polyprobe")]
#[command(
    author,
    version,
    about = "Parallel question proposal and consolidation pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all proposers and consolidate their questions
    Run(RunArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Path to config file
    #[arg(short, long, default_value = "polyprobe.yaml")]
    pub config: PathBuf,

    /// Text file the proposers work from
    #[arg(long)]
    pub corpus: PathBuf,

    /// quick, standard or comprehensive (a, b, c)
    #[arg(short, long, default_value = "standard")]
    pub mode: String,

    /// Domain used for relevance scoring
    #[arg(long)]
    pub domain: Option<String>,

    /// Extra context entries as key=value (repeatable)
    #[arg(long, value_name = "KEY=VALUE")]
    pub context: Vec<String>,

    /// Run specific proposers only (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub proposers: Option<Vec<String>>,

    /// Override max parallel proposers
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Override output directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Write intermediate stage dumps to this directory
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Show plan without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Exit 1 if no questions survive (CI mode)
    #[arg(long)]
    pub fail_on_empty: bool,
}
