//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

/// ironsbom -- project discovered packages into deterministic SBOM artifacts.
///
/// Use `ironsbom <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "ironsbom", version, about, long_about = None)]
pub struct Cli {
    /// Path to the ironsbom.toml configuration file (defaults apply when missing).
    #[arg(short, long, default_value = "ironsbom.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Catalog discovery results and project them against a source.
    Project(ProjectArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- project ----

/// Catalog discovery results and project them into artifacts.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["dir", "image"])))]
pub struct ProjectArgs {
    /// JSON file with discovery results (array of package records).
    #[arg(long)]
    pub packages: PathBuf,

    /// Scan a filesystem directory (symlinks are indexed, not followed).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// JSON image layout describing layers and their entries.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Project each package individually and report failures instead of aborting.
    #[arg(long)]
    pub partial: bool,
}

// ---- config ----

/// Manage ironsbom configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, catalog).
        #[arg(long)]
        section: Option<String>,
    },
}
