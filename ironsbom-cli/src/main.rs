//! ironsbom CLI -- catalog discovered packages and project them into SBOM artifacts.

mod cli;
mod commands;
mod error;
mod input;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use ironsbom_core::config::{GeneralConfig, IronsbomConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 로깅 설정만 먼저 읽음 (설정 오류는 각 명령이 보고)
    let general = IronsbomConfig::load_or_default(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }
    ironsbom_core::metrics::describe_all();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Project(args) => commands::project::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
