//! failset: failure-set selection on rooted trees.

use std::process::ExitCode;

use clap::Parser;
use console::style;

use failset::cli::{self, Cli};
use failset::observability::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(None);
            eprintln!("{} {e}", style("error:").red().bold());
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.logging.filter.as_deref());

    match cli::execute(&cli, config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
