use anyhow::Context;
use clap::Parser;
use filesorter::cli::{Cli, run_cli};
use filesorter::logging;
use filesorter::output::OutputFormatter;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {:#}", e);
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = cli.settings().context("Error loading configuration")?;

    let _guard = logging::init_logger(&settings.logging, cli.verbose).with_context(|| {
        format!(
            "Failed to set up logging to {}",
            settings.logging.file.display()
        )
    })?;

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let report = run_cli(cli, &settings, cancel)?;
    if report.cancelled {
        info!("Cancelled by user");
    }
    Ok(())
}
