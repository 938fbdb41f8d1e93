//! Command-line interface module for filesorter.
//!
//! This module handles:
//! - Argument parsing
//! - Merging flags over the settings file
//! - Running the organizer with console progress and a summary

use crate::classifier::{Classifier, SortMode};
use crate::config::{ConfigError, Settings};
use crate::file_category::FileMapper;
use crate::file_organizer::{OrganizeOptions, OrganizeReport, OrganizeResult, Organizer};
use crate::observer::TracingObserver;
use crate::output::{OutputFormatter, ProgressObserver};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Organize files by content type or extension.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "filesorter", version, about, long_about = None)]
pub struct Cli {
    /// Source directory to organize [default: ~/Downloads]
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Target directory for categorized subfolders [default: ~/Documents]
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Sorting mode [default: mime]
    #[arg(long, value_enum)]
    pub mode: Option<SortMode>,

    /// Rename files with a YYYY-MM- prefix (always on in extension mode)
    #[arg(long)]
    pub rename: bool,

    /// Show what would happen without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log file path [default: file_sorter.log]
    #[arg(long)]
    pub logfile: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Loads the settings file and applies the flags on top of it.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let settings = Settings::load(self.config.as_deref())?;
        Ok(self.apply_to(settings))
    }

    fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(source) = &self.source {
            settings.source = source.clone();
        }
        if let Some(target) = &self.target {
            settings.target = target.clone();
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(logfile) = &self.logfile {
            settings.logging.file = logfile.clone();
        }
        settings.rename |= self.rename;
        settings
    }

    /// Organizer options for this invocation.
    pub fn options(&self, settings: &Settings) -> OrganizeOptions {
        OrganizeOptions {
            source: settings.source.clone(),
            target: settings.target.clone(),
            mode: settings.mode,
            rename: settings.rename,
            dry_run: self.dry_run,
        }
    }
}

/// Runs one organization with console progress, then prints the summary.
///
/// Returns an error only for run-level failures; failures on single files
/// are listed in the summary.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use filesorter::cli::{Cli, run_cli};
/// use std::sync::Arc;
/// use std::sync::atomic::AtomicBool;
///
/// let cli = Cli::parse_from(["filesorter", "--source", "/tmp/in", "--target", "/tmp/out"]);
/// let settings = cli.settings().expect("settings");
/// match run_cli(&cli, &settings, Arc::new(AtomicBool::new(false))) {
///     Ok(report) => println!("Moved {} files", report.total_moved()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(
    cli: &Cli,
    settings: &Settings,
    cancel: Arc<AtomicBool>,
) -> OrganizeResult<OrganizeReport> {
    let options = cli.options(settings);
    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing {} (no files will be changed)",
            options.source.display()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing {} into {}",
            options.source.display(),
            options.target.display()
        ));
    }

    let observer = ProgressObserver::new(TracingObserver, !cli.verbose);
    let classifier = Classifier::new(
        FileMapper::default(),
        settings.images.min_width,
        settings.images.min_height,
    );
    let organizer = Organizer::new(classifier, &observer).with_cancel_flag(cancel);
    let report = organizer.organize(&options)?;

    OutputFormatter::summary_table(&report);
    if report.cancelled {
        OutputFormatter::warning("Cancelled by user. Files already moved stay where they are.");
    } else if !report.failed.is_empty() {
        OutputFormatter::warning("Some files could not be organized. See the log for details.");
    } else if report.dry_run {
        OutputFormatter::dry_run_notice("Complete. Run without --dry-run to apply.");
    } else {
        OutputFormatter::success("Organization complete!");
    }

    Ok(report)
}
