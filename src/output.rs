//! Output formatting and styling module.
//!
//! Provides colored console messages, a progress bar that follows the
//! organizer's events, and the end-of-run summary table.

use crate::file_organizer::OrganizeReport;
use crate::observer::{OrganizeEvent, OrganizeObserver};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Console output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesorter::output::OutputFormatter;
    /// OutputFormatter::error("Source directory not found");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` files.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints the run summary: files per folder, then the other outcomes.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesorter::file_organizer::OrganizeReport;
    /// use filesorter::output::OutputFormatter;
    ///
    /// let mut report = OrganizeReport::default();
    /// report.moved.insert("PDF".to_string(), 3);
    /// report.moved.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&report);
    /// ```
    pub fn summary_table(report: &OrganizeReport) {
        Self::header(if report.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let max_folder_len = report
            .moved
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(21); // "Stale sources deleted"

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        // BTreeMap keeps folders sorted
        for (folder, count) in &report.moved {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                file_word(*count),
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total moved".bold(),
            report.total_moved().to_string().green().bold(),
            file_word(report.total_moved()),
            width = max_folder_len
        );

        let extras = [
            ("Already in place", report.already_in_place),
            ("Older files replaced", report.stale_destinations_replaced),
            ("Duplicates deleted", report.duplicates_removed),
            ("Stale sources deleted", report.stale_sources_removed),
            ("Small images deleted", report.images_discarded),
        ];
        for (label, count) in extras.iter().filter(|(_, count)| *count > 0) {
            println!(
                "{:<width$} | {} {}",
                label,
                count.to_string().yellow(),
                file_word(*count),
                width = max_folder_len
            );
        }

        if !report.failed.is_empty() {
            println!(
                "{:<width$} | {} {}",
                "Failed".bold(),
                report.failed.len().to_string().red().bold(),
                file_word(report.failed.len()),
                width = max_folder_len
            );
            for (path, reason) in &report.failed {
                eprintln!("    - {}: {}", path.display(), reason);
            }
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Advances a progress bar as files finish, forwarding every call to `inner`.
pub struct ProgressObserver<O> {
    inner: O,
    bar: ProgressBar,
}

impl<O: OrganizeObserver> ProgressObserver<O> {
    pub fn new(inner: O, visible: bool) -> Self {
        let bar = if visible {
            OutputFormatter::create_progress_bar(0)
        } else {
            ProgressBar::hidden()
        };
        Self { inner, bar }
    }
}

impl<O: OrganizeObserver> OrganizeObserver for ProgressObserver<O> {
    fn on_start(&self, source: &Path, target: &Path, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.inner.on_start(source, target, total_files);
    }

    fn on_directories_ready(&self, target: &Path) {
        self.inner.on_directories_ready(target);
    }

    fn on_event(&self, event: &OrganizeEvent<'_>) {
        self.bar.suspend(|| self.inner.on_event(event));
        if event.is_terminal() {
            self.bar.inc(1);
        }
    }

    fn on_cancelled(&self, remaining: usize) {
        self.bar.abandon_with_message("cancelled");
        self.inner.on_cancelled(remaining);
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
        self.inner.on_finish();
    }
}
