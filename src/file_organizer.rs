/// Moves the files of a source directory into category folders of a target.
///
/// The organizer walks the direct children of the source directory, asks the
/// classifier where each one belongs, names it, reconciles it with whatever
/// already sits at the destination and applies the result. A failure on one
/// file is recorded and the run continues with the next.
use crate::classifier::{Classification, Classifier, DiscardReason, FileEntry, SortMode};
use crate::collision::{self, CollisionDecision, MovePlan};
use crate::file_category::{Category, Folder};
use crate::naming;
use crate::observer::{OrganizeEvent, OrganizeObserver};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors that can occur while organizing.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source directory is missing or not a directory.
    #[error("Source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// A destination folder could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The source directory could not be listed.
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Comparing a file with an occupied destination failed.
    #[error("Error comparing {} with {}: {source}", source_path.display(), destination.display())]
    CompareFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: std::io::Error,
    },

    /// A file could not be deleted.
    #[error("Failed to delete {}: {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file could not be moved to its destination.
    #[error("Error moving {} to {}: {source}", source_path.display(), destination.display())]
    FileMoveFailure {
        source_path: PathBuf,
        destination: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Parameters of one organization run.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub source: PathBuf,
    pub target: PathBuf,
    pub mode: SortMode,
    /// Prefix names with `YYYY-MM-`. Implied by extension mode.
    pub rename: bool,
    /// Plan everything, touch nothing.
    pub dry_run: bool,
}

impl OrganizeOptions {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>, mode: SortMode) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            mode,
            rename: false,
            dry_run: false,
        }
    }

    /// Extension mode always renames, whatever the caller asked for.
    pub fn effective_rename(&self) -> bool {
        self.rename || self.mode == SortMode::Extension
    }
}

/// What a run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrganizeReport {
    /// Files moved (or, in a dry run, planned to move) per destination folder.
    pub moved: BTreeMap<String, usize>,
    /// Files already at their destination, left untouched.
    pub already_in_place: usize,
    pub duplicates_removed: usize,
    pub stale_destinations_replaced: usize,
    pub stale_sources_removed: usize,
    pub images_discarded: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub cancelled: bool,
    pub dry_run: bool,
}

impl OrganizeReport {
    /// Number of files that ended up at a destination.
    pub fn total_moved(&self) -> usize {
        self.moved.values().sum()
    }

    /// Number of files the run dealt with, including failures.
    pub fn total_processed(&self) -> usize {
        self.total_moved()
            + self.already_in_place
            + self.duplicates_removed
            + self.stale_sources_removed
            + self.images_discarded
            + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    fn record_move(&mut self, folder: &Folder) {
        *self.moved.entry(folder.dir_name().to_string()).or_insert(0) += 1;
    }
}

/// Organizes a directory, one file at a time.
pub struct Organizer<'a> {
    classifier: Classifier,
    observer: &'a dyn OrganizeObserver,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Organizer<'a> {
    pub fn new(classifier: Classifier, observer: &'a dyn OrganizeObserver) -> Self {
        Self {
            classifier,
            observer,
            cancel: None,
        }
    }

    /// Stops the run before the next file once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Organizes the direct children of `options.source`.
    ///
    /// # Errors
    ///
    /// Fails only when the run cannot start: the source directory is missing,
    /// it cannot be listed, or a category folder cannot be created. Failures
    /// on individual files are recorded in the report.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filesorter::classifier::{Classifier, SortMode};
    /// use filesorter::file_organizer::{OrganizeOptions, Organizer};
    /// use filesorter::observer::TracingObserver;
    ///
    /// let observer = TracingObserver;
    /// let organizer = Organizer::new(Classifier::default(), &observer);
    /// let options = OrganizeOptions::new("/home/me/Downloads", "/home/me/Documents", SortMode::Mime);
    /// match organizer.organize(&options) {
    ///     Ok(report) => println!("Moved {} files", report.total_moved()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn organize(&self, options: &OrganizeOptions) -> OrganizeResult<OrganizeReport> {
        if !options.source.is_dir() {
            return Err(OrganizeError::SourceNotFound {
                path: options.source.clone(),
            });
        }

        let (entries, unreadable) = list_files(&options.source)?;
        self.observer.on_start(
            &options.source,
            &options.target,
            entries.len() + unreadable.len(),
        );

        if !options.dry_run {
            create_category_dirs(&options.target)?;
            self.observer.on_directories_ready(&options.target);
        }

        let mut report = OrganizeReport {
            dry_run: options.dry_run,
            ..OrganizeReport::default()
        };

        for (path, e) in unreadable {
            let reason = format!("unreadable directory entry: {}", e);
            self.observer.on_event(&OrganizeEvent::Failed {
                path: &path,
                reason: reason.clone(),
            });
            report.failed.push((path, reason));
        }

        for (index, path) in entries.iter().enumerate() {
            if self.is_cancelled() {
                report.cancelled = true;
                self.observer.on_cancelled(entries.len() - index);
                break;
            }

            let entry = FileEntry::from_path(path.clone());
            if let Err(e) = self.process_file(&entry, options, &mut report) {
                self.observer.on_event(&OrganizeEvent::Failed {
                    path: &entry.path,
                    reason: e.to_string(),
                });
                report.failed.push((entry.path.clone(), e.to_string()));
            }
        }

        self.observer.on_finish();
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn process_file(
        &self,
        entry: &FileEntry,
        options: &OrganizeOptions,
        report: &mut OrganizeReport,
    ) -> OrganizeResult<()> {
        let (folder, name) = match self.classifier.classify(entry, options.mode, self.observer) {
            Classification::Destination { folder, name } => (folder, name),
            Classification::Discard(reason) => {
                return self.discard(entry, reason, options.dry_run, report);
            }
        };

        let name = match name {
            Some(name) => name,
            None => naming::compute_name(
                entry,
                options.mode,
                options.effective_rename(),
                self.observer,
            )
            .unwrap_or_else(|| entry.file_name.clone()),
        };

        let folder_path = options.target.join(folder.dir_name());
        let destination = folder_path.join(&name);
        let plan = MovePlan::resolve(&entry.path, &destination)?;

        if options.dry_run {
            self.observer.on_event(&OrganizeEvent::Planned {
                source: &plan.source,
                destination: &plan.destination,
                decision: plan.decision,
            });
            tally(report, &folder, plan.decision);
            return Ok(());
        }

        if matches!(folder, Folder::Extension(_)) {
            fs::create_dir_all(&folder_path).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: folder_path.clone(),
                    source: e,
                }
            })?;
        }

        collision::apply(&plan)?;
        self.observer.on_event(&outcome_event(&plan));
        tally(report, &folder, plan.decision);
        Ok(())
    }

    fn discard(
        &self,
        entry: &FileEntry,
        reason: DiscardReason,
        dry_run: bool,
        report: &mut OrganizeReport,
    ) -> OrganizeResult<()> {
        if dry_run {
            self.observer.on_event(&OrganizeEvent::DiscardPlanned {
                path: &entry.path,
                reason: &reason,
            });
        } else {
            fs::remove_file(&entry.path).map_err(|e| OrganizeError::DeleteFailed {
                path: entry.path.clone(),
                source: e,
            })?;
            self.observer.on_event(&OrganizeEvent::ImageDiscarded {
                path: &entry.path,
                reason: &reason,
            });
        }
        report.images_discarded += 1;
        Ok(())
    }
}

fn outcome_event(plan: &MovePlan) -> OrganizeEvent<'_> {
    let source = plan.source.as_path();
    let destination = plan.destination.as_path();
    match plan.decision {
        CollisionDecision::NoConflict => OrganizeEvent::Moved {
            source,
            destination,
        },
        CollisionDecision::AlreadyInPlace => OrganizeEvent::AlreadyInPlace { path: source },
        CollisionDecision::SourceIsDuplicate => OrganizeEvent::DuplicateRemoved {
            source,
            destination,
        },
        CollisionDecision::DestinationIsStale => OrganizeEvent::StaleDestinationReplaced {
            source,
            destination,
        },
        CollisionDecision::SourceIsStale => OrganizeEvent::StaleSourceRemoved {
            source,
            destination,
        },
    }
}

fn tally(report: &mut OrganizeReport, folder: &Folder, decision: CollisionDecision) {
    match decision {
        CollisionDecision::NoConflict => report.record_move(folder),
        CollisionDecision::AlreadyInPlace => report.already_in_place += 1,
        CollisionDecision::DestinationIsStale => {
            report.stale_destinations_replaced += 1;
            report.record_move(folder);
        }
        CollisionDecision::SourceIsDuplicate => report.duplicates_removed += 1,
        CollisionDecision::SourceIsStale => report.stale_sources_removed += 1,
    }
}

/// Regular files directly inside `dir`, sorted by name, plus the entries
/// that could not be read.
fn list_files(dir: &Path) -> OrganizeResult<(Vec<PathBuf>, Vec<(PathBuf, io::Error)>)> {
    let entries = fs::read_dir(dir).map_err(|e| OrganizeError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    Ok(split_listing(
        dir,
        entries.map(|entry| entry.map(|entry| entry.path())),
    ))
}

fn split_listing(
    dir: &Path,
    entries: impl Iterator<Item = io::Result<PathBuf>>,
) -> (Vec<PathBuf>, Vec<(PathBuf, io::Error)>) {
    let mut files = Vec::new();
    let mut unreadable = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => unreadable.push((dir.to_path_buf(), e)),
        }
    }
    files.sort();
    (files, unreadable)
}

/// Creates every category folder under `target`.
pub fn create_category_dirs(target: &Path) -> OrganizeResult<()> {
    for category in Category::ALL {
        let path = target.join(category.dir_name());
        fs::create_dir_all(&path)
            .map_err(|e| OrganizeError::DirectoryCreationFailed { path, source: e })?;
    }
    Ok(())
}
