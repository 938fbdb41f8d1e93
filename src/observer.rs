//! Observability handle threaded through the organizer and its collaborators.
//!
//! Every file-level outcome is reported as one [`OrganizeEvent`]. The CLI wires
//! a [`TracingObserver`] (optionally wrapped with a progress bar); tests use a
//! recording observer or [`SilentObserver`].

use crate::classifier::DiscardReason;
use crate::collision::CollisionDecision;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Something that happened while organizing a single file.
#[derive(Debug)]
pub enum OrganizeEvent<'a> {
    /// File was moved to its destination with no conflict.
    Moved { source: &'a Path, destination: &'a Path },
    /// File already sits at its destination and was left untouched.
    AlreadyInPlace { path: &'a Path },
    /// Image failing the size check was deleted instead of being moved.
    ImageDiscarded {
        path: &'a Path,
        reason: &'a DiscardReason,
    },
    /// Source had the same bytes as the existing destination and was deleted.
    DuplicateRemoved { source: &'a Path, destination: &'a Path },
    /// Older destination was deleted and replaced by the source.
    StaleDestinationReplaced { source: &'a Path, destination: &'a Path },
    /// Source was not newer than a differing destination and was deleted.
    StaleSourceRemoved { source: &'a Path, destination: &'a Path },
    /// Dry run: what would happen to the file.
    Planned {
        source: &'a Path,
        destination: &'a Path,
        decision: CollisionDecision,
    },
    /// Dry run: the image would be discarded.
    DiscardPlanned {
        path: &'a Path,
        reason: &'a DiscardReason,
    },
    /// Content sniffing failed, the extension fallback is used instead.
    SniffFailed { path: &'a Path, reason: String },
    /// Modification time unavailable, current time is used for the prefix.
    MtimeUnavailable { path: &'a Path, reason: String },
    /// Processing the file failed, it was left where it was.
    Failed { path: &'a Path, reason: String },
}

impl OrganizeEvent<'_> {
    /// True for events that end the processing of a file.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            OrganizeEvent::SniffFailed { .. } | OrganizeEvent::MtimeUnavailable { .. }
        )
    }
}

/// Receives organizer events.
///
/// All methods default to no-ops.
pub trait OrganizeObserver {
    fn on_start(&self, _source: &Path, _target: &Path, _total_files: usize) {}
    fn on_directories_ready(&self, _target: &Path) {}
    fn on_event(&self, _event: &OrganizeEvent<'_>) {}
    fn on_cancelled(&self, _remaining: usize) {}
    fn on_finish(&self) {}
}

/// No-op observer for silent operation.
pub struct SilentObserver;

impl OrganizeObserver for SilentObserver {}

/// Writes every event as one `tracing` line.
///
/// Destructive but intentional outcomes go out at INFO, failures at ERROR and
/// degraded fallbacks at WARN, so an audit of the log can tell them apart.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl OrganizeObserver for TracingObserver {
    fn on_start(&self, source: &Path, target: &Path, total_files: usize) {
        info!(
            "Organizing {} files from {} into {}",
            total_files,
            source.display(),
            target.display()
        );
    }

    fn on_directories_ready(&self, target: &Path) {
        debug!("Category directories verified in {}", target.display());
    }

    fn on_event(&self, event: &OrganizeEvent<'_>) {
        match event {
            OrganizeEvent::Moved {
                source,
                destination,
            } => info!("Moved {} to {}", source.display(), destination.display()),
            OrganizeEvent::AlreadyInPlace { path } => {
                debug!("Already in place: {}", path.display())
            }
            OrganizeEvent::ImageDiscarded { path, reason } => match reason {
                DiscardReason::UndersizedImage { .. } => {
                    info!("Deleting useless image: {} ({})", path.display(), reason)
                }
                DiscardReason::UnreadableImage { .. } => {
                    info!("Deleting unreadable image: {} ({})", path.display(), reason)
                }
            },
            OrganizeEvent::DuplicateRemoved {
                source,
                destination,
            } => info!(
                "Deleting duplicate file: {} (same content as {})",
                source.display(),
                destination.display()
            ),
            OrganizeEvent::StaleDestinationReplaced {
                source,
                destination,
            } => info!(
                "Replacing older file: {} with newer: {}",
                destination.display(),
                source.display()
            ),
            OrganizeEvent::StaleSourceRemoved {
                source,
                destination,
            } => info!(
                "Deleting older file: {} (kept {})",
                source.display(),
                destination.display()
            ),
            OrganizeEvent::Planned {
                source,
                destination,
                decision,
            } => info!(
                "[DRY RUN] {} -> {} ({})",
                source.display(),
                destination.display(),
                decision
            ),
            OrganizeEvent::DiscardPlanned { path, reason } => info!(
                "[DRY RUN] would delete image: {} ({})",
                path.display(),
                reason
            ),
            OrganizeEvent::SniffFailed { path, reason } => warn!(
                "Failed to detect content type for {}: {}",
                path.display(),
                reason
            ),
            OrganizeEvent::MtimeUnavailable { path, reason } => warn!(
                "Could not get mtime for {}: {}",
                path.display(),
                reason
            ),
            OrganizeEvent::Failed { path, reason } => {
                error!("Error processing {}: {}", path.display(), reason)
            }
        }
    }

    fn on_cancelled(&self, remaining: usize) {
        info!("Cancelled by user, {} files left untouched", remaining);
    }

    fn on_finish(&self) {
        debug!("Organization finished");
    }
}

/// Observer that keeps a copy of every event, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub events: std::cell::RefCell<Vec<String>>,
    pub paths: std::cell::RefCell<Vec<std::path::PathBuf>>,
}

#[cfg(test)]
impl OrganizeObserver for RecordingObserver {
    fn on_event(&self, event: &OrganizeEvent<'_>) {
        let (kind, path) = match event {
            OrganizeEvent::Moved { source, .. } => ("moved", *source),
            OrganizeEvent::AlreadyInPlace { path } => ("in_place", *path),
            OrganizeEvent::ImageDiscarded { path, .. } => ("discarded", *path),
            OrganizeEvent::DuplicateRemoved { source, .. } => ("duplicate", *source),
            OrganizeEvent::StaleDestinationReplaced { source, .. } => ("replaced", *source),
            OrganizeEvent::StaleSourceRemoved { source, .. } => ("stale_source", *source),
            OrganizeEvent::Planned { source, .. } => ("planned", *source),
            OrganizeEvent::DiscardPlanned { path, .. } => ("discard_planned", *path),
            OrganizeEvent::SniffFailed { path, .. } => ("sniff_failed", *path),
            OrganizeEvent::MtimeUnavailable { path, .. } => ("mtime_unavailable", *path),
            OrganizeEvent::Failed { path, .. } => ("failed", *path),
        };
        self.events.borrow_mut().push(kind.to_string());
        self.paths.borrow_mut().push(path.to_path_buf());
    }
}
