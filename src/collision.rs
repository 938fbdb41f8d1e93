//! Reconciles a source file with whatever already occupies its destination.

use crate::file_organizer::{OrganizeError, OrganizeResult};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// What to do when moving `source` onto `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionDecision {
    /// Destination is free: move.
    NoConflict,
    /// Source and destination are the same file: leave it alone.
    AlreadyInPlace,
    /// Same bytes already at the destination: delete the source.
    SourceIsDuplicate,
    /// Source is newer: delete the destination, then move.
    DestinationIsStale,
    /// Source is older or equally old: delete the source, keep the destination.
    SourceIsStale,
}

impl fmt::Display for CollisionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CollisionDecision::NoConflict => "move",
            CollisionDecision::AlreadyInPlace => "already in place",
            CollisionDecision::SourceIsDuplicate => "duplicate, delete source",
            CollisionDecision::DestinationIsStale => "replace older destination",
            CollisionDecision::SourceIsStale => "older than destination, delete source",
        };
        f.write_str(text)
    }
}

/// A resolved move, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub decision: CollisionDecision,
}

impl MovePlan {
    /// Inspects both paths and decides how to reconcile them.
    pub fn resolve(source: &Path, destination: &Path) -> OrganizeResult<Self> {
        let decision = resolve(source, destination).map_err(|e| OrganizeError::CompareFailed {
            source_path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            decision,
        })
    }
}

/// Decides how `source` relates to `destination`.
///
/// Content is compared byte for byte. When it differs, the strictly newer
/// modification time wins and ties favour the destination.
pub fn resolve(source: &Path, destination: &Path) -> io::Result<CollisionDecision> {
    if !destination.try_exists()? {
        return Ok(CollisionDecision::NoConflict);
    }

    if same_file(source, destination)? {
        return Ok(CollisionDecision::AlreadyInPlace);
    }

    if files_identical(source, destination)? {
        return Ok(CollisionDecision::SourceIsDuplicate);
    }

    let source_mtime = fs::metadata(source)?.modified()?;
    let destination_mtime = fs::metadata(destination)?.modified()?;
    if source_mtime > destination_mtime {
        Ok(CollisionDecision::DestinationIsStale)
    } else {
        Ok(CollisionDecision::SourceIsStale)
    }
}

/// Performs the filesystem effects of `plan`.
pub fn apply(plan: &MovePlan) -> OrganizeResult<()> {
    match plan.decision {
        CollisionDecision::NoConflict => move_file(&plan.source, &plan.destination),
        CollisionDecision::AlreadyInPlace => Ok(()),
        CollisionDecision::SourceIsDuplicate | CollisionDecision::SourceIsStale => {
            remove(&plan.source)
        }
        CollisionDecision::DestinationIsStale => {
            remove(&plan.destination)?;
            move_file(&plan.source, &plan.destination)
        }
    }
}

fn remove(path: &Path) -> OrganizeResult<()> {
    fs::remove_file(path).map_err(|e| OrganizeError::DeleteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Moves a file, copying across filesystems when a rename is not possible.
pub fn move_file(source: &Path, destination: &Path) -> OrganizeResult<()> {
    let to_error = |e: io::Error| OrganizeError::FileMoveFailure {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    };

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination).map_err(to_error)?;
            fs::remove_file(source).map_err(to_error)
        }
        Err(e) => Err(to_error(e)),
    }
}

/// True when both paths lead to the same file.
fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

/// Compares two files byte for byte.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    const CHUNK: usize = 64 * 1024;
    let mut reader_a = BufReader::new(File::open(a)?);
    let mut reader_b = BufReader::new(File::open(b)?);
    let mut buf_a = vec![0u8; CHUNK];
    let mut buf_b = vec![0u8; CHUNK];

    loop {
        let read = read_full(&mut reader_a, &mut buf_a)?;
        if read != read_full(&mut reader_b, &mut buf_b)? {
            return Ok(false);
        }
        if read == 0 {
            return Ok(true);
        }
        if buf_a[..read] != buf_b[..read] {
            return Ok(false);
        }
    }
}

/// Fills `buf` as far as the reader allows, returning the byte count.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
