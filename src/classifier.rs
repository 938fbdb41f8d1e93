//! Decides where a file belongs.
//!
//! Classification reads the file but never changes the filesystem: an image
//! that is too small comes back as [`Classification::Discard`] and the caller
//! decides what to do with it.

use crate::file_category::{Category, FileMapper, Folder};
use crate::naming;
use crate::observer::{OrganizeEvent, OrganizeObserver};
use crate::sniff::{self, ContentSniffer};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

/// Minimum width and height an image needs to be kept.
pub const DEFAULT_MIN_IMAGE_SIZE: usize = 100;

/// How files are assigned to folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// By sniffed content type
    #[default]
    Mime,
    /// By lower-cased file extension, with year-month renaming
    Extension,
}

/// A regular file found directly inside the source directory.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// Lower-cased, without the dot, empty when there is none.
    pub extension: String,
    /// The name has an extension separator, even with nothing after it
    /// (`draft.`).
    pub has_extension: bool,
    /// Modification time, or why it could not be read.
    pub modified: Result<SystemTime, String>,
}

impl FileEntry {
    pub fn from_path(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let has_extension = path.extension().is_some();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| e.to_string());

        Self {
            path,
            file_name,
            extension,
            has_extension,
            modified,
        }
    }
}

/// Why an image is deleted instead of moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    UndersizedImage { width: usize, height: usize },
    /// Dimensions could not be read, which counts as failing the size check.
    UnreadableImage { reason: String },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::UndersizedImage { width, height } => write!(f, "{}x{}", width, height),
            DiscardReason::UnreadableImage { reason } => {
                write!(f, "dimensions unreadable: {}", reason)
            }
        }
    }
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Send the file to `folder`, optionally under a new name.
    Destination { folder: Folder, name: Option<String> },
    /// Delete the file instead of moving it.
    Discard(DiscardReason),
}

/// Maps files to destination folders.
pub struct Classifier {
    mapper: FileMapper,
    sniffer: ContentSniffer,
    min_width: usize,
    min_height: usize,
}

impl Classifier {
    pub fn new(mapper: FileMapper, min_width: usize, min_height: usize) -> Self {
        Self {
            mapper,
            sniffer: ContentSniffer::new(),
            min_width,
            min_height,
        }
    }

    /// Classifies `entry` according to `mode`.
    pub fn classify(
        &self,
        entry: &FileEntry,
        mode: SortMode,
        observer: &dyn OrganizeObserver,
    ) -> Classification {
        match mode {
            SortMode::Extension => self.classify_by_extension(entry, observer),
            SortMode::Mime => self.classify_by_content(entry, observer),
        }
    }

    fn classify_by_extension(
        &self,
        entry: &FileEntry,
        observer: &dyn OrganizeObserver,
    ) -> Classification {
        let folder = if entry.extension.is_empty() {
            Folder::Category(Category::NoExtension)
        } else {
            Folder::Extension(entry.extension.clone())
        };
        Classification::Destination {
            folder,
            name: naming::compute_name(entry, SortMode::Extension, true, observer),
        }
    }

    fn classify_by_content(
        &self,
        entry: &FileEntry,
        observer: &dyn OrganizeObserver,
    ) -> Classification {
        let mime = match self.sniffer.sniff_path(&entry.path) {
            Ok(mime) => mime,
            Err(e) => {
                observer.on_event(&OrganizeEvent::SniffFailed {
                    path: &entry.path,
                    reason: e.to_string(),
                });
                None
            }
        };

        let category = self.mapper.categorize(mime.as_deref(), &entry.extension);
        if category == Category::Images
            && let Some(reason) = self.check_image_size(entry)
        {
            return Classification::Discard(reason);
        }

        Classification::Destination {
            folder: Folder::Category(category),
            name: None,
        }
    }

    /// Returns a discard reason when the image is below the minimum size or
    /// its size cannot be read.
    fn check_image_size(&self, entry: &FileEntry) -> Option<DiscardReason> {
        match sniff::image_dimensions(&entry.path) {
            Ok((width, height)) if width < self.min_width || height < self.min_height => {
                Some(DiscardReason::UndersizedImage { width, height })
            }
            Ok(_) => None,
            Err(e) => Some(DiscardReason::UnreadableImage {
                reason: e.to_string(),
            }),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            FileMapper::default(),
            DEFAULT_MIN_IMAGE_SIZE,
            DEFAULT_MIN_IMAGE_SIZE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{RecordingObserver, SilentObserver};
    use std::fs;
    use tempfile::TempDir;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52]);
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[0x08, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        data
    }

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("Failed to write test file");
        FileEntry::from_path(path)
    }

    fn folder_of(classification: Classification) -> String {
        match classification {
            Classification::Destination { folder, .. } => folder.dir_name().to_string(),
            Classification::Discard(reason) => panic!("unexpected discard: {:?}", reason),
        }
    }

    #[test]
    fn test_file_entry_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = write(&temp_dir, "Archive.TAR.GZ", b"x");
        assert_eq!(entry.file_name, "Archive.TAR.GZ");
        assert_eq!(entry.extension, "gz");
        assert!(entry.modified.is_ok());

        let dotfile = write(&temp_dir, ".bashrc", b"x");
        assert_eq!(dotfile.extension, "");
        assert!(!dotfile.has_extension);

        let trailing_dot = write(&temp_dir, "draft.", b"x");
        assert_eq!(trailing_dot.extension, "");
        assert!(trailing_dot.has_extension);
    }

    #[test]
    fn test_extension_mode_uses_raw_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = write(&temp_dir, "NOTES.TXT", b"hello");
        let classifier = Classifier::default();

        match classifier.classify(&entry, SortMode::Extension, &SilentObserver) {
            Classification::Destination { folder, name } => {
                assert_eq!(folder, Folder::Extension("txt".to_string()));
                let name = name.expect("extension mode always names");
                assert!(name.ends_with("-NOTES.TXT"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_extension_mode_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = write(&temp_dir, "README", b"hello");
        let classifier = Classifier::default();

        assert_eq!(
            classifier.classify(&entry, SortMode::Extension, &SilentObserver),
            Classification::Destination {
                folder: Folder::Category(Category::NoExtension),
                name: Some("README".to_string()),
            }
        );
    }

    #[test]
    fn test_extension_mode_trailing_dot() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = write(&temp_dir, "draft.", b"hello");
        let classifier = Classifier::default();

        match classifier.classify(&entry, SortMode::Extension, &SilentObserver) {
            Classification::Destination { folder, name } => {
                assert_eq!(folder, Folder::Category(Category::NoExtension));
                let name = name.expect("extension mode always names");
                assert!(name.ends_with("-draft."), "got {}", name);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mime_mode_pdf() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = write(&temp_dir, "report.bin", b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        let classifier = Classifier::default();
        assert_eq!(
            folder_of(classifier.classify(&entry, SortMode::Mime, &SilentObserver)),
            "PDF"
        );
    }

    #[test]
    fn test_mime_mode_text_and_code() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let classifier = Classifier::default();

        let text = write(&temp_dir, "notes.md", b"# heading\n");
        let script = write(&temp_dir, "run", b"#!/bin/sh\necho hi\n");

        assert_eq!(
            folder_of(classifier.classify(&text, SortMode::Mime, &SilentObserver)),
            "Text"
        );
        assert_eq!(
            folder_of(classifier.classify(&script, SortMode::Mime, &SilentObserver)),
            "Code"
        );
    }

    #[test]
    fn test_mime_mode_unknown_binary_uses_extension_fallback() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let classifier = Classifier::default();
        let junk = [0x00, 0x13, 0x37, 0x00, 0xFE];

        let unknown = write(&temp_dir, "blob.xyz", &junk);
        let conf = write(&temp_dir, "daemon.conf", &junk);

        assert_eq!(
            folder_of(classifier.classify(&unknown, SortMode::Mime, &SilentObserver)),
            "Others"
        );
        assert_eq!(
            folder_of(classifier.classify(&conf, SortMode::Mime, &SilentObserver)),
            "Conf"
        );
    }

    #[test]
    fn test_mime_mode_empty_file_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let classifier = Classifier::default();
        let entry = write(&temp_dir, "capture.pcapng", b"");
        assert_eq!(
            folder_of(classifier.classify(&entry, SortMode::Mime, &SilentObserver)),
            "PCAP"
        );
    }

    #[test]
    fn test_undersized_image_is_discarded_without_deleting() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = write(&temp_dir, "icon.png", &png(50, 50));
        let classifier = Classifier::default();

        assert_eq!(
            classifier.classify(&entry, SortMode::Mime, &SilentObserver),
            Classification::Discard(DiscardReason::UndersizedImage {
                width: 50,
                height: 50
            })
        );
        assert!(entry.path.exists(), "classification must not delete");
    }

    #[test]
    fn test_unreadable_image_is_discarded() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // signature only, no IHDR chunk
        let entry = write(
            &temp_dir,
            "broken.png",
            &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        );
        let classifier = Classifier::default();

        assert!(matches!(
            classifier.classify(&entry, SortMode::Mime, &SilentObserver),
            Classification::Discard(DiscardReason::UnreadableImage { .. })
        ));
        assert!(entry.path.exists(), "classification must not delete");
    }

    #[test]
    fn test_image_needs_both_dimensions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let classifier = Classifier::default();

        let wide = write(&temp_dir, "banner.png", &png(800, 99));
        let exact = write(&temp_dir, "square.png", &png(100, 100));

        assert!(matches!(
            classifier.classify(&wide, SortMode::Mime, &SilentObserver),
            Classification::Discard(_)
        ));
        assert_eq!(
            folder_of(classifier.classify(&exact, SortMode::Mime, &SilentObserver)),
            "Images"
        );
    }

    #[test]
    fn test_custom_minimum_size() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let classifier = Classifier::new(FileMapper::default(), 10, 10);
        let entry = write(&temp_dir, "thumb.png", &png(50, 50));
        assert_eq!(
            folder_of(classifier.classify(&entry, SortMode::Mime, &SilentObserver)),
            "Images"
        );
    }

    #[test]
    fn test_missing_file_reports_sniff_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let entry = FileEntry::from_path(temp_dir.path().join("vanished.txt"));
        let observer = RecordingObserver::default();
        let classifier = Classifier::default();

        assert_eq!(
            folder_of(classifier.classify(&entry, SortMode::Mime, &observer)),
            "Text"
        );
        assert_eq!(observer.events.borrow().as_slice(), ["sniff_failed"]);
    }
}
