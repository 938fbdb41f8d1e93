//! Year-month renaming policy.

use crate::classifier::{FileEntry, SortMode};
use crate::observer::{OrganizeEvent, OrganizeObserver};
use chrono::{DateTime, Local};

/// `strftime` format of the rename prefix.
pub const PREFIX_FORMAT: &str = "%Y-%m";

/// Returns the `YYYY-MM` of the file's modification time in local time.
///
/// Falls back to the current time when the modification time is unknown.
pub fn year_month_prefix(entry: &FileEntry, observer: &dyn OrganizeObserver) -> String {
    let timestamp: DateTime<Local> = match &entry.modified {
        Ok(modified) => (*modified).into(),
        Err(reason) => {
            observer.on_event(&OrganizeEvent::MtimeUnavailable {
                path: &entry.path,
                reason: reason.clone(),
            });
            Local::now()
        }
    };
    timestamp.format(PREFIX_FORMAT).to_string()
}

/// `{YYYY-MM}-{file name}`.
pub fn prefixed_name(entry: &FileEntry, observer: &dyn OrganizeObserver) -> String {
    format!("{}-{}", year_month_prefix(entry, observer), entry.file_name)
}

/// Computes the destination file name, if it differs from "keep the name".
///
/// Extension mode always produces a name: the prefixed one, or the original
/// for files without an extension separator. Content type mode renames only
/// on request.
pub fn compute_name(
    entry: &FileEntry,
    mode: SortMode,
    rename: bool,
    observer: &dyn OrganizeObserver,
) -> Option<String> {
    match mode {
        SortMode::Extension if !entry.has_extension => Some(entry.file_name.clone()),
        SortMode::Extension => Some(prefixed_name(entry, observer)),
        SortMode::Mime if rename => Some(prefixed_name(entry, observer)),
        SortMode::Mime => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{RecordingObserver, SilentObserver};
    use chrono::TimeZone;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn entry(name: &str, modified: Result<SystemTime, String>) -> FileEntry {
        let path = PathBuf::from("/src").join(name);
        let mut entry = FileEntry::from_path(path);
        entry.modified = modified;
        entry
    }

    fn march_2024() -> SystemTime {
        Local
            .with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
            .single()
            .expect("valid local time")
            .into()
    }

    #[test]
    fn test_prefix_from_mtime() {
        let entry = entry("notes.txt", Ok(march_2024()));
        assert_eq!(year_month_prefix(&entry, &SilentObserver), "2024-03");
        assert_eq!(prefixed_name(&entry, &SilentObserver), "2024-03-notes.txt");
    }

    #[test]
    fn test_prefix_falls_back_to_now() {
        let observer = RecordingObserver::default();
        let entry = entry("notes.txt", Err("permission denied".to_string()));

        let prefix = year_month_prefix(&entry, &observer);

        assert_eq!(prefix, Local::now().format(PREFIX_FORMAT).to_string());
        assert_eq!(observer.events.borrow().as_slice(), ["mtime_unavailable"]);
    }

    #[test]
    fn test_extension_mode_always_renames() {
        let entry = entry("Report.PDF", Ok(march_2024()));
        assert_eq!(
            compute_name(&entry, SortMode::Extension, false, &SilentObserver).as_deref(),
            Some("2024-03-Report.PDF")
        );
    }

    #[test]
    fn test_extension_mode_keeps_extensionless_name() {
        let entry = entry("Makefile", Ok(march_2024()));
        assert_eq!(
            compute_name(&entry, SortMode::Extension, true, &SilentObserver).as_deref(),
            Some("Makefile")
        );
    }

    #[test]
    fn test_extension_mode_prefixes_trailing_dot() {
        let entry = entry("draft.", Ok(march_2024()));
        assert_eq!(
            compute_name(&entry, SortMode::Extension, true, &SilentObserver).as_deref(),
            Some("2024-03-draft.")
        );
    }

    #[test]
    fn test_mime_mode_renames_only_on_request() {
        let entry = entry("photo.png", Ok(march_2024()));
        assert_eq!(
            compute_name(&entry, SortMode::Mime, false, &SilentObserver),
            None
        );
        assert_eq!(
            compute_name(&entry, SortMode::Mime, true, &SilentObserver).as_deref(),
            Some("2024-03-photo.png")
        );
    }
}
