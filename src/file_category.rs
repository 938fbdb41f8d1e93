//! File categorization tables for sorting files by content type or extension.
//!
//! The set of categories is closed. Content types are matched by prefix against
//! an ordered table where the first match wins, so adding a category means adding
//! rows, not branches.
//!
//! # Examples
//!
//! ```
//! use filesorter::file_category::{Category, FileMapper};
//!
//! let mapper = FileMapper::default();
//! assert_eq!(mapper.mime_to_category("image/png"), Some(Category::Images));
//! assert_eq!(mapper.mime_to_category("audio/mpeg"), Some(Category::Music));
//! assert_eq!(mapper.mime_to_category("text/plain"), Some(Category::Text));
//! ```

use std::fmt;

/// Represents a destination category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Raster and vector images
    Images,
    /// Video containers
    Videos,
    /// Audio files
    Music,
    /// Archives and compressed streams
    Compressed,
    /// PDF documents
    Pdf,
    /// Legacy and OOXML Word documents
    Word,
    /// Legacy and OOXML spreadsheets
    Excel,
    /// Legacy and OOXML slide decks
    Presentations,
    /// ISO 9660 and Apple disk images
    DiskImages,
    /// Packet captures
    Pcap,
    /// Scripts, markup and source code
    Code,
    /// Plain text and markdown
    Text,
    /// E-books
    Ebooks,
    /// Windows executables
    Executables,
    /// iCalendar files
    Calendar,
    /// Configuration files
    Conf,
    /// Files no rule recognized
    Others,
    /// Files without an extension (extension mode only)
    NoExtension,
}

impl Category {
    /// Every category, in the order their folders are created.
    pub const ALL: [Category; 18] = [
        Category::Images,
        Category::Videos,
        Category::Music,
        Category::Compressed,
        Category::Pdf,
        Category::Word,
        Category::Excel,
        Category::Presentations,
        Category::DiskImages,
        Category::Pcap,
        Category::Others,
        Category::Code,
        Category::Text,
        Category::Ebooks,
        Category::Executables,
        Category::Calendar,
        Category::Conf,
        Category::NoExtension,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::DiskImages.dir_name(), "Disk_Images");
    /// assert_eq!(Category::NoExtension.dir_name(), "No_Extension");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Videos => "Videos",
            Category::Music => "Music",
            Category::Compressed => "Compressed",
            Category::Pdf => "PDF",
            Category::Word => "Word",
            Category::Excel => "Excel",
            Category::Presentations => "Presentations",
            Category::DiskImages => "Disk_Images",
            Category::Pcap => "PCAP",
            Category::Code => "Code",
            Category::Text => "Text",
            Category::Ebooks => "Ebooks",
            Category::Executables => "Executables",
            Category::Calendar => "Calendar",
            Category::Conf => "Conf",
            Category::Others => "Others",
            Category::NoExtension => "No_Extension",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// The subfolder of the target directory a file is sent to.
///
/// Extension mode names folders after the raw extension, so they are not part
/// of the closed category set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Folder {
    Category(Category),
    Extension(String),
}

impl Folder {
    pub fn dir_name(&self) -> &str {
        match self {
            Folder::Category(category) => category.dir_name(),
            Folder::Extension(ext) => ext,
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl From<Category> for Folder {
    fn from(category: Category) -> Self {
        Folder::Category(category)
    }
}

/// Content type prefixes, evaluated top to bottom.
const MIME_RULES: &[(&str, Category)] = &[
    ("image/", Category::Images),
    ("video/", Category::Videos),
    ("audio/", Category::Music),
    ("application/zip", Category::Compressed),
    ("application/x-tar", Category::Compressed),
    ("application/gzip", Category::Compressed),
    ("application/x-gzip", Category::Compressed),
    ("application/x-bzip2", Category::Compressed),
    ("application/x-7z-compressed", Category::Compressed),
    ("application/vnd.rar", Category::Compressed),
    ("application/x-rar-compressed", Category::Compressed),
    ("application/pdf", Category::Pdf),
    ("application/msword", Category::Word),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Category::Word,
    ),
    ("application/vnd.ms-excel", Category::Excel),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Category::Excel,
    ),
    ("application/vnd.ms-powerpoint", Category::Presentations),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        Category::Presentations,
    ),
    ("application/x-iso9660-image", Category::DiskImages),
    ("application/x-apple-diskimage", Category::DiskImages),
    ("application/vnd.tcpdump.pcap", Category::Pcap),
    ("application/x-pcapng", Category::Pcap),
    ("text/x-python", Category::Code),
    ("application/javascript", Category::Code),
    ("text/html", Category::Code),
    ("text/css", Category::Code),
    ("text/x-shellscript", Category::Code),
    ("application/x-sh", Category::Code),
    ("text/plain", Category::Text),
    ("text/markdown", Category::Text),
    ("application/epub+zip", Category::Ebooks),
    ("application/x-msdownload", Category::Executables),
    (
        "application/vnd.microsoft.portable-executable",
        Category::Executables,
    ),
    ("text/calendar", Category::Calendar),
];

/// Extensions consulted only when no content type rule matched.
const EXTENSION_FALLBACK: &[(&str, Category)] = &[
    ("pcap", Category::Pcap),
    ("pcapng", Category::Pcap),
    ("txt", Category::Text),
    ("conf", Category::Conf),
];

/// Maps content types and file extensions to categories using the ordered
/// built-in tables.
#[derive(Debug, Clone)]
pub struct FileMapper {
    mime_rules: &'static [(&'static str, Category)],
    extension_rules: &'static [(&'static str, Category)],
}

impl FileMapper {
    /// Creates a new `FileMapper` with the standard tables.
    pub fn new() -> Self {
        Self {
            mime_rules: MIME_RULES,
            extension_rules: EXTENSION_FALLBACK,
        }
    }

    /// Maps a content type to a category, first matching prefix wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.mime_to_category("application/pdf"), Some(Category::Pdf));
    /// assert_eq!(mapper.mime_to_category("unknown/type"), None);
    /// ```
    pub fn mime_to_category(&self, mime_type: &str) -> Option<Category> {
        let mime = mime_type.to_lowercase();
        self.mime_rules
            .iter()
            .find(|(prefix, _)| mime.starts_with(prefix))
            .map(|(_, category)| *category)
    }

    /// Maps a file extension to a fallback category.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.extension_to_category("PCAPNG"), Some(Category::Pcap));
    /// assert_eq!(mapper.extension_to_category("jpg"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.extension_rules
            .iter()
            .find(|(known, _)| *known == ext.as_str())
            .map(|(_, category)| *category)
    }

    /// Determines the category from an optional content type and the extension.
    ///
    /// 1. Try the content type table
    /// 2. Fall back to the extension table
    /// 3. Return `Category::Others` if neither matches
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::file_category::{Category, FileMapper};
    ///
    /// let mapper = FileMapper::default();
    /// assert_eq!(mapper.categorize(Some("video/mp4"), "txt"), Category::Videos);
    /// assert_eq!(mapper.categorize(None, "conf"), Category::Conf);
    /// assert_eq!(mapper.categorize(None, "xyz"), Category::Others);
    /// ```
    pub fn categorize(&self, mime_type: Option<&str>, ext: &str) -> Category {
        if let Some(mime) = mime_type
            && let Some(category) = self.mime_to_category(mime)
        {
            return category;
        }

        self.extension_to_category(ext)
            .unwrap_or(Category::Others)
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Pdf.dir_name(), "PDF");
        assert_eq!(Category::Pcap.dir_name(), "PCAP");
        assert_eq!(Category::Presentations.dir_name(), "Presentations");
        assert_eq!(Category::Others.dir_name(), "Others");
    }

    #[test]
    fn test_all_categories_have_distinct_folders() {
        let names: HashSet<_> = Category::ALL.iter().map(|c| c.dir_name()).collect();
        assert_eq!(names.len(), Category::ALL.len());
    }

    #[test]
    fn test_mime_prefix_matching() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.mime_to_category("image/webp"), Some(Category::Images));
        assert_eq!(
            mapper.mime_to_category("video/x-matroska"),
            Some(Category::Videos)
        );
        assert_eq!(mapper.mime_to_category("audio/x-flac"), Some(Category::Music));
    }

    #[test]
    fn test_mime_office_documents() {
        let mapper = FileMapper::default();
        assert_eq!(
            mapper.mime_to_category(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(Category::Word)
        );
        assert_eq!(
            mapper.mime_to_category("application/vnd.ms-excel"),
            Some(Category::Excel)
        );
        assert_eq!(
            mapper.mime_to_category("application/vnd.ms-powerpoint"),
            Some(Category::Presentations)
        );
    }

    #[test]
    fn test_mime_archives_and_misc() {
        let mapper = FileMapper::default();
        assert_eq!(
            mapper.mime_to_category("application/gzip"),
            Some(Category::Compressed)
        );
        assert_eq!(
            mapper.mime_to_category("application/vnd.rar"),
            Some(Category::Compressed)
        );
        assert_eq!(
            mapper.mime_to_category("application/epub+zip"),
            Some(Category::Ebooks)
        );
        assert_eq!(
            mapper.mime_to_category("application/vnd.tcpdump.pcap"),
            Some(Category::Pcap)
        );
        assert_eq!(
            mapper.mime_to_category("text/calendar"),
            Some(Category::Calendar)
        );
        assert_eq!(
            mapper.mime_to_category("application/vnd.microsoft.portable-executable"),
            Some(Category::Executables)
        );
    }

    #[test]
    fn test_mime_with_parameters_still_matches() {
        let mapper = FileMapper::default();
        assert_eq!(
            mapper.mime_to_category("text/plain; charset=utf-8"),
            Some(Category::Text)
        );
    }

    #[test]
    fn test_mime_case_insensitive() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.mime_to_category("IMAGE/PNG"), Some(Category::Images));
    }

    #[test]
    fn test_mime_unknown() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.mime_to_category("application/octet-stream"), None);
        assert_eq!(mapper.mime_to_category("font/woff2"), None);
    }

    #[test]
    fn test_extension_fallback_table() {
        let mapper = FileMapper::default();
        assert_eq!(mapper.extension_to_category("pcap"), Some(Category::Pcap));
        assert_eq!(mapper.extension_to_category(".TXT"), Some(Category::Text));
        assert_eq!(mapper.extension_to_category("conf"), Some(Category::Conf));
        assert_eq!(mapper.extension_to_category("pdf"), None);
    }

    #[test]
    fn test_categorize_prefers_content_type() {
        let mapper = FileMapper::default();
        assert_eq!(
            mapper.categorize(Some("text/plain"), "conf"),
            Category::Text
        );
        assert_eq!(
            mapper.categorize(Some("application/octet-stream"), "pcap"),
            Category::Pcap
        );
        assert_eq!(mapper.categorize(None, ""), Category::Others);
    }

    #[test]
    fn test_categorize_is_order_independent() {
        let mapper = FileMapper::default();
        let inputs = [
            (Some("image/gif"), "gif"),
            (None, "txt"),
            (Some("application/pdf"), "pdf"),
        ];
        let forward: Vec<_> = inputs
            .iter()
            .map(|(m, e)| mapper.categorize(*m, e))
            .collect();
        let mut backward: Vec<_> = inputs
            .iter()
            .rev()
            .map(|(m, e)| mapper.categorize(*m, e))
            .collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_folder_names() {
        assert_eq!(Folder::from(Category::Pdf).dir_name(), "PDF");
        assert_eq!(Folder::Extension("txt".to_string()).dir_name(), "txt");
    }
}
