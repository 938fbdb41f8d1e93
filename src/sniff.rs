//! Content type detection.
//!
//! Binary formats are recognized by signature with `infer`, extended with
//! matchers for packet captures and ISO 9660 images. Content no signature
//! recognizes is checked for text, and a few text formats are told apart by
//! their first line.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes read from the start of a file for sniffing.
///
/// Large enough to reach the ISO 9660 volume descriptor at offset 0x8001.
pub const SNIFF_LEN: u64 = 64 * 1024;

const ISO9660_MAGIC_OFFSET: usize = 0x8001;

fn is_pcap(buf: &[u8]) -> bool {
    matches!(
        buf.get(..4),
        Some([0xD4, 0xC3, 0xB2, 0xA1])
            | Some([0xA1, 0xB2, 0xC3, 0xD4])
            | Some([0x4D, 0x3C, 0xB2, 0xA1])
            | Some([0xA1, 0xB2, 0x3C, 0x4D])
    )
}

fn is_pcapng(buf: &[u8]) -> bool {
    buf.starts_with(&[0x0A, 0x0D, 0x0D, 0x0A])
}

fn is_iso9660(buf: &[u8]) -> bool {
    buf.get(ISO9660_MAGIC_OFFSET..ISO9660_MAGIC_OFFSET + 5) == Some(b"CD001".as_slice())
}

/// Detects content types from file bytes.
pub struct ContentSniffer {
    infer: infer::Infer,
}

impl ContentSniffer {
    pub fn new() -> Self {
        let mut infer = infer::Infer::new();
        infer.add("application/vnd.tcpdump.pcap", "pcap", is_pcap);
        infer.add("application/x-pcapng", "pcapng", is_pcapng);
        infer.add("application/x-iso9660-image", "iso", is_iso9660);
        Self { infer }
    }

    /// Reads the head of the file at `path` and sniffs it.
    ///
    /// `Ok(None)` means the file was readable but nothing recognized it.
    pub fn sniff_path(&self, path: &Path) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        File::open(path)?.take(SNIFF_LEN).read_to_end(&mut buf)?;
        Ok(self.sniff_bytes(&buf))
    }

    /// Sniffs an in-memory buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::sniff::ContentSniffer;
    ///
    /// let sniffer = ContentSniffer::new();
    /// assert_eq!(sniffer.sniff_bytes(b"%PDF-1.7\n").as_deref(), Some("application/pdf"));
    /// assert_eq!(sniffer.sniff_bytes(b"hello\n").as_deref(), Some("text/plain"));
    /// assert_eq!(sniffer.sniff_bytes(b""), None);
    /// ```
    pub fn sniff_bytes(&self, buf: &[u8]) -> Option<String> {
        if buf.is_empty() {
            return None;
        }
        if let Some(kind) = self.infer.get(buf) {
            return Some(kind.mime_type().to_string());
        }
        sniff_text(buf).map(str::to_string)
    }
}

impl Default for ContentSniffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a buffer that carries no binary signature.
///
/// Accepts UTF-8, UTF-16 with a byte order mark, and single-byte encodings
/// such as Latin-1. Returns `None` for anything else.
fn sniff_text(buf: &[u8]) -> Option<&'static str> {
    if is_utf16_with_bom(buf) {
        return Some("text/plain");
    }
    if buf.contains(&0) {
        return None;
    }
    let text = match std::str::from_utf8(buf) {
        Ok(text) => Cow::Borrowed(text),
        // the read may have cut a multi-byte character in half
        Err(e) if e.error_len().is_none() => {
            Cow::Borrowed(std::str::from_utf8(&buf[..e.valid_up_to()]).ok()?)
        }
        Err(_) if buf.iter().all(|&b| is_text_byte(b)) => String::from_utf8_lossy(buf),
        Err(_) => return None,
    };

    let first_line = text.lines().next().unwrap_or_default();
    if let Some(interpreter) = first_line.strip_prefix("#!") {
        if interpreter.contains("python") {
            return Some("text/x-python");
        }
        if ["sh", "bash", "zsh", "dash", "ksh"]
            .iter()
            .any(|shell| interpreter.split(['/', ' ']).any(|part| part == *shell))
        {
            return Some("text/x-shellscript");
        }
    }

    let head: String = text.trim_start().chars().take(15).collect();
    let head = head.to_ascii_lowercase();
    if head.starts_with("begin:vcalendar") {
        return Some("text/calendar");
    }
    if head.starts_with("<!doctype html") || head.starts_with("<html") {
        return Some("text/html");
    }

    Some("text/plain")
}

fn is_utf16_with_bom(buf: &[u8]) -> bool {
    buf.len() >= 2
        && buf.len() % 2 == 0
        && (buf.starts_with(&[0xFF, 0xFE]) || buf.starts_with(&[0xFE, 0xFF]))
}

/// Printable ASCII, common control characters, and any high-bit byte.
fn is_text_byte(b: u8) -> bool {
    matches!(b, 0x07..=0x0D | 0x1B | 0x20..=0x7E | 0x80..=0xFF)
}

/// Reads the pixel dimensions of an image file.
pub fn image_dimensions(path: &Path) -> Result<(usize, usize), imagesize::ImageError> {
    imagesize::size(path).map(|size| (size.width, size.height))
}
