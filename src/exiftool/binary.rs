use std::collections::{BTreeSet, HashMap};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::{command, process, ExifTool};

/// A binary tag payload read under a caller-supplied size cap.
///
/// `truncated` is set when payload bytes remained in the stream beyond the
/// cap, so a caller that guessed the cap too low can tell the difference
/// between a short payload and a clipped one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryTag {
    pub data: Vec<u8>,
    pub truncated: bool,
}

impl ExifTool {
    /// Read the binary value of one tag for a batch of files.
    ///
    /// The binary stream carries no delimiters or length prefixes, so this
    /// runs in two phases: a textual read of the same tag first, whose
    /// rendering reports each payload's size in bytes, then a `-b` read
    /// whose output is sliced at exactly those sizes. Both phases walk the
    /// same `files` slice, keeping the size list and the byte stream aligned.
    ///
    /// Files whose size could not be discovered in phase A are absent from
    /// the result. A stream fault mid-extraction yields the files completed
    /// so far.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use exif_bridge::exiftool::ExifTool;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let tool = ExifTool::new("/usr/bin/exiftool")?;
    /// let files = vec![PathBuf::from("/photos/a.jpg"), PathBuf::from("/photos/b.jpg")];
    ///
    /// let thumbs = tool.read_binary_tags(&files, "ThumbnailImage");
    /// for (file, bytes) in &thumbs {
    ///     println!("{}: {} bytes", file.display(), bytes.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn read_binary_tags(&self, files: &[PathBuf], tag: &str) -> HashMap<PathBuf, Vec<u8>> {
        if files.is_empty() {
            log::warn!("no input files for binary tag read, returning empty map");
            return HashMap::new();
        }
        if !command::valid_tag_name(tag) {
            log::warn!("invalid binary tag name {tag:?}, returning empty map");
            return HashMap::new();
        }

        // Phase A: the textual rendering of a binary tag reports its size.
        let query = BTreeSet::from([tag.to_string()]);
        let rendered = self.read_tags(files, &query);

        let mut sized: Vec<(PathBuf, usize)> = Vec::new();
        for file in files {
            let Some(values) = rendered.get(file) else {
                continue;
            };
            let Some(rendering) = values.get(tag) else {
                continue;
            };
            match parse_byte_size(rendering) {
                Some(len) => sized.push((file.clone(), len)),
                None => log::warn!(
                    "unparseable {tag} size {rendering:?} for {}, skipping",
                    file.display()
                ),
            }
        }

        if sized.is_empty() {
            log::debug!("no {tag} payload sizes discovered, nothing to extract");
            return HashMap::new();
        }

        // Phase B: slice the headerless byte stream at the discovered sizes.
        let argv = command::binary_read(self.path(), tag, files);
        let (child, stdout) = match process::spawn(&argv) {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("binary tag read failed: {e:#}");
                return HashMap::new();
            }
        };

        let result = slice_payloads(BufReader::new(stdout), &sized);
        process::reap(child);
        result
    }

    /// Size-unaware single-file variant: read one file's binary tag into a
    /// growable buffer bounded by `max_size`, without the textual size pass.
    ///
    /// Weaker than [`read_binary_tags`](Self::read_binary_tags) — the true
    /// payload length is unknown, so the result is however many bytes the
    /// tool produced, clipped at the cap with `truncated` set when payload
    /// remained beyond it.
    pub fn read_binary_tag(&self, file: &Path, tag: &str, max_size: usize) -> BinaryTag {
        let empty = BinaryTag {
            data: Vec::new(),
            truncated: false,
        };
        if !command::valid_tag_name(tag) {
            log::warn!("invalid binary tag name {tag:?}");
            return empty;
        }

        let files = [file.to_path_buf()];
        let argv = command::binary_read(self.path(), tag, &files);
        let (child, stdout) = match process::spawn(&argv) {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("binary tag read failed: {e:#}");
                return empty;
            }
        };

        let (data, truncated) = read_capped(stdout, max_size);
        process::reap(child);
        BinaryTag { data, truncated }
    }
}

/// Pull the numeric byte count out of a textual binary-tag rendering such as
/// `(Binary data 5789 bytes, use -b option to extract)` by stripping every
/// non-digit character.
pub(crate) fn parse_byte_size(rendering: &str) -> Option<usize> {
    let digits: String = rendering.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Consume a headerless concatenated payload stream, assigning exactly the
/// discovered length to each file in order. The cursor never re-reads or
/// skips bytes; a short stream drops the file being read and stops.
pub(crate) fn slice_payloads<R: Read>(
    mut stream: R,
    sized: &[(PathBuf, usize)],
) -> HashMap<PathBuf, Vec<u8>> {
    let mut result = HashMap::new();

    for (file, len) in sized {
        let mut payload = vec![0u8; *len];
        if let Err(e) = stream.read_exact(&mut payload) {
            log::error!(
                "binary stream ended early reading {} bytes for {}: {e}",
                len,
                file.display()
            );
            break;
        }
        result.insert(file.clone(), payload);
    }

    result
}

/// Read up to `cap` bytes into a growable buffer, then probe one byte further
/// to learn whether the payload was clipped.
fn read_capped<R: Read>(stream: R, cap: usize) -> (Vec<u8>, bool) {
    let mut bounded = stream.take(cap as u64);
    let mut data = Vec::new();
    if let Err(e) = bounded.read_to_end(&mut data) {
        log::error!("error reading binary tag stream: {e}");
        return (data, false);
    }

    let mut probe = [0u8; 1];
    let truncated = matches!(bounded.into_inner().read(&mut probe), Ok(n) if n > 0);
    (data, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // ── parse_byte_size ──────────────────────────────────────────────

    #[test]
    fn size_from_plain_rendering() {
        assert_eq!(parse_byte_size("1234 bytes"), Some(1234));
    }

    #[test]
    fn size_from_full_exiftool_rendering() {
        assert_eq!(
            parse_byte_size("(Binary data 5789 bytes, use -b option to extract)"),
            Some(5789)
        );
    }

    #[test]
    fn size_without_digits_is_none() {
        assert_eq!(parse_byte_size("no digits here"), None);
        assert_eq!(parse_byte_size(""), None);
    }

    #[test]
    fn size_overflow_is_none() {
        assert_eq!(parse_byte_size("99999999999999999999999999 bytes"), None);
    }

    // ── slice_payloads ───────────────────────────────────────────────

    fn sized(entries: &[(&str, usize)]) -> Vec<(PathBuf, usize)> {
        entries
            .iter()
            .map(|(f, n)| (PathBuf::from(f), *n))
            .collect()
    }

    #[test]
    fn payloads_sliced_in_order() {
        // 256 bytes of 0xAA for a.jpg followed by 512 bytes of 0xBB for b.jpg
        let mut stream = vec![0xAA; 256];
        stream.extend(vec![0xBB; 512]);

        let result = slice_payloads(
            Cursor::new(stream),
            &sized(&[("/a.jpg", 256), ("/b.jpg", 512)]),
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[&PathBuf::from("/a.jpg")], vec![0xAA; 256]);
        assert_eq!(result[&PathBuf::from("/b.jpg")], vec![0xBB; 512]);
    }

    #[test]
    fn cursor_never_rereads_or_skips() {
        let stream: Vec<u8> = (0u8..=255).collect();
        let result = slice_payloads(
            Cursor::new(stream),
            &sized(&[("/a", 100), ("/b", 56), ("/c", 100)]),
        );

        assert_eq!(result[&PathBuf::from("/a")], (0u8..100).collect::<Vec<_>>());
        assert_eq!(result[&PathBuf::from("/b")], (100u8..156).collect::<Vec<_>>());
        assert_eq!(result[&PathBuf::from("/c")], (156u8..=255).collect::<Vec<_>>());
    }

    #[test]
    fn short_stream_yields_partial_result() {
        let stream = vec![0u8; 300];
        let result = slice_payloads(
            Cursor::new(stream),
            &sized(&[("/a.jpg", 256), ("/b.jpg", 512)]),
        );

        // a.jpg completed, b.jpg dropped at the fault
        assert_eq!(result.len(), 1);
        assert_eq!(result[&PathBuf::from("/a.jpg")].len(), 256);
    }

    #[test]
    fn zero_length_payload_is_empty_buffer() {
        let result = slice_payloads(Cursor::new(vec![1u8, 2, 3]), &sized(&[("/a.jpg", 0)]));
        assert_eq!(result[&PathBuf::from("/a.jpg")], Vec::<u8>::new());
    }

    // ── read_capped ──────────────────────────────────────────────────

    #[test]
    fn capped_read_of_short_payload() {
        let (data, truncated) = read_capped(Cursor::new(vec![7u8; 100]), 1024);
        assert_eq!(data, vec![7u8; 100]);
        assert!(!truncated);
    }

    #[test]
    fn capped_read_exactly_at_cap() {
        let (data, truncated) = read_capped(Cursor::new(vec![7u8; 100]), 100);
        assert_eq!(data.len(), 100);
        assert!(!truncated);
    }

    #[test]
    fn capped_read_flags_truncation() {
        let (data, truncated) = read_capped(Cursor::new(vec![7u8; 200]), 100);
        assert_eq!(data.len(), 100);
        assert!(truncated);
    }
}
