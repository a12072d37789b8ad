use std::collections::{BTreeSet, HashMap};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{command, process, ExifTool};

// With more than one file on the command line, exiftool introduces each
// file's block with this marker followed by the path.
const FILE_HEADER: &str = "========";

impl ExifTool {
    /// Read the requested textual tags for a batch of files in one
    /// subprocess invocation.
    ///
    /// The result maps each file that produced a recognizable output block to
    /// its tag values. Tags present in the output but not in `tags` are
    /// discarded; a file block can yield an empty map. An empty result can
    /// also mean the tool failed to run — the failure is logged, not raised.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use exif_bridge::exiftool::ExifTool;
    /// use std::collections::BTreeSet;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let tool = ExifTool::new("/usr/bin/exiftool")?;
    /// let tags = BTreeSet::from(["Make".to_string(), "Model".to_string()]);
    /// let files = vec![PathBuf::from("/photos/a.jpg"), PathBuf::from("/photos/b.jpg")];
    ///
    /// let result = tool.read_tags(&files, &tags);
    /// for (file, values) in &result {
    ///     println!("{}: {:?}", file.display(), values.get("Model"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn read_tags(
        &self,
        files: &[PathBuf],
        tags: &BTreeSet<String>,
    ) -> HashMap<PathBuf, HashMap<String, String>> {
        if files.is_empty() {
            log::warn!("no input files for tag read, returning empty map");
            return HashMap::new();
        }

        let tags = retain_valid_tags(tags);

        let argv = command::batch_read(self.path(), &tags, files);
        let (child, stdout) = match process::spawn(&argv) {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("tag read failed: {e:#}");
                return HashMap::new();
            }
        };

        let result = parse_tag_blocks(BufReader::new(stdout), files, &tags);
        process::reap(child);
        result
    }

    /// Single-file convenience: read tags for one file and return its inner
    /// tag map directly (empty if the tool produced nothing for it).
    pub fn read_tags_from_file(
        &self,
        file: &Path,
        tags: &BTreeSet<String>,
    ) -> HashMap<String, String> {
        let files = [file.to_path_buf()];
        self.read_tags(&files, tags).remove(file).unwrap_or_default()
    }
}

/// Drop tag names that cannot safely cross the argv boundary.
pub(crate) fn retain_valid_tags(tags: &BTreeSet<String>) -> BTreeSet<String> {
    let mut valid = BTreeSet::new();
    for tag in tags {
        if command::valid_tag_name(tag) {
            valid.insert(tag.clone());
        } else {
            log::warn!("skipping invalid tag name {tag:?}");
        }
    }
    valid
}

/// Fold the line-oriented batch output into a per-file tag map.
///
/// Block headers switch the current file; `name: value` lines are recorded
/// into the current file's map when the name is in the query, with later
/// occurrences of the same tag overwriting earlier ones. When exactly one
/// file was queried the tool emits no header, so that file is pre-seeded as
/// the current block.
pub(crate) fn parse_tag_blocks<R: BufRead>(
    reader: R,
    files: &[PathBuf],
    tags: &BTreeSet<String>,
) -> HashMap<PathBuf, HashMap<String, String>> {
    let mut result: HashMap<PathBuf, HashMap<String, String>> = HashMap::new();
    let mut current: Option<PathBuf> = None;

    if let [only] = files {
        result.insert(only.clone(), HashMap::new());
        current = Some(only.clone());
    }

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                // Partial result: keep whatever was parsed before the fault.
                log::error!("error reading exiftool output: {e}");
                break;
            }
        };

        if let Some(rest) = line.strip_prefix(FILE_HEADER) {
            let file = PathBuf::from(rest.trim());
            result.insert(file.clone(), HashMap::new());
            current = Some(file);
        } else if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if !tags.contains(name) {
                continue;
            }
            if let Some(file) = &current {
                if let Some(values) = result.get_mut(file) {
                    values.insert(name.to_string(), value.trim().to_string());
                }
            }
        }
    }

    result
}
