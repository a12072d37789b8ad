use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use super::{command, process, ExifTool};

impl ExifTool {
    /// Assign tag values directly to a batch of files. The files are mutated
    /// in place on disk by the external tool.
    ///
    /// Returns the tool's raw stdout as a diagnostic string. No success or
    /// failure is inferred from it — the write is best-effort and the caller
    /// decides what the diagnostics mean.
    ///
    /// Values are passed verbatim inside their own argv element; no shell is
    /// involved, but values originating from untrusted input should be
    /// screened by the caller for characters exiftool itself interprets.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use exif_bridge::exiftool::ExifTool;
    /// use std::collections::BTreeMap;
    /// use std::path::PathBuf;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let tool = ExifTool::new("/usr/bin/exiftool")?;
    /// let assignments = BTreeMap::from([("Artist".to_string(), "Wyatt".to_string())]);
    ///
    /// let diagnostics = tool.write_tags(&[PathBuf::from("/photos/a.jpg")], &assignments);
    /// print!("{diagnostics}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_tags(&self, files: &[PathBuf], assignments: &BTreeMap<String, String>) -> String {
        if files.is_empty() {
            log::warn!("no input files for tag write");
            return String::new();
        }

        let assignments = retain_valid_assignments(assignments);
        if assignments.is_empty() {
            log::warn!("no valid tag assignments for write");
            return String::new();
        }

        self.run_write(command::batch_write(self.path(), &assignments, files))
    }

    /// Assign tag values sourced from files on disk (`-Tag<=path`) — the way
    /// to write binary payloads such as thumbnails. No check is made that the
    /// source files hold sensible values for their tags; writing the wrong
    /// datafile to the wrong image loses data.
    pub fn write_tags_from_datafiles(
        &self,
        files: &[PathBuf],
        sources: &BTreeMap<String, PathBuf>,
    ) -> String {
        if files.is_empty() {
            log::warn!("no input files for datafile tag write");
            return String::new();
        }

        let mut valid = BTreeMap::new();
        for (tag, source) in sources {
            if command::valid_tag_name(tag) {
                valid.insert(tag.clone(), source.clone());
            } else {
                log::warn!("skipping invalid tag name {tag:?}");
            }
        }
        if valid.is_empty() {
            log::warn!("no valid tag assignments for datafile write");
            return String::new();
        }

        self.run_write(command::datafile_write(self.path(), &valid, files))
    }

    fn run_write(&self, argv: Vec<OsString>) -> String {
        let (child, stdout) = match process::spawn(&argv) {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("tag write failed: {e:#}");
                return String::new();
            }
        };

        let mut diagnostics = String::new();
        for line in BufReader::new(stdout).lines() {
            match line {
                Ok(line) => {
                    diagnostics.push_str(&line);
                    diagnostics.push('\n');
                }
                Err(e) => {
                    log::error!("error reading exiftool write output: {e}");
                    break;
                }
            }
        }

        process::reap(child);
        diagnostics
    }
}

fn retain_valid_assignments(assignments: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut valid = BTreeMap::new();
    for (tag, value) in assignments {
        if command::valid_tag_name(tag) {
            valid.insert(tag.clone(), value.clone());
        } else {
            log::warn!("skipping invalid tag name {tag:?}");
        }
    }
    valid
}
