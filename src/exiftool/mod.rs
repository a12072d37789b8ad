//! Subprocess adapter for Phil Harvey's exiftool utility.
//!
//! [`ExifTool`] wraps a validated path to the exiftool executable and exposes
//! batch operations over it:
//!
//! - [`ExifTool::read_tags`] — textual tags for many files in one invocation
//! - [`ExifTool::read_binary_tags`] — binary payloads (thumbnails etc.),
//!   sized via a textual pre-pass and sliced out of a raw byte stream
//! - [`ExifTool::write_tags`] / [`ExifTool::write_tags_from_datafiles`] —
//!   in-place tag writes, returning the tool's raw diagnostics
//!
//! One subprocess is spawned per operation and reaped before it returns;
//! the adapter itself holds no other state. Launch and stream failures are
//! logged and degrade to empty or partial results rather than erroring —
//! an empty map can mean "tool failed", not only "no tags present".

mod binary;
mod command;
mod process;
mod reader;
mod writer;

pub use binary::BinaryTag;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Handle to an exiftool executable on disk.
///
/// Construction validates the path once; all operations reuse it unchanged.
#[derive(Debug, Clone)]
pub struct ExifTool {
    tool_path: PathBuf,
}

impl ExifTool {
    /// Create an adapter for the exiftool executable at `tool_path`.
    ///
    /// The path must exist, be a regular file, and be readable; anything
    /// else fails here so no operation ever runs against a bad tool path.
    pub fn new(tool_path: impl AsRef<Path>) -> Result<Self> {
        let tool_path = tool_path.as_ref().to_path_buf();

        let meta = fs::metadata(&tool_path)
            .with_context(|| format!("exiftool not found at {}", tool_path.display()))?;
        if !meta.is_file() {
            anyhow::bail!("{} is not a regular file", tool_path.display());
        }
        fs::File::open(&tool_path)
            .with_context(|| format!("exiftool at {} is not readable", tool_path.display()))?;

        Ok(Self { tool_path })
    }

    /// The validated executable path this adapter drives.
    pub fn path(&self) -> &Path {
        &self.tool_path
    }
}
