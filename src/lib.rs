//! # exif-bridge
//!
//! Batch EXIF/IPTC/XMP metadata reader and writer for images — drives Phil
//! Harvey's exiftool CLI as a subprocess and parses its output into
//! structured per-file tag maps, including embedded binary payloads such as
//! thumbnails.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_bridge::exiftool::ExifTool;
//! use std::collections::BTreeSet;
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Point the adapter at an exiftool executable (validated up front)
//!     let tool = ExifTool::new("/usr/bin/exiftool")?;
//!
//!     let files = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
//!     let tags = BTreeSet::from(["Make".to_string(), "Model".to_string()]);
//!
//!     // One subprocess invocation covers the whole batch
//!     let result = tool.read_tags(&files, &tags);
//!     for (file, values) in &result {
//!         println!("{}: {:?}", file.display(), values.get("Model"));
//!     }
//!
//!     // Embedded thumbnails come back as raw bytes, sliced per file
//!     let thumbs = tool.read_binary_tags(&files, "ThumbnailImage");
//!     println!("{} of {} files carry a thumbnail", thumbs.len(), files.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Writing tags
//!
//! ```rust,no_run
//! use exif_bridge::exiftool::ExifTool;
//! use std::collections::BTreeMap;
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tool = ExifTool::new("/usr/bin/exiftool")?;
//! let files = vec![PathBuf::from("a.jpg")];
//!
//! // Direct values
//! let assignments = BTreeMap::from([("Artist".to_string(), "Wyatt".to_string())]);
//! let diagnostics = tool.write_tags(&files, &assignments);
//!
//! // Or sourced from a file on disk (binary payloads)
//! let sources = BTreeMap::from([(
//!     "ThumbnailImage".to_string(),
//!     PathBuf::from("thumb.jpg"),
//! )]);
//! let diagnostics = tool.write_tags_from_datafiles(&files, &sources);
//! print!("{diagnostics}");
//! # Ok(())
//! # }
//! ```
//!
//! Writes mutate the target files in place and report only exiftool's raw
//! diagnostic output — no success/failure is inferred from it.
//!
//! ## Error model
//!
//! The only hard failure is construction: [`exiftool::ExifTool::new`] errors
//! when the executable is missing, not a regular file, or unreadable. Every
//! operation afterwards degrades on failure — launch and stream faults are
//! logged and yield empty or partial results, and output that doesn't match
//! the expected protocol is skipped per entry. Treat an empty result as
//! possibly meaning "tool failure", not only "no tags present".
//!
//! ## Modules
//!
//! - [`exiftool`] — the subprocess adapter (batch reads, binary extraction, writes)
//! - [`codec`] — image decode/scale/rotate/encode for preview generation
//! - [`pipeline`] — file collection, preview generation, thumbnail dumping
//! - [`config`] — configuration types and loading/saving

pub mod codec;
pub mod config;
pub mod exiftool;
pub mod pipeline;
