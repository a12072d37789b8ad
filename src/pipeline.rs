use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::codec;
use crate::exiftool::ExifTool;

/// Extensions exiftool can read metadata from that this pipeline accepts.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "tif", "tiff",
    // HEIC/HEIF and AVIF
    "heic", "heif", "avif",
    // RAW formats
    "cr3", "cr2", "dng", "nef", "arw", "raf", "orf", "rw2", "pef", "srw",
];

/// The tag carrying the embedded preview most cameras write.
const THUMBNAIL_TAG: &str = "ThumbnailImage";

/// Options for scaled, re-encoded preview images.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// The longer dimension of the scaled preview, in pixels.
    pub long_edge: u32,
    /// Fractional compression quality (0.0–1.0) where the format supports it.
    pub quality: f32,
    /// Output format extension ("jpg", "png", "webp").
    pub format: String,
}

impl From<&crate::config::PreviewConfig> for PreviewOptions {
    fn from(config: &crate::config::PreviewConfig) -> Self {
        Self {
            long_edge: config.long_edge,
            quality: config.quality,
            format: config.format.clone(),
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks); only files with supported image
/// extensions are kept.
///
/// # Example
///
/// ```rust,no_run
/// use exif_bridge::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),   // single file
///     PathBuf::from("./photos/"),   // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Produce a scaled, re-encoded preview of `src` at `dest`.
///
/// Decodes the source, resizes so the longer edge matches
/// [`PreviewOptions::long_edge`], and encodes in the configured format.
pub fn write_preview(src: &Path, dest: &Path, options: &PreviewOptions) -> Result<()> {
    let img = codec::decode(src)?;
    let scaled = codec::scale(&img, options.long_edge);

    let file = File::create(dest)
        .with_context(|| format!("failed to create preview at {}", dest.display()))?;
    codec::encode(&scaled, BufWriter::new(file), options.quality, &options.format)?;

    log::debug!("Preview written: {}", dest.display());
    Ok(())
}

/// Dump the embedded thumbnails of a batch of images into `dest_dir`.
///
/// One subprocess pair extracts every payload; each image that carries a
/// thumbnail gets `<stem>_thumb.jpg` in `dest_dir` (camera thumbnails are
/// JPEG). Images without a thumbnail are skipped. Returns the written paths
/// in input order.
pub fn extract_thumbnails(
    tool: &ExifTool,
    files: &[PathBuf],
    dest_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("failed to create {}", dest_dir.display()))?;

    let payloads = tool.read_binary_tags(files, THUMBNAIL_TAG);

    let mut written = Vec::new();
    for file in files {
        let Some(payload) = payloads.get(file) else {
            log::debug!("No embedded thumbnail in {}", file.display());
            continue;
        };

        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "thumbnail".to_string());
        let dest = dest_dir.join(format!("{stem}_thumb.jpg"));

        std::fs::write(&dest, payload)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        written.push(dest);
    }

    Ok(written)
}
