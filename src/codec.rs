//! Image codec collaborator: decode, scale, rotate, and re-encode images.
//!
//! Thin wrappers over the `image` crate used by the preview pipeline. The
//! metadata adapter never goes through here — pixels and tags travel on
//! separate paths.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Write;
use std::path::Path;

/// Decode an image file into memory.
pub fn decode(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("failed to decode {}", path.display()))
}

/// Aspect-preserving resize: the longer dimension becomes `target_long_edge`.
pub fn scale(img: &DynamicImage, target_long_edge: u32) -> DynamicImage {
    img.resize(target_long_edge, target_long_edge, FilterType::Lanczos3)
}

/// Resize to exact dimensions, ignoring aspect ratio.
pub fn scale_exact(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Rotate by a quarter-turn multiple. Other angles are not supported and
/// return the image unchanged with a warning.
pub fn rotate(img: &DynamicImage, degrees: u32) -> DynamicImage {
    match degrees % 360 {
        0 => img.clone(),
        90 => img.rotate90(),
        180 => img.rotate180(),
        270 => img.rotate270(),
        other => {
            log::warn!("unsupported rotation of {other} degrees, leaving image unrotated");
            img.clone()
        }
    }
}

/// Encode `img` to `writer` in the format implied by `extension`.
///
/// `quality` is a fractional compression parameter (0.0–1.0) honored where
/// the format supports it (JPEG); PNG and WebP are written lossless.
pub fn encode<W: Write>(
    img: &DynamicImage,
    writer: W,
    quality: f32,
    extension: &str,
) -> Result<()> {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => {
            let q = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            img.write_with_encoder(JpegEncoder::new_with_quality(writer, q))
        }
        "png" => img.write_with_encoder(PngEncoder::new(writer)),
        "webp" => img.write_with_encoder(WebPEncoder::new_lossless(writer)),
        other => anyhow::bail!("unsupported output format: {other}"),
    }
    .context("failed to encode image")
}
