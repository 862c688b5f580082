//! On-the-fly asset processing and cache policy for `/assets/...`.
//!
//! Every helper here is best effort: when minification or image processing fails
//! the caller gets the original bytes back and a warning is logged.

use std::fs::Metadata;
use std::io;
use std::io::{Cursor, ErrorKind};
use std::path::{Component, Path};
use std::time::UNIX_EPOCH;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::error::{LimitError, LimitErrorKind};
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageResult};
use spdlog::warn;

pub const DEV_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";
pub const HTML_CACHE_CONTROL: &str = "public, max-age=300, must-revalidate";

const DAY_SECS: u64 = 86400;
const OPTIMIZE_MAX_SIDE: u32 = 1920;
/// Largest side a resize request may produce.
const RESIZE_MAX_SIDE: u32 = 4096;
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetKind {
    Stylesheet,
    Script,
    Image(ImageFormat),
    Other,
}

impl AssetKind {
    pub fn from_path(path: &Path) -> AssetKind {
        match extension_of(path).as_str() {
            "css" => AssetKind::Stylesheet,
            "js" => AssetKind::Script,
            "jpg" | "jpeg" => AssetKind::Image(ImageFormat::Jpeg),
            "png" => AssetKind::Image(ImageFormat::Png),
            "gif" => AssetKind::Image(ImageFormat::Gif),
            _ => AssetKind::Other,
        }
    }
}

/// Query parameters accepted on image assets. Zero means "not requested".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageRequest {
    pub width: u32,
    pub height: u32,
    pub optimize: bool,
}

impl ImageRequest {
    fn wants_resize(&self) -> bool {
        self.width > 0 || self.height > 0
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Relative path under the assets folder with no parent, root or prefix components.
pub fn is_safe_asset_path(path: &str) -> bool {
    if path.is_empty() || path.contains("..") {
        return false;
    }
    Path::new(path).components().all(|c| matches!(c, Component::Normal(_)))
}

pub fn max_age_for(path: &Path) -> u64 {
    match extension_of(path).as_str() {
        "css" | "js" => DAY_SECS * 7,
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "ico" | "webp" => DAY_SECS * 30,
        "woff" | "woff2" | "ttf" | "eot" => DAY_SECS * 365,
        _ => DAY_SECS,
    }
}

pub fn asset_cache_control(path: &Path) -> String {
    format!("public, max-age={}", max_age_for(path))
}

/// `"{mtime:x}-{size:x}"` with the modification time in whole seconds.
pub fn etag_for(metadata: &Metadata) -> Option<String> {
    let modified = metadata.modified().ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(format!("\"{:x}-{:x}\"", secs, metadata.len()))
}

pub fn content_type_for(path: &Path) -> String {
    match AssetKind::from_path(path) {
        AssetKind::Stylesheet => "text/css; charset=utf-8".to_string(),
        AssetKind::Script => "application/javascript; charset=utf-8".to_string(),
        _ => mime_guess::from_path(path).first_or_octet_stream().to_string(),
    }
}

pub fn minify_css(src: &str) -> io::Result<String> {
    match minifier::css::minify(src) {
        Ok(minified) => Ok(minified.to_string()),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidData, e)),
    }
}

pub fn minify_js(src: &str) -> String {
    minifier::js::minify(src).to_string()
}

/// Target size for a resize request. A single given side keeps the aspect ratio.
fn target_size(width: u32, height: u32, req_width: u32, req_height: u32) -> (u32, u32) {
    match (req_width, req_height) {
        (0, 0) => (width, height),
        (w, 0) => (w, scale_side(height, w, width)),
        (0, h) => (scale_side(width, h, height), h),
        (w, h) => (w, h),
    }
}

fn scale_side(side: u32, new_ref: u32, old_ref: u32) -> u32 {
    if old_ref == 0 {
        return 1;
    }
    let scaled = (side as u64 * new_ref as u64 + old_ref as u64 / 2) / old_ref as u64;
    scaled.clamp(1, u32::MAX as u64) as u32
}

fn encode(img: &DynamicImage, format: ImageFormat) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            img.write_with_encoder(PngEncoder::new(&mut buf))?;
        }
        other => {
            img.write_to(&mut Cursor::new(&mut buf), other)?;
        }
    }
    Ok(buf)
}

fn too_large() -> ImageError {
    ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError))
}

pub fn resize_image(bytes: &[u8], format: ImageFormat, req_width: u32, req_height: u32) -> ImageResult<Vec<u8>> {
    if req_width > RESIZE_MAX_SIDE || req_height > RESIZE_MAX_SIDE {
        return Err(too_large());
    }

    let img = image::load_from_memory_with_format(bytes, format)?;
    let (width, height) = target_size(img.width(), img.height(), req_width, req_height);
    if width > RESIZE_MAX_SIDE || height > RESIZE_MAX_SIDE {
        return Err(too_large());
    }
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    encode(&resized, format)
}

/// Fits the image into 1920x1920 and re-encodes JPEG and PNG. Other formats
/// are returned untouched.
pub fn optimize_image(bytes: &[u8], format: ImageFormat) -> ImageResult<Vec<u8>> {
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Ok(bytes.to_vec());
    }

    let mut img = image::load_from_memory_with_format(bytes, format)?;
    if img.width() > OPTIMIZE_MAX_SIDE || img.height() > OPTIMIZE_MAX_SIDE {
        img = img.resize(OPTIMIZE_MAX_SIDE, OPTIMIZE_MAX_SIDE, FilterType::Lanczos3);
    }
    encode(&img, format)
}

/// Applies minification or image processing to the raw file contents.
pub fn process_asset(path: &Path, bytes: Vec<u8>, request: &ImageRequest, dev_mode: bool) -> Vec<u8> {
    let processed = match AssetKind::from_path(path) {
        AssetKind::Stylesheet | AssetKind::Script if dev_mode => return bytes,
        AssetKind::Stylesheet => match std::str::from_utf8(&bytes) {
            Ok(src) => minify_css(src).map(String::into_bytes),
            Err(e) => Err(io::Error::new(ErrorKind::InvalidData, e)),
        },
        AssetKind::Script => match std::str::from_utf8(&bytes) {
            Ok(src) => Ok(minify_js(src).into_bytes()),
            Err(e) => Err(io::Error::new(ErrorKind::InvalidData, e)),
        },
        AssetKind::Image(format) if request.wants_resize() => {
            resize_image(&bytes, format, request.width, request.height)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
        }
        AssetKind::Image(format) if request.optimize && !dev_mode => {
            optimize_image(&bytes, format)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
        }
        _ => return bytes,
    };

    match processed {
        Ok(processed) => processed,
        Err(e) => {
            warn!("Serving {} unmodified: {}", path.display(), e);
            bytes
        }
    }
}
