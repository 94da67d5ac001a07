//! # Logo Loading and Decoding
//!
//! Resolves the report's logo source (file path, `data:` URI, or raw base64)
//! into pixels the PDF serializer can embed. JPEG bytes pass through without
//! re-encoding (DCTDecode is native to PDF); PNG is decoded to RGB plus an
//! optional alpha channel for SMask transparency.
//!
//! Logo failure is non-fatal by design: [`load_logo`] logs the reason and
//! returns `None`, and layout proceeds with the fallback top margin.

use std::io::Cursor;

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// Pixel data in a form the PDF serializer consumes directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded as-is with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes.
        rgb: Vec<u8>,
        /// width * height bytes of coverage. None when fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load the report logo, folding failure into the agreed fallback.
///
/// This is the single point where the external image collaborator is
/// consumed; by the time layout starts the outcome is settled.
pub fn load_logo(src: Option<&str>) -> Option<LoadedImage> {
    let src = src?;
    match load_image(src) {
        Ok(image) => Some(image),
        Err(reason) => {
            log::warn!("logo failed to load, continuing without it: {}", reason);
            None
        }
    }
}

/// Load an image from a source string.
///
/// Supported forms:
/// - `data:image/...;base64,...`
/// - a file path (`/...`, `./...`, `../...`)
/// - raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage, String> {
    let raw = source_bytes(src)?;
    decode_image_bytes(&raw)
}

/// Resolve the source string to raw image bytes.
fn source_bytes(src: &str) -> Result<Vec<u8>, String> {
    if src.starts_with("data:image/") {
        let comma = src
            .find(',')
            .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
        return base64_decode(&src[comma + 1..]);
    }

    // Only explicit path prefixes count as paths; base64 payloads contain
    // '/' and must not be mistaken for them.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src).map_err(|e| format!("could not read image file '{}': {}", src, e));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| format!("base64 decode error: {}", e))
}

/// Dispatch on magic bytes.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and color space only; the raw bytes are kept.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {}", e))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("could not read JPEG dimensions: {}", e))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment; its component count tells the
/// color space (1 = grayscale, otherwise RGB).
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // past the SOI marker
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            // SOF layout: length(2) precision(1) height(2) width(2) components(1)
            if i + 9 < data.len() {
                return if data[i + 9] == 1 {
                    JpegColorSpace::DeviceGray
                } else {
                    JpegColorSpace::DeviceRGB
                };
            }
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA and split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("PNG format detection error: {}", e))?;

    let img = reader
        .decode()
        .map_err(|e| format!("could not decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}
