//! File extension resolution for downloaded images.
//!
//! The declared `Content-Type` is trusted first. When the server sends a MIME
//! type outside the known table the payload itself is sniffed and its header
//! decoded, so a mislabelled or exotic image still lands with a usable
//! extension.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use tracing::{debug, warn};

const MIME_TO_EXTENSION: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/bmp", ".bmp"),
    ("image/webp", ".webp"),
    ("image/tiff", ".tiff"),
    ("image/vnd.microsoft.icon", ".ico"),
];

/// Extension (with leading dot) for an image response, or `None` when neither
/// the MIME table nor the payload identifies a format.
pub fn resolve_extension(content_type: &str, bytes: &[u8]) -> Option<String> {
    if let Some(ext) = extension_for_mime(content_type) {
        return Some(ext.to_string());
    }

    match sniff_format(bytes) {
        Ok(format) => {
            let ext = format!(".{}", format_name(format)?);
            debug!(content_type, ext = %ext, "format detected from payload");
            Some(ext)
        }
        Err(reason) => {
            warn!(content_type, %reason, "unable to detect image format");
            None
        }
    }
}

pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let content_type = content_type.trim();
    MIME_TO_EXTENSION
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, String> {
    if bytes.is_empty() {
        return Err("empty body".to_string());
    }
    let format = image::guess_format(bytes).map_err(|err| err.to_string())?;
    ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|err| err.to_string())?;
    Ok(format)
}

/// Lowercase format name as image libraries usually report it
/// (`jpeg` rather than `jpg`).
fn format_name(format: ImageFormat) -> Option<&'static str> {
    let name = match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Ico => "ico",
        other => return other.extensions_str().first().copied(),
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let image = RgbaImage::from_pixel(2, 2, Rgba([200, 30, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn mapped_mime_ignores_payload() {
        for (mime, ext) in MIME_TO_EXTENSION {
            assert_eq!(resolve_extension(mime, b"not an image").as_deref(), Some(*ext));
            assert_eq!(resolve_extension(mime, &[]).as_deref(), Some(*ext));
        }
    }

    #[test]
    fn unmapped_gif_falls_back_to_sniffing() {
        let gif = encode(ImageFormat::Gif);
        assert_eq!(resolve_extension("image/gif", &gif).as_deref(), Some(".gif"));
    }

    #[test]
    fn mislabelled_png_is_sniffed() {
        let png = encode(ImageFormat::Png);
        assert_eq!(
            resolve_extension("image/x-unknown", &png).as_deref(),
            Some(".png")
        );
    }

    #[test]
    fn garbage_and_empty_bodies_resolve_to_nothing() {
        assert_eq!(resolve_extension("image/gif", b"definitely not pixels"), None);
        assert_eq!(resolve_extension("image/gif", &[]), None);
    }

    #[test]
    fn truncated_header_is_rejected() {
        let png = encode(ImageFormat::Png);
        assert_eq!(resolve_extension("image/apng", &png[..12]), None);
    }

    #[test]
    fn mime_lookup_is_exact() {
        assert_eq!(extension_for_mime("image/png"), Some(".png"));
        assert_eq!(extension_for_mime("image/jpg"), None);
        assert_eq!(extension_for_mime("image/png; charset=binary"), None);
    }
}
