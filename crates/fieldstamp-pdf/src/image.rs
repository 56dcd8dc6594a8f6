//! Image content decoding and XObject construction
//!
//! Field content arrives as base64, optionally wrapped in a `data:` URI.
//! Only PNG and JPEG are accepted; anything else is reported as `None` so
//! the caller can skip the field silently. JPEG bytes pass through with a
//! `DCTDecode` filter; PNG is decoded to RGB8 and embedded with
//! `FlateDecode`.

use std::io::Write;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::{write::ZlibEncoder, Compression};
use lopdf::{dictionary, Stream};

use crate::coords::PointRect;

/// Supported embedded image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Identify the format from magic bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&PNG_MAGIC) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

/// Decode field content into raw image bytes.
///
/// Accepts a bare base64 string or a `data:<mime>;base64,<payload>` URI.
pub fn decode_content(content: &str) -> Option<Vec<u8>> {
    let payload = match content.split_once("base64,") {
        Some((_, rest)) => rest,
        None => content,
    };
    BASE64.decode(payload.trim()).ok()
}

/// An image ready to be added to a document as an XObject.
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub stream: Stream,
}

/// Component count from a JPEG's start-of-frame segment.
///
/// 1 means grayscale, 3 YCbCr/RGB, 4 CMYK or YCCK.
fn jpeg_component_count(bytes: &[u8]) -> Option<u8> {
    let mut i = 2; // past SOI
    while i + 3 < bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        // fill bytes before a marker
        while i + 1 < bytes.len() && bytes[i + 1] == 0xFF {
            i += 1;
        }
        let marker = *bytes.get(i + 1)?;
        match marker {
            // standalone markers carry no length field
            0x01 | 0xD0..=0xD9 => {
                i += 2;
                continue;
            }
            // entropy-coded data follows SOS; SOF was expected before it
            0xDA => return None,
            // any SOF flavor: len(2) precision(1) height(2) width(2) nf(1)
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => {
                return bytes.get(i + 9).copied();
            }
            _ => {
                let len = usize::from(*bytes.get(i + 2)?) << 8 | usize::from(*bytes.get(i + 3)?);
                i += 2 + len;
            }
        }
    }
    None
}

/// Flate-compress RGB8 pixels into an image XObject.
fn flate_xobject(img: ::image::RgbImage) -> Option<EmbeddedImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&img.into_raw()).ok()?;
    let samples = encoder.finish().ok()?;
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        samples,
    );
    Some(EmbeddedImage {
        width,
        height,
        stream,
    })
}

/// Build an image XObject stream from raw PNG or JPEG bytes.
///
/// Returns `None` for unsupported or undecodable data.
pub fn build_xobject(bytes: &[u8]) -> Option<EmbeddedImage> {
    match sniff_format(bytes)? {
        ImageFormat::Jpeg => {
            let img = ::image::load_from_memory_with_format(bytes, ::image::ImageFormat::Jpeg)
                .ok()?;
            // A 4-component (CMYK/YCCK) JPEG cannot pass through as
            // DeviceRGB; embed the decoded pixels instead.
            if jpeg_component_count(bytes) == Some(4) {
                return flate_xobject(img.to_rgb8());
            }
            let grayscale = matches!(
                img.color(),
                ::image::ColorType::L8 | ::image::ColorType::L16
            );
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(img.width()),
                    "Height" => i64::from(img.height()),
                    "ColorSpace" => if grayscale { "DeviceGray" } else { "DeviceRGB" },
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes.to_vec(),
            );
            Some(EmbeddedImage {
                width: img.width(),
                height: img.height(),
                stream,
            })
        }
        ImageFormat::Png => {
            let img = ::image::load_from_memory_with_format(bytes, ::image::ImageFormat::Png)
                .ok()?
                .to_rgb8();
            flate_xobject(img)
        }
    }
}

/// Scale an image to fit `bounds` preserving aspect ratio, centered.
pub fn fit_rect(img_width: u32, img_height: u32, bounds: &PointRect) -> PointRect {
    if img_width == 0 || img_height == 0 || bounds.width <= 0.0 || bounds.height <= 0.0 {
        return *bounds;
    }
    let scale = (bounds.width / f64::from(img_width)).min(bounds.height / f64::from(img_height));
    let width = f64::from(img_width) * scale;
    let height = f64::from(img_height) * scale;
    PointRect {
        left: bounds.left + (bounds.width - width) / 2.0,
        bottom: bounds.bottom + (bounds.height - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A 2x2 red PNG encoded with the image crate, so the magic bytes
    /// and structure are always valid.
    fn tiny_png() -> Vec<u8> {
        let img = ::image::RgbImage::from_pixel(2, 2, ::image::Rgb([255, 0, 0]));
        let mut out = std::io::Cursor::new(Vec::new());
        ::image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ::image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn tiny_jpeg() -> Vec<u8> {
        let img = ::image::RgbImage::from_pixel(2, 2, ::image::Rgb([0, 128, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        ::image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ::image::ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn sniff_recognizes_png_and_jpeg() {
        assert_eq!(sniff_format(&tiny_png()), Some(ImageFormat::Png));
        assert_eq!(sniff_format(&tiny_jpeg()), Some(ImageFormat::Jpeg));
        assert_eq!(sniff_format(b"GIF89a...."), None);
        assert_eq!(sniff_format(&[]), None);
    }

    #[test]
    fn decode_content_handles_data_uri_and_bare_base64() {
        let png = tiny_png();
        let bare = BASE64.encode(&png);
        let uri = format!("data:image/png;base64,{bare}");
        assert_eq!(decode_content(&bare).unwrap(), png);
        assert_eq!(decode_content(&uri).unwrap(), png);
        assert!(decode_content("not base64 at all!!!").is_none());
    }

    #[test]
    fn png_builds_flate_xobject() {
        let img = build_xobject(&tiny_png()).unwrap();
        assert_eq!((img.width, img.height), (2, 2));
        let filter = img.stream.dict.get(b"Filter").unwrap();
        assert_eq!(filter, &lopdf::Object::Name(b"FlateDecode".to_vec()));
    }

    #[test]
    fn jpeg_builds_dct_xobject_with_original_bytes() {
        let jpeg = tiny_jpeg();
        let img = build_xobject(&jpeg).unwrap();
        assert_eq!(img.stream.content, jpeg);
        let filter = img.stream.dict.get(b"Filter").unwrap();
        assert_eq!(filter, &lopdf::Object::Name(b"DCTDecode".to_vec()));
    }

    #[test]
    fn jpeg_component_count_reads_sof() {
        // The encoder emits a baseline YCbCr frame
        assert_eq!(jpeg_component_count(&tiny_jpeg()), Some(3));

        // SOI then a hand-built SOF0 declaring 4 components (CMYK)
        let cmyk_frame = [
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, // SOF0
            0x00, 0x14, // segment length
            0x08, // precision
            0x00, 0x02, 0x00, 0x02, // 2x2
            0x04, // components
        ];
        assert_eq!(jpeg_component_count(&cmyk_frame), Some(4));

        assert_eq!(jpeg_component_count(b"GIF89a"), None);
    }

    #[test]
    fn three_component_jpeg_keeps_dct_passthrough() {
        // Sanity for the CMYK special case: ordinary JPEGs still pass
        // through untouched.
        let jpeg = tiny_jpeg();
        assert_ne!(jpeg_component_count(&jpeg), Some(4));
        let img = build_xobject(&jpeg).unwrap();
        assert_eq!(
            img.stream.dict.get(b"Filter").unwrap(),
            &lopdf::Object::Name(b"DCTDecode".to_vec())
        );
    }

    #[test]
    fn unsupported_format_is_rejected() {
        assert!(build_xobject(b"GIF89a\x01\x00\x01\x00").is_none());
        // PNG magic with garbage body fails decoding, not just sniffing
        let mut fake = PNG_MAGIC.to_vec();
        fake.extend_from_slice(&[0u8; 16]);
        assert!(build_xobject(&fake).is_none());
    }

    #[test]
    fn fit_rect_preserves_aspect_and_centers() {
        let bounds = PointRect {
            left: 100.0,
            bottom: 200.0,
            width: 100.0,
            height: 50.0,
        };
        // A square image in a wide box: height-bound, centered horizontally
        let fitted = fit_rect(10, 10, &bounds);
        assert_eq!(fitted.height, 50.0);
        assert_eq!(fitted.width, 50.0);
        assert_eq!(fitted.left, 125.0);
        assert_eq!(fitted.bottom, 200.0);
    }

    #[test]
    fn fit_rect_wide_image_is_width_bound() {
        let bounds = PointRect {
            left: 0.0,
            bottom: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let fitted = fit_rect(200, 50, &bounds);
        assert_eq!(fitted.width, 100.0);
        assert_eq!(fitted.height, 25.0);
        assert_eq!(fitted.bottom, 37.5);
    }
}
