//! Image references: inline base64 pixel data and external files.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::ImageError;
use crate::surface::{RawImage, Rect};
use crate::theme::Rgb;

use super::pass::Pass;

/// Gap below an image.
pub const IMAGE_SPACING: i32 = 4;
/// Color treated as transparent when blitting external images.
pub const TRANSPARENT_KEY: Rgb = Rgb::hex(0xA8_A8A7);

const BASE64_MARKER: &str = "base64,";
const HEADER_LEN: usize = 4;

// Embedded data is often hand-wrapped and unpadded.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Pixel data decoded from a `data:...;base64,` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: i32,
    pub height: i32,
    /// Exactly `width * height` RGB triplets.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn as_raw(&self) -> RawImage<'_> {
        RawImage {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

/// Whether `source` carries inline pixel data rather than naming a file.
pub fn is_inline(source: &str) -> bool {
    source.contains(BASE64_MARKER)
}

/// Decode an inline image: a 2-byte big-endian width, a 2-byte big-endian
/// height, then RGB triplets.
///
/// # Errors
/// Returns an [`ImageError`] if the payload is not base64, the header is
/// cut short, a dimension is zero, or there are too few pixel bytes.
pub fn decode_inline(source: &str) -> Result<DecodedImage, ImageError> {
    let payload = source
        .find(BASE64_MARKER)
        .map_or(source, |at| &source[at + BASE64_MARKER.len()..]);
    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let raw = LENIENT.decode(cleaned.trim_end_matches('='))?;

    // At least one pixel byte must follow the header.
    if raw.len() <= HEADER_LEN {
        return Err(ImageError::TruncatedHeader(raw.len()));
    }
    let width = i32::from(u16::from_be_bytes([raw[0], raw[1]]));
    let height = i32::from(u16::from_be_bytes([raw[2], raw[3]]));
    if width == 0 || height == 0 {
        return Err(ImageError::EmptyDimension { width, height });
    }
    let needed = (width as usize) * (height as usize) * 3;
    let mut pixels = raw[HEADER_LEN..].to_vec();
    if pixels.len() < needed {
        return Err(ImageError::ShortPixelData {
            needed,
            actual: pixels.len(),
        });
    }
    pixels.truncate(needed);
    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

/// Scale `(width, height)` down to fit `max_width`, keeping the aspect ratio.
pub fn fit_width(width: i32, height: i32, max_width: i32) -> (i32, i32) {
    if width <= max_width || width <= 0 {
        return (width, height);
    }
    let scaled = i64::from(height) * i64::from(max_width) / i64::from(width);
    (max_width, i32::try_from(scaled).unwrap_or(height))
}

impl Pass<'_, '_> {
    /// Draw an image reference; undecodable images are skipped.
    pub(super) fn image(&mut self, source: &str) {
        let placed = if is_inline(source) {
            self.inline_image(source)
        } else {
            self.file_image(source)
        };
        if let Err(err) = placed {
            tracing::debug!(error = %err, "skipping image");
            crate::perf::log_event("render.image.skip", err.to_string());
        }
    }

    fn inline_image(&mut self, source: &str) -> Result<(), ImageError> {
        let image = decode_inline(source)?;
        let x = self.view.x + (self.view.width - image.width) / 2;
        if self.view.in_view(self.y, image.height) {
            self.out.surface.draw_pixels(x, self.y, &image.as_raw());
        }
        self.y += image.height + IMAGE_SPACING;
        Ok(())
    }

    fn file_image(&mut self, source: &str) -> Result<(), ImageError> {
        let size = self
            .out
            .surface
            .open_image(source)
            .filter(|size| size.width > 0 && size.height > 0)
            .ok_or_else(|| ImageError::Unavailable(source.to_string()))?;
        let (width, height) = fit_width(size.width, size.height, self.view.width);
        let x = self.view.x + (self.view.width - width) / 2;
        if self.view.in_view(self.y, height) {
            self.out.surface.blit_image(
                Rect::new(x, self.y, width, height),
                Rect::new(0, 0, size.width, size.height),
                Some(TRANSPARENT_KEY),
            );
        }
        self.y += height + IMAGE_SPACING;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn encode(bytes: &[u8]) -> String {
        format!("data:image/raw;base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn test_decode_two_by_one_image() {
        let src = encode(&[0, 2, 0, 1, 255, 0, 0, 0, 255, 0]);
        let image = decode_inline(&src).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.pixels, vec![255, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn test_decode_tolerates_wrapping_and_missing_padding() {
        let encoded = STANDARD.encode([0u8, 1, 0, 1, 9, 9, 9]);
        let wrapped = format!("base64,{}\n {}", &encoded[..4], encoded[4..].trim_end_matches('='));
        assert_eq!(decode_inline(&wrapped).unwrap().pixels, vec![9, 9, 9]);
    }

    #[test]
    fn test_decode_drops_extra_pixel_bytes() {
        let src = encode(&[0, 1, 0, 1, 1, 2, 3, 4, 5]);
        assert_eq!(decode_inline(&src).unwrap().pixels, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_truncated_header() {
        assert_eq!(
            decode_inline(&encode(&[0, 1, 0])),
            Err(ImageError::TruncatedHeader(3))
        );
    }

    #[test]
    fn test_decode_zero_dimension() {
        assert_eq!(
            decode_inline(&encode(&[0, 0, 0, 4, 1])),
            Err(ImageError::EmptyDimension {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn test_decode_short_pixel_data() {
        assert_eq!(
            decode_inline(&encode(&[0, 2, 0, 2, 1, 2, 3])),
            Err(ImageError::ShortPixelData {
                needed: 12,
                actual: 3
            })
        );
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(matches!(
            decode_inline("base64,@@@@"),
            Err(ImageError::Base64(_))
        ));
    }

    #[test]
    fn test_fit_width_scales_proportionally() {
        assert_eq!(fit_width(620, 100, 310), (310, 50));
        assert_eq!(fit_width(100, 80, 310), (100, 80));
    }

    #[test]
    fn test_is_inline() {
        assert!(is_inline("data:image/raw;base64,AAAA"));
        assert!(!is_inline("images/logo.png"));
    }
}
