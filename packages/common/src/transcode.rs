use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

/// Quality used for the first lossy encode.
const START_QUALITY: u8 = 95;
/// Lowest quality the reduction phase will reach before downscaling starts.
const QUALITY_FLOOR: u8 = 20;
const QUALITY_STEP: u8 = 5;
/// Downscaling stops at this dimension regardless of output size, so the
/// loop terminates even when the ceiling is unreachable.
const MIN_DIMENSION: u32 = 1;

/// Errors from [`transcode`].
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// The payload is not in a supported image container.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    /// The container was recognized but the data is corrupt.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
}

/// A re-encoded image together with its resolved metadata.
#[derive(Debug)]
pub struct TranscodeOutput {
    pub bytes: Vec<u8>,
    /// Canonical MIME type of the detected format, independent of whatever
    /// the client claimed.
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Re-encode `raw` so the result fits under `size_ceiling` bytes.
///
/// The format is detected by content sniffing and never changes: JPEG stays
/// JPEG, PNG stays PNG, WebP stays WebP. Size reduction runs in two phases:
/// quality reduction first (JPEG only; dimensions untouched), then repeated
/// halving of both dimensions down to a 1x1 floor. When even the floor
/// exceeds the ceiling, the smallest achievable encoding is returned.
///
/// The input is re-encoded even when it is already under the ceiling, so the
/// stored bytes are normalized and may differ from the upload.
pub fn transcode(raw: &[u8], size_ceiling: u64) -> Result<TranscodeOutput, TranscodeError> {
    let reader = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| TranscodeError::Decode(image::ImageError::IoError(e)))?;

    let format = reader
        .format()
        .ok_or_else(|| TranscodeError::UnsupportedFormat("unknown".into()))?;
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP
    ) {
        return Err(TranscodeError::UnsupportedFormat(format_label(format).into()));
    }

    let decoded = reader.decode().map_err(|e| match e {
        image::ImageError::Unsupported(err) => TranscodeError::UnsupportedFormat(err.to_string()),
        other => TranscodeError::Decode(other),
    })?;

    let mut quality = START_QUALITY;
    let mut bytes = encode(&decoded, format, quality)?;

    // Phase one: trade quality for size while resolution stays intact.
    // Only JPEG carries a quality parameter here; PNG and WebP go through
    // the encoder's maximal lossless effort on the initial encode instead.
    if format == ImageFormat::Jpeg {
        while bytes.len() as u64 > size_ceiling && quality > QUALITY_FLOOR {
            quality = quality.saturating_sub(QUALITY_STEP).max(QUALITY_FLOOR);
            bytes = encode(&decoded, format, quality)?;
        }
    }

    // Phase two: halve dimensions until the ceiling is met or the floor is
    // hit, re-encoding at the last-used quality.
    let mut image = decoded;
    while bytes.len() as u64 > size_ceiling
        && (image.width() > MIN_DIMENSION || image.height() > MIN_DIMENSION)
    {
        let width = (image.width() / 2).max(MIN_DIMENSION);
        let height = (image.height() / 2).max(MIN_DIMENSION);
        image = image.resize_exact(width, height, FilterType::Lanczos3);
        bytes = encode(&image, format, quality)?;
    }

    Ok(TranscodeOutput {
        bytes,
        mime_type: format.to_mime_type(),
        width: image.width(),
        height: image.height(),
    })
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, TranscodeError> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            image
                .write_with_encoder(encoder)
                .map_err(TranscodeError::Encode)?;
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            image
                .write_with_encoder(encoder)
                .map_err(TranscodeError::Encode)?;
        }
        ImageFormat::WebP => {
            // The webp encoder is lossless; size reduction for it comes
            // entirely from the downscale phase.
            let encoder = WebPEncoder::new_lossless(&mut buf);
            image
                .write_with_encoder(encoder)
                .map_err(TranscodeError::Encode)?;
        }
        other => {
            return Err(TranscodeError::UnsupportedFormat(format_label(other).into()));
        }
    }
    Ok(buf)
}

fn format_label(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("unknown")
}
