//! JPEG decoding and EXIF timestamp pickup.
//!
//! The adapter between a decoded pixel buffer and a [`Frame`]: source
//! channels are averaged to grayscale, rows are flipped so row 0 ends up
//! at the bottom as FITS expects, and the observation time is seeded from
//! the EXIF `DateTime` tag when the file carries one.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::DynamicImage;
use log::{debug, warn};
use ndarray::Array2;
use thiserror::Error;

use crate::frame::Frame;

/// Errors from turning a JPEG source into a [`Frame`].
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("sample buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(usize),
}

/// Average an interleaved pixel buffer into a frame.
///
/// `data` is row-major with the top row first and `channels` bytes per
/// pixel (1 for grayscale, 3 for RGB). Each sample is the mean of the
/// source channels, and rows are flipped so the frame's row 0 is the
/// source's bottom row.
pub fn frame_from_samples(
    width: usize,
    height: usize,
    channels: usize,
    data: &[u8],
) -> Result<Frame, DecodeError> {
    if channels != 1 && channels != 3 {
        return Err(DecodeError::UnsupportedChannels(channels));
    }
    let expected = width * height * channels;
    if data.len() != expected {
        return Err(DecodeError::BufferSize {
            expected,
            actual: data.len(),
        });
    }

    let mut samples = Array2::zeros((height, width));
    for row in 0..height {
        let flipped = height - 1 - row;
        for col in 0..width {
            let base = channels * (col + width * row);
            let sum: f32 = data[base..base + channels]
                .iter()
                .map(|&v| f32::from(v))
                .sum();
            samples[[flipped, col]] = sum / channels as f32;
        }
    }

    Ok(Frame::from_samples(samples))
}

/// Decode a JPEG file into a frame, seeding the observation time from
/// its EXIF timestamp.
///
/// A missing or unreadable EXIF timestamp is logged and the frame keeps
/// its default observation time; a failed decode is fatal.
pub fn read_jpeg(path: &Path) -> Result<Frame, DecodeError> {
    let decoded = image::open(path)?;
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);
    let (channels, data) = match decoded {
        DynamicImage::ImageLuma8(gray) => (1, gray.into_raw()),
        other => (3, other.to_rgb8().into_raw()),
    };
    debug!("decoded {width}x{height} image with {channels} channel(s)");

    let mut frame = frame_from_samples(width, height, channels, &data)?;

    match exif_timestamp(path) {
        Some(timestamp) => frame.set_time_from_timestamp(&timestamp),
        None => warn!(
            "no EXIF timestamp in {}, keeping the default observation time",
            path.display()
        ),
    }

    Ok(frame)
}

/// Read the EXIF `DateTime` field and rewrite it to ISO form, or `None`
/// if the file has no usable EXIF timestamp.
fn exif_timestamp(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let exif = exif::Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .ok()?;
    let field = exif.get_field(exif::Tag::DateTime, exif::In::PRIMARY)?;
    match &field.value {
        exif::Value::Ascii(strings) => exif_to_iso(strings.first()?),
        _ => None,
    }
}

/// Rewrite EXIF's `YYYY:MM:DD HH:MM:SS` to `YYYY-MM-DDTHH:MM:SS`.
///
/// Bytes 4 and 7 become `-`, byte 10 becomes `T`, and anything past the
/// seconds field is dropped.
fn exif_to_iso(raw: &[u8]) -> Option<String> {
    if raw.len() < 19 {
        return None;
    }
    let mut iso = raw[..19].to_vec();
    iso[4] = b'-';
    iso[7] = b'-';
    iso[10] = b'T';
    String::from_utf8(iso).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rows_flip_bottom_up() {
        // Source rows top to bottom: [10, 20] then [30, 40].
        let frame = frame_from_samples(2, 2, 1, &[10, 20, 30, 40]).unwrap();
        let samples = frame.samples();
        assert_relative_eq!(samples[[0, 0]], 30.0);
        assert_relative_eq!(samples[[0, 1]], 40.0);
        assert_relative_eq!(samples[[1, 0]], 10.0);
        assert_relative_eq!(samples[[1, 1]], 20.0);
    }

    #[test]
    fn test_rgb_channels_average() {
        let frame = frame_from_samples(1, 1, 3, &[30, 60, 90]).unwrap();
        assert_relative_eq!(frame.samples()[[0, 0]], 60.0);
    }

    #[test]
    fn test_grayscale_passes_through() {
        let frame = frame_from_samples(2, 1, 1, &[0, 255]).unwrap();
        assert_relative_eq!(frame.samples()[[0, 0]], 0.0);
        assert_relative_eq!(frame.samples()[[0, 1]], 255.0);
    }

    #[test]
    fn test_rejects_unsupported_channel_counts() {
        let err = frame_from_samples(1, 1, 2, &[1, 2]).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedChannels(2)));
    }

    #[test]
    fn test_rejects_short_buffers() {
        let err = frame_from_samples(2, 2, 3, &[0; 11]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::BufferSize {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn test_exif_datetime_rewrites_to_iso() {
        assert_eq!(
            exif_to_iso(b"2024:03:15 12:34:56").as_deref(),
            Some("2024-03-15T12:34:56")
        );
        // Trailing bytes past the seconds field are dropped.
        assert_eq!(
            exif_to_iso(b"2024:03:15 12:34:56.99").as_deref(),
            Some("2024-03-15T12:34:56")
        );
        assert_eq!(exif_to_iso(b"2024:03:15"), None);
    }
}
