//! FITS primary HDU serialization.
//!
//! Renders the fixed sequence of 80-byte header cards followed by the
//! big-endian 16-bit data segment, each padded to the 2880-byte FITS
//! block size. Only the single primary HDU is written; no extensions.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::frame::Frame;

/// FITS block size in bytes. Headers pad to it with spaces, data with
/// zero bytes.
pub const BLOCK_SIZE: usize = 2880;

/// Size of one header card.
const CARD_SIZE: usize = 80;

/// Errors from serializing a frame.
#[derive(Error, Debug)]
pub enum FitsWriteError {
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidImage { width: usize, height: usize },

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize `frame` to a FITS file at `path`.
///
/// Dimensions are validated before the file is created, so a rejected
/// frame leaves nothing behind on disk.
pub fn write_fits(frame: &Frame, path: &Path) -> Result<(), FitsWriteError> {
    validate(frame)?;
    let mut writer = BufWriter::new(File::create(path)?);
    write_validated(frame, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Serialize `frame` to any byte sink.
pub fn write_fits_to<W: Write>(frame: &Frame, writer: &mut W) -> Result<(), FitsWriteError> {
    validate(frame)?;
    write_validated(frame, writer)
}

fn validate(frame: &Frame) -> Result<(), FitsWriteError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(FitsWriteError::InvalidImage {
            width: frame.width(),
            height: frame.height(),
        });
    }
    Ok(())
}

fn write_validated<W: Write>(frame: &Frame, writer: &mut W) -> Result<(), FitsWriteError> {
    writer.write_all(&build_header(frame))?;
    writer.write_all(&serialize_samples(frame))?;
    Ok(())
}

/// Render the primary header, space-padded to a block boundary.
fn build_header(frame: &Frame) -> Vec<u8> {
    let width = frame.width();
    let height = frame.height();

    let cards = [
        card("SIMPLE", "T"),
        card("BITPIX", "16"),
        card("NAXIS", "2"),
        card("NAXIS1", &width.to_string()),
        card("NAXIS2", &height.to_string()),
        card("BSCALE", "1.0"),
        card("BZERO", "0.0"),
        card("DATAMAX", "255.0"),
        card("DATAMIN", "0.0"),
        card("CRPIX1", &format!("{:.6}", width as f64 / 2.0)),
        card("CRPIX2", &format!("{:.6}", height as f64 / 2.0)),
        card("CRVAL1", "0.0"),
        card("CRVAL2", "0.0"),
        card("CD1_1", "0.0"),
        card("CD1_2", "0.0"),
        card("CD2_1", "0.0"),
        card("CD2_2", "0.0"),
        card("CTYPE1", "'RA---TAN'"),
        card("CTYPE2", "'DEC--TAN'"),
        card("CUNIT1", "'deg'"),
        card("CUNIT2", "'deg'"),
        card("CRRES1", "0.0"),
        card("CRRES2", "0.0"),
        card("EQUINOX", "2000.0"),
        card("RADECSYS", "ICRS"),
        card("DATE-OBS", frame.timestamp()),
        card("MJD-OBS", &format!("{:.6}", frame.mjd())),
        card("COSPAR", &frame.cospar.to_string()),
        card("EXPTIME", &format!("{:.6}", frame.exptime)),
        card("OBSERVER", frame.observer()),
        card("END", ""),
    ];

    let mut header = Vec::with_capacity(BLOCK_SIZE);
    for record in &cards {
        header.extend_from_slice(record);
    }
    let padding = (BLOCK_SIZE - header.len() % BLOCK_SIZE) % BLOCK_SIZE;
    header.resize(header.len() + padding, b' ');
    header
}

/// Render one 80-byte header card.
///
/// The keyword is left-justified in the first 8 bytes. Values starting
/// with a quote are laid out from byte 10; everything else is
/// right-justified to end at byte 30, shifting right only when too long
/// to fit. `END` has no value indicator.
fn card(keyword: &str, value: &str) -> [u8; CARD_SIZE] {
    let mut record = [b' '; CARD_SIZE];
    let key = keyword.as_bytes();
    let key_len = key.len().min(8);
    record[..key_len].copy_from_slice(&key[..key_len]);

    if keyword == "END" {
        return record;
    }
    record[8] = b'=';

    let bytes = value.as_bytes();
    let len = bytes.len().min(CARD_SIZE - 10);
    let start = if value.starts_with('\'') {
        10
    } else {
        30usize.saturating_sub(len).max(10)
    };
    record[start..start + len].copy_from_slice(&bytes[..len]);
    record
}

/// Truncate samples to `i16` and serialize big-endian, zero-padded to a
/// block boundary.
///
/// The cast truncates toward zero and saturates at the `i16` range.
/// Samples stream in storage order, bottom row first.
fn serialize_samples(frame: &Frame) -> Vec<u8> {
    let raw_len = 2 * frame.width() * frame.height();
    let padding = (BLOCK_SIZE - raw_len % BLOCK_SIZE) % BLOCK_SIZE;

    let mut data = Vec::with_capacity(raw_len + padding);
    for &sample in frame.samples() {
        data.extend_from_slice(&(sample as i16).to_be_bytes());
    }
    data.resize(raw_len + padding, 0);
    data
}
