//! In-memory representation of a decoded observation still.
//!
//! A [`Frame`] pairs the grayscale samples with the metadata that ends up
//! in the FITS primary header: plate bounds, the linear pixel transform,
//! the observation time as a consistent timestamp/MJD pair, and the
//! station fields.

use ndarray::Array2;
use time_math::{mjd_to_timestamp, timestamp_to_mjd};

/// J2000 epoch used when no observation time is known.
const DEFAULT_TIMESTAMP: &str = "2000-01-01T00:00:00.000";
const DEFAULT_MJD: f64 = 51544.0;

/// Longest observer name carried in the header, in bytes.
const OBSERVER_MAX_BYTES: usize = 31;

/// A grayscale image plus the observation metadata for one FITS frame.
///
/// Samples live in a `(height, width)` array whose row 0 is the bottom
/// row of the source image, matching the FITS orientation; the decode
/// step performs the vertical flip. Bounds and the pixel transform are
/// derived from the dimensions, and the timestamp and MJD only change
/// together, so the pair always agrees.
#[derive(Debug, Clone)]
pub struct Frame {
    samples: Array2<f32>,
    xmin: f32,
    xmax: f32,
    ymin: f32,
    ymax: f32,
    transform: [f64; 6],
    timestamp: String,
    mjd: f64,
    observer: String,

    /// COSPAR identifier of the observing site.
    pub cospar: i32,

    /// Exposure time in seconds.
    pub exptime: f32,
}

impl Frame {
    /// Build a frame from samples already in FITS orientation (row 0 at
    /// the bottom), with default metadata.
    pub fn from_samples(samples: Array2<f32>) -> Self {
        let (height, width) = samples.dim();
        let (xmin, xmax) = (0.0, width as f32);
        let (ymin, ymax) = (0.0, height as f32);
        Self {
            transform: derive_transform(width, height, xmin, xmax, ymin, ymax),
            samples,
            xmin,
            xmax,
            ymin,
            ymax,
            timestamp: DEFAULT_TIMESTAMP.to_string(),
            mjd: DEFAULT_MJD,
            observer: String::new(),
            cospar: 0,
            exptime: 10.06,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.samples.ncols()
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.samples.nrows()
    }

    /// Grayscale samples in `(height, width)` layout, bottom row first.
    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }

    /// Plate bounds as `(xmin, xmax, ymin, ymax)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (self.xmin, self.xmax, self.ymin, self.ymax)
    }

    /// Linear pixel-to-plate transform
    /// `[x0, dx/dcol, 0, y0, 0, dy/drow]`.
    pub fn transform(&self) -> &[f64; 6] {
        &self.transform
    }

    /// Observation timestamp, always `YYYY-MM-DDTHH:MM:SS.sss`.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Observation time as a Modified Julian Date.
    pub fn mjd(&self) -> f64 {
        self.mjd
    }

    /// Observer name.
    pub fn observer(&self) -> &str {
        &self.observer
    }

    /// Set the observation time from a timestamp string.
    ///
    /// The string is parsed to an MJD and re-rendered, so the stored pair
    /// agrees and always carries millisecond precision.
    pub fn set_time_from_timestamp(&mut self, timestamp: &str) {
        self.set_time_from_mjd(timestamp_to_mjd(timestamp));
    }

    /// Set the observation time from a Modified Julian Date.
    pub fn set_time_from_mjd(&mut self, mjd: f64) {
        self.mjd = mjd;
        self.timestamp = mjd_to_timestamp(mjd);
    }

    /// Set the observer name, truncating to 31 bytes on a char boundary.
    pub fn set_observer(&mut self, name: &str) {
        let mut end = name.len().min(OBSERVER_MAX_BYTES);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        self.observer = name[..end].to_string();
    }
}

/// Derive the linear pixel transform from the image dimensions and plate
/// bounds. Coordinates refer to pixel centers, hence the half-pixel
/// offset on the origin.
fn derive_transform(
    width: usize,
    height: usize,
    xmin: f32,
    xmax: f32,
    ymin: f32,
    ymax: f32,
) -> [f64; 6] {
    let dx = f64::from(xmax - xmin) / width as f64;
    let dy = f64::from(ymax - ymin) / height as f64;
    [
        f64::from(xmin) - 0.5 * dx,
        dx,
        0.0,
        f64::from(ymin) - 0.5 * dy,
        0.0,
        dy,
    ]
}
