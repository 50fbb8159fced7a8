//! JPEG to FITS conversion for satellite and meteor observation stills.
//!
//! Turns a single camera still into a minimally astrometry-ready FITS
//! frame: pixels are averaged to grayscale and flipped to the FITS
//! bottom-up orientation, the observation time comes from EXIF or the
//! caller, and the primary header carries the placeholder plate solution
//! downstream astrometry expects.
//!
//! ```no_run
//! use std::path::Path;
//! use jpg2fits::{decode, fits};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut frame = decode::read_jpeg(Path::new("still.jpg"))?;
//! frame.set_observer("Cees Bassa");
//! fits::write_fits(&frame, Path::new("still.fits"))?;
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod fits;
pub mod frame;

pub use decode::DecodeError;
pub use fits::FitsWriteError;
pub use frame::Frame;
