//! Convert a JPEG photograph into a FITS image with observation metadata.
//!
//! # Usage
//!
//! ```bash
//! # Convert using the EXIF timestamp embedded in the JPEG
//! jpg2fits -i still.jpg -o still.fits
//!
//! # Explicit timestamp, camera delay and timezone correction
//! jpg2fits -i still.jpg -o still.fits -t 2025-03-15T21:30:00 -d 0.5 -Z -3600
//! ```
//!
//! The observation time base is the `-t` flag when given, otherwise the
//! EXIF timestamp, otherwise the J2000 default; the delay and timezone
//! offsets are then added to that base.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use jpg2fits::{decode, fits};
use time_math::timestamp_to_mjd;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JPEG file to convert
    #[arg(short, long)]
    input: PathBuf,

    /// FITS file to write
    #[arg(short, long)]
    output: PathBuf,

    /// Observation timestamp (YYYY-MM-DDTHH:MM:SS), overriding EXIF
    #[arg(short, long)]
    timestamp: Option<String>,

    /// Acquisition delay in seconds, added to the timestamp
    #[arg(short, long, default_value_t = 0.0)]
    delay: f64,

    /// Timezone offset in seconds, added to the timestamp
    #[arg(short = 'Z', long, default_value_t = 0.0)]
    timezone: f64,

    /// COSPAR identifier of the observing site
    #[arg(short, long, default_value_t = 0)]
    cospar: i32,

    /// Exposure time in seconds
    #[arg(short = 'T', long, default_value_t = 10.06)]
    exposure: f32,

    /// Observer name
    #[arg(short = 'O', long, default_value = "Cees Bassa")]
    observer: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut frame = decode::read_jpeg(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    // An explicit -t beats the EXIF-seeded time; the frame default covers
    // the case where neither exists.
    let base_mjd = match &args.timestamp {
        Some(timestamp) => timestamp_to_mjd(timestamp),
        None => frame.mjd(),
    };
    frame.set_time_from_mjd(base_mjd + (args.delay + args.timezone) / 86400.0);

    frame.cospar = args.cospar;
    frame.exptime = args.exposure;
    frame.set_observer(&args.observer);

    fits::write_fits(&frame, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        "wrote {} ({}x{}, DATE-OBS {})",
        args.output.display(),
        frame.width(),
        frame.height(),
        frame.timestamp()
    );

    Ok(())
}
