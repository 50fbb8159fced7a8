//! Calendar and Julian day conversions for observation timestamps.
//!
//! Converts between civil calendar dates, ISO-style timestamp strings and
//! the Modified Julian Date carried in FITS headers. The algorithms are
//! the classic Julian day formulas with the Gregorian calendar cutover
//! (October 1582), so dates on either side of the reform resolve to the
//! correct day.

/// Offset between Julian Date and Modified Julian Date: MJD = JD - 2400000.5.
pub const MJD_JD_OFFSET: f64 = 2_400_000.5;

/// Convert a civil calendar date to a Modified Julian Date.
///
/// `day` may carry a fractional part for the time of day. Dates before
/// the Gregorian reform are treated as Julian calendar dates. The caller
/// supplies a valid calendar date; out-of-range months or days produce an
/// arithmetically consistent but meaningless value rather than an error.
pub fn civil_to_mjd(year: i32, month: i32, day: f64) -> f64 {
    // January and February count as months 13 and 14 of the previous year.
    let (year, month) = if month < 3 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };

    let a = (f64::from(year) / 100.0).floor();
    let mut b = 2.0 - a + (a / 4.0).floor();

    // No Gregorian correction before the October 1582 reform.
    if year < 1582 || (year == 1582 && month < 10) {
        b = 0.0;
    }
    // Almost certainly a typo for 1582: October 1-4 is exactly the gap
    // the month < 10 test above leaves open before the reform, so this
    // branch never affects a real cutover date. Kept as-is, typo
    // included, since callers may depend on the shifted values it
    // produces for those four 1852 days.
    if year == 1852 && month == 10 && day <= 4.0 {
        b = 0.0;
    }

    let jd = (365.25 * (f64::from(year) + 4716.0)).floor()
        + (30.6001 * f64::from(month + 1)).floor()
        + day
        + b
        - 1524.5;

    jd - MJD_JD_OFFSET
}

/// Convert a `YYYY-MM-DDTHH:MM:SS` timestamp to a Modified Julian Date.
///
/// The scan is fixed-width and tolerant: a field that does not parse as
/// an integer reads as zero, and anything past the seconds field (such as
/// a fractional part) is ignored.
pub fn timestamp_to_mjd(timestamp: &str) -> f64 {
    let field = |range: std::ops::Range<usize>| -> i32 {
        timestamp
            .get(range)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    let year = field(0..4);
    let month = field(5..7);
    let day = f64::from(field(8..10));
    let hour = f64::from(field(11..13));
    let min = f64::from(field(14..16));
    let sec = f64::from(field(17..19));

    let dday = day + hour / 24.0 + min / 1440.0 + sec / 86400.0;
    civil_to_mjd(year, month, dday)
}

/// Convert a Modified Julian Date to a `YYYY-MM-DDTHH:MM:SS.sss` timestamp.
///
/// Seconds are floored to millisecond precision rather than rounded, so a
/// value a hair below the next millisecond never reports it.
pub fn mjd_to_timestamp(mjd: f64) -> String {
    let jd = mjd + MJD_JD_OFFSET + 0.5;

    let z = jd.floor();
    let f = jd.fract();

    // The Gregorian correction applies from JD 2299161 (1582-10-15).
    let a = if z < 2_299_161.0 {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let dday = b - d - (30.6001 * e).floor() + f;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };

    let day = dday.floor();
    let mut x = 3600.0 * (24.0 * (dday - day)).abs();
    let sec = x % 60.0;
    x = (x - sec) / 60.0;
    let min = (x % 60.0).floor();
    let hour = ((x - min) / 60.0).floor();
    let sec = (1000.0 * sec).floor() / 1000.0;

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:06.3}",
        year as i32, month as i32, day as i32, hour as i32, min as i32, sec
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_j2000_epoch() {
        assert_relative_eq!(civil_to_mjd(2000, 1, 1.0), 51544.0);
    }

    #[test]
    fn test_unix_epoch() {
        assert_relative_eq!(civil_to_mjd(1970, 1, 1.0), 40587.0);
    }

    #[test]
    fn test_timestamp_matches_fractional_day() {
        assert_relative_eq!(
            timestamp_to_mjd("2024-03-15T12:00:00"),
            civil_to_mjd(2024, 3, 15.5)
        );
    }

    #[test]
    fn test_fractional_seconds_are_ignored() {
        assert_relative_eq!(
            timestamp_to_mjd("2024-03-15T12:00:00.750"),
            timestamp_to_mjd("2024-03-15T12:00:00")
        );
    }

    #[test]
    fn test_malformed_fields_read_as_zero() {
        assert_relative_eq!(
            timestamp_to_mjd("not a timestamp at all"),
            civil_to_mjd(0, 0, 0.0)
        );
        assert_relative_eq!(
            timestamp_to_mjd("2024-03-??T09:00:00"),
            civil_to_mjd(2024, 3, 0.375)
        );
    }

    #[test]
    fn test_mjd_epoch_renders_midnight() {
        assert_eq!(mjd_to_timestamp(51544.0), "2000-01-01T00:00:00.000");
    }

    /// Day count for a Gregorian calendar month.
    fn days_in_month(year: i32, month: i32) -> i32 {
        match month {
            4 | 6 | 9 | 11 => 30,
            2 => {
                if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                    29
                } else {
                    28
                }
            }
            _ => 31,
        }
    }

    #[test]
    fn test_civil_dates_round_trip() {
        // Every midnight from 1600 through 2200 comes back exactly. The
        // four shifted October 1852 days are the lone exception; they
        // render as the later dates they map onto.
        for year in 1600..=2200 {
            for month in 1..=12 {
                for day in 1..=days_in_month(year, month) {
                    if year == 1852 && month == 10 && day <= 4 {
                        continue;
                    }
                    let mjd = civil_to_mjd(year, month, f64::from(day));
                    let expected = format!("{year:04}-{month:02}-{day:02}T00:00:00.000");
                    assert_eq!(mjd_to_timestamp(mjd), expected);
                }
            }
        }
    }

    #[test]
    fn test_whole_second_mjds_round_trip() {
        // Sub-second residue cannot survive the fixed-width scan, so the
        // round trip is exercised at whole seconds.
        let mjds = [
            0.0,
            40587.0,
            51544.0,
            51544.5,
            60000.25,
            99999.0 + 86399.0 / 86400.0,
        ];
        for mjd in mjds {
            assert_relative_eq!(
                timestamp_to_mjd(&mjd_to_timestamp(mjd)),
                mjd,
                epsilon = 1e-8
            );
        }
    }

    #[test]
    fn test_gregorian_cutover_skips_ten_days() {
        assert_eq!(mjd_to_timestamp(-100_840.5), "1582-10-04T12:00:00.000");
        assert_eq!(mjd_to_timestamp(-100_839.5), "1582-10-15T12:00:00.000");
    }

    #[test]
    fn test_october_1852_quirk_shifts_four_days() {
        // The 1852 carve-out fires for October 1-4 only, pushing those
        // days twelve days forward; the rest of the month is plain
        // Gregorian.
        assert_relative_eq!(civil_to_mjd(1852, 9, 30.0), -2239.0);
        assert_relative_eq!(civil_to_mjd(1852, 10, 1.0), -2226.0);
        assert_relative_eq!(civil_to_mjd(1852, 10, 4.0), -2223.0);
        assert_relative_eq!(civil_to_mjd(1852, 10, 5.0), -2234.0);
        assert_relative_eq!(
            civil_to_mjd(1852, 10, 5.0) - civil_to_mjd(1852, 10, 4.0),
            -11.0
        );
        // The day check is a plain threshold; fractional days past it
        // fall back to the Gregorian correction.
        assert_relative_eq!(civil_to_mjd(1852, 10, 4.5), -2234.5);
        // A shifted day renders as the date its MJD really lands on.
        assert_eq!(
            mjd_to_timestamp(civil_to_mjd(1852, 10, 1.0)),
            "1852-10-13T00:00:00.000"
        );
    }

    #[test]
    fn test_seconds_floor_to_milliseconds() {
        let mjd = 51544.0 + 30.9997 / 86400.0;
        assert_eq!(mjd_to_timestamp(mjd), "2000-01-01T00:00:30.999");
    }
}
