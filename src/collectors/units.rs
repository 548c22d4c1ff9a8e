//! Unit conversion for raw transmission-rate strings
//!
//! The router's status interface reports rates as human-readable strings with
//! a unit suffix. The byte suffix is `" B"` with a leading space while the
//! kilobyte and megabyte suffixes are the bare `"KB"` and `"MB"` — that
//! asymmetry is the only thing distinguishing `"123 B"` from `"123 KB"`, so
//! the matching below keeps it literally.

use log::error;

/// Converts a raw rate string (e.g. `"55.3 KB"`) into Mbit/s, rounded to
/// two decimal places.
///
/// An unrecognized suffix or an unparsable value is an unrecoverable input:
/// it yields `0.0` with an error report instead of failing, so the monitor
/// loop keeps running on whatever the router sends next.
pub fn to_mbit(raw: &str) -> f64 {
    let value = match raw.split_whitespace().next() {
        Some(token) => token,
        None => {
            error!("Nothing matched! Value: {raw:?}");
            return 0.0;
        }
    };

    let parsed: f64 = match value.parse() {
        Ok(v) => v,
        Err(_) => {
            error!("Nothing matched! Value: {raw:?}");
            return 0.0;
        }
    };

    let mbit = if raw.ends_with(" B") {
        parsed / 125_000.0
    } else if raw.ends_with("KB") {
        parsed / 125.0
    } else if raw.ends_with("MB") {
        parsed * 8.0
    } else {
        error!("Nothing matched! Value: {raw:?}");
        return 0.0;
    };

    (mbit * 100.0).round() / 100.0
}

/// Normalizes an absolute rate against its configured ceiling as an integer
/// percentage, clamped to 100.
///
/// A ceiling of zero is a programming error: the config layer rejects
/// non-positive ceilings before a loop ever starts.
pub fn to_percent(value: f64, ceiling: f64) -> u8 {
    debug_assert!(ceiling > 0.0, "percentage ceiling must be positive");
    let percent = (value / ceiling * 100.0).round();
    if percent >= 100.0 { 100 } else { percent as u8 }
}
