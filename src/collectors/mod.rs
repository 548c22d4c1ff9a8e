//! Collection of the monitor's external readings
//!
//! Each sub-module wraps one collaborator the loop depends on:
//!
//! - `rate`: the router's UPnP status interface (transmission rates)
//! - `probe`: internet and router reachability checks
//! - `cpu`: host CPU temperature
//! - `units`: pure conversion of raw rate strings into Mbit/s and percentages

pub mod cpu;
pub mod probe;
pub mod rate;
pub mod units;

pub use probe::{NetProbe, Probe};
pub use rate::{FritzRateFetcher, RateFetchError, RateSource};
