//! Shared data structures for the monitor loop
//!
//! This module contains the ephemeral per-iteration types produced by the
//! collectors and consumed by the display renderer. Nothing here is persisted.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Direction of a transmission-rate reading, used to pick the trailing
/// arrow glyph on the rendered gauge line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

/// Reachability of the two network dependencies, probed independently
/// at the start of every loop iteration
///
/// Either flag can be false while the other is true: the router stays
/// pingable when the uplink is down, and a misconfigured address leaves
/// the internet reachable while the router is not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityState {
    /// Outbound TCP connection to a well-known public endpoint succeeded
    pub internet_reachable: bool,
    /// Single echo request to the configured router address succeeded
    pub router_reachable: bool,
}

/// One fully converted throughput reading, recomputed every iteration
/// and discarded after rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSample {
    /// Local timestamp of the reading, shown as "last API call" in the header
    pub timestamp: DateTime<Local>,
    /// CPU temperature of the monitoring host, if a sensor reported one
    pub cpu_temp_celsius: Option<f32>,
    /// Upload rate converted to Mbit/s
    pub upload_mbit: f64,
    /// Download rate converted to Mbit/s
    pub download_mbit: f64,
    /// Upload rate normalized against the configured ceiling, clamped to [0, 100]
    pub upload_percent: u8,
    /// Download rate normalized against the configured ceiling, clamped to [0, 100]
    pub download_percent: u8,
}
