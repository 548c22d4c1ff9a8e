//! Host CPU temperature via the sysinfo component sensors

use sysinfo::Components;

/// Reads the current CPU temperature in degrees Celsius, rounded to two
/// decimal places. Returns `None` when no matching sensor reports a value;
/// the header simply omits the reading in that case.
pub fn cpu_temperature() -> Option<f32> {
    let components = Components::new_with_refreshed_list();

    let reading = components
        .iter()
        .find(|c| {
            let label = c.label().to_ascii_lowercase();
            label.contains("cpu") || label.contains("coretemp") || label.contains("thermal")
        })
        .or_else(|| components.iter().next())
        .and_then(|c| c.temperature())?;

    Some((reading * 100.0).round() / 100.0)
}
