//! The built-in sample deployment.

use crate::model::{Device, LinkStation};

/// Sample stations as `(x, y, reach)`.
pub const SAMPLE_STATIONS: [(f64, f64, f64); 3] =
    [(0.0, 0.0, 10.0), (20.0, 20.0, 5.0), (10.0, 0.0, 12.0)];

/// Sample devices as `(x, y)`.
pub const SAMPLE_DEVICES: [(f64, f64); 4] =
    [(0.0, 0.0), (100.0, 100.0), (15.0, 10.0), (18.0, 18.0)];

pub fn sample_stations() -> Vec<LinkStation> {
    SAMPLE_STATIONS
        .iter()
        .map(|&(x, y, reach)| LinkStation::new(x, y, reach))
        .collect()
}

pub fn sample_devices() -> Vec<Device> {
    SAMPLE_DEVICES.iter().map(|&(x, y)| Device::new(x, y)).collect()
}
