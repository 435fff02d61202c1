//! Devices that need a link.

use serde::{Deserialize, Serialize};

use super::point::Point;
use super::station::LinkStation;
use crate::eval::best_station;

/// A device at a fixed position. Serializes as a bare `{"x", "y"}` point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device {
    pub position: Point,
}

impl Device {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
        }
    }

    /// Distance from this device to `station`.
    pub fn distance_to(&self, station: &LinkStation) -> f64 {
        self.position.distance(station.position)
    }

    /// Picks the station delivering the most power to this device.
    /// See [`best_station`].
    pub fn best_station<'a>(
        &self,
        stations: &'a [LinkStation],
    ) -> (Option<&'a LinkStation>, f64) {
        best_station(self, stations)
    }
}

impl From<Point> for Device {
    fn from(position: Point) -> Self {
        Self { position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_station_in_reach() {
        let stations = [LinkStation::new(0.0, 0.0, 10.0)];
        let (station, power) = Device::new(0.0, 0.0).best_station(&stations);
        assert_eq!(station, Some(&stations[0]));
        assert_eq!(power, 100.0);
    }

    #[test]
    fn no_station_in_reach() {
        let stations = [LinkStation::new(0.0, 0.0, 10.0)];
        let (station, power) = Device::new(100.0, 100.0).best_station(&stations);
        assert!(station.is_none());
        assert_eq!(power, 0.0);
    }

    #[test]
    fn distance_is_shared_with_station() {
        let station = LinkStation::new(1.0, 1.0, 2.0);
        let device = Device::new(4.0, 5.0);
        assert_eq!(device.distance_to(&station), 5.0);
        assert_eq!(station.distance_to(&device), 5.0);
    }

    #[test]
    fn serde_is_transparent_point() {
        let device: Device = serde_json::from_str(r#"{"x":15,"y":10}"#).unwrap();
        assert_eq!(device, Device::new(15.0, 10.0));
        assert!(serde_json::from_str::<Device>(r#"{"x":15}"#).is_err());
    }
}
