//! Link stations and the reach-limited power model.
//!
//! A station delivers `(reach - d)^2` to anything strictly closer than its
//! reach and nothing at or beyond it. A device sitting exactly on the reach
//! boundary therefore receives zero power.
//!
//! Power never exceeds `reach^2`, so a station whose squared reach is finite
//! only ever delivers finite power. Deserialization rejects any other station.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::device::Device;
use super::point::Point;

/// A fixed station with a maximum effective radius.
///
/// Zero or negative reach is accepted and simply never covers anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StationRecord", into = "StationRecord")]
pub struct LinkStation {
    pub position: Point,
    pub reach: f64,
}

/// Flat wire shape: `{"x": .., "y": .., "reach": ..}`.
#[derive(Serialize, Deserialize)]
struct StationRecord {
    x: f64,
    y: f64,
    reach: f64,
}

/// A station whose power could overflow `f64`.
#[derive(Debug, Error, PartialEq)]
#[error("reach {0:e} is too large, its power would overflow")]
pub struct ReachTooLarge(pub f64);

impl TryFrom<StationRecord> for LinkStation {
    type Error = ReachTooLarge;

    fn try_from(r: StationRecord) -> Result<Self, Self::Error> {
        let station = LinkStation::new(r.x, r.y, r.reach);
        if station.has_finite_power() {
            Ok(station)
        } else {
            Err(ReachTooLarge(r.reach))
        }
    }
}

impl From<LinkStation> for StationRecord {
    fn from(s: LinkStation) -> Self {
        StationRecord {
            x: s.position.x,
            y: s.position.y,
            reach: s.reach,
        }
    }
}

impl LinkStation {
    pub const fn new(x: f64, y: f64, reach: f64) -> Self {
        Self {
            position: Point::new(x, y),
            reach,
        }
    }

    /// Distance from this station to `device`.
    pub fn distance_to(&self, device: &Device) -> f64 {
        self.position.distance(device.position)
    }

    /// Power delivered to `device`. Always `>= 0`.
    pub fn power(&self, device: &Device) -> f64 {
        let d = self.distance_to(device);
        if self.reach > d {
            let margin = self.reach - d;
            margin * margin
        } else {
            0.0
        }
    }

    /// Returns true if every power this station can deliver is finite.
    pub fn has_finite_power(&self) -> bool {
        self.reach <= 0.0 || (self.reach * self.reach).is_finite()
    }

    /// Returns true if the station delivers any power to `device`.
    pub fn covers(&self, device: &Device) -> bool {
        self.power(device) > 0.0
    }
}
