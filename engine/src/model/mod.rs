//! Plane geometry and the entities placed on it.
//!
//! Contains the point value type, link stations with their reach-limited
//! power model, and devices.

pub mod device;
pub mod point;
pub mod station;

pub use device::Device;
pub use point::Point;
pub use station::{LinkStation, ReachTooLarge};
