use serde::{Deserialize, Serialize};

use std::f64::consts::PI;

use crate::physics::aerodynamics::circle_area;
use crate::physics::{Atmo, G0, MM};
use super::component::{keys, Component};

const PARACHUTE_CD: f64 = 0.8;
const STREAMER_CD: f64 = 0.3;

const DEFAULT_CANOPY: f64 = 300.0;        // mm
const DEFAULT_DROGUE_CANOPY: f64 = 150.0; // mm
const DEFAULT_STREAMER_LENGTH: f64 = 500.0;
const DEFAULT_STREAMER_WIDTH: f64 = 50.0;

/// Deployable recovery device, identified from the catalogue label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecoveryDevice {
    Parachute { canopy_diameter: f64 },
    Drogue { canopy_diameter: f64 },
    Streamer { length: f64, width: f64 },
}

impl RecoveryDevice {
    pub fn from_component(c: &Component) -> RecoveryDevice {
        let prop = |k: &str, default: f64| c.property(k).map_or(default, |v| v.max(0.0));
        let name = c.name.to_ascii_lowercase();
        if name.contains("streamer") {
            RecoveryDevice::Streamer {
                length: prop(keys::STREAMER_LENGTH, DEFAULT_STREAMER_LENGTH),
                width: prop(keys::STREAMER_WIDTH, DEFAULT_STREAMER_WIDTH),
            }
        } else if name.contains("drogue") {
            RecoveryDevice::Drogue {
                canopy_diameter: prop(keys::CANOPY_DIAMETER, DEFAULT_DROGUE_CANOPY),
            }
        } else {
            RecoveryDevice::Parachute {
                canopy_diameter: prop(keys::CANOPY_DIAMETER, DEFAULT_CANOPY),
            }
        }
    }

    /// Parachute canopy (mm) that lowers `mass` (kg) at `descent_rate` (m/s).
    pub fn canopy_for_descent_rate(mass: f64, atm: &Atmo, descent_rate: f64) -> f64 {
        let k = PI * atm.density * PARACHUTE_CD * descent_rate * descent_rate;
        if k > 0.0 {
            (8.0 * mass * G0 / k).sqrt() / MM
        } else {
            0.0
        }
    }

    pub fn cd(&self) -> f64 {
        match self {
            RecoveryDevice::Parachute { .. } | RecoveryDevice::Drogue { .. } => PARACHUTE_CD,
            RecoveryDevice::Streamer { .. } => STREAMER_CD,
        }
    }

    /// Reference area of the deployed device, m^2.
    pub fn area(&self) -> f64 {
        match *self {
            RecoveryDevice::Parachute { canopy_diameter }
            | RecoveryDevice::Drogue { canopy_diameter } => circle_area(canopy_diameter * MM),
            RecoveryDevice::Streamer { length, width } => length * MM * width * MM,
        }
    }
}
