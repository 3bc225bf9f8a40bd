use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::physics::Atmo;

/// Launch-site conditions, supplied once per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchConditions {
    pub wind_speed: f64,   // m/s
    pub temperature: f64,  // °C
    pub pressure: f64,     // hPa
    pub humidity: f64,     // %
    pub launch_angle: f64, // degrees above horizontal, 90 = vertical
}

impl Default for LaunchConditions {
    fn default() -> Self {
        Self {
            wind_speed: 5.0,
            temperature: 20.0,
            pressure: 1013.0,
            humidity: 60.0,
            launch_angle: 90.0,
        }
    }
}

// Accepted ranges, inclusive.
pub const WIND_SPEED_RANGE: (f64, f64) = (0.0, 50.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (-60.0, 60.0);
pub const PRESSURE_RANGE: (f64, f64) = (500.0, 1100.0);
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);
pub const LAUNCH_ANGLE_RANGE: (f64, f64) = (45.0, 90.0);

impl LaunchConditions {
    /// Reject non-finite values and values outside the accepted ranges.
    pub fn validate(&self) -> Result<()> {
        check("wind_speed", self.wind_speed, WIND_SPEED_RANGE)?;
        check("temperature", self.temperature, TEMPERATURE_RANGE)?;
        check("pressure", self.pressure, PRESSURE_RANGE)?;
        check("humidity", self.humidity, HUMIDITY_RANGE)?;
        check("launch_angle", self.launch_angle, LAUNCH_ANGLE_RANGE)?;
        Ok(())
    }

    pub fn atmosphere(&self) -> Atmo {
        Atmo::at_launch_site(self.temperature, self.pressure, self.humidity)
    }

    pub fn launch_angle_rad(&self) -> f64 {
        self.launch_angle.to_radians()
    }
}

fn check(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() {
        return Err(SimError::InvalidCondition {
            field,
            value,
            reason: "must be a finite number".into(),
        });
    }
    if value < min || value > max {
        return Err(SimError::InvalidCondition {
            field,
            value,
            reason: format!("must be within [{min}, {max}]"),
        });
    }
    Ok(())
}
