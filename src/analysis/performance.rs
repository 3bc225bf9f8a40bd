use serde::{Deserialize, Serialize};

use crate::assembly::RecoveryDevice;
use crate::physics::G0;
use crate::sim::profile::{FlightKind, FlightProfile};

/// Comfortable touchdown speed under a parachute, m/s.
pub const TARGET_DESCENT_RATE: f64 = 5.0;

/// Headline numbers of one flight, read off the profile in closed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub apogee: f64,            // m
    pub apogee_time: f64,       // s
    pub max_velocity: f64,      // m/s
    pub max_mach: f64,
    pub max_acceleration: f64,  // m/s^2
    pub max_acceleration_g: f64,
    pub descent_rate: f64,      // m/s at touchdown
    pub flight_time: f64,       // s
    pub landing_drift: f64,     // m
    pub motor_delay: Option<f64>,
    /// Delay that fires the ejection charge at apogee, s.
    pub recommended_delay: f64,
    /// Parachute that lands the empty rocket at [`TARGET_DESCENT_RATE`], mm.
    pub recommended_canopy_diameter: f64,
}

impl FlightSummary {
    pub fn from_profile(p: &FlightProfile) -> FlightSummary {
        let recommended_canopy_diameter = RecoveryDevice::canopy_for_descent_rate(
            p.burnout_mass,
            &p.atmosphere,
            TARGET_DESCENT_RATE,
        );

        if p.kind != FlightKind::Flight {
            return FlightSummary {
                apogee: 0.0,
                apogee_time: 0.0,
                max_velocity: 0.0,
                max_mach: 0.0,
                max_acceleration: 0.0,
                max_acceleration_g: 0.0,
                descent_rate: 0.0,
                flight_time: p.landing_time(),
                landing_drift: 0.0,
                motor_delay: p.motor_delay,
                recommended_delay: 0.0,
                recommended_canopy_diameter,
            };
        }

        let impact = p.impact_speed();
        let max_velocity = p.burnout_velocity.max(impact);
        let max_acceleration = p.boost_accel.max(p.coast_decel).max(G0);
        let max_mach = if p.atmosphere.sound_speed > 0.0 {
            max_velocity / p.atmosphere.sound_speed
        } else {
            0.0
        };

        FlightSummary {
            apogee: p.apogee,
            apogee_time: p.apogee_time(),
            max_velocity,
            max_mach,
            max_acceleration,
            max_acceleration_g: max_acceleration / G0,
            descent_rate: impact,
            flight_time: p.landing_time(),
            landing_drift: p.landing_drift(),
            motor_delay: p.motor_delay,
            recommended_delay: p.coast_time,
            recommended_canopy_diameter,
        }
    }

    /// Seconds the motor's delay charge fires after (+) or before (−) apogee.
    pub fn delay_error(&self) -> Option<f64> {
        self.motor_delay.map(|d| d - self.recommended_delay)
    }
}
