use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Launch-site air properties from measured surface conditions
// ---------------------------------------------------------------------------

const R_DRY: f64 = 287.052_87;   // specific gas constant for dry air, J/(kg·K)
const R_VAPOR: f64 = 461.495;    // specific gas constant for water vapour, J/(kg·K)
const GAMMA: f64 = 1.4;          // ratio of specific heats

const KELVIN: f64 = 273.15;
const HPA: f64 = 100.0;          // Pa per hPa

/// Air properties at the launch pad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atmo {
    pub density: f64,      // kg/m^3
    pub pressure: f64,     // Pa
    pub temperature: f64,  // K
    pub sound_speed: f64,  // m/s
}

impl Atmo {
    /// Moist-air properties from surface readings.
    ///
    /// `temperature_c` in °C, `pressure_hpa` in hPa, `humidity_pct` in percent.
    /// The vapour partial pressure comes from the Tetens saturation curve and is
    /// capped at the total pressure.
    pub fn at_launch_site(temperature_c: f64, pressure_hpa: f64, humidity_pct: f64) -> Atmo {
        let temperature = temperature_c + KELVIN;
        let pressure = pressure_hpa * HPA;

        let rh = (humidity_pct / 100.0).clamp(0.0, 1.0);
        let p_vapor = (rh * saturation_pressure(temperature_c)).min(pressure);
        let p_dry = pressure - p_vapor;

        let density = if temperature > 0.0 {
            p_dry / (R_DRY * temperature) + p_vapor / (R_VAPOR * temperature)
        } else {
            0.0
        };

        Atmo {
            density,
            pressure,
            temperature,
            sound_speed: (GAMMA * R_DRY * temperature.max(0.0)).sqrt(),
        }
    }

    /// ISA sea-level reference: 15 °C, 1013.25 hPa, dry.
    pub fn standard() -> Atmo {
        Atmo::at_launch_site(15.0, 1013.25, 0.0)
    }
}

/// Saturation vapour pressure over water (Tetens), Pa.
fn saturation_pressure(temperature_c: f64) -> f64 {
    610.78 * (17.27 * temperature_c / (temperature_c + 237.3)).exp()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sea_level_standard_values() {
        let a = Atmo::standard();
        assert_abs_diff_eq!(a.temperature, 288.15, epsilon = 0.01);
        assert_abs_diff_eq!(a.pressure, 101_325.0, epsilon = 1.0);
        assert_abs_diff_eq!(a.density, 1.225, epsilon = 0.001);
        assert_abs_diff_eq!(a.sound_speed, 340.29, epsilon = 0.1);
    }

    #[test]
    fn humid_air_is_lighter() {
        let dry = Atmo::at_launch_site(25.0, 1013.0, 0.0);
        let wet = Atmo::at_launch_site(25.0, 1013.0, 100.0);
        assert!(wet.density < dry.density);
    }

    #[test]
    fn warm_air_is_thinner() {
        let cold = Atmo::at_launch_site(-10.0, 1013.0, 50.0);
        let hot = Atmo::at_launch_site(35.0, 1013.0, 50.0);
        assert!(hot.density < cold.density);
        assert!(hot.sound_speed > cold.sound_speed);
    }

    #[test]
    fn saturation_pressure_at_20c() {
        // ~2.34 kPa
        assert_abs_diff_eq!(saturation_pressure(20.0), 2_337.0, epsilon = 10.0);
    }
}
