use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::analysis::stability::analyze;
use crate::assembly::Assembly;
use crate::physics::aerodynamics::{circle_area, drag_force, terminal_velocity};
use crate::physics::{Atmo, G0, GRAM, MM};
use super::conditions::LaunchConditions;

// ---------------------------------------------------------------------------
// Flight phases and samples
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Boost,
    Coast,
    Recovery,
    Landed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Boost => "BOOST",
            Phase::Coast => "COAST",
            Phase::Recovery => "RECOVERY",
            Phase::Landed => "LANDED",
        };
        f.write_str(s)
    }
}

/// Kinematic snapshot at one simulated time. Vertical quantities are positive
/// up; `downrange` is horizontal drift from the pad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightSample {
    pub time: f64,          // s
    pub phase: Phase,
    pub altitude: f64,      // m
    pub velocity: f64,      // m/s
    pub acceleration: f64,  // m/s^2
    pub downrange: f64,     // m
}

impl FlightSample {
    /// Position in the launch-site ENU frame, downrange along East.
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.downrange, 0.0, self.altitude)
    }

    fn landed(time: f64, downrange: f64) -> FlightSample {
        FlightSample {
            time,
            phase: Phase::Landed,
            altitude: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            downrange,
        }
    }
}

/// What the motor can do for this airframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightKind {
    /// No motor, or no thrust: the rocket never burns.
    Unpowered,
    /// The motor burns but thrust never exceeds weight.
    Grounded,
    Flight,
}

// ---------------------------------------------------------------------------
// Flight profile: everything derived once per (assembly, conditions)
// ---------------------------------------------------------------------------

/// Closed-form trajectory through boost, coast, recovery and landing.
///
/// Boost is constant acceleration, coast is constant deceleration (gravity
/// plus mean drag) down to zero vertical speed at apogee, and recovery is
/// free fall until the device's terminal rate, then a constant-rate descent.
/// Altitude and vertical velocity are continuous at every airborne boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightProfile {
    pub kind: FlightKind,
    pub burn_time: f64,         // s
    pub coast_time: f64,        // s
    pub descent_time: f64,      // s
    pub boost_accel: f64,       // m/s^2, vertical
    pub coast_decel: f64,       // m/s^2, positive
    pub burnout_velocity: f64,  // m/s
    pub burnout_altitude: f64,  // m
    pub apogee: f64,            // m
    pub descent_rate: f64,      // m/s, terminal, may be infinite
    pub launch_mass: f64,       // kg
    pub burnout_mass: f64,      // kg
    pub motor_delay: Option<f64>,
    pub atmosphere: Atmo,
    horizontal_accel: f64,
    wind_speed: f64,
}

impl FlightProfile {
    /// Derive the profile. `conditions` are expected to have passed
    /// [`LaunchConditions::validate`].
    pub fn new(assembly: &Assembly, conditions: &LaunchConditions) -> FlightProfile {
        let atm = conditions.atmosphere();
        let report = analyze(assembly);

        // --- Motor cluster ---
        let (thrust, impulse, propellant, motor_delay) = assembly.motors().fold(
            (0.0, 0.0, 0.0, None),
            |(f, i, p, delay): (f64, f64, f64, Option<f64>), m| {
                (f + m.thrust, i + m.total_impulse(), p + m.propellant_mass, delay.or(m.delay))
            },
        );
        let burn_time = if thrust > 0.0 { impulse / thrust } else { 0.0 };

        // --- Masses ---
        let launch_mass = report.total_mass * GRAM;
        let burnout_mass = (report.total_mass - propellant).max(f64::MIN_POSITIVE) * GRAM;
        let mean_mass = (launch_mass + burnout_mass) / 2.0;

        let theta = conditions.launch_angle_rad();
        let thrust_accel = thrust / mean_mass;
        let boost_accel = thrust_accel * theta.sin() - G0;

        let mut profile = FlightProfile {
            kind: FlightKind::Unpowered,
            burn_time,
            coast_time: 0.0,
            descent_time: 0.0,
            boost_accel: 0.0,
            coast_decel: G0,
            burnout_velocity: 0.0,
            burnout_altitude: 0.0,
            apogee: 0.0,
            descent_rate: 0.0,
            launch_mass,
            burnout_mass,
            motor_delay,
            atmosphere: atm,
            horizontal_accel: 0.0,
            wind_speed: conditions.wind_speed.max(0.0),
        };

        if burn_time <= 0.0 {
            profile.burn_time = 0.0;
            return profile;
        }
        if boost_accel <= 0.0 {
            profile.kind = FlightKind::Grounded;
            return profile;
        }

        // --- Boost ---
        let v_b = boost_accel * burn_time;
        let h_b = 0.5 * boost_accel * burn_time * burn_time;

        // --- Coast: mean of v^2 over a linear ramp to zero is v_b^2 / 3 ---
        let ref_area = circle_area(assembly.reference_diameter() * MM);
        let burnout_drag = drag_force(v_b, &atm, assembly.drag_coefficient(), ref_area);
        let coast_decel = G0 + burnout_drag / (3.0 * burnout_mass);
        let coast_time = v_b / coast_decel;
        let apogee = h_b + v_b * v_b / (2.0 * coast_decel);

        // --- Recovery ---
        let (cd, area) = match assembly.recovery_device() {
            Some(device) => (device.cd(), device.area()),
            None => (assembly.drag_coefficient(), ref_area),
        };
        let descent_rate = terminal_velocity(burnout_mass, &atm, cd, area);
        let descent_time = fall_time(apogee, descent_rate);

        profile.kind = FlightKind::Flight;
        profile.boost_accel = boost_accel;
        profile.coast_decel = coast_decel;
        profile.coast_time = coast_time;
        profile.burnout_velocity = v_b;
        profile.burnout_altitude = h_b;
        profile.apogee = apogee;
        profile.descent_rate = descent_rate;
        profile.descent_time = descent_time;
        profile.horizontal_accel = thrust_accel * theta.cos();
        profile
    }

    pub fn apogee_time(&self) -> f64 {
        self.burn_time + self.coast_time
    }

    /// Time after which the rocket is at rest on the ground.
    pub fn landing_time(&self) -> f64 {
        match self.kind {
            FlightKind::Unpowered => 0.0,
            FlightKind::Grounded => self.burn_time,
            FlightKind::Flight => self.apogee_time() + self.descent_time,
        }
    }

    /// Vertical speed at touchdown, m/s (positive).
    pub fn impact_speed(&self) -> f64 {
        if self.kind != FlightKind::Flight {
            return 0.0;
        }
        (G0 * self.descent_time).min(self.descent_rate)
    }

    pub fn landing_drift(&self) -> f64 {
        self.downrange_at(self.landing_time())
    }

    pub fn phase_at(&self, t: f64) -> Phase {
        self.sample(t).phase
    }

    /// Kinematics at simulated time `t`; negative or non-finite `t` reads as 0.
    pub fn sample(&self, t: f64) -> FlightSample {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };

        if t >= self.landing_time() {
            return FlightSample::landed(t, self.landing_drift());
        }

        if self.kind == FlightKind::Grounded {
            return FlightSample {
                time: t,
                phase: Phase::Boost,
                altitude: 0.0,
                velocity: 0.0,
                acceleration: 0.0,
                downrange: 0.0,
            };
        }

        let (phase, altitude, velocity, acceleration) = if t < self.burn_time {
            let a = self.boost_accel;
            (Phase::Boost, 0.5 * a * t * t, a * t, a)
        } else if t < self.apogee_time() {
            let tau = t - self.burn_time;
            let d = self.coast_decel;
            (
                Phase::Coast,
                self.burnout_altitude + self.burnout_velocity * tau - 0.5 * d * tau * tau,
                self.burnout_velocity - d * tau,
                -d,
            )
        } else {
            let (altitude, velocity, acceleration) = self.descent(t - self.apogee_time());
            (Phase::Recovery, altitude, velocity, acceleration)
        };

        FlightSample {
            time: t,
            phase,
            altitude: altitude.max(0.0),
            velocity,
            acceleration,
            downrange: self.downrange_at(t),
        }
    }

    /// Altitude, velocity, acceleration `tau` seconds after apogee.
    fn descent(&self, tau: f64) -> (f64, f64, f64) {
        let v_t = self.descent_rate;
        let tau_terminal = v_t / G0;
        if tau < tau_terminal {
            (self.apogee - 0.5 * G0 * tau * tau, -G0 * tau, -G0)
        } else {
            let fall = v_t * v_t / (2.0 * G0);
            (self.apogee - fall - v_t * (tau - tau_terminal), -v_t, 0.0)
        }
    }

    fn downrange_at(&self, t: f64) -> f64 {
        if self.kind != FlightKind::Flight {
            return 0.0;
        }
        let t_b = self.burn_time;
        let v_hb = self.horizontal_accel * t_b;
        let x_b = 0.5 * self.horizontal_accel * t_b * t_b;
        let t_a = self.apogee_time();
        let t = t.min(self.landing_time());

        if t < t_b {
            0.5 * self.horizontal_accel * t * t
        } else if t < t_a {
            x_b + v_hb * (t - t_b)
        } else {
            x_b + v_hb * self.coast_time + self.wind_speed * (t - t_a)
        }
    }
}

/// Seconds to fall `height` from rest when speed saturates at `v_t`.
fn fall_time(height: f64, v_t: f64) -> f64 {
    let free_fall = v_t * v_t / (2.0 * G0);
    if height <= free_fall {
        (2.0 * height / G0).sqrt()
    } else {
        v_t / G0 + (height - free_fall) / v_t
    }
}

/// Kinematics of `assembly` under `conditions` at time `t`.
///
/// Pure convenience form of [`FlightProfile::sample`]; derive the profile
/// once and sample it directly when scrubbing many times.
pub fn step(assembly: &Assembly, conditions: &LaunchConditions, t: f64) -> FlightSample {
    FlightProfile::new(assembly, conditions).sample(t)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{keys, presets, ComponentBuilder, Properties};
    use approx::assert_abs_diff_eq;

    fn sport() -> FlightProfile {
        FlightProfile::new(&presets::sport_c6(), &LaunchConditions::default())
    }

    #[test]
    fn sport_rocket_flies_through_all_phases() {
        let p = sport();
        assert_eq!(p.kind, FlightKind::Flight);
        assert_eq!(p.phase_at(0.0), Phase::Boost);
        assert_eq!(p.phase_at(p.burn_time + 0.01), Phase::Coast);
        assert_eq!(p.phase_at(p.apogee_time() + 0.01), Phase::Recovery);
        assert_eq!(p.phase_at(p.landing_time()), Phase::Landed);
        assert_eq!(p.phase_at(p.landing_time() + 1000.0), Phase::Landed);
        assert!(p.apogee > 100.0 && p.apogee < 500.0, "apogee {:.1}", p.apogee);
    }

    #[test]
    fn sport_rocket_numbers() {
        let p = sport();
        assert_abs_diff_eq!(p.burn_time, 10.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.burnout_velocity, 68.32, epsilon = 0.01);
        assert_abs_diff_eq!(p.apogee, 253.8, epsilon = 0.1);
        assert_abs_diff_eq!(p.descent_rate, 5.69, epsilon = 0.01);
        assert_abs_diff_eq!(p.landing_time(), 52.33, epsilon = 0.01);
    }

    /// Sport rocket without its parachute: falls at the airframe's own
    /// terminal rate, or without any drag at all.
    fn ballistic(drag: bool) -> Assembly {
        let mut a = presets::sport_c6();
        let chute = a
            .components()
            .iter()
            .find(|c| c.recovery_device().is_some())
            .map(|c| c.id)
            .unwrap();
        a.remove_component(chute).unwrap();
        if !drag {
            let ids: Vec<_> = a.components().iter().map(|c| c.id).collect();
            for id in ids {
                let patch: Properties = [(keys::CD.to_string(), 0.0)].into_iter().collect();
                a.update_properties(id, patch).unwrap();
            }
        }
        a
    }

    /// Every recovery model: parachute, streamer, bare airframe, vacuum.
    fn flights() -> Vec<(String, FlightProfile)> {
        let c = LaunchConditions::default();
        [
            ("parachute", presets::sport_c6()),
            ("streamer", presets::streamer_dart()),
            ("ballistic", ballistic(true)),
            ("drag-free", ballistic(false)),
        ]
        .into_iter()
        .map(|(name, a)| (name.to_string(), FlightProfile::new(&a, &c)))
        .collect()
    }

    #[test]
    fn recovery_models_cover_finite_and_infinite_rates() {
        let rates: Vec<f64> = flights().iter().map(|(_, p)| p.descent_rate).collect();
        assert!(rates[0] < rates[1], "streamer should fall faster than parachute");
        assert!(rates[2].is_finite() && rates[2] > rates[1]);
        assert!(rates[3].is_infinite());
    }

    #[test]
    fn altitude_and_velocity_continuous_at_burnout() {
        let eps = 1e-7;
        for (name, p) in flights() {
            assert_eq!(p.kind, FlightKind::Flight, "{name}");
            let before = p.sample(p.burn_time - eps);
            let after = p.sample(p.burn_time + eps);
            assert_abs_diff_eq!(before.altitude, after.altitude, epsilon = 1e-4);
            assert_abs_diff_eq!(before.velocity, after.velocity, epsilon = 1e-4);
        }
    }

    #[test]
    fn altitude_and_velocity_continuous_at_apogee() {
        let eps = 1e-7;
        for (name, p) in flights() {
            let before = p.sample(p.apogee_time() - eps);
            let after = p.sample(p.apogee_time() + eps);
            assert_abs_diff_eq!(before.altitude, p.apogee, epsilon = 1e-4);
            assert_abs_diff_eq!(after.altitude, p.apogee, epsilon = 1e-4);
            assert_abs_diff_eq!(before.velocity, after.velocity, epsilon = 1e-4);
            assert_eq!(after.phase, Phase::Recovery, "{name}");
        }
    }

    #[test]
    fn altitude_reaches_zero_at_landing() {
        for (name, p) in flights() {
            let before = p.sample(p.landing_time() - 1e-7);
            assert_abs_diff_eq!(before.altitude, 0.0, epsilon = 1e-4);
            assert!(before.velocity < 0.0, "{name}");
            assert_abs_diff_eq!(-before.velocity, p.impact_speed(), epsilon = 1e-4);
            let at = p.sample(p.landing_time());
            assert_eq!(at.altitude, 0.0);
            assert_eq!(at.velocity, 0.0);
        }
    }

    #[test]
    fn altitude_never_negative() {
        let p = FlightProfile::new(&presets::streamer_dart(), &LaunchConditions::default());
        let end = p.landing_time() + 5.0;
        let mut t = 0.0;
        while t < end {
            let s = p.sample(t);
            assert!(s.altitude >= 0.0, "negative altitude at t={t}");
            if t >= p.landing_time() {
                assert_eq!(s.altitude, 0.0);
            }
            t += 0.05;
        }
    }

    #[test]
    fn velocity_is_zero_at_apogee_and_negative_on_descent() {
        let p = sport();
        assert_abs_diff_eq!(p.sample(p.apogee_time() - 1e-9).velocity, 0.0, epsilon = 1e-6);
        let s = p.sample(p.apogee_time() + 10.0);
        assert_eq!(s.phase, Phase::Recovery);
        assert_abs_diff_eq!(s.velocity, -p.descent_rate, epsilon = 1e-12);
    }

    #[test]
    fn streamer_descends_faster_than_parachute() {
        let rocket = presets::sport_c6();
        let mut streamer = presets::sport_c6();
        let chute = rocket
            .components()
            .iter()
            .find(|c| c.recovery_device().is_some())
            .map(|c| c.id)
            .unwrap();
        streamer.remove_component(chute).unwrap();
        streamer.add(ComponentBuilder::recovery("Streamer").mass(8.0).position(75.0));

        let c = LaunchConditions::default();
        let p_chute = FlightProfile::new(&rocket, &c);
        let p_streamer = FlightProfile::new(&streamer, &c);
        assert!(p_streamer.descent_rate > p_chute.descent_rate);
        assert!(p_streamer.descent_time < p_chute.descent_time);
    }

    #[test]
    fn no_motor_is_landed_from_the_start() {
        let a = Assembly::new("glider").with(ComponentBuilder::nose_cone("Ogive"));
        let p = FlightProfile::new(&a, &LaunchConditions::default());
        assert_eq!(p.kind, FlightKind::Unpowered);
        assert_eq!(p.landing_time(), 0.0);
        let s = p.sample(3.0);
        assert_eq!(s.phase, Phase::Landed);
        assert_eq!(s.altitude, 0.0);
    }

    #[test]
    fn zero_thrust_motor_is_unpowered() {
        let a = presets::sport_c6().with(ComponentBuilder::motor("Dud").prop(keys::THRUST, 0.0));
        // the C6 still burns; a rocket with only the dud does not
        assert_eq!(FlightProfile::new(&a, &LaunchConditions::default()).kind, FlightKind::Flight);
        let dud = Assembly::new("dud").with(ComponentBuilder::motor("Dud").prop(keys::THRUST, 0.0));
        let p = FlightProfile::new(&dud, &LaunchConditions::default());
        assert_eq!(p.kind, FlightKind::Unpowered);
        assert_eq!(p.sample(0.0).phase, Phase::Landed);
    }

    #[test]
    fn underpowered_rocket_stays_on_pad() {
        let heavy = presets::sport_c6().with(ComponentBuilder::body_tube("Ballast").mass(2000.0));
        let p = FlightProfile::new(&heavy, &LaunchConditions::default());
        assert_eq!(p.kind, FlightKind::Grounded);
        let s = p.sample(p.burn_time / 2.0);
        assert_eq!(s.phase, Phase::Boost);
        assert_eq!(s.altitude, 0.0);
        assert_eq!(p.sample(p.burn_time).phase, Phase::Landed);
    }

    #[test]
    fn canted_launch_trades_altitude_for_range() {
        let rocket = presets::sport_c6();
        let vertical = FlightProfile::new(
            &rocket,
            &LaunchConditions { wind_speed: 0.0, ..Default::default() },
        );
        let canted = FlightProfile::new(
            &rocket,
            &LaunchConditions { wind_speed: 0.0, launch_angle: 60.0, ..Default::default() },
        );
        assert!(canted.apogee < vertical.apogee);
        assert!(canted.landing_drift() > vertical.landing_drift());
    }

    #[test]
    fn wind_drifts_the_descent() {
        let rocket = presets::sport_c6();
        let calm = LaunchConditions { wind_speed: 0.0, ..Default::default() };
        let windy = LaunchConditions { wind_speed: 8.0, ..Default::default() };
        let calm = FlightProfile::new(&rocket, &calm);
        let windy = FlightProfile::new(&rocket, &windy);
        assert_abs_diff_eq!(
            windy.landing_drift() - calm.landing_drift(),
            8.0 * windy.descent_time,
            epsilon = 1e-6
        );
        let s = windy.sample(windy.landing_time() + 1.0);
        assert_eq!(s.position().x, windy.landing_drift());
        assert_eq!(s.position().z, 0.0);
    }

    #[test]
    fn thin_air_flies_higher() {
        let rocket = presets::sport_c6();
        let sea = FlightProfile::new(&rocket, &LaunchConditions::default());
        let high = FlightProfile::new(
            &rocket,
            &LaunchConditions { pressure: 700.0, temperature: 5.0, ..Default::default() },
        );
        assert!(high.apogee > sea.apogee);
    }

    #[test]
    fn step_matches_profile_sample() {
        let rocket = presets::sport_c6();
        let c = LaunchConditions::default();
        let p = FlightProfile::new(&rocket, &c);
        for t in [0.0, 0.5, 3.0, 12.0, 60.0] {
            assert_eq!(step(&rocket, &c, t), p.sample(t));
        }
    }

    #[test]
    fn negative_and_nan_time_read_as_zero() {
        let p = sport();
        assert_eq!(p.sample(-3.0), p.sample(0.0));
        assert_eq!(p.sample(f64::NAN), p.sample(0.0));
    }
}
