use serde::{Deserialize, Serialize};

use crate::physics::{G0, GRAM};
use super::component::{keys, Component, ComponentKind};

/// Effective specific impulse of a black-powder hobby motor, s.
pub const ISP_BLACK_POWDER: f64 = 80.0;

// Fallbacks for a motor with neither a readable designation nor properties:
// a C6.
const DEFAULT_THRUST: f64 = 6.0;
const DEFAULT_IMPULSE: f64 = 10.0;
const CASING_RATIO: f64 = 2.0; // loaded mass / propellant mass

// ---------------------------------------------------------------------------
// NAR/CAR motor designation: "C6-5" = class C, 6 N average, 5 s delay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Designation {
    pub total_impulse: f64, // N·s, upper bound of the impulse class
    pub thrust: f64,        // N
    pub delay: Option<f64>, // s, None for plugged boosters
}

impl Designation {
    /// Decode a motor code such as `A8-3`, `1/2A6-2`, `G80-10T` or `D12-P`.
    pub fn parse(code: &str) -> Option<Designation> {
        let code = code.trim().to_ascii_uppercase();

        let (fraction, rest) = if let Some(rest) = code.strip_prefix("1/8") {
            (0.125, rest)
        } else if let Some(rest) = code.strip_prefix("1/4") {
            (0.25, rest)
        } else if let Some(rest) = code.strip_prefix("1/2") {
            (0.5, rest)
        } else {
            (1.0, code.as_str())
        };

        let mut chars = rest.chars();
        let class = chars.next()?;
        if !('A'..='O').contains(&class) {
            return None;
        }
        if fraction < 1.0 && class != 'A' {
            return None;
        }
        let total_impulse = 2.5 * 2f64.powi((class as u32 - 'A' as u32) as i32) * fraction;

        let rest = chars.as_str();
        let (thrust_str, delay_str) = match rest.split_once('-') {
            Some((t, d)) => (t, Some(d)),
            None => (rest, None),
        };
        let thrust: f64 = leading_number(thrust_str)?;
        if thrust <= 0.0 {
            return None;
        }

        let delay = match delay_str {
            Some(d) if d.starts_with('P') => None,
            Some(d) => leading_number(d),
            None => None,
        };

        Some(Designation { total_impulse, thrust, delay })
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

// ---------------------------------------------------------------------------
// Resolved motor parameters
// ---------------------------------------------------------------------------

/// Motor parameters resolved from explicit properties, then the designation
/// in the component name, then category defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorSpec {
    pub thrust: f64,          // N, average
    pub burn_time: f64,       // s
    pub propellant_mass: f64, // g
    pub loaded_mass: f64,     // g
    pub delay: Option<f64>,   // s
}

impl MotorSpec {
    pub fn from_component(c: &Component) -> MotorSpec {
        let prop = |k: &str| c.property(k).map(|v| v.max(0.0));
        let designation = Designation::parse(&c.name);

        let (t, i, b) = (prop(keys::THRUST), prop(keys::TOTAL_IMPULSE), prop(keys::BURN_TIME));

        let thrust = t
            .or_else(|| match (i, b) {
                (Some(i), Some(b)) if b > 0.0 => Some(i / b),
                _ => None,
            })
            .or(designation.map(|d| d.thrust))
            .unwrap_or(DEFAULT_THRUST);

        let impulse_hint = i
            .or_else(|| t.zip(b).map(|(t, b)| t * b))
            .or(designation.map(|d| d.total_impulse))
            .unwrap_or(DEFAULT_IMPULSE);

        // an explicit burn time wins over impulse / thrust
        let burn_time = b.unwrap_or(if thrust > 0.0 { impulse_hint / thrust } else { 0.0 });

        let impulse = thrust * burn_time;
        let propellant_estimate = prop(keys::PROPELLANT_MASS)
            .unwrap_or(impulse / (ISP_BLACK_POWDER * G0) / GRAM);

        let loaded_mass = prop(keys::MASS).unwrap_or_else(|| {
            (propellant_estimate * CASING_RATIO).max(ComponentKind::Motor.default_mass())
        });

        MotorSpec {
            thrust,
            burn_time,
            propellant_mass: propellant_estimate.min(loaded_mass),
            loaded_mass,
            delay: prop(keys::DELAY).or(designation.and_then(|d| d.delay)),
        }
    }

    /// Delivered total impulse, N·s.
    pub fn total_impulse(&self) -> f64 {
        self.thrust * self.burn_time
    }
}
