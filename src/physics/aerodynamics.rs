use std::f64::consts::PI;

use super::atmosphere::Atmo;
use super::G0;

/// Aerodynamic drag magnitude (N) at `speed` (m/s).
pub fn drag_force(speed: f64, atm: &Atmo, cd: f64, area: f64) -> f64 {
    if speed.abs() > 1e-6 {
        0.5 * atm.density * speed * speed * cd * area
    } else {
        0.0
    }
}

/// Steady descent rate (m/s, positive) where drag balances weight.
///
/// Returns `f64::INFINITY` when there is nothing to produce drag.
pub fn terminal_velocity(mass: f64, atm: &Atmo, cd: f64, area: f64) -> f64 {
    let k = atm.density * cd * area;
    if k > 0.0 {
        (2.0 * mass * G0 / k).sqrt()
    } else {
        f64::INFINITY
    }
}

/// Frontal area of a circle of the given diameter.
pub fn circle_area(diameter: f64) -> f64 {
    PI * diameter * diameter / 4.0
}

// ---------------------------------------------------------------------------
// Barrowman normal-force terms
//
// All lengths in one consistent unit; the slopes are per radian and referred
// to the frontal area of `ref_diameter`.
// ---------------------------------------------------------------------------

/// Normal-force slope of any nose cone.
pub const NOSE_CN_ALPHA: f64 = 2.0;

/// Nose cone CP as a fraction of its length, by profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoseShape {
    Conical,
    Ogive,
    Parabolic,
}

impl NoseShape {
    /// Guess the profile from a catalogue label; ogive when unknown.
    pub fn from_name(name: &str) -> NoseShape {
        let n = name.to_ascii_lowercase();
        if n.contains("conic") {
            NoseShape::Conical
        } else if n.contains("parabol") {
            NoseShape::Parabolic
        } else {
            NoseShape::Ogive
        }
    }

    pub fn cp_fraction(self) -> f64 {
        match self {
            NoseShape::Conical => 0.666,
            NoseShape::Ogive => 0.466,
            NoseShape::Parabolic => 0.5,
        }
    }
}

const BODY_LIFT_K: f64 = 1.1;
const BODY_REF_ALPHA: f64 = 5.0 * PI / 180.0;

/// Linearised body-lift slope of a cylindrical tube at a 5° reference angle.
pub fn body_cn_alpha(length: f64, diameter: f64, ref_diameter: f64) -> f64 {
    let a_ref = circle_area(ref_diameter);
    if a_ref <= 0.0 {
        return 0.0;
    }
    let planform = length * diameter;
    BODY_LIFT_K * planform / a_ref * BODY_REF_ALPHA
}

/// Trapezoidal fin set geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinGeometry {
    pub count: f64,
    pub root_chord: f64,
    pub tip_chord: f64,
    pub span: f64,
    pub sweep: f64, // leading-edge sweep length
}

impl FinGeometry {
    /// Fin normal-force slope including fin-body interference.
    pub fn cn_alpha(&self, body_diameter: f64, ref_diameter: f64) -> f64 {
        let (cr, ct, s) = (self.root_chord, self.tip_chord, self.span);
        if s <= 0.0 || cr + ct <= 0.0 || ref_diameter <= 0.0 || self.count <= 0.0 {
            return 0.0;
        }
        let radius = body_diameter / 2.0;
        let mid_chord = self.mid_chord_length();
        let cn = 4.0 * self.count * (s / ref_diameter).powi(2)
            / (1.0 + (1.0 + (2.0 * mid_chord / (cr + ct)).powi(2)).sqrt());
        let interference = 1.0 + radius / (s + radius);
        interference * cn
    }

    /// CP of the fin set measured aft of the root leading edge.
    pub fn cp_offset(&self) -> f64 {
        let (cr, ct, xr) = (self.root_chord, self.tip_chord, self.sweep);
        let sum = cr + ct;
        if sum <= 0.0 {
            return 0.0;
        }
        xr * (cr + 2.0 * ct) / (3.0 * sum) + (sum - cr * ct / sum) / 6.0
    }

    fn mid_chord_length(&self) -> f64 {
        let dx = self.sweep + self.tip_chord / 2.0 - self.root_chord / 2.0;
        (self.span * self.span + dx * dx).sqrt()
    }
}
