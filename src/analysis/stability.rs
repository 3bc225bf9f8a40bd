use serde::{Deserialize, Serialize};

use crate::assembly::{keys, Assembly, Component, ComponentKind};
use crate::physics::aerodynamics::{body_cn_alpha, NOSE_CN_ALPHA};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Irreducible airframe mass (adhesive, shock cord, launch lug), g.
pub const BASE_MASS: f64 = 50.0;

/// Static margin reported for an empty assembly, calibers.
pub const EMPTY_MARGIN: f64 = 0.0;

/// Stable band is `[STABLE_MIN, STABLE_MAX)` calibers.
pub const STABLE_MIN: f64 = 1.0;
pub const STABLE_MAX: f64 = 3.0;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    /// Nothing to analyze (empty assembly).
    Indeterminate,
    /// Margin below one caliber: CP too close to (or ahead of) the CG.
    Unstable,
    Stable,
    /// Margin of three calibers or more: weathercocks into the wind.
    OverStable,
}

impl Stability {
    pub fn from_margin(margin: f64) -> Stability {
        if !margin.is_finite() {
            Stability::Indeterminate
        } else if margin < STABLE_MIN {
            Stability::Unstable
        } else if margin < STABLE_MAX {
            Stability::Stable
        } else {
            Stability::OverStable
        }
    }

    pub fn is_stable(self) -> bool {
        self == Stability::Stable
    }
}

/// Design change that moves the margin toward the stable band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    AddFins,
    AddNoseWeight,
    EnlargeFins,
    MoveFinsAft,
    ReduceFinArea,
}

/// Mass and static-stability snapshot of one assembly revision.
///
/// Masses in g, axial stations in mm from the nose tip, margin in calibers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub total_mass: f64,
    pub empty_mass: f64,
    pub cg: f64,
    pub cp: f64,
    pub reference_diameter: f64,
    pub static_margin: f64,
    pub stability: Stability,
    pub recommendations: Vec<Recommendation>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Mass properties, CG, CP and static margin of `assembly`.
///
/// Pure: recomputed from scratch on every call.
pub fn analyze(assembly: &Assembly) -> StabilityReport {
    let reference_diameter = assembly.reference_diameter();

    if assembly.is_empty() {
        return StabilityReport {
            total_mass: BASE_MASS,
            empty_mass: BASE_MASS,
            cg: 0.0,
            cp: 0.0,
            reference_diameter,
            static_margin: EMPTY_MARGIN,
            stability: Stability::Indeterminate,
            recommendations: Vec::new(),
        };
    }

    let components = assembly.components();
    let length = assembly.overall_length();

    // --- Mass & CG (base mass sits mid-airframe) ---
    let component_mass: f64 = components.iter().map(Component::mass).sum();
    let total_mass = BASE_MASS + component_mass;
    let moment: f64 = BASE_MASS * length / 2.0
        + components.iter().map(|c| c.mass() * c.centroid()).sum::<f64>();
    let cg = moment / total_mass;

    let propellant: f64 = assembly.motors().map(|m| m.propellant_mass).sum();

    // --- CP ---
    let (cn_total, cn_moment) = components
        .iter()
        .filter_map(|c| normal_force(c, reference_diameter))
        .fold((0.0, 0.0), |(sum, mom), (cn, x)| (sum + cn, mom + cn * x));
    let cp = if cn_total > 0.0 { cn_moment / cn_total } else { length / 2.0 };

    let static_margin = (cp - cg) / reference_diameter;
    let stability = Stability::from_margin(static_margin);

    let has_fins = components.iter().any(|c| c.kind == ComponentKind::FinSet);

    StabilityReport {
        total_mass,
        empty_mass: total_mass - propellant,
        cg,
        cp,
        reference_diameter,
        static_margin,
        stability,
        recommendations: recommendations(stability, has_fins),
    }
}

/// Normal-force slope and its axial station for one component, if it has an
/// aerodynamic surface.
fn normal_force(c: &Component, ref_diameter: f64) -> Option<(f64, f64)> {
    let cn_override = c.property(keys::CN_ALPHA).map(|v| v.max(0.0));
    match c.kind {
        ComponentKind::NoseCone => {
            let shape = c.nose_shape()?;
            let x = c.position + shape.cp_fraction() * c.length();
            Some((cn_override.unwrap_or(NOSE_CN_ALPHA), x))
        }
        ComponentKind::BodyTube => {
            let cn = cn_override
                .unwrap_or_else(|| body_cn_alpha(c.length(), c.diameter(), ref_diameter));
            Some((cn, c.centroid()))
        }
        ComponentKind::FinSet => {
            let fins = c.fin_geometry()?;
            let cn = cn_override.unwrap_or_else(|| fins.cn_alpha(ref_diameter, ref_diameter));
            Some((cn, c.position + fins.cp_offset()))
        }
        ComponentKind::Motor | ComponentKind::Recovery => None,
    }
}

fn recommendations(stability: Stability, has_fins: bool) -> Vec<Recommendation> {
    match stability {
        Stability::Unstable if !has_fins => {
            vec![Recommendation::AddFins, Recommendation::AddNoseWeight]
        }
        Stability::Unstable => vec![
            Recommendation::AddNoseWeight,
            Recommendation::EnlargeFins,
            Recommendation::MoveFinsAft,
        ],
        Stability::OverStable => vec![Recommendation::ReduceFinArea],
        Stability::Stable | Stability::Indeterminate => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
