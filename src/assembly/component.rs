use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::physics::aerodynamics::{FinGeometry, NoseShape};
use super::motor::MotorSpec;
use super::recovery::RecoveryDevice;

/// Open-ended physical properties; the unit is implied by the key.
pub type Properties = BTreeMap<String, f64>;

/// Recognised property keys.
pub mod keys {
    pub const POSITION: &str = "position";               // mm from nose tip
    pub const MASS: &str = "mass";                       // g
    pub const LENGTH: &str = "length";                   // mm
    pub const DIAMETER: &str = "diameter";               // mm
    pub const CD: &str = "cd";
    pub const CN_ALPHA: &str = "cn_alpha";               // 1/rad
    pub const FIN_COUNT: &str = "fin_count";
    pub const SPAN: &str = "span";                       // mm
    pub const TIP_CHORD: &str = "tip_chord";             // mm
    pub const SWEEP: &str = "sweep";                     // mm
    pub const THRUST: &str = "thrust";                   // N
    pub const TOTAL_IMPULSE: &str = "total_impulse";     // N·s
    pub const BURN_TIME: &str = "burn_time";             // s
    pub const PROPELLANT_MASS: &str = "propellant_mass"; // g
    pub const DELAY: &str = "delay";                     // s
    pub const CANOPY_DIAMETER: &str = "canopy_diameter"; // mm
    pub const STREAMER_LENGTH: &str = "streamer_length"; // mm
    pub const STREAMER_WIDTH: &str = "streamer_width";   // mm
}

/// Outer diameter used when a nose cone or body tube does not declare one, mm.
pub const DEFAULT_DIAMETER: f64 = 25.0;

const DEFAULT_FIN_COUNT: f64 = 3.0;
const DEFAULT_FIN_SPAN: f64 = 50.0;
const DEFAULT_FIN_TIP_CHORD: f64 = 30.0;

// ---------------------------------------------------------------------------
// Identity and category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    NoseCone,
    BodyTube,
    FinSet,
    Motor,
    Recovery,
}

impl ComponentKind {
    /// Mass assumed when the component carries no `mass` property, g.
    pub fn default_mass(self) -> f64 {
        match self {
            ComponentKind::NoseCone => 15.0,
            ComponentKind::BodyTube => 25.0,
            ComponentKind::FinSet => 10.0,
            ComponentKind::Motor => 24.0,
            ComponentKind::Recovery => 8.0,
        }
    }

    /// Length assumed when the component carries no `length` property, mm.
    pub fn default_length(self) -> f64 {
        match self {
            ComponentKind::NoseCone => 70.0,
            ComponentKind::BodyTube => 200.0,
            ComponentKind::FinSet => 60.0,
            ComponentKind::Motor => 70.0,
            ComponentKind::Recovery => 30.0,
        }
    }

    /// Drag-coefficient contribution referred to the body frontal area.
    pub fn default_cd(self) -> f64 {
        match self {
            ComponentKind::NoseCone => 0.10,
            ComponentKind::BodyTube => 0.25,
            ComponentKind::FinSet => 0.15,
            ComponentKind::Motor | ComponentKind::Recovery => 0.0,
        }
    }

    /// Nose cones and body tubes form the outer airframe and stack end to end.
    pub fn is_airframe(self) -> bool {
        matches!(self, ComponentKind::NoseCone | ComponentKind::BodyTube)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentKind::NoseCone => "nose cone",
            ComponentKind::BodyTube => "body tube",
            ComponentKind::FinSet => "fin set",
            ComponentKind::Motor => "motor",
            ComponentKind::Recovery => "recovery",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// One part of the rocket. `position` is the axial offset of its forward end
/// from the nose tip, in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub name: String,
    pub position: f64,
    pub properties: Properties,
}

impl Component {
    /// A finite property value, if present.
    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied().filter(|v| v.is_finite())
    }

    fn non_negative(&self, key: &str) -> Option<f64> {
        self.property(key).map(|v| v.max(0.0))
    }

    /// Mass in grams; motors default to their loaded mass estimate.
    pub fn mass(&self) -> f64 {
        if let Some(m) = self.non_negative(keys::MASS) {
            return m;
        }
        match self.motor() {
            Some(motor) => motor.loaded_mass,
            None => self.kind.default_mass(),
        }
    }

    pub fn length(&self) -> f64 {
        self.non_negative(keys::LENGTH)
            .unwrap_or_else(|| self.kind.default_length())
    }

    pub fn diameter(&self) -> f64 {
        self.non_negative(keys::DIAMETER).unwrap_or(DEFAULT_DIAMETER)
    }

    pub fn cd(&self) -> f64 {
        self.non_negative(keys::CD)
            .unwrap_or_else(|| self.kind.default_cd())
    }

    /// Length-weighted centroid, mm from nose tip.
    pub fn centroid(&self) -> f64 {
        self.position + self.length() / 2.0
    }

    pub fn aft_end(&self) -> f64 {
        self.position + self.length()
    }

    pub fn nose_shape(&self) -> Option<NoseShape> {
        (self.kind == ComponentKind::NoseCone).then(|| NoseShape::from_name(&self.name))
    }

    /// Trapezoidal geometry of a fin set; root chord is the component length.
    pub fn fin_geometry(&self) -> Option<FinGeometry> {
        if self.kind != ComponentKind::FinSet {
            return None;
        }
        let root_chord = self.length();
        let tip_chord = self
            .non_negative(keys::TIP_CHORD)
            .unwrap_or(DEFAULT_FIN_TIP_CHORD.min(root_chord));
        Some(FinGeometry {
            count: self.non_negative(keys::FIN_COUNT).unwrap_or(DEFAULT_FIN_COUNT),
            root_chord,
            tip_chord,
            span: self.non_negative(keys::SPAN).unwrap_or(DEFAULT_FIN_SPAN),
            // straight trailing edge unless told otherwise
            sweep: self
                .non_negative(keys::SWEEP)
                .unwrap_or((root_chord - tip_chord).max(0.0)),
        })
    }

    pub fn motor(&self) -> Option<MotorSpec> {
        (self.kind == ComponentKind::Motor).then(|| MotorSpec::from_component(self))
    }

    pub fn recovery_device(&self) -> Option<RecoveryDevice> {
        (self.kind == ComponentKind::Recovery).then(|| RecoveryDevice::from_component(self))
    }
}

// ---------------------------------------------------------------------------
// Component builder
// ---------------------------------------------------------------------------

/// Fluent description of a component before the assembly assigns its id.
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    pub(crate) kind: ComponentKind,
    pub(crate) name: String,
    pub(crate) position: Option<f64>,
    pub(crate) properties: Properties,
}

impl ComponentBuilder {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self { kind, name: name.into(), position: None, properties: Properties::new() }
    }

    pub fn nose_cone(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::NoseCone, name)
    }

    pub fn body_tube(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::BodyTube, name)
    }

    pub fn fin_set(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::FinSet, name)
    }

    pub fn motor(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Motor, name)
    }

    pub fn recovery(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Recovery, name)
    }

    pub fn position(mut self, v: f64) -> Self {
        self.position = Some(v);
        self
    }

    pub fn mass(self, v: f64) -> Self {
        self.prop(keys::MASS, v)
    }

    pub fn length(self, v: f64) -> Self {
        self.prop(keys::LENGTH, v)
    }

    pub fn diameter(self, v: f64) -> Self {
        self.prop(keys::DIAMETER, v)
    }

    pub fn cd(self, v: f64) -> Self {
        self.prop(keys::CD, v)
    }

    pub fn prop(mut self, key: impl Into<String>, v: f64) -> Self {
        self.properties.insert(key.into(), v);
        self
    }
}
