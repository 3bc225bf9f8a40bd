use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SimError};
use super::component::{
    keys, Component, ComponentBuilder, ComponentId, ComponentKind, Properties, DEFAULT_DIAMETER,
};
use super::motor::MotorSpec;
use super::recovery::RecoveryDevice;

// ---------------------------------------------------------------------------
// Assembly: ordered sequence of components, nose to tail
// ---------------------------------------------------------------------------

/// The rocket under design, kept sorted nose to tail by `position`; parts at
/// the same station stay in insertion order. Every mutation bumps `revision`,
/// so callers can memoize derived reports against it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assembly {
    pub name: String,
    components: Vec<Component>,
    next_id: u64,
    revision: u64,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Append a component. A `position` entry in `properties` places it
    /// explicitly; otherwise it is placed by category (see [`Self::auto_position`]).
    pub fn add_component(
        &mut self,
        kind: ComponentKind,
        name: impl Into<String>,
        mut properties: Properties,
    ) -> ComponentId {
        let position = properties
            .remove(keys::POSITION)
            .unwrap_or_else(|| self.auto_position(kind, &properties));
        self.insert(kind, name.into(), position, properties)
    }

    pub fn add_component_at(
        &mut self,
        kind: ComponentKind,
        name: impl Into<String>,
        position: f64,
        properties: Properties,
    ) -> ComponentId {
        self.insert(kind, name.into(), position, properties)
    }

    pub fn add(&mut self, builder: ComponentBuilder) -> ComponentId {
        let ComponentBuilder { kind, name, position, mut properties } = builder;
        let position = position
            .or_else(|| properties.remove(keys::POSITION))
            .unwrap_or_else(|| self.auto_position(kind, &properties));
        self.insert(kind, name, position, properties)
    }

    /// Chaining form of [`Self::add`].
    pub fn with(mut self, builder: ComponentBuilder) -> Self {
        self.add(builder);
        self
    }

    fn insert(
        &mut self,
        kind: ComponentKind,
        name: String,
        position: f64,
        properties: Properties,
    ) -> ComponentId {
        self.next_id += 1;
        let id = ComponentId(self.next_id);
        let position = sanitize_position(position);
        let idx = self.components.partition_point(|c| c.position <= position);
        debug!(%id, %kind, %name, position, idx, "component added");
        self.components.insert(idx, Component { id, kind, name, position, properties });
        self.revision += 1;
        id
    }

    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component> {
        let idx = self.index_of(id)?;
        let removed = self.components.remove(idx);
        self.revision += 1;
        debug!(%id, kind = %removed.kind, "component removed");
        Ok(removed)
    }

    /// Merge `patch` into the component's properties, in place. A `position`
    /// entry moves the component.
    pub fn update_properties(&mut self, id: ComponentId, mut patch: Properties) -> Result<()> {
        let idx = self.index_of(id)?;
        let component = &mut self.components[idx];
        let moved = patch.remove(keys::POSITION).map(sanitize_position);
        if let Some(pos) = moved {
            component.position = pos;
        }
        let changed = patch.len();
        component.properties.extend(patch);
        if moved.is_some() {
            // stable, so equal stations keep their relative order
            self.components.sort_by(|a, b| a.position.total_cmp(&b.position));
        }
        self.revision += 1;
        debug!(%id, changed, "component properties updated");
        Ok(())
    }

    pub fn clear(&mut self) {
        debug!(count = self.components.len(), "assembly cleared");
        self.components.clear();
        self.revision += 1;
    }

    fn index_of(&self, id: ComponentId) -> Result<usize> {
        self.components
            .iter()
            .position(|c| c.id == id)
            .ok_or(SimError::NotFound(id))
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Aft end of the nose cones and body tubes, mm.
    pub fn airframe_length(&self) -> f64 {
        self.components
            .iter()
            .filter(|c| c.kind.is_airframe())
            .map(Component::aft_end)
            .fold(0.0, f64::max)
    }

    /// Aft end of the rearmost component of any kind, mm.
    pub fn overall_length(&self) -> f64 {
        self.components.iter().map(Component::aft_end).fold(0.0, f64::max)
    }

    /// Largest nose cone or body tube diameter, mm.
    pub fn reference_diameter(&self) -> f64 {
        self.components
            .iter()
            .filter(|c| c.kind.is_airframe())
            .map(Component::diameter)
            .filter(|d| *d > 0.0)
            .reduce(f64::max)
            .unwrap_or(DEFAULT_DIAMETER)
    }

    pub fn motors(&self) -> impl Iterator<Item = MotorSpec> + '_ {
        self.components.iter().filter_map(Component::motor)
    }

    /// The first recovery device, nose to tail.
    pub fn recovery_device(&self) -> Option<RecoveryDevice> {
        self.components.iter().find_map(Component::recovery_device)
    }

    /// Sum of component drag contributions.
    pub fn drag_coefficient(&self) -> f64 {
        self.components.iter().map(Component::cd).sum()
    }

    /// Default placement for a component that carries no explicit position:
    /// nose cones and body tubes stack at the aft end of the airframe, fins and
    /// motors sit flush with that end, recovery devices sit just behind the
    /// first nose cone.
    pub fn auto_position(&self, kind: ComponentKind, properties: &Properties) -> f64 {
        let airframe = self.airframe_length();
        match kind {
            ComponentKind::NoseCone | ComponentKind::BodyTube => airframe,
            ComponentKind::FinSet | ComponentKind::Motor => {
                let own_length = properties
                    .get(keys::LENGTH)
                    .copied()
                    .filter(|v| v.is_finite())
                    .map_or(kind.default_length(), |v| v.max(0.0));
                (airframe - own_length).max(0.0)
            }
            ComponentKind::Recovery => self
                .components
                .iter()
                .find(|c| c.kind == ComponentKind::NoseCone)
                .map_or(0.0, Component::aft_end),
        }
    }
}

fn sanitize_position(position: f64) -> f64 {
    if position.is_finite() {
        position.max(0.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Preset rockets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Single-stage sport rocket on a C6-5 with a 300 mm parachute.
    pub fn sport_c6() -> Assembly {
        Assembly::new("Sport C6")
            .with(ComponentBuilder::nose_cone("Ogive").mass(12.0).length(70.0).diameter(25.0))
            .with(
                ComponentBuilder::body_tube("Standard Tube")
                    .mass(20.0)
                    .length(250.0)
                    .diameter(25.0),
            )
            .with(ComponentBuilder::recovery("Parachute").mass(8.0).position(75.0))
            .with(
                ComponentBuilder::fin_set("Trapezoidal")
                    .mass(9.0)
                    .length(60.0)
                    .position(260.0)
                    .prop(keys::SPAN, 35.0),
            )
            .with(ComponentBuilder::motor("C6-5").position(250.0))
    }

    /// Small streamer-recovered dart on an A8-3.
    pub fn streamer_dart() -> Assembly {
        Assembly::new("Streamer Dart")
            .with(ComponentBuilder::nose_cone("Conical").mass(6.0).length(50.0).diameter(18.0))
            .with(
                ComponentBuilder::body_tube("Standard Tube")
                    .mass(10.0)
                    .length(180.0)
                    .diameter(18.0),
            )
            .with(ComponentBuilder::recovery("Streamer").mass(3.0).position(55.0))
            .with(
                ComponentBuilder::fin_set("Delta")
                    .mass(4.0)
                    .length(50.0)
                    .position(180.0)
                    .prop(keys::FIN_COUNT, 4.0)
                    .prop(keys::SPAN, 20.0)
                    .prop(keys::TIP_CHORD, 10.0),
            )
            .with(ComponentBuilder::motor("A8-3").mass(16.0).position(160.0))
    }
}
