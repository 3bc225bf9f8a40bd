pub mod analysis;
pub mod assembly;
pub mod config;
pub mod error;
pub mod physics;
pub mod sim;

pub use analysis::{analyze, FlightSummary, Stability, StabilityReport};
pub use assembly::{presets, Assembly, Component, ComponentBuilder, ComponentId, ComponentKind};
pub use config::SimConfig;
pub use error::{Result, SimError};
pub use sim::{
    step, EventKind, FlightEvent, FlightProfile, FlightSample, LaunchConditions, Phase, RunState,
    SimulationController,
};
