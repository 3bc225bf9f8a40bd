pub mod conditions;
pub mod controller;
pub mod event;
pub mod profile;

pub use conditions::LaunchConditions;
pub use controller::{RunState, SimulationController, TickReport};
pub use event::{events_up_to_time, EventKind, FlightEvent, Milestones};
pub use profile::{step, FlightKind, FlightProfile, FlightSample, Phase};
