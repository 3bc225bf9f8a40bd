pub mod component;
pub mod motor;
pub mod recovery;
pub mod rocket;

pub use component::{keys, Component, ComponentBuilder, ComponentId, ComponentKind, Properties};
pub use motor::{Designation, MotorSpec};
pub use recovery::RecoveryDevice;
pub use rocket::{presets, Assembly};
