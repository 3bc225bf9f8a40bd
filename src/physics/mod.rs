pub mod aerodynamics;
pub mod atmosphere;

pub use atmosphere::Atmo;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665; // standard gravity, m/s^2

/// Millimetres to metres.
pub const MM: f64 = 1.0e-3;

/// Grams to kilograms.
pub const GRAM: f64 = 1.0e-3;
