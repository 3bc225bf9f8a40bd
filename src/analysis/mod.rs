pub mod performance;
pub mod stability;

pub use performance::{FlightSummary, TARGET_DESCENT_RATE};
pub use stability::{analyze, Recommendation, Stability, StabilityReport};
