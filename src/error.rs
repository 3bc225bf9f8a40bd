use crate::assembly::ComponentId;

/// Errors reported by the assembly model and the simulation controller.
///
/// Every variant is local and recoverable; nothing here aborts a running
/// simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("component {0} not found in assembly")]
    NotFound(ComponentId),

    #[error("invalid launch condition `{field}` = {value}: {reason}")]
    InvalidCondition {
        field: &'static str,
        value: f64,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SimError>;
