//! Planning error taxonomy
//!
//! Configuration and validation failures are raised before any write; storage
//! failures inside the save transaction roll everything back and surface as a
//! single error. Post-commit side-effect failures are NOT errors — they are
//! collected as warnings on the successful response.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Required input missing or unresolvable (empty scope, no service
    /// areas). Not retriable without changed input.
    #[error("{0}")]
    Configuration(String),

    /// Payload rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A requested resource is in a conflicting state, e.g. the pinned
    /// technician already has an overlapping trip.
    #[error("{0}")]
    Conflict(String),

    #[error("no technician is available for the requested window")]
    NoAvailableTechnician,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PlanError {
    /// Stable error code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::Configuration(_) => "CONFIGURATION_ERROR",
            PlanError::Validation(_) => "VALIDATION_ERROR",
            PlanError::NotFound(_) => "NOT_FOUND",
            PlanError::Conflict(_) => "CONFLICT",
            PlanError::NoAvailableTechnician => "NO_AVAILABLE_TECHNICIAN",
            PlanError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
