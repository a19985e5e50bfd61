//! CLI support for carserv
//!
//! The caller-facing layer around the engine: raw parameter validation,
//! dataset selection and response serialization. Kept free of argument
//! parsing so other front ends can embed it.

mod dataset;
pub mod params;
mod search;

pub use dataset::{DatasetSummary, check_dataset};
pub use search::{SearchOptions, SearchOutput, execute_search};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// A query parameter failed validation
    InvalidParam { name: &'static str, message: String },
    /// Dataset could not be loaded
    Load(crate::LoadError),
    /// Search aborted
    Engine(crate::EngineError),
    /// Response could not be serialized
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InvalidParam { name, message } => write!(f, "Invalid {}: {}", name, message),
            CliError::Load(e) => write!(f, "Dataset error: {}", e),
            CliError::Engine(e) => write!(f, "Search error: {}", e),
            CliError::Json(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Load(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::InvalidParam { .. } => None,
        }
    }
}

impl CliError {
    /// True for errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, CliError::InvalidParam { .. })
    }
}

impl From<crate::LoadError> for CliError {
    fn from(e: crate::LoadError) -> Self {
        CliError::Load(e)
    }
}

impl From<crate::EngineError> for CliError {
    fn from(e: crate::EngineError) -> Self {
        CliError::Engine(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
