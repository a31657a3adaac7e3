use bughunter_storage::{StoreError, UnknownCourseType};

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A store call failed. Propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Input rejected before any store mutation (negative XP, unknown
    /// course type, unknown achievement name, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<UnknownCourseType> for EngineError {
    fn from(e: UnknownCourseType) -> Self {
        EngineError::InvalidInput(e.to_string())
    }
}
