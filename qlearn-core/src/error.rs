//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Module-level APIs return [`anyhow::Result`]; a caller that needs to react to a
/// particular failure recovers it with `err.downcast_ref::<QlError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QlError {
    /// A setup argument that cannot be clamped to a sane value.
    ///
    /// Out-of-range hyperparameters in configs never produce this error, they are
    /// replaced with defaults and a warning is logged.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A loaded table or model does not match the configured dimensions.
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Shape derived from `state_dims` and `action_size`.
        expected: Vec<usize>,

        /// Shape of the loaded data.
        found: Vec<usize>,
    },

    /// A raw state violates the declared dimension cardinalities.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A batch was requested from a buffer holding fewer transitions.
    #[error("Insufficient data: requested {requested}, available {available}")]
    InsufficientData {
        /// Requested batch size.
        requested: usize,

        /// Number of stored transitions.
        available: usize,
    },

    /// The learning module was used before `setup_module()` succeeded.
    #[error("Learning module is not initialized, call setup_module() first")]
    NotInitialized,

    /// Action index out of `[0, action_size)`.
    #[error("Invalid action {action}, the number of actions is {action_size}")]
    InvalidAction {
        /// Given action.
        action: usize,

        /// Number of actions.
        action_size: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKey(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueType(String),
}
