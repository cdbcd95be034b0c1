//! Error types for the bounded containers
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Container Error Enum ==
/// Unified error type for the bounded containers.
///
/// Every variant is a caller-induced precondition violation. Absence of a key
/// in a cache is not an error and is reported as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// Invalid construction argument or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Insert attempted on a full heap
    #[error("Capacity exceeded: heap already holds {capacity} entries")]
    CapacityExceeded { capacity: usize },

    /// Insert of a key that is already present
    #[error("Duplicate key: {0}")]
    DuplicateKey(i64),

    /// Removal of the minimum from an empty heap
    #[error("Empty structure: no entry to remove")]
    EmptyStructure,
}

// == Result Type Alias ==
/// Convenience Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
