//! Error types for the Galaxy3D asset subsystem
//!
//! Content problems (missing files, unreadable images, malformed meshes) are
//! logged and substituted with placeholders. The variants below are reserved
//! for failures the caller has to handle: device errors, exhausted GPU-side
//! tables and broken content contracts.

use std::fmt;

/// Result type for Galaxy3D asset operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D asset errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Vulkan, lock poisoning, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, sampler, etc.)
    InvalidResource(String),

    /// Initialization failed (asset manager, device objects)
    InitializationFailed(String),

    /// A fixed-size GPU table (bindless textures, material entries) is full
    CapacityExceeded(String),

    /// Content breaks a hard format contract (unsupported index size, etc.)
    ContractViolation(String),

    /// File system error
    Io(String),

    /// Malformed file content
    Parse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::CapacityExceeded(msg) => write!(f, "Capacity exceeded: {}", msg),
            Error::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
