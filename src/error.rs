//! Custom error types for the application.
//!
//! The orchestrator distinguishes fatal precondition violations (a conflicting
//! service holding the hardware) from everything else. Unavailable resources,
//! timeouts, and failed shell commands are *not* errors: each check reports a
//! definite boolean outcome into the registry instead. Only conditions that
//! must abort the whole run surface as `CheckError`.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type CheckResult<T> = std::result::Result<T, CheckError>;

#[derive(Error, Debug)]
pub enum CheckError {
    /// A service that would hold the hardware under test is active. Testing
    /// while it runs would produce false results, so the process aborts.
    #[error("Service {0} is running. Please stop it before proceeding.")]
    ConflictingService(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial support not enabled. Rebuild with --features hardware_serial")]
    SerialFeatureDisabled,
}
