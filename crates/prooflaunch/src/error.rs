//! Launch failure taxonomy.
//!
//! A child that starts and exits non-zero is not an error here; its code is
//! relayed as the launcher's own exit status.

use std::io;
use thiserror::Error;

/// Exit status when the precondition check fails before spawn.
pub const EXIT_PRECONDITION: i32 = 1;

/// Exit status when the server executable cannot be started.
pub const EXIT_SPAWN_FAILURE: i32 = 127;

/// Errors that abort a launch. All are fatal and immediate; nothing is
/// retried within an invocation.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The runtime environment is not set up. Carries a remediation message
    /// for the operator.
    #[error("environment not ready: {reason}")]
    PreconditionMissing { reason: String, remediation: String },

    /// The server executable could not be spawned at all.
    #[error("failed to start `{program}`")]
    SpawnFailure {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    /// Process exit status this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::PreconditionMissing { .. } => EXIT_PRECONDITION,
            LaunchError::SpawnFailure { .. } => EXIT_SPAWN_FAILURE,
        }
    }

    /// Operator-facing fix instructions, where the error has one.
    pub fn remediation(&self) -> Option<&str> {
        match self {
            LaunchError::PreconditionMissing { remediation, .. } => Some(remediation),
            LaunchError::SpawnFailure { .. } => None,
        }
    }
}
