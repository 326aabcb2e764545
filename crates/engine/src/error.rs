//! Error types for the execution engine.

use thiserror::Error;

/// The fixed error set of the job API.
///
/// Everything that happens after a successful spawn — non-zero exit codes,
/// signals, unknown termination kinds — is reported as data inside the
/// [`ExecutionResult`](lazycurl_types::ExecutionResult), not through this
/// enum.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command string was empty or did not start with `curl`. Nothing
    /// was spawned.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// The OS refused to create the process. No partial job remains.
    #[error("failed to spawn process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// A job is already active; the running job is unaffected.
    #[error("an execution is already in progress")]
    ExecutionInProgress,
}
