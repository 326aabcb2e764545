//! # Lazycurl Engine
//!
//! Subprocess lifecycle management for rendered curl commands. The engine
//! spawns the child, streams its stdout/stderr incrementally to a caller
//! driven poll loop, and turns the termination status into an immutable
//! [`ExecutionResult`](lazycurl_types::ExecutionResult) with human-readable
//! failure diagnosis.
//!
//! ## Architecture
//!
//! - **`job`**: the `Created → Running → Completed` state machine around one
//!   child process
//! - **`executor`**: the single-active-job gate a UI holds on to
//! - **`exit_codes`**: curl's documented exit codes mapped to short messages
//! - **`error`**: the small fixed error set of the job API
//!
//! Process-level failure (non-zero exit, death by signal) is never an `Err`
//! here; it is captured as data inside the returned result.

pub mod error;
pub mod executor;
pub mod exit_codes;
pub mod job;

pub use error::ExecError;
pub use executor::Executor;
pub use exit_codes::describe_exit_code;
pub use job::{ExecutionJob, StreamKind};
