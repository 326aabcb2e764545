//! Single-active-job gate.
//!
//! A UI holds one `Executor` for its lifetime. At most one job runs at a
//! time; starting another while one is active is a caller error and leaves
//! the running job untouched.

use std::io;
use std::time::Duration;

use lazycurl_types::ExecutionResult;
use tracing::debug;

use crate::error::ExecError;
use crate::job::{ExecutionJob, StreamKind};

/// Owns the currently active [`ExecutionJob`], if any.
#[derive(Default)]
pub struct Executor {
    active: Option<ExecutionJob>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Starts a job from a rendered command string.
    ///
    /// Fails with [`ExecError::ExecutionInProgress`], without side effects,
    /// while a job is active.
    pub fn start(&mut self, command: &str) -> Result<(), ExecError> {
        if self.active.is_some() {
            return Err(ExecError::ExecutionInProgress);
        }
        self.active = Some(ExecutionJob::start(command)?);
        Ok(())
    }

    /// Starts a job from structured argv. Same gating as [`Executor::start`].
    pub fn start_args(&mut self, args: &[String]) -> Result<(), ExecError> {
        if self.active.is_some() {
            return Err(ExecError::ExecutionInProgress);
        }
        self.active = Some(ExecutionJob::start_args(args)?);
        Ok(())
    }

    /// Polls the active job once; `Ok(true)` when there is nothing left to
    /// drive (job complete or no job at all).
    pub fn poll<F>(&mut self, timeout: Duration, sink: &mut F) -> io::Result<bool>
    where
        F: FnMut(StreamKind, &[u8]),
    {
        match self.active.as_mut() {
            Some(job) => job.poll(timeout, sink),
            None => Ok(true),
        }
    }

    /// Runs the active job to completion, clears the slot and returns the
    /// result; `Ok(None)` when no job was started.
    pub fn finish<F>(&mut self, sink: &mut F) -> io::Result<Option<ExecutionResult>>
    where
        F: FnMut(StreamKind, &[u8]),
    {
        let Some(job) = self.active.take() else {
            return Ok(None);
        };
        let result = job.finish(sink)?;
        debug!(exit_code = ?result.exit_code, "executor slot cleared");
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install_sh_job(executor: &mut Executor, script: &str) {
        let args = vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()];
        let job = ExecutionJob::start_unchecked(&args).expect("spawn /bin/sh");
        executor.active = Some(job);
    }

    #[test]
    fn second_start_is_rejected_while_job_is_active() {
        let mut executor = Executor::new();
        install_sh_job(&mut executor, "printf first");

        assert!(matches!(executor.start("curl https://example.com"), Err(ExecError::ExecutionInProgress)));
        let args = vec!["curl".to_string(), "https://example.com".to_string()];
        assert!(matches!(executor.start_args(&args), Err(ExecError::ExecutionInProgress)));

        // The running job is unaffected by the rejected starts.
        let result = executor
            .finish(&mut |_, _| {})
            .expect("finish job")
            .expect("job was active");
        assert_eq!(result.stdout, "first");
        assert_eq!(result.exit_code, Some(0));
    }

    #[test]
    fn finish_clears_the_slot() {
        let mut executor = Executor::new();
        install_sh_job(&mut executor, "exit 0");
        assert!(executor.is_running());

        executor.finish(&mut |_, _| {}).expect("finish job");
        assert!(!executor.is_running());
        assert!(executor.finish(&mut |_, _| {}).expect("finish idle").is_none());
    }

    #[test]
    fn invalid_command_leaves_executor_idle() {
        let mut executor = Executor::new();
        assert!(matches!(executor.start("wget https://example.com"), Err(ExecError::InvalidCommand(_))));
        assert!(!executor.is_running());
    }

    #[test]
    fn poll_with_no_job_reports_done() {
        let mut executor = Executor::new();
        assert!(executor.poll(Duration::ZERO, &mut |_, _| {}).expect("poll idle"));
    }
}
