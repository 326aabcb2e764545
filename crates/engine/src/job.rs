//! The execution job state machine.
//!
//! One job wraps one spawned curl process. Reader threads forward raw
//! stdout/stderr chunks over a channel; the caller drains them by calling
//! [`ExecutionJob::poll`] on its own cadence (a UI does this once per frame
//! with a zero timeout), so the job never blocks the caller and needs no
//! shared state. States advance `Created → Running → Completed` and never
//! reopen.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use lazycurl_types::ExecutionResult;
use lazycurl_util::{render_command, split_command};
use tracing::{debug, warn};

use crate::error::ExecError;
use crate::exit_codes::describe_exit_code;

/// Which child stream a chunk arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

const READ_BUFFER_SIZE: usize = 8192;

/// Poll cadence used by [`ExecutionJob::finish`] when running to completion.
const FINISH_POLL_TIMEOUT: Duration = Duration::from_millis(25);

/// A live, pollable handle to one spawned curl process.
pub struct ExecutionJob {
    command: String,
    child: Child,
    chunks: Receiver<(StreamKind, Vec<u8>)>,
    reader_handles: Vec<JoinHandle<()>>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    started_at: Instant,
    status: Option<ExitStatus>,
}

impl ExecutionJob {
    /// Spawns a job from a rendered command string.
    ///
    /// The string is split with the quote-aware lexer, so arguments the
    /// builder quoted (header values, write-out formats) arrive at the
    /// child intact. Fails with [`ExecError::InvalidCommand`] when the
    /// token list is empty or does not start with `curl`, and with
    /// [`ExecError::SpawnFailed`] when the OS cannot create the process.
    pub fn start(command: &str) -> Result<Self, ExecError> {
        let args = split_command(command);
        validate_args(&args)?;
        Self::spawn(&args, command.to_string())
    }

    /// Spawns a job from structured argv, the form the builder hands over
    /// directly. Same validation as [`ExecutionJob::start`].
    pub fn start_args(args: &[String]) -> Result<Self, ExecError> {
        validate_args(args)?;
        Self::spawn(args, render_command(args))
    }

    #[cfg(test)]
    pub(crate) fn start_unchecked(args: &[String]) -> Result<Self, ExecError> {
        Self::spawn(args, render_command(args))
    }

    fn spawn(args: &[String], rendered: String) -> Result<Self, ExecError> {
        let mut command = Command::new(&args[0]);
        command
            .args(&args[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(ExecError::SpawnFailed)?;
        debug!(pid = child.id(), command = %rendered, "spawned child process");

        let (sender, receiver) = mpsc::channel();
        let mut reader_handles = Vec::with_capacity(2);
        if let Some(pipe) = child.stdout.take() {
            reader_handles.push(spawn_reader(pipe, StreamKind::Stdout, sender.clone()));
        }
        if let Some(pipe) = child.stderr.take() {
            reader_handles.push(spawn_reader(pipe, StreamKind::Stderr, sender.clone()));
        }
        // The channel disconnects once both reader threads hit EOF.
        drop(sender);

        Ok(Self {
            command: rendered,
            child,
            chunks: receiver,
            reader_handles,
            stdout: Vec::new(),
            stderr: Vec::new(),
            started_at: Instant::now(),
            status: None,
        })
    }

    /// The rendered command string this job is running.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_some()
    }

    /// Output accumulated so far; moved out by [`ExecutionJob::finish`].
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Performs one bounded check for newly available output.
    ///
    /// Waits at most `timeout` for a first chunk, then drains whatever else
    /// is immediately ready. Every chunk is appended to the job's buffers
    /// and forwarded to `sink` exactly once, in receipt order. Returns
    /// `true` once both streams have closed and the termination status has
    /// been recorded; safe and cheap to call repeatedly after that.
    pub fn poll<F>(&mut self, timeout: Duration, sink: &mut F) -> io::Result<bool>
    where
        F: FnMut(StreamKind, &[u8]),
    {
        if self.status.is_some() {
            return Ok(true);
        }

        let mut streams_closed = false;
        match self.chunks.recv_timeout(timeout) {
            Ok((kind, chunk)) => {
                self.accept(kind, chunk, sink);
                loop {
                    match self.chunks.try_recv() {
                        Ok((kind, chunk)) => self.accept(kind, chunk, sink),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            streams_closed = true;
                            break;
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => return Ok(false),
            Err(RecvTimeoutError::Disconnected) => streams_closed = true,
        }

        if !streams_closed {
            return Ok(false);
        }

        for handle in self.reader_handles.drain(..) {
            let _ = handle.join();
        }
        let status = self.child.wait()?;
        debug!(status = %status, "child process terminated");
        self.status = Some(status);
        Ok(true)
    }

    /// Runs the job to completion and produces the immutable result.
    ///
    /// Polls with a small bounded timeout until the process terminates, so
    /// this doubles as a synchronous "run and wait" call. Output buffers
    /// are moved into the result. Only a lower-level I/O fault while
    /// draining can make this fail; the process's own outcome is data in
    /// the result.
    pub fn finish<F>(mut self, sink: &mut F) -> io::Result<ExecutionResult>
    where
        F: FnMut(StreamKind, &[u8]),
    {
        let status = loop {
            if let Some(status) = self.status {
                break status;
            }
            self.poll(FINISH_POLL_TIMEOUT, sink)?;
        };

        let duration = self.started_at.elapsed();
        let (exit_code, error_message) = diagnose(status);
        debug!(
            exit_code = ?exit_code,
            duration_ms = duration.as_millis(),
            "execution finished"
        );

        Ok(ExecutionResult {
            command: self.command,
            exit_code,
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            duration,
            error_message,
        })
    }

    fn accept<F>(&mut self, kind: StreamKind, chunk: Vec<u8>, sink: &mut F)
    where
        F: FnMut(StreamKind, &[u8]),
    {
        match kind {
            StreamKind::Stdout => self.stdout.extend_from_slice(&chunk),
            StreamKind::Stderr => self.stderr.extend_from_slice(&chunk),
        }
        sink(kind, &chunk);
    }
}

fn validate_args(args: &[String]) -> Result<(), ExecError> {
    match args.first() {
        None => Err(ExecError::InvalidCommand("empty command".to_string())),
        Some(first) if first != lazycurl_util::command::CURL_BIN => Err(ExecError::InvalidCommand(format!(
            "expected '{}', got '{first}'",
            lazycurl_util::command::CURL_BIN
        ))),
        Some(_) => Ok(()),
    }
}

fn spawn_reader<R>(mut reader: R, kind: StreamKind, sender: Sender<(StreamKind, Vec<u8>)>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => {
                    if sender.send((kind, buffer[..read].to_vec())).is_err() {
                        break;
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    warn!(stream = ?kind, %error, "pipe read failed");
                    break;
                }
            }
        }
    })
}

/// Maps a termination status to `(exit_code, error_message)`.
fn diagnose(status: ExitStatus) -> (Option<u8>, Option<String>) {
    if let Some(code) = status.code() {
        let code = u8::try_from(code).unwrap_or(u8::MAX);
        if code == 0 {
            return (Some(0), None);
        }
        return (Some(code), Some(describe_exit_code(code).to_string()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return (None, Some(format!("Process terminated by signal {signal}")));
        }
        if let Some(signal) = status.stopped_signal() {
            return (None, Some(format!("Process stopped by signal {signal}")));
        }
    }

    (None, Some("Process ended in an unrecognized state".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> ExecutionJob {
        let args = vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()];
        ExecutionJob::start_unchecked(&args).expect("spawn /bin/sh")
    }

    fn run(script: &str) -> ExecutionResult {
        sh(script).finish(&mut |_, _| {}).expect("finish job")
    }

    #[test]
    fn start_rejects_empty_command() {
        assert!(matches!(ExecutionJob::start(""), Err(ExecError::InvalidCommand(_))));
        assert!(matches!(ExecutionJob::start("   "), Err(ExecError::InvalidCommand(_))));
    }

    #[test]
    fn start_rejects_non_curl_executable() {
        assert!(matches!(ExecutionJob::start("wget https://example.com"), Err(ExecError::InvalidCommand(_))));
        let args = vec!["echo".to_string(), "hi".to_string()];
        assert!(matches!(ExecutionJob::start_args(&args), Err(ExecError::InvalidCommand(_))));
    }

    #[test]
    fn spawn_failure_reports_os_error() {
        let args = vec!["/nonexistent/lazycurl-test-binary".to_string()];
        assert!(matches!(ExecutionJob::start_unchecked(&args), Err(ExecError::SpawnFailed(_))));
    }

    #[test]
    fn captures_both_streams_on_clean_exit() {
        let result = run("printf out; printf err >&2");
        assert_eq!(result.stdout, "out");
        assert_eq!(result.stderr, "err");
        assert_eq!(result.exit_code, Some(0));
        assert!(result.error_message.is_none());
        assert!(result.is_success());
    }

    #[test]
    fn sink_sees_every_chunk_once() {
        let job = sh("printf hello; printf ' world' >&2");
        let mut stdout_seen = Vec::new();
        let mut stderr_seen = Vec::new();
        let result = job
            .finish(&mut |kind, chunk| match kind {
                StreamKind::Stdout => stdout_seen.extend_from_slice(chunk),
                StreamKind::Stderr => stderr_seen.extend_from_slice(chunk),
            })
            .expect("finish job");

        assert_eq!(String::from_utf8_lossy(&stdout_seen), result.stdout);
        assert_eq!(String::from_utf8_lossy(&stderr_seen), result.stderr);
    }

    #[test]
    fn nonzero_exit_uses_diagnosis_table() {
        let result = run("exit 6");
        assert_eq!(result.exit_code, Some(6));
        assert_eq!(result.error_message.as_deref(), Some("Couldn't resolve host"));
    }

    #[test]
    fn undocumented_exit_code_is_unknown_error() {
        let result = run("exit 50");
        assert_eq!(result.exit_code, Some(50));
        assert_eq!(result.error_message.as_deref(), Some("Unknown error"));
    }

    #[test]
    fn signal_termination_reports_signal_number() {
        let result = run("kill -TERM $$");
        assert_eq!(result.exit_code, None);
        assert_eq!(result.error_message.as_deref(), Some("Process terminated by signal 15"));
    }

    #[test]
    fn zero_timeout_polling_drives_job_to_completion() {
        let mut job = sh("printf steady");
        let mut sink = |_: StreamKind, _: &[u8]| {};

        let mut done = false;
        for _ in 0..2000 {
            done = job.poll(Duration::ZERO, &mut sink).expect("poll job");
            if done {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert!(done, "job never completed under zero-timeout polling");

        // Completion is monotonic; further polls stay done.
        assert!(job.poll(Duration::ZERO, &mut sink).expect("poll after done"));
        assert_eq!(job.stdout(), b"steady");

        let result = job.finish(&mut sink).expect("finish job");
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "steady");
    }

    #[test]
    fn result_records_command_and_duration() {
        let args = vec!["/bin/sh".to_string(), "-c".to_string(), "exit 0".to_string()];
        let job = ExecutionJob::start_unchecked(&args).expect("spawn /bin/sh");
        assert_eq!(job.command(), "/bin/sh -c 'exit 0'");

        let result = job.finish(&mut |_, _| {}).expect("finish job");
        assert_eq!(result.command, "/bin/sh -c 'exit 0'");
        assert!(result.duration > Duration::ZERO);
    }
}
