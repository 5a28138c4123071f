//! Ways to start a worker and wait for it.
//!
//! The coordinator only sees [`Launcher`] and [`WorkerHandle`]. Workers may
//! be separate processes ([`ProcessLauncher`]) or blocking tasks in this
//! process ([`ThreadLauncher`]); either way they reach the data through the
//! shared regions named in their [`WorkerTask`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::Error;
use crate::worker::{self, WORKER_COMMAND, WorkerTask};

/// How a worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStatus {
    Success,
    /// Exited with a non-zero code.
    Failed(i32),
    /// Killed by a signal.
    Signaled(i32),
    Panicked(String),
    Unknown,
}

impl WorkerStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerStatus::Success)
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Success => write!(f, "success"),
            WorkerStatus::Failed(code) => write!(f, "exit code {}", code),
            WorkerStatus::Signaled(signal) => write!(f, "killed by signal {}", signal),
            WorkerStatus::Panicked(msg) => write!(f, "panicked: {}", msg),
            WorkerStatus::Unknown => write!(f, "unknown termination"),
        }
    }
}

impl From<ExitStatus> for WorkerStatus {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => WorkerStatus::Success,
            Some(code) => WorkerStatus::Failed(code),
            None => signal_status(status),
        }
    }
}

#[cfg(unix)]
fn signal_status(status: ExitStatus) -> WorkerStatus {
    use std::os::unix::process::ExitStatusExt;

    status
        .signal()
        .map_or(WorkerStatus::Unknown, WorkerStatus::Signaled)
}

#[cfg(not(unix))]
fn signal_status(_status: ExitStatus) -> WorkerStatus {
    WorkerStatus::Unknown
}

/// A started worker.
#[async_trait]
pub trait WorkerHandle: Send {
    /// Waits for the worker to finish and reports how it ended.
    async fn join(self: Box<Self>) -> io::Result<WorkerStatus>;
}

/// Starts workers.
///
/// Must be called from within a tokio runtime.
pub trait Launcher: Send + Sync {
    fn spawn(&self, task: WorkerTask) -> io::Result<Box<dyn WorkerHandle>>;
}

/// Runs each worker as a child process of `program worker <task args>`.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Launches workers by re-executing the running binary.
    pub fn current_exe() -> io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Launcher for ProcessLauncher {
    fn spawn(&self, task: WorkerTask) -> io::Result<Box<dyn WorkerHandle>> {
        let child = Command::new(&self.program)
            .arg(WORKER_COMMAND)
            .args(task.to_args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        Ok(Box::new(ProcessHandle { child }))
    }
}

struct ProcessHandle {
    child: Child,
}

#[async_trait]
impl WorkerHandle for ProcessHandle {
    async fn join(mut self: Box<Self>) -> io::Result<WorkerStatus> {
        let status = self.child.wait().await?;
        Ok(WorkerStatus::from(status))
    }
}

/// Runs each worker on tokio's blocking pool.
///
/// Workers still attach to the regions by path, exactly as a child process
/// would.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLauncher;

impl Launcher for ThreadLauncher {
    fn spawn(&self, task: WorkerTask) -> io::Result<Box<dyn WorkerHandle>> {
        let worker = task.partition.worker;
        let handle = tokio::task::spawn_blocking(move || worker::run(&task));
        Ok(Box::new(ThreadHandle { worker, handle }))
    }
}

struct ThreadHandle {
    worker: usize,
    handle: JoinHandle<Result<(), Error>>,
}

#[async_trait]
impl WorkerHandle for ThreadHandle {
    async fn join(self: Box<Self>) -> io::Result<WorkerStatus> {
        let status = match self.handle.await {
            Ok(Ok(())) => WorkerStatus::Success,
            Ok(Err(e)) => {
                warn!("worker {} failed: {}", self.worker, e);
                WorkerStatus::Failed(1)
            }
            Err(e) if e.is_panic() => WorkerStatus::Panicked(e.to_string()),
            Err(_) => WorkerStatus::Unknown,
        };
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use shm_region::RegionHandle;

    use crate::partition::Partition;

    fn missing_task(dir: &Path) -> WorkerTask {
        WorkerTask {
            partition: Partition {
                worker: 0,
                start_row: 0,
                end_row: 1,
            },
            a_rows: 1,
            a_cols: 1,
            b_cols: 1,
            inputs: RegionHandle::new(dir.join("in.shm"), 2),
            output: RegionHandle::new(dir.join("out.shm"), 1),
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(WorkerStatus::Success.to_string(), "success");
        assert_eq!(WorkerStatus::Failed(3).to_string(), "exit code 3");
        assert!(WorkerStatus::Success.is_success());
        assert!(!WorkerStatus::Signaled(9).is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_status_from_exit_status() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(WorkerStatus::from(ExitStatus::from_raw(0)), WorkerStatus::Success);
        assert_eq!(
            WorkerStatus::from(ExitStatus::from_raw(2 << 8)),
            WorkerStatus::Failed(2)
        );
        assert_eq!(
            WorkerStatus::from(ExitStatus::from_raw(9)),
            WorkerStatus::Signaled(9)
        );
    }

    #[tokio::test]
    async fn test_thread_worker_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let handle = ThreadLauncher.spawn(missing_task(dir.path())).unwrap();
        assert_eq!(handle.join().await.unwrap(), WorkerStatus::Failed(1));
    }

    #[tokio::test]
    async fn test_process_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = ProcessLauncher::new(dir.path().join("no-such-program"));
        assert!(launcher.spawn(missing_task(dir.path())).is_err());
    }
}
