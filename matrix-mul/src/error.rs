//! Error types for matrix-mul operations.

use thiserror::Error;

use crate::launcher::WorkerStatus;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed matrix input: {0}")]
    InputFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("matrix dimension mismatch: A is {0}x{1}, B is {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("shared region allocation failed: {0}")]
    Allocation(#[source] shm_region::Error),

    #[error("shared region error: {0}")]
    Region(#[from] shm_region::Error),

    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        source: std::io::Error,
    },

    #[error("worker {worker} exited abnormally: {status}")]
    WorkerExit { worker: usize, status: WorkerStatus },

    #[error("failed to wait for worker {worker}: {source}")]
    Join {
        worker: usize,
        source: std::io::Error,
    },

    #[error("result mismatch at ({row}, {col}): expected {expected}, got {actual}")]
    Mismatch {
        row: usize,
        col: usize,
        expected: i64,
        actual: i64,
    },

    #[error("result shape mismatch: expected {0}x{1}, got {2}x{3}")]
    ShapeMismatch(usize, usize, usize, usize),
}
