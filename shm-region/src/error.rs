//! Error types for shared region operations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to create shared region at {}: {source}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open shared region at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to map shared region: {0}")]
    Map(#[source] std::io::Error),

    #[error("failed to release shared region at {}: {source}", path.display())]
    Release {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("region of {0} elements exceeds the addressable size")]
    TooLarge(usize),

    #[error("shared region size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("view {start}..{end} exceeds region of {len} elements")]
    ViewOutOfRange { start: usize, end: usize, len: usize },

    #[error("index {index} outside view {start}..{end}")]
    OutOfBounds {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("shared region already released")]
    Released,
}
