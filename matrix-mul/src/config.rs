//! Run configuration.

use std::path::{Path, PathBuf};

use crate::Error;

/// File the verified product is written to.
pub const DEFAULT_OUTPUT: &str = "C.txt";

const SHM_DIR: &str = "/dev/shm";

/// Settings for one sequential-vs-parallel run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub matrix_a: PathBuf,
    pub matrix_b: PathBuf,
    pub workers: usize,
    pub output: PathBuf,
    /// Directory the shared regions are created in.
    pub region_dir: PathBuf,
}

impl RunConfig {
    pub fn new(matrix_a: impl Into<PathBuf>, matrix_b: impl Into<PathBuf>, workers: usize) -> Self {
        Self {
            matrix_a: matrix_a.into(),
            matrix_b: matrix_b.into(),
            workers,
            output: PathBuf::from(DEFAULT_OUTPUT),
            region_dir: default_region_dir(),
        }
    }

    /// Builds a config from the three positional command-line arguments.
    pub fn from_args(matrix_a: &str, matrix_b: &str, workers: &str) -> Result<Self, Error> {
        Ok(Self::new(matrix_a, matrix_b, parse_worker_count(workers)?))
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_region_dir(mut self, region_dir: impl Into<PathBuf>) -> Self {
        self.region_dir = region_dir.into();
        self
    }
}

/// Parses a worker count, rejecting anything that is not a positive integer.
pub fn parse_worker_count(s: &str) -> Result<usize, Error> {
    let count: i64 = s
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("worker count {:?} is not an integer", s)))?;
    if count <= 0 {
        return Err(Error::InvalidConfig(format!(
            "worker count must be positive, got {}",
            count
        )));
    }
    usize::try_from(count)
        .map_err(|_| Error::InvalidConfig(format!("worker count {} is too large", count)))
}

/// `/dev/shm` where it exists, the system temp directory otherwise.
pub fn default_region_dir() -> PathBuf {
    let shm = Path::new(SHM_DIR);
    if shm.is_dir() {
        shm.to_path_buf()
    } else {
        std::env::temp_dir()
    }
}
