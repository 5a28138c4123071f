//! Timing report.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::Matrix;

/// Wall-clock times of the two strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timings {
    pub sequential: Duration,
    pub parallel: Duration,
    pub workers: usize,
}

impl Timings {
    /// Sequential time divided by parallel time.
    pub fn speedup(&self) -> f64 {
        self.sequential.as_secs_f64() / self.parallel.as_secs_f64()
    }
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sequential time: {:.6} seconds", self.sequential.as_secs_f64())?;
        writeln!(
            f,
            "Parallel time ({} processes): {:.6} seconds",
            self.workers,
            self.parallel.as_secs_f64()
        )?;
        writeln!(f, "Speedup: {:.2}x", self.speedup())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Report {
    pub timings: Timings,
    pub product: Matrix,
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedup_and_display() {
        let t = Timings {
            sequential: Duration::from_millis(300),
            parallel: Duration::from_millis(100),
            workers: 4,
        };
        assert!((t.speedup() - 3.0).abs() < 1e-9);
        assert_eq!(
            t.to_string(),
            "Sequential time: 0.300000 seconds\n\
             Parallel time (4 processes): 0.100000 seconds\n\
             Speedup: 3.00x\n"
        );
    }
}
