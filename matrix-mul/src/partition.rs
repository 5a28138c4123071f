//! Row-range partitioning of the output across workers.

use std::ops::Range;

use crate::Error;

/// A contiguous block of output rows owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub worker: usize,
    /// First row, inclusive.
    pub start_row: usize,
    /// Last row, exclusive.
    pub end_row: usize,
}

impl Partition {
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    pub fn len(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }

    /// Linear indices of this partition's cells in a row-major output with
    /// `cols` columns.
    pub fn cells(&self, cols: usize) -> Range<usize> {
        self.start_row * cols..self.end_row * cols
    }
}

/// Splits `0..total_rows` into `worker_count` contiguous partitions.
///
/// Every partition gets `total_rows / worker_count` rows except the last,
/// which also takes the remainder. With more workers than rows the leading
/// partitions are empty.
pub fn partition(total_rows: usize, worker_count: usize) -> Result<Vec<Partition>, Error> {
    if worker_count == 0 {
        return Err(Error::InvalidConfig(
            "worker count must be positive".to_string(),
        ));
    }

    let base = total_rows / worker_count;
    let last = worker_count - 1;
    let partitions = (0..worker_count)
        .map(|worker| Partition {
            worker,
            start_row: worker * base,
            end_row: if worker == last {
                total_rows
            } else {
                (worker + 1) * base
            },
        })
        .collect();
    Ok(partitions)
}
