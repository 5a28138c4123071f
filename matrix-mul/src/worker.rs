//! Worker side of the parallel multiply.
//!
//! A worker is handed a [`WorkerTask`], attaches to the input and output
//! regions the coordinator created, and fills in its own rows of the
//! product. It never creates or destroys a region.

use std::path::PathBuf;

use shm_region::{RegionAttachment, RegionHandle, RegionViewMut};
use tracing::debug;

use crate::Error;
use crate::partition::Partition;

/// First argument that switches the binary into worker mode.
pub const WORKER_COMMAND: &str = "worker";

const TASK_ARGS: usize = 10;

/// Whether `args` (without the program name) is a worker invocation.
///
/// Only `worker` followed by exactly the task arguments counts, so a matrix
/// file that happens to be named `worker` still runs normally.
pub fn is_worker_invocation(args: &[String]) -> bool {
    args.len() == TASK_ARGS + 1 && args[0] == WORKER_COMMAND
}

/// Everything one worker needs to compute its partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerTask {
    pub partition: Partition,
    pub a_rows: usize,
    pub a_cols: usize,
    pub b_cols: usize,
    /// Flattened A followed by flattened B.
    pub inputs: RegionHandle,
    /// `a_rows * b_cols` output cells.
    pub output: RegionHandle,
}

impl WorkerTask {
    /// Encodes the task as command-line arguments for a worker process.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.partition.worker.to_string(),
            self.partition.start_row.to_string(),
            self.partition.end_row.to_string(),
            self.a_rows.to_string(),
            self.a_cols.to_string(),
            self.b_cols.to_string(),
            self.inputs.path().display().to_string(),
            self.inputs.len().to_string(),
            self.output.path().display().to_string(),
            self.output.len().to_string(),
        ]
    }

    /// Decodes arguments produced by [`to_args`](Self::to_args).
    pub fn from_args(args: &[String]) -> Result<Self, Error> {
        if args.len() != TASK_ARGS {
            return Err(Error::InvalidConfig(format!(
                "worker expects {} arguments, got {}",
                TASK_ARGS,
                args.len()
            )));
        }

        let num = |i: usize, name: &str| {
            args[i].parse::<usize>().map_err(|_| {
                Error::InvalidConfig(format!("worker {} is not a number: {:?}", name, args[i]))
            })
        };

        let partition = Partition {
            worker: num(0, "index")?,
            start_row: num(1, "start row")?,
            end_row: num(2, "end row")?,
        };
        if partition.start_row > partition.end_row {
            return Err(Error::InvalidConfig(format!(
                "worker rows {}..{} are reversed",
                partition.start_row, partition.end_row
            )));
        }

        Ok(Self {
            partition,
            a_rows: num(3, "A rows")?,
            a_cols: num(4, "A cols")?,
            b_cols: num(5, "B cols")?,
            inputs: RegionHandle::new(PathBuf::from(&args[6]), num(7, "input length")?),
            output: RegionHandle::new(PathBuf::from(&args[8]), num(9, "output length")?),
        })
    }

    fn a_len(&self) -> usize {
        self.a_rows * self.a_cols
    }

    fn b_len(&self) -> usize {
        self.a_cols * self.b_cols
    }
}

/// Computes rows `partition.rows()` of `A × B` into `out`.
///
/// `flat_a` is `rows × a_cols` and `flat_b` is `a_cols × b_cols`, both row
/// major. Cell `(i, j)` is written at linear index `i * b_cols + j`, so `out`
/// must cover `partition.cells(b_cols)`. Slices too short for the partition
/// are rejected with [`Error::InvalidConfig`].
pub fn compute_rows(
    flat_a: &[i64],
    flat_b: &[i64],
    a_cols: usize,
    b_cols: usize,
    partition: &Partition,
    out: &mut RegionViewMut<'_>,
) -> Result<(), Error> {
    let a_needed = partition.end_row.checked_mul(a_cols);
    if a_needed.is_none_or(|needed| flat_a.len() < needed) {
        return Err(Error::InvalidConfig(format!(
            "A holds {} values, too few for rows {:?} of {} columns",
            flat_a.len(),
            partition.rows(),
            a_cols
        )));
    }
    if a_cols.checked_mul(b_cols) != Some(flat_b.len()) {
        return Err(Error::InvalidConfig(format!(
            "B holds {} values, expected {}x{}",
            flat_b.len(),
            a_cols,
            b_cols
        )));
    }

    for i in partition.rows() {
        let a_row = &flat_a[i * a_cols..(i + 1) * a_cols];
        for j in 0..b_cols {
            let mut sum = 0i64;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum = sum.wrapping_add(a_ik.wrapping_mul(flat_b[k * b_cols + j]));
            }
            out.set(i * b_cols + j, sum)?;
        }
    }
    Ok(())
}

/// Attaches to the task's regions and computes its partition.
pub fn run(task: &WorkerTask) -> Result<(), Error> {
    if task.partition.end_row > task.a_rows {
        return Err(Error::InvalidConfig(format!(
            "worker rows {:?} exceed the {} rows of A",
            task.partition.rows(),
            task.a_rows
        )));
    }

    let inputs = RegionAttachment::open(&task.inputs)?;
    let (a_len, b_len) = (task.a_len(), task.b_len());
    if inputs.len() != a_len + b_len {
        return Err(Error::InvalidConfig(format!(
            "input region holds {} values, expected {}",
            inputs.len(),
            a_len + b_len
        )));
    }
    let values = inputs.view(0..inputs.len())?.to_vec();
    let (flat_a, flat_b) = values.split_at(a_len);

    let mut output = RegionAttachment::open(&task.output)?;
    let expected = task.a_rows * task.b_cols;
    if output.len() != expected {
        return Err(Error::InvalidConfig(format!(
            "output region holds {} values, expected {}",
            output.len(),
            expected
        )));
    }
    let mut view = output.view_mut(task.partition.cells(task.b_cols))?;

    compute_rows(
        flat_a,
        flat_b,
        task.a_cols,
        task.b_cols,
        &task.partition,
        &mut view,
    )?;

    debug!(
        worker = task.partition.worker,
        rows = ?task.partition.rows(),
        "worker finished"
    );
    Ok(())
}

/// Entry point for `matrix-mul worker <task args>`.
pub fn run_from_args(args: &[String]) -> Result<(), Error> {
    let task = WorkerTask::from_args(args)?;
    run(&task)
}
