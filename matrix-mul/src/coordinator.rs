//! Parallel multiplication over shared regions.

use std::path::PathBuf;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use shm_region::SharedRegion;
use tracing::{debug, error, info, warn};

use crate::launcher::Launcher;
use crate::partition::partition;
use crate::sequential::check_dimensions;
use crate::worker::WorkerTask;
use crate::{Error, Matrix};

/// Lifecycle of one parallel multiply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    RegionAllocated,
    WorkersSpawned,
    AllExited,
    Materialized,
    Released,
    Done,
}

/// Owns the shared regions of a parallel multiply and the workers writing
/// into them.
///
/// For every call to [`multiply`](Self::multiply):
///
/// 1. the flattened inputs are staged in one region and a zeroed output
///    region of `A.rows * B.cols` cells is created;
/// 2. one worker per row partition is started;
/// 3. every started worker is waited for, in whatever order they finish;
/// 4. the output is copied into a new [`Matrix`];
/// 5. both regions are released, whatever happened before.
///
/// Workers write disjoint row ranges, so no locking is involved.
pub struct Coordinator<L> {
    launcher: L,
    region_dir: PathBuf,
}

impl<L: Launcher> Coordinator<L> {
    /// Creates a coordinator that places its regions in `region_dir`.
    pub fn new(launcher: L, region_dir: impl Into<PathBuf>) -> Self {
        Self {
            launcher,
            region_dir: region_dir.into(),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Computes `a × b` with `worker_count` workers.
    ///
    /// Fails before allocating anything on a dimension mismatch or a zero
    /// worker count. After allocation, the first spawn, worker or release
    /// failure is returned once every started worker has been reaped and
    /// both regions have been released.
    pub async fn multiply(
        &self,
        a: &Matrix,
        b: &Matrix,
        worker_count: usize,
    ) -> Result<Matrix, Error> {
        check_dimensions(a, b)?;
        let partitions = partition(a.rows(), worker_count)?;
        let mut phase = Phase::Idle;

        let mut inputs = self.stage_inputs(a, b)?;
        let mut output = SharedRegion::create(&self.region_dir, a.rows() * b.cols())
            .map_err(Error::Allocation)?;
        advance(&mut phase, Phase::RegionAllocated);

        let mut first_error = None;
        let mut running = FuturesUnordered::new();
        for partition in partitions {
            let task = WorkerTask {
                partition,
                a_rows: a.rows(),
                a_cols: a.cols(),
                b_cols: b.cols(),
                inputs: inputs.handle().clone(),
                output: output.handle().clone(),
            };
            match self.launcher.spawn(task) {
                Ok(handle) => {
                    running.push(async move { (partition.worker, handle.join().await) });
                }
                Err(source) => {
                    error!("failed to spawn worker {}: {}", partition.worker, source);
                    record(
                        &mut first_error,
                        Error::Spawn {
                            worker: partition.worker,
                            source,
                        },
                    );
                    break;
                }
            }
        }
        advance(&mut phase, Phase::WorkersSpawned);

        let spawned = running.len();
        while let Some((worker, joined)) = running.next().await {
            match joined {
                Ok(status) if status.is_success() => debug!("worker {} exited cleanly", worker),
                Ok(status) => {
                    warn!("worker {} exited abnormally: {}", worker, status);
                    record(&mut first_error, Error::WorkerExit { worker, status });
                }
                Err(source) => {
                    warn!("failed to wait for worker {}: {}", worker, source);
                    record(&mut first_error, Error::Join { worker, source });
                }
            }
        }
        advance(&mut phase, Phase::AllExited);

        let product = match first_error {
            Some(e) => Err(e),
            None => {
                let product = materialize(&output, a.rows(), b.cols());
                if product.is_ok() {
                    advance(&mut phase, Phase::Materialized);
                }
                product
            }
        };

        let output_released = output.release();
        let inputs_released = inputs.release();
        advance(&mut phase, Phase::Released);

        let product = product?;
        output_released?;
        inputs_released?;
        advance(&mut phase, Phase::Done);

        info!(
            "multiplied {}x{} by {}x{} with {} workers",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols(),
            spawned
        );
        Ok(product)
    }

    /// Creates the input region and copies flattened A then B into it.
    fn stage_inputs(&self, a: &Matrix, b: &Matrix) -> Result<SharedRegion, Error> {
        let values: Vec<i64> = a.flatten().into_iter().chain(b.flatten()).collect();
        let mut region =
            SharedRegion::create(&self.region_dir, values.len()).map_err(Error::Allocation)?;

        let mut view = region.view_mut(0..values.len())?;
        for (i, &value) in values.iter().enumerate() {
            view.set(i, value)?;
        }
        Ok(region)
    }
}

fn materialize(output: &SharedRegion, rows: usize, cols: usize) -> Result<Matrix, Error> {
    let values = output.view(0..output.len())?.to_vec();
    Matrix::from_flat(rows, cols, values)
}

fn record(first_error: &mut Option<Error>, error: Error) {
    if first_error.is_none() {
        *first_error = Some(error);
    }
}

impl Phase {
    /// Whether the lifecycle may move from `self` to `next`.
    ///
    /// A failed run skips `Materialized` and goes straight to `Released`.
    fn allows(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, RegionAllocated)
                | (RegionAllocated, WorkersSpawned)
                | (WorkersSpawned, AllExited)
                | (AllExited, Materialized | Released)
                | (Materialized, Released)
                | (Released, Done)
        )
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    debug_assert!(
        phase.allows(next),
        "invalid coordinator transition {:?} -> {:?}",
        phase,
        next
    );
    debug!(from = ?*phase, to = ?next, "coordinator phase");
    *phase = next;
}
