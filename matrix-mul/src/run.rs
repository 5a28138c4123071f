//! The full sequential-vs-parallel run behind the command line.

use std::time::Instant;

use tracing::info;

use crate::config::RunConfig;
use crate::coordinator::Coordinator;
use crate::launcher::Launcher;
use crate::report::{Report, Timings};
use crate::verify::verify;
use crate::{Error, Matrix, sequential};

/// Reads both inputs, multiplies them both ways, checks the results agree
/// and writes the product.
///
/// Nothing is written unless verification passes.
pub async fn run<L: Launcher>(config: &RunConfig, launcher: L) -> Result<Report, Error> {
    let a = Matrix::read_from(&config.matrix_a)?;
    let b = Matrix::read_from(&config.matrix_b)?;
    info!(
        "loaded A ({}x{}) and B ({}x{})",
        a.rows(),
        a.cols(),
        b.rows(),
        b.cols()
    );

    let start = Instant::now();
    let seq = sequential::multiply(&a, &b)?;
    let sequential = start.elapsed();

    let coordinator = Coordinator::new(launcher, &config.region_dir);
    let start = Instant::now();
    let par = coordinator.multiply(&a, &b, config.workers).await?;
    let parallel = start.elapsed();

    verify(&seq, &par)?;
    seq.write_to(&config.output)?;
    info!("wrote result to {}", config.output.display());

    Ok(Report {
        timings: Timings {
            sequential,
            parallel,
            workers: config.workers,
        },
        product: seq,
        output: config.output.clone(),
    })
}
