//! Integer matrix multiplication, sequential and across worker processes.
//!
//! The parallel path splits the rows of `A` into contiguous partitions, one
//! per worker. The coordinator copies both inputs into a shared region,
//! creates a second shared region for the product, and starts the workers.
//! Each worker attaches to the regions by path and writes only the cells of
//! its own rows. Once every worker has exited, the product is read back and
//! both regions are released.
//!
//! # Example
//!
//! ```no_run
//! use matrix_mul::{Coordinator, Matrix, ProcessLauncher, sequential, verify};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let a = Matrix::new(vec![vec![1, 2], vec![3, 4]])?;
//!     let b = Matrix::new(vec![vec![5, 6], vec![7, 8]])?;
//!
//!     let coordinator = Coordinator::new(ProcessLauncher::current_exe()?, "/dev/shm");
//!     let par = coordinator.multiply(&a, &b, 2).await?;
//!     verify(&sequential::multiply(&a, &b)?, &par)?;
//!
//!     assert_eq!(par.to_text(), "2 2\n19 22 \n43 50 \n");
//!     Ok(())
//! }
//! ```

pub mod config;
mod coordinator;
mod error;
pub mod launcher;
mod matrix;
pub mod partition;
mod report;
mod run;
pub mod sequential;
mod text;
mod verify;
pub mod worker;

pub use config::RunConfig;
pub use coordinator::Coordinator;
pub use error::Error;
pub use launcher::{Launcher, ProcessLauncher, ThreadLauncher, WorkerHandle, WorkerStatus};
pub use matrix::Matrix;
pub use partition::{Partition, partition};
pub use report::{Report, Timings};
pub use run::run;
pub use verify::verify;
pub use worker::{WORKER_COMMAND, WorkerTask};
