//! File-backed shared memory regions of `i64` elements.
//!
//! `shm-region` hands out a block of memory that several independent
//! processes can read and write at the same time. The block lives in a file
//! under a shared-memory directory (usually `/dev/shm`) and is mapped with
//! `MAP_SHARED`, so every process that maps the same path sees the same
//! bytes.
//!
//! # Ownership
//!
//! - [`SharedRegion`] is the owner. It creates the backing file, maps it,
//!   and removes it on [`SharedRegion::release`] or on drop.
//! - [`RegionAttachment`] is a participant. It maps an existing region from a
//!   [`RegionHandle`] and only ever unmaps it; it cannot destroy it.
//!
//! Elements are only reachable through [`RegionView`] and [`RegionViewMut`],
//! which are bounds-checked windows over a range of linear indices.
//!
//! # Example
//!
//! ```no_run
//! use shm_region::{RegionAttachment, SharedRegion};
//!
//! fn main() -> Result<(), shm_region::Error> {
//!     let mut region = SharedRegion::create("/dev/shm", 4)?;
//!
//!     // Usually done in another process that received the handle.
//!     let mut attached = RegionAttachment::open(region.handle())?;
//!     attached.view_mut(2..4)?.set(3, 42)?;
//!
//!     assert_eq!(region.view(0..4)?.get(3)?, 42);
//!     region.release()?;
//!     Ok(())
//! }
//! ```

mod error;
mod region;
mod view;

pub use error::Error;
pub use region::{ELEMENT_SIZE, RegionAttachment, RegionHandle, SharedRegion};
pub use view::{RegionView, RegionViewMut};
