//! Shared region creation, attachment and release.

use std::fs::{self, File, OpenOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::MmapMut;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::Error;
use crate::view::{RegionView, RegionViewMut};

/// Size in bytes of one region element.
pub const ELEMENT_SIZE: usize = std::mem::size_of::<i64>();

const FILE_PREFIX: &str = "matmul-";
const FILE_SUFFIX: &str = ".shm";

/// Everything another process needs to attach to a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHandle {
    path: PathBuf,
    len: usize,
}

impl RegionHandle {
    pub fn new(path: impl Into<PathBuf>, len: usize) -> Self {
        Self {
            path: path.into(),
            len,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of `i64` elements in the region.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn byte_len(&self) -> Result<usize, Error> {
        byte_len(self.len)
    }
}

/// An owned shared region.
///
/// The owner is the only party that may destroy the region. Destruction
/// happens exactly once, on the first call to [`release`](Self::release) or
/// on drop, whichever comes first.
pub struct SharedRegion {
    handle: RegionHandle,
    map: Option<MmapMut>,
    released: bool,
}

impl SharedRegion {
    /// Creates and maps a zero-filled region of `len` elements in `dir`.
    ///
    /// If any step after the backing file exists fails, the file is removed
    /// before the error is returned.
    pub fn create(dir: impl AsRef<Path>, len: usize) -> Result<Self, Error> {
        let bytes = byte_len(len)?;
        let path = dir.as_ref().join(unique_name());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| Error::Create {
                path: path.clone(),
                source,
            })?;

        let mut region = Self {
            handle: RegionHandle::new(path, len),
            map: None,
            released: false,
        };

        file.set_len(bytes as u64).map_err(|source| Error::Create {
            path: region.handle.path.clone(),
            source,
        })?;
        region.map = map_file(&file, bytes)?;

        debug!(path = %region.handle.path.display(), len, "created shared region");
        Ok(region)
    }

    pub fn handle(&self) -> &RegionHandle {
        &self.handle
    }

    pub fn len(&self) -> usize {
        self.handle.len
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Returns a read-only view over `range`.
    pub fn view(&self, range: Range<usize>) -> Result<RegionView<'_>, Error> {
        if self.released {
            return Err(Error::Released);
        }
        RegionView::new(bytes(&self.map), range)
    }

    /// Returns a read-write view over `range`.
    pub fn view_mut(&mut self, range: Range<usize>) -> Result<RegionViewMut<'_>, Error> {
        if self.released {
            return Err(Error::Released);
        }
        RegionViewMut::new(bytes_mut(&mut self.map), range)
    }

    /// Unmaps the region and removes its backing file.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    /// Must not be called while another participant still uses the region.
    pub fn release(&mut self) -> Result<(), Error> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.map = None;

        fs::remove_file(&self.handle.path).map_err(|source| Error::Release {
            path: self.handle.path.clone(),
            source,
        })?;

        debug!(path = %self.handle.path.display(), "released shared region");
        Ok(())
    }
}

impl Drop for SharedRegion {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("failed to release shared region on drop: {}", e);
        }
    }
}

/// A mapping of a region created by someone else.
///
/// Dropping an attachment unmaps it and leaves the region in place.
pub struct RegionAttachment {
    handle: RegionHandle,
    map: Option<MmapMut>,
}

impl RegionAttachment {
    /// Maps the existing region described by `handle`.
    ///
    /// Fails if the backing file is missing or its size does not match the
    /// handle.
    pub fn open(handle: &RegionHandle) -> Result<Self, Error> {
        let bytes = handle.byte_len()?;
        let open_error = |source| Error::Open {
            path: handle.path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&handle.path)
            .map_err(open_error)?;

        let actual = file.metadata().map_err(open_error)?.len();
        if actual != bytes as u64 {
            return Err(Error::SizeMismatch {
                expected: bytes as u64,
                actual,
            });
        }

        Ok(Self {
            handle: handle.clone(),
            map: map_file(&file, bytes)?,
        })
    }

    pub fn handle(&self) -> &RegionHandle {
        &self.handle
    }

    pub fn len(&self) -> usize {
        self.handle.len
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    /// Returns a read-only view over `range`.
    pub fn view(&self, range: Range<usize>) -> Result<RegionView<'_>, Error> {
        RegionView::new(bytes(&self.map), range)
    }

    /// Returns a read-write view over `range`.
    pub fn view_mut(&mut self, range: Range<usize>) -> Result<RegionViewMut<'_>, Error> {
        RegionViewMut::new(bytes_mut(&mut self.map), range)
    }
}

fn byte_len(len: usize) -> Result<usize, Error> {
    len.checked_mul(ELEMENT_SIZE)
        .filter(|&bytes| u64::try_from(bytes).is_ok())
        .ok_or(Error::TooLarge(len))
}

fn unique_name() -> String {
    let suffix = rand::thread_rng().gen_range(0..=u64::MAX);
    format!(
        "{}{}-{:016x}{}",
        FILE_PREFIX,
        std::process::id(),
        suffix,
        FILE_SUFFIX
    )
}

/// Empty regions have no mapping; `mmap` rejects zero-length maps.
fn map_file(file: &File, bytes: usize) -> Result<Option<MmapMut>, Error> {
    if bytes == 0 {
        return Ok(None);
    }
    // SAFETY: the file is sized to `bytes` and is only ever accessed through
    // element-aligned, bounds-checked views. Concurrent writers touch
    // disjoint ranges.
    let map = unsafe { MmapMut::map_mut(file) }.map_err(Error::Map)?;
    Ok(Some(map))
}

fn bytes(map: &Option<MmapMut>) -> &[u8] {
    match map {
        Some(map) => &map[..],
        None => &[],
    }
}

fn bytes_mut(map: &mut Option<MmapMut>) -> &mut [u8] {
    match map {
        Some(map) => &mut map[..],
        None => &mut [],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[test]
    fn test_create_zero_filled() {
        let dir = tempfile::tempdir().unwrap();
        let region = SharedRegion::create(dir.path(), 5).unwrap();

        assert_eq!(region.len(), 5);
        assert_eq!(region.view(0..5).unwrap().to_vec(), vec![0; 5]);

        let files = region_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(
            fs::metadata(&files[0]).unwrap().len(),
            (5 * ELEMENT_SIZE) as u64
        );
    }

    #[test]
    fn test_attachment_shares_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut region = SharedRegion::create(dir.path(), 6).unwrap();

        let mut attached = RegionAttachment::open(region.handle()).unwrap();
        {
            let mut view = attached.view_mut(3..6).unwrap();
            view.set(3, 11).unwrap();
            view.set(5, -13).unwrap();
        }
        region.view_mut(0..1).unwrap().set(0, 7).unwrap();

        assert_eq!(region.view(0..6).unwrap().to_vec(), vec![7, 0, 0, 11, 0, -13]);
        assert_eq!(attached.view(0..1).unwrap().get(0).unwrap(), 7);
    }

    #[test]
    fn test_release_removes_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut region = SharedRegion::create(dir.path(), 3).unwrap();
        let path = region.handle().path().to_path_buf();

        region.release().unwrap();
        assert!(region.is_released());
        assert!(!path.exists());
        assert!(region_files(dir.path()).is_empty());

        region.release().unwrap();
        assert!(matches!(region.view(0..1), Err(Error::Released)));
        assert!(matches!(region.view_mut(0..1), Err(Error::Released)));
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        let region = SharedRegion::create(dir.path(), 3).unwrap();
        let path = region.handle().path().to_path_buf();
        assert!(path.exists());

        drop(region);
        assert!(!path.exists());
    }

    #[test]
    fn test_dropping_attachment_keeps_region() {
        let dir = tempfile::tempdir().unwrap();
        let mut region = SharedRegion::create(dir.path(), 2).unwrap();

        let attached = RegionAttachment::open(region.handle()).unwrap();
        drop(attached);

        assert!(region.handle().path().exists());
        region.view_mut(0..2).unwrap().set(1, 9).unwrap();
        assert_eq!(region.view(0..2).unwrap().get(1).unwrap(), 9);
    }

    #[test]
    fn test_open_missing_region() {
        let dir = tempfile::tempdir().unwrap();
        let handle = RegionHandle::new(dir.path().join("missing.shm"), 4);
        assert!(matches!(
            RegionAttachment::open(&handle),
            Err(Error::Open { .. })
        ));
    }

    #[test]
    fn test_open_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let region = SharedRegion::create(dir.path(), 4).unwrap();
        let wrong = RegionHandle::new(region.handle().path(), 8);
        assert!(matches!(
            RegionAttachment::open(&wrong),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_view_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut region = SharedRegion::create(dir.path(), 4).unwrap();
        assert!(matches!(
            region.view_mut(2..5),
            Err(Error::ViewOutOfRange { len: 4, .. })
        ));
        assert!(region.view(0..4).is_ok());
    }

    #[test]
    fn test_empty_region() {
        let dir = tempfile::tempdir().unwrap();
        let mut region = SharedRegion::create(dir.path(), 0).unwrap();
        assert!(region.is_empty());
        assert!(region.view(0..0).unwrap().is_empty());

        let attached = RegionAttachment::open(region.handle()).unwrap();
        assert!(attached.view(0..0).unwrap().to_vec().is_empty());
        drop(attached);

        region.release().unwrap();
        assert!(region_files(dir.path()).is_empty());
    }

    #[test]
    fn test_create_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            SharedRegion::create(&missing, 1),
            Err(Error::Create { .. })
        ));
    }

    #[test]
    fn test_too_large() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SharedRegion::create(dir.path(), usize::MAX),
            Err(Error::TooLarge(_))
        ));
        assert!(region_files(dir.path()).is_empty());
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = SharedRegion::create(dir.path(), 1).unwrap();
        let b = SharedRegion::create(dir.path(), 1).unwrap();
        assert_ne!(a.handle().path(), b.handle().path());
        let name = a.handle().path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(FILE_PREFIX));
        assert!(name.ends_with(FILE_SUFFIX));
    }
}
