//! Bounds-checked windows over a mapped region.

use std::ops::Range;

use crate::error::Error;
use crate::region::ELEMENT_SIZE;

/// Read-only window over a range of elements.
///
/// Indices are absolute linear offsets into the region, not offsets into the
/// window, so `get(i)` means the same element in every view that covers `i`.
#[derive(Debug)]
pub struct RegionView<'a> {
    bytes: &'a [u8],
    range: Range<usize>,
}

/// Read-write window over a range of elements.
///
/// A worker that owns rows `r0..r1` of an output with `cols` columns is
/// handed a view over `r0 * cols..r1 * cols` and cannot write anywhere else.
#[derive(Debug)]
pub struct RegionViewMut<'a> {
    bytes: &'a mut [u8],
    range: Range<usize>,
}

impl<'a> RegionView<'a> {
    pub(crate) fn new(bytes: &'a [u8], range: Range<usize>) -> Result<Self, Error> {
        let window = window(bytes.len(), &range)?;
        Ok(Self {
            bytes: &bytes[window],
            range,
        })
    }

    /// Returns the element range covered by this view.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Reads the element at absolute index `index`.
    pub fn get(&self, index: usize) -> Result<i64, Error> {
        let offset = offset(&self.range, index)?;
        Ok(decode(&self.bytes[offset..offset + ELEMENT_SIZE]))
    }

    /// Copies every element of the view out, in index order.
    pub fn to_vec(&self) -> Vec<i64> {
        self.bytes.chunks_exact(ELEMENT_SIZE).map(decode).collect()
    }
}

impl<'a> RegionViewMut<'a> {
    pub(crate) fn new(bytes: &'a mut [u8], range: Range<usize>) -> Result<Self, Error> {
        let window = window(bytes.len(), &range)?;
        Ok(Self {
            bytes: &mut bytes[window],
            range,
        })
    }

    /// Returns the element range covered by this view.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Reads the element at absolute index `index`.
    pub fn get(&self, index: usize) -> Result<i64, Error> {
        let offset = offset(&self.range, index)?;
        Ok(decode(&self.bytes[offset..offset + ELEMENT_SIZE]))
    }

    /// Writes `value` at absolute index `index`.
    pub fn set(&mut self, index: usize, value: i64) -> Result<(), Error> {
        let offset = offset(&self.range, index)?;
        self.bytes[offset..offset + ELEMENT_SIZE].copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    /// Copies every element of the view out, in index order.
    pub fn to_vec(&self) -> Vec<i64> {
        self.bytes.chunks_exact(ELEMENT_SIZE).map(decode).collect()
    }
}

/// Maps an element range to a byte range, rejecting ranges wider than the
/// `byte_len`-byte region.
fn window(byte_len: usize, range: &Range<usize>) -> Result<Range<usize>, Error> {
    let len = byte_len / ELEMENT_SIZE;
    if range.start > range.end || range.end > len {
        return Err(Error::ViewOutOfRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(range.start * ELEMENT_SIZE..range.end * ELEMENT_SIZE)
}

fn offset(range: &Range<usize>, index: usize) -> Result<usize, Error> {
    if !range.contains(&index) {
        return Err(Error::OutOfBounds {
            index,
            start: range.start,
            end: range.end,
        });
    }
    Ok((index - range.start) * ELEMENT_SIZE)
}

fn decode(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; ELEMENT_SIZE];
    buf.copy_from_slice(bytes);
    i64::from_ne_bytes(buf)
}
