//! Dense integer matrix.

use crate::Error;

/// A rectangular grid of `i64` values stored row by row.
///
/// Every row has exactly `cols` values and there are exactly `rows` rows.
/// A `Matrix` is never mutated after construction; multiplication always
/// produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<i64>>,
}

impl Matrix {
    /// Builds a matrix from its rows, taking the column count from the first
    /// row.
    pub fn new(data: Vec<Vec<i64>>) -> Result<Self, Error> {
        let cols = data.first().map_or(0, Vec::len);
        Self::from_rows(data.len(), cols, data)
    }

    /// Builds a `rows`×`cols` matrix, checking that `data` has that shape.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<Vec<i64>>) -> Result<Self, Error> {
        if data.len() != rows {
            return Err(Error::InputFormat(format!(
                "expected {} rows, got {}",
                rows,
                data.len()
            )));
        }
        if let Some((i, row)) = data.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(Error::InputFormat(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a `rows`×`cols` matrix from row-major values.
    pub fn from_flat(rows: usize, cols: usize, values: Vec<i64>) -> Result<Self, Error> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            Error::InputFormat(format!("{}x{} matrix is too large", rows, cols))
        })?;
        if values.len() != expected {
            return Err(Error::InputFormat(format!(
                "{}x{} matrix needs {} values, got {}",
                rows,
                cols,
                expected,
                values.len()
            )));
        }
        let data = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            values.chunks(cols).map(<[i64]>::to_vec).collect()
        };
        Ok(Self { rows, cols, data })
    }

    /// The `n`×`n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let data = (0..n)
            .map(|i| (0..n).map(|j| i64::from(i == j)).collect())
            .collect();
        Self {
            rows: n,
            cols: n,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        self.data.get(row)?.get(col).copied()
    }

    /// Returns row `i`.
    ///
    /// # Panics
    /// Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[i64]> {
        self.data.iter().map(Vec::as_slice)
    }

    /// Row-major copy of the values; element `(i, j)` lands at `i * cols + j`.
    pub fn flatten(&self) -> Vec<i64> {
        let mut flat = Vec::with_capacity(self.rows * self.cols);
        for row in &self.data {
            flat.extend_from_slice(row);
        }
        flat
    }
}
