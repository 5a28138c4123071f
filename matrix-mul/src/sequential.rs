//! Single-threaded reference multiplication.

use crate::{Error, Matrix};

/// Fails with [`Error::DimensionMismatch`] unless `a.cols() == b.rows()`.
pub fn check_dimensions(a: &Matrix, b: &Matrix) -> Result<(), Error> {
    if a.cols() != b.rows() {
        return Err(Error::DimensionMismatch(
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols(),
        ));
    }
    Ok(())
}

/// Computes `a × b` with the plain triple loop.
///
/// Arithmetic wraps on overflow, matching the parallel workers.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, Error> {
    check_dimensions(a, b)?;

    let mut data = Vec::with_capacity(a.rows());
    for i in 0..a.rows() {
        let a_row = a.row(i);
        let mut row = vec![0i64; b.cols()];
        for (j, cell) in row.iter_mut().enumerate() {
            let mut sum = 0i64;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum = sum.wrapping_add(a_ik.wrapping_mul(b.row(k)[j]));
            }
            *cell = sum;
        }
        data.push(row);
    }

    Matrix::from_rows(a.rows(), b.cols(), data)
}
