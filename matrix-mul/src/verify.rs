//! Cross-checks the parallel result against the sequential one.

use crate::{Error, Matrix};

/// Compares `par` with `seq` cell by cell in row-major order.
///
/// Reports only the first differing cell.
pub fn verify(seq: &Matrix, par: &Matrix) -> Result<(), Error> {
    if seq.rows() != par.rows() || seq.cols() != par.cols() {
        return Err(Error::ShapeMismatch(
            seq.rows(),
            seq.cols(),
            par.rows(),
            par.cols(),
        ));
    }

    for (row, (expected_row, actual_row)) in seq.iter_rows().zip(par.iter_rows()).enumerate() {
        for (col, (&expected, &actual)) in expected_row.iter().zip(actual_row).enumerate() {
            if expected != actual {
                return Err(Error::Mismatch {
                    row,
                    col,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}
