//! Plain-text matrix files.
//!
//! A file starts with a `rows cols` header line followed by `rows` lines of
//! `cols` whitespace-separated integers:
//!
//! ```text
//! 2 3
//! 1 2 3
//! 4 5 6
//! ```
//!
//! When written back out, every value is followed by a single space.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Matrix};

impl Matrix {
    /// Parses a matrix from its text form.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut lines = text.lines().enumerate();

        let (_, header) = lines
            .next()
            .ok_or_else(|| Error::InputFormat("empty input, expected `rows cols` header".into()))?;
        let (rows, cols) = parse_header(header)?;

        // Grows with the rows actually present; the header is not trusted.
        let mut data = Vec::new();
        for row in 0..rows {
            let Some((line_no, line)) = lines.next() else {
                return Err(Error::InputFormat(format!(
                    "expected {} rows, found {}",
                    rows, row
                )));
            };
            data.push(parse_row(line, cols, line_no + 1)?);
        }

        if let Some((line_no, _)) = lines.find(|(_, line)| !line.trim().is_empty()) {
            return Err(Error::InputFormat(format!(
                "line {}: unexpected content after {} rows",
                line_no + 1,
                rows
            )));
        }

        Matrix::from_rows(rows, cols, data)
    }

    /// Reads and parses a matrix file.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| match e {
            Error::InputFormat(msg) => Error::InputFormat(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Renders the matrix in its text form.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", self.rows(), self.cols());
        for row in self.iter_rows() {
            for value in row {
                let _ = write!(out, "{} ", value);
            }
            out.push('\n');
        }
        out
    }

    /// Writes the matrix to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        fs::write(path, self.to_text())?;
        Ok(())
    }
}

impl FromStr for Matrix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Matrix::parse(s)
    }
}

fn parse_header(line: &str) -> Result<(usize, usize), Error> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [rows, cols] = fields.as_slice() else {
        return Err(Error::InputFormat(format!(
            "line 1: expected `rows cols` header, got {:?}",
            line
        )));
    };
    let dim = |s: &str| {
        s.parse::<usize>()
            .map_err(|_| Error::InputFormat(format!("line 1: invalid dimension {:?}", s)))
    };
    Ok((dim(*rows)?, dim(*cols)?))
}

fn parse_row(line: &str, cols: usize, line_no: usize) -> Result<Vec<i64>, Error> {
    let row = line
        .split_whitespace()
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                Error::InputFormat(format!("line {}: invalid integer {:?}", line_no, s))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if row.len() != cols {
        return Err(Error::InputFormat(format!(
            "line {}: expected {} values, found {}",
            line_no,
            cols,
            row.len()
        )));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let m: Matrix = "2 3\n1 2 3\n-4 5 6\n".parse().unwrap();
        assert_eq!(m, Matrix::new(vec![vec![1, 2, 3], vec![-4, 5, 6]]).unwrap());
    }

    #[test]
    fn test_parse_tolerates_spacing_and_trailing_blank_lines() {
        let m = Matrix::parse("2 2\n  1   2 \n3\t4 \n\n\n").unwrap();
        assert_eq!(m.flatten(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            "",
            "2\n1 2\n",
            "x 2\n1 2\n",
            "2 2\n1 2\n",
            "2 2\n1 2\n3\n",
            "2 2\n1 2\n3 4 5\n",
            "1 2\n1 two\n",
            "1 1\n1\n2\n",
        ];
        for text in cases {
            assert!(
                matches!(Matrix::parse(text), Err(Error::InputFormat(_))),
                "expected format error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = Matrix::parse("2 2\n1 2\n3 x\n").unwrap_err();
        assert!(err.to_string().contains("line 3"), "{}", err);
    }

    #[test]
    fn test_parse_zero_columns() {
        let m = Matrix::parse("2 0\n\n\n").unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 0);
        assert_eq!(Matrix::parse(&m.to_text()).unwrap(), m);
    }

    #[test]
    fn test_parse_huge_row_count_with_short_body() {
        for text in [
            "18446744073709551615 2\n1 2\n",
            "1000000000000 0\n",
            "1000000000000 0\n\n\n",
        ] {
            assert!(
                matches!(Matrix::parse(text), Err(Error::InputFormat(_))),
                "expected format error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_to_text_layout() {
        let m = Matrix::new(vec![vec![19, 22], vec![43, 50]]).unwrap();
        assert_eq!(m.to_text(), "2 2\n19 22 \n43 50 \n");
        assert_eq!(Matrix::parse(&m.to_text()).unwrap(), m);
    }

    #[test]
    fn test_read_and_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let m = Matrix::new(vec![vec![1, -2, 3]]).unwrap();

        m.write_to(&path).unwrap();
        assert_eq!(Matrix::read_from(&path).unwrap(), m);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Matrix::read_from(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
