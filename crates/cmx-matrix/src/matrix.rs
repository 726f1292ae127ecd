use std::fmt;

use num_complex::Complex64;

use crate::backend::MatmulBackend;
use crate::error::{MatrixError, Result};
use crate::shape::Shape;

/// A dense matrix of complex entries.
///
/// Entries are stored contiguously in row-major order, so every row has the
/// same length by construction. Ragged input is rejected by the constructors
/// rather than discovered during a multiply.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<Complex64>,
    shape: Shape,
}

impl Matrix {
    /// Create a matrix from row-major data and a shape.
    ///
    /// # Errors
    /// Returns `ResourceExhausted` if the shape's entry count overflows
    /// `usize`, and `ShapeMismatch` if `data.len()` differs from it.
    pub fn new(data: Vec<Complex64>, shape: Shape) -> Result<Self> {
        let expected = entry_count(shape)?;
        if data.len() != expected {
            return Err(MatrixError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Matrix { data, shape })
    }

    /// Build a matrix from a sequence of rows.
    ///
    /// The column count is taken from the first row. An empty sequence
    /// produces a `0x0` matrix.
    ///
    /// # Errors
    /// Returns `RaggedRows` naming the first row whose length differs from
    /// the first row's.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[Complex64]>,
    {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        if let Some((row, r)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.as_ref().len() != cols)
        {
            return Err(MatrixError::RaggedRows {
                row,
                expected: cols,
                got: r.as_ref().len(),
            });
        }
        let data = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();
        Ok(Matrix {
            data,
            shape: Shape::new(rows.len(), cols),
        })
    }

    /// Build a matrix from real-valued rows. Every imaginary part is zero.
    pub fn from_real_rows<R>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[f64]>,
    {
        let rows: Vec<Vec<Complex64>> = rows
            .iter()
            .map(|r| r.as_ref().iter().map(|&re| Complex64::new(re, 0.0)).collect())
            .collect();
        Self::from_rows(&rows)
    }

    /// Create a zero-filled matrix with the given shape.
    ///
    /// # Panics
    /// Panics if the shape's entry count overflows `usize` or cannot be
    /// allocated. Use [`Matrix::try_zeros`] for untrusted shapes.
    pub fn zeros(shape: Shape) -> Self {
        Self::try_zeros(shape).expect("zero matrix allocation failed")
    }

    /// Create a zero-filled matrix, reporting oversized shapes as errors.
    ///
    /// # Errors
    /// Returns `ResourceExhausted` if the entry count overflows `usize` or the
    /// buffer cannot be reserved.
    pub fn try_zeros(shape: Shape) -> Result<Self> {
        let n = entry_count(shape)?;
        let mut data = Vec::new();
        data.try_reserve_exact(n).map_err(|e| {
            MatrixError::ResourceExhausted(format!("cannot allocate {} matrix: {}", shape, e))
        })?;
        data.resize(n, Complex64::new(0.0, 0.0));
        Ok(Matrix { data, shape })
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(Shape::square(n));
        for i in 0..n {
            m.data[i * n + i] = Complex64::new(1.0, 0.0);
        }
        m
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns `(rows, cols)`.
    pub fn dimension(&self) -> (usize, usize) {
        (self.shape.rows(), self.shape.cols())
    }

    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    /// Entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<&Complex64> {
        self.shape.offset(i, j).map(|o| &self.data[o])
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> Option<&[Complex64]> {
        if i >= self.rows() {
            return None;
        }
        let cols = self.cols();
        Some(&self.data[i * cols..(i + 1) * cols])
    }

    /// Iterate over the rows in order.
    pub fn row_iter(&self) -> impl ExactSizeIterator<Item = &[Complex64]> + '_ {
        (0..self.rows()).map(move |i| {
            let cols = self.cols();
            &self.data[i * cols..(i + 1) * cols]
        })
    }

    /// Returns the underlying row-major data.
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    /// Copy the entries out as a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<Complex64>> {
        self.row_iter().map(<[Complex64]>::to_vec).collect()
    }

    /// Consume the matrix, returning its row-major data.
    pub fn into_vec(self) -> Vec<Complex64> {
        self.data
    }

    /// Multiply with `self` on the right: computes `other x self`.
    ///
    /// The receiver is the *right-hand* operand. `m.apply(&n, backend)`
    /// returns `n x m`, not `m x n`.
    pub fn apply(&self, other: &Matrix, backend: &dyn MatmulBackend) -> Result<Matrix> {
        backend.matmul(self, other)
    }
}

fn entry_count(shape: Shape) -> Result<usize> {
    shape.numel().ok_or_else(|| {
        MatrixError::ResourceExhausted(format!("{} matrix has too many entries", shape))
    })
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.row_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", v)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::SerialBackend;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_new_matrix() {
        let data = vec![c(1.0, 0.0), c(2.0, 1.0), c(3.0, 0.0), c(4.0, -1.0)];
        let m = Matrix::new(data, Shape::square(2)).unwrap();
        assert_eq!(m.dimension(), (2, 2));
        assert_eq!(m.get(0, 1), Some(&c(2.0, 1.0)));
        assert_eq!(m.get(1, 1), Some(&c(4.0, -1.0)));
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn test_new_length_mismatch() {
        let err = Matrix::new(vec![c(1.0, 0.0); 3], Shape::square(2)).unwrap_err();
        assert_eq!(err, MatrixError::ShapeMismatch { expected: 4, got: 3 });
    }

    #[test]
    fn test_new_overflowing_shape() {
        let err = Matrix::new(Vec::new(), Shape::new(usize::MAX / 2, 4)).unwrap_err();
        assert!(matches!(err, MatrixError::ResourceExhausted(_)));
    }

    #[test]
    fn test_try_zeros_oversized() {
        let err = Matrix::try_zeros(Shape::new(usize::MAX / 2, usize::MAX / 2)).unwrap_err();
        assert!(matches!(err, MatrixError::ResourceExhausted(_)));

        // Fits in usize, but not in the address space.
        let err = Matrix::try_zeros(Shape::new(usize::MAX / 8, 1)).unwrap_err();
        assert!(matches!(err, MatrixError::ResourceExhausted(_)));
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_real_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.dimension(), (2, 3));
        assert_eq!(m.row(1).unwrap(), &[c(4.0, 0.0), c(5.0, 0.0), c(6.0, 0.0)]);
        assert_eq!(m.row(2), None);
        assert_eq!(m.to_rows().len(), 2);
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows = vec![vec![c(1.0, 0.0), c(2.0, 0.0)], vec![c(3.0, 0.0)]];
        let err = Matrix::from_rows(&rows).unwrap_err();
        assert_eq!(
            err,
            MatrixError::RaggedRows {
                row: 1,
                expected: 2,
                got: 1
            }
        );
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_from_rows_empty() {
        let rows: Vec<Vec<Complex64>> = Vec::new();
        let m = Matrix::from_rows(&rows).unwrap();
        assert_eq!(m.dimension(), (0, 0));
        assert!(m.as_slice().is_empty());
    }

    #[test]
    fn test_identity() {
        let i = Matrix::identity(3);
        assert_eq!(i.get(0, 0), Some(&c(1.0, 0.0)));
        assert_eq!(i.get(0, 1), Some(&c(0.0, 0.0)));
        assert_eq!(i.get(2, 2), Some(&c(1.0, 0.0)));
    }

    #[test]
    fn test_apply_operand_order() {
        // m.apply(n) computes n x m.
        let m = Matrix::from_real_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let n = Matrix::from_real_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
        let r = m.apply(&n, &SerialBackend::new()).unwrap();
        let expected = Matrix::from_real_rows(&[[23.0, 34.0], [31.0, 46.0]]).unwrap();
        assert_eq!(r, expected);
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(&[[c(1.0, 0.0), c(0.0, -2.0)]]).unwrap();
        assert_eq!(m.to_string(), "[1+0i, 0-2i]");
    }
}
