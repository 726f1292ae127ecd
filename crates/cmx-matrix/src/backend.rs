use std::fmt::Debug;

use num_complex::Complex64;

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::shape::Shape;

/// Trait for interchangeable matrix multiplication backends.
///
/// Every backend shares one operand convention: `matmul(left, right)`
/// computes `right x left`. Entry `[i][j]` of the result is
/// `sum(right[i][k] * left[k][j])` for `k` ascending from zero, so backends
/// that honor the order produce bit-identical results.
pub trait MatmulBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "serial", "parallel").
    fn name(&self) -> &str;

    /// Matrix multiplication: C = right @ left.
    ///
    /// - `left`: shape [k, n]
    /// - `right`: shape [m, k]
    /// - Returns: shape [m, n]
    fn matmul(&self, left: &Matrix, right: &Matrix) -> Result<Matrix>;
}

/// Validate operands for `right x left` and return the output shape.
///
/// Two empty operands can still describe an output too large to index, e.g.
/// `[M x 0] @ [0 x N]`, so the output entry count is checked as well.
pub fn output_shape(left: &Matrix, right: &Matrix) -> Result<Shape> {
    let (m, k) = right.dimension();
    let (k2, n) = left.dimension();
    if k != k2 {
        return Err(MatrixError::MatmulMismatch { m, k, k2, n });
    }
    let shape = Shape::new(m, n);
    if shape.numel().is_none() {
        return Err(MatrixError::ResourceExhausted(format!(
            "{} result has too many entries",
            shape
        )));
    }
    Ok(shape)
}

/// Compute output row `i` of `right x left` into `out`.
///
/// `out.len()` must equal `left.cols()`.
pub(crate) fn compute_row(left: &Matrix, right: &Matrix, i: usize, out: &mut [Complex64]) {
    let p = left.rows();
    let n = left.cols();
    let lhs = right.as_slice();
    let rhs = left.as_slice();
    let row = &lhs[i * p..(i + 1) * p];
    for (j, cell) in out.iter_mut().enumerate() {
        let mut sum = Complex64::new(0.0, 0.0);
        for (k, r) in row.iter().enumerate() {
            sum = sum + *r * rhs[k * n + j];
        }
        *cell = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_shape() {
        let left = Matrix::zeros(Shape::new(3, 5));
        let right = Matrix::zeros(Shape::new(2, 3));
        assert_eq!(output_shape(&left, &right).unwrap(), Shape::new(2, 5));
    }

    #[test]
    fn test_output_shape_mismatch() {
        let left = Matrix::zeros(Shape::new(3, 5));
        let right = Matrix::zeros(Shape::new(2, 4));
        let err = output_shape(&left, &right).unwrap_err();
        assert_eq!(
            err,
            MatrixError::MatmulMismatch {
                m: 2,
                k: 4,
                k2: 3,
                n: 5
            }
        );
    }

    #[test]
    fn test_output_shape_overflow() {
        let huge = usize::MAX / 2;
        let left = Matrix::zeros(Shape::new(0, huge));
        let right = Matrix::zeros(Shape::new(huge, 0));
        let err = output_shape(&left, &right).unwrap_err();
        assert!(matches!(err, MatrixError::ResourceExhausted(_)));
        assert!(!err.is_shape_mismatch());
    }
}
