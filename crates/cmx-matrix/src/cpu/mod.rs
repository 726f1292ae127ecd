use crate::backend::{compute_row, output_shape, MatmulBackend};
use crate::error::Result;
use crate::matrix::Matrix;

/// Single-threaded CPU backend.
///
/// Computes each output row in turn with the same loop and summation order
/// as the parallel multiplier. Intended as a reference implementation and
/// correctness oracle.
#[derive(Debug, Clone)]
pub struct SerialBackend;

impl SerialBackend {
    pub fn new() -> Self {
        SerialBackend
    }
}

impl Default for SerialBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MatmulBackend for SerialBackend {
    fn name(&self) -> &str {
        "serial"
    }

    fn matmul(&self, left: &Matrix, right: &Matrix) -> Result<Matrix> {
        let shape = output_shape(left, right)?;
        let mut out = Matrix::try_zeros(shape)?;
        let cols = shape.cols();
        if cols > 0 {
            let data = out.as_mut_slice();
            for (i, row) in data.chunks_mut(cols).enumerate() {
                compute_row(left, right, i, row);
            }
        }
        Ok(out)
    }
}
