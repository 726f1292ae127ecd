use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("shape mismatch: expected {expected} elements, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("ragged rows: row {row} has {got} entries, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    MatmulMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl MatrixError {
    /// True for every error caused by incompatible or malformed operand shapes.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            MatrixError::ShapeMismatch { .. }
                | MatrixError::RaggedRows { .. }
                | MatrixError::MatmulMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;
