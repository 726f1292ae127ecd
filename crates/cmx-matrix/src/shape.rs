use std::fmt;

/// The dimensions of a 2D matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Create a new shape with `rows` rows of `cols` entries each.
    pub fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    /// A square `n x n` shape.
    pub fn square(n: usize) -> Self {
        Shape { rows: n, cols: n }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (entries per row).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of entries, or `None` if `rows * cols` overflows `usize`.
    pub fn numel(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Flat row-major offset of entry `(i, j)`, or `None` if out of bounds.
    pub fn offset(&self, i: usize, j: usize) -> Option<usize> {
        if i < self.rows && j < self.cols {
            Some(i * self.cols + j)
        } else {
            None
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape::new(rows, cols)
    }
}
