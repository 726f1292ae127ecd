use cmx_matrix::{Matrix, ParallelMultiplier, Result, TraceSink};

/// The 4x4 cyclic shift permutation used by the demo.
pub fn permutation() -> Result<Matrix> {
    Matrix::from_real_rows(&[
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ])
}

/// Square `m` with the multiplier, i.e. `m.apply(m)`.
pub fn square<S: TraceSink>(m: &Matrix, mm: &ParallelMultiplier<S>) -> Result<Matrix> {
    m.apply(m, mm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmx_matrix::{MultiplierConfig, RecordingSink};

    #[test]
    fn test_permutation_square() {
        let mm = ParallelMultiplier::with_sink(&MultiplierConfig::new(), RecordingSink::new())
            .unwrap();
        let r = square(&permutation().unwrap(), &mm).unwrap();
        let expected = Matrix::from_real_rows(&[
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ])
        .unwrap();
        assert_eq!(r, expected);
        assert_eq!(mm.sink().events().len(), 10);
    }
}
