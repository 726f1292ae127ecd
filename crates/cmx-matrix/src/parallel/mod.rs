//! Row-parallel matrix multiplication.
//!
//! Each output row is one unit of work. The output buffer is split into
//! disjoint row slices and every slice is handed to exactly one task, so no
//! task can observe or touch another task's row and the output needs no lock.
//! Both operands are shared read-only. Work runs on a dedicated rayon pool
//! bounded by [`MultiplierConfig`], and `multiply` only returns once every
//! row has been written.

mod config;

pub use config::MultiplierConfig;

use std::fmt;

use num_complex::Complex64;
use rayon::prelude::*;

use crate::backend::{compute_row, output_shape, MatmulBackend};
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::trace::{NoopSink, Region, TraceSink};

/// Multiplies matrices on a bounded worker pool, one task per output row.
pub struct ParallelMultiplier<S: TraceSink = NoopSink> {
    pool: rayon::ThreadPool,
    threads: usize,
    sink: S,
}

impl ParallelMultiplier<NoopSink> {
    /// Build a multiplier with no trace sink attached.
    pub fn new(config: &MultiplierConfig) -> Result<Self> {
        Self::with_sink(config, NoopSink)
    }
}

impl<S: TraceSink> ParallelMultiplier<S> {
    /// Build a multiplier that reports span lifecycle events to `sink`.
    ///
    /// # Errors
    /// `InvalidConfig` for a zero thread count, `ResourceExhausted` if the
    /// worker pool cannot be created.
    pub fn with_sink(config: &MultiplierConfig, sink: S) -> Result<Self> {
        let threads = config.resolved_threads()?;
        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .build()
            .map_err(|e| {
                MatrixError::ResourceExhausted(format!("failed to build worker pool: {}", e))
            })?;
        tracing::debug!(threads, "built multiplier worker pool");
        Ok(Self {
            pool,
            threads,
            sink,
        })
    }

    /// Number of worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Computes `right x left`.
    ///
    /// Note the operand order: the result's entry `[i][j]` is
    /// `sum(right[i][k] * left[k][j])` over `k = 0..left.rows()`, summed in
    /// ascending `k`. The result has `right.rows()` rows and `left.cols()`
    /// columns; for two `n x n` inputs it is `n x n`.
    ///
    /// Shapes are checked and the output allocated before any task is
    /// scheduled, so an error means no work was started and no trace events
    /// were emitted. Every row span is a child of the multiply span.
    ///
    /// # Errors
    /// Returns `MatmulMismatch` if `right.cols() != left.rows()`, and
    /// `ResourceExhausted` if the result is too large to allocate.
    pub fn multiply(&self, left: &Matrix, right: &Matrix) -> Result<Matrix> {
        let shape = output_shape(left, right)?;
        let mut out = Matrix::try_zeros(shape)?;

        let span = self.sink.begin_span(
            Region::Multiply {
                rows: shape.rows(),
                cols: shape.cols(),
            },
            None,
        );
        let cols = shape.cols();
        // par_chunks_mut panics on a zero chunk size; a 0-column result has nothing to compute.
        if cols > 0 {
            let sink = &self.sink;
            let parent = &span;
            let data = out.as_mut_slice();
            self.pool.install(|| {
                data.par_chunks_mut(cols)
                    .enumerate()
                    .for_each(|(i, row)| {
                        let handle = sink.begin_span(Region::Row(i), Some(parent));
                        compute_row(left, right, i, row);
                        sink.end_span(handle);
                    });
            });
        }

        self.sink.end_span(span);
        Ok(out)
    }

    /// Like [`multiply`](Self::multiply), for operands given as rows.
    ///
    /// # Errors
    /// Returns `RaggedRows` if either operand has rows of unequal length;
    /// this is detected before any task is scheduled.
    pub fn multiply_rows<L, R>(&self, left: &[L], right: &[R]) -> Result<Matrix>
    where
        L: AsRef<[Complex64]>,
        R: AsRef<[Complex64]>,
    {
        let left = Matrix::from_rows(left)?;
        let right = Matrix::from_rows(right)?;
        self.multiply(&left, &right)
    }
}

impl<S: TraceSink> fmt::Debug for ParallelMultiplier<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelMultiplier")
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}

impl<S: TraceSink> MatmulBackend for ParallelMultiplier<S> {
    fn name(&self) -> &str {
        "parallel"
    }

    fn matmul(&self, left: &Matrix, right: &Matrix) -> Result<Matrix> {
        self.multiply(left, right)
    }
}
