//! `cmx-matrix` - Complex matrices and row-parallel multiplication for cmx.
//!
//! This crate provides:
//! - A `Matrix` type of `Complex64` entries in row-major storage
//! - A `MatmulBackend` trait with a reference `SerialBackend`
//! - A `ParallelMultiplier` that computes one output row per task on a
//!   bounded rayon pool
//! - A `TraceSink` hook for observing multiply and row spans
//!
//! All backends compute `right x left` for `matmul(left, right)`. See
//! [`ParallelMultiplier::multiply`] for the exact contract.

pub mod backend;
pub mod cpu;
pub mod error;
pub mod matrix;
pub mod parallel;
pub mod shape;
pub mod trace;

// Re-export primary types at the crate root for convenience.
pub use backend::MatmulBackend;
pub use cpu::SerialBackend;
pub use error::{MatrixError, Result};
pub use matrix::Matrix;
pub use num_complex::Complex64;
pub use parallel::{MultiplierConfig, ParallelMultiplier};
pub use shape::Shape;
pub use trace::{NoopSink, RecordingSink, Region, TraceSink, TracingSink};
