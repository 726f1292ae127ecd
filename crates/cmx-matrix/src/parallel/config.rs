use std::num::NonZeroUsize;

use crate::error::{MatrixError, Result};

/// Settings for the multiplier's worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplierConfig {
    /// Worker thread count. `None` uses the available hardware parallelism.
    pub threads: Option<usize>,
    /// Worker threads are named `{prefix}-{index}`.
    pub thread_name_prefix: String,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            threads: None,
            thread_name_prefix: "cmx-worker".to_string(),
        }
    }
}

impl MultiplierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit worker count. Returns self for builder-style usage.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// The number of worker threads the pool will be built with.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an explicit count of zero.
    pub fn resolved_threads(&self) -> Result<usize> {
        match self.threads {
            Some(0) => Err(MatrixError::InvalidConfig(
                "thread count must be > 0".to_string(),
            )),
            Some(n) => Ok(n),
            None => Ok(std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_hardware_parallelism() {
        let cfg = MultiplierConfig::default();
        assert_eq!(cfg.threads, None);
        assert!(cfg.resolved_threads().unwrap() >= 1);
    }

    #[test]
    fn test_explicit_threads() {
        let cfg = MultiplierConfig::new()
            .with_threads(3)
            .with_thread_name_prefix("mm");
        assert_eq!(cfg.resolved_threads().unwrap(), 3);
        assert_eq!(cfg.thread_name_prefix, "mm");
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = MultiplierConfig::new().with_threads(0).resolved_threads();
        assert!(matches!(err, Err(MatrixError::InvalidConfig(_))));
    }
}
