use std::path::PathBuf;

use crate::generator::{GeneratorConfig, DEFAULT_SEED, DEFAULT_WORKER_COUNT};
use crate::ranking::DEFAULT_TOP_N;

/// Settings shared by the command line and the Python dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Rows generated when no table is supplied.
    pub worker_count: usize,
    pub seed: u64,
    /// Length of the top-performer tables.
    pub top_n: usize,
    /// Directory receiving CSV exports.
    pub output_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            seed: DEFAULT_SEED,
            top_n: DEFAULT_TOP_N,
            output_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Synthetic generation settings for this configuration.
    pub fn generator(&self) -> GeneratorConfig {
        GeneratorConfig::default()
            .with_count(self.worker_count)
            .with_seed(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_demo() {
        let config = DashboardConfig::default();
        assert_eq!(config.worker_count, 50);
        assert_eq!(config.seed, 42);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn builder_feeds_generator() {
        let config = DashboardConfig::default().with_worker_count(7).with_seed(3);
        let generator = config.generator();
        assert_eq!(generator.count, 7);
        assert_eq!(generator.seed, 3);
    }
}
