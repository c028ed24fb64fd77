//! Results and summaries for evaluation runs

mod aggregator;
mod regression;
mod types;

pub use aggregator::MetricsAggregator;
pub use regression::{Regression, RegressionConfig, RegressionDetector, RegressionType};
pub use types::{
    CategorySummary, DatasetResult, DatasetScore, EntryResult, EvalSummary, result_stem,
};
