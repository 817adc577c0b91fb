// Pipeline orchestration — wires normalization, clustering, aggregation,
// and risk scoring into one analysis run.

pub mod analyze;

pub use analyze::{run, AnalysisReport};
