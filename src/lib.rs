// Groundswell: mention clustering and comparative analytics
//
// This is the library root. Each module corresponds to a major stage of the
// analytics pipeline: normalize raw mentions, cluster them, aggregate
// sentiment/engagement, detect trend anomalies, score bot risk, and compare
// snapshots into insights.

pub mod aggregate;
pub mod anomaly;
pub mod cluster;
pub mod config;
pub mod error;
pub mod insight;
pub mod model;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod risk;
