//! The Metrics Collector (§4.2): scrapes each known member's Prometheus
//! exposition and records its raw semantic metrics into the Pool Store.

mod collector;
mod error;
mod parser;

pub use collector::run as run_metrics_collector;
pub use error::MetricsError;
pub use parser::{extract_semantic_metrics, parse_exposition};
