/// Errors raised while scraping and parsing a member's metrics endpoint
/// (§7 `MetricsFetchError` / `MetricsParseError`).
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("metrics scrape failed: {0}")]
    Fetch(String),
    #[error("metrics endpoint returned status {0}")]
    Status(u16),
    #[error("metrics exposition parse error: {0}")]
    Parse(String),
}
