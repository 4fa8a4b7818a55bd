use std::fmt;

/// The three semantic health quantities every scoring algorithm consumes.
///
/// Engines expose these under different raw metric names; `EngineKind`
/// bridges the two (§3 "Engine metric mapping").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticMetric {
    WaitingQueue,
    CacheUsage,
    RunningReq,
}

impl SemanticMetric {
    pub const ALL: [SemanticMetric; 3] = [
        SemanticMetric::WaitingQueue,
        SemanticMetric::CacheUsage,
        SemanticMetric::RunningReq,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SemanticMetric::WaitingQueue => "waiting_queue",
            SemanticMetric::CacheUsage => "cache_usage",
            SemanticMetric::RunningReq => "running_req",
        }
    }
}

impl fmt::Display for SemanticMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Closed set of inference engine kinds, each with a fixed mapping from
/// semantic metric to the raw Prometheus metric name it exposes.
///
/// `strum`-friendly: new engines are added here, never dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EngineKind {
    Vllm,
    Sglang,
}

impl EngineKind {
    /// The raw Prometheus metric name realizing `metric` for this engine.
    pub fn raw_metric_name(self, metric: SemanticMetric) -> &'static str {
        match (self, metric) {
            (EngineKind::Vllm, SemanticMetric::WaitingQueue) => "vllm:num_requests_waiting",
            (EngineKind::Vllm, SemanticMetric::CacheUsage) => "vllm:gpu_cache_usage_perc",
            (EngineKind::Vllm, SemanticMetric::RunningReq) => "vllm:num_requests_running",
            (EngineKind::Sglang, SemanticMetric::WaitingQueue) => "sglang:num_queue_reqs",
            (EngineKind::Sglang, SemanticMetric::CacheUsage) => "sglang:token_usage",
            (EngineKind::Sglang, SemanticMetric::RunningReq) => "sglang:num_running_reqs",
        }
    }

    /// Reverse lookup used by the Prometheus parser: given a raw metric
    /// name actually seen on the wire, which semantic quantity (if any)
    /// does it realize for this engine.
    pub fn semantic_of(self, raw_name: &str) -> Option<SemanticMetric> {
        SemanticMetric::ALL
            .into_iter()
            .find(|&metric| self.raw_metric_name(metric) == raw_name)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Vllm => f.write_str("VLLM"),
            EngineKind::Sglang => f.write_str("SGLANG"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vllm_mapping_matches_spec_table() {
        assert_eq!(
            EngineKind::Vllm.raw_metric_name(SemanticMetric::WaitingQueue),
            "vllm:num_requests_waiting"
        );
        assert_eq!(
            EngineKind::Vllm.raw_metric_name(SemanticMetric::CacheUsage),
            "vllm:gpu_cache_usage_perc"
        );
    }

    #[test]
    fn sglang_mapping_matches_spec_table() {
        assert_eq!(
            EngineKind::Sglang.raw_metric_name(SemanticMetric::WaitingQueue),
            "sglang:num_queue_reqs"
        );
        assert_eq!(
            EngineKind::Sglang.raw_metric_name(SemanticMetric::CacheUsage),
            "sglang:token_usage"
        );
    }

    #[test]
    fn semantic_of_is_the_inverse_of_raw_metric_name() {
        for engine in [EngineKind::Vllm, EngineKind::Sglang] {
            for metric in SemanticMetric::ALL {
                let raw = engine.raw_metric_name(metric);
                assert_eq!(engine.semantic_of(raw), Some(metric));
            }
        }
    }

    #[test]
    fn semantic_of_rejects_unknown_metric_names() {
        assert_eq!(EngineKind::Vllm.semantic_of("totally_unknown"), None);
    }
}
