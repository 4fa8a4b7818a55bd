use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The closed set of sixteen scoring algorithms (§4.3.2). Algorithms are a
/// closed set by design (§9): adding a seventeenth means adding a variant
/// here and a dispatch arm in `scheduler-score`, never a config-driven
/// plug-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlgorithmName {
    S1,
    S1Enhanced,
    S1Adaptive,
    S1Ratio,
    S1Precise,
    S1Nonlinear,
    S1Balanced,
    S1AdaptiveDistribution,
    S1Advanced,
    S1DynamicWaiting,
    S2,
    S2Enhanced,
    S2Nonlinear,
    S2Adaptive,
    S2Advanced,
    S2DynamicWaiting,
}

impl AlgorithmName {
    /// Whether this algorithm consumes `running_req` in addition to
    /// `waiting_queue`/`cache_usage` (the "three-metric family", §4.3.2).
    pub fn is_three_metric(self) -> bool {
        matches!(
            self,
            AlgorithmName::S2
                | AlgorithmName::S2Enhanced
                | AlgorithmName::S2Nonlinear
                | AlgorithmName::S2Adaptive
                | AlgorithmName::S2Advanced
                | AlgorithmName::S2DynamicWaiting
        )
    }

    /// Whether this algorithm requires `transition_point`/`steepness` to be
    /// present in its parameter bag (the waiting-progressive family).
    pub fn requires_dynamic_waiting_params(self) -> bool {
        matches!(
            self,
            AlgorithmName::S1DynamicWaiting | AlgorithmName::S2DynamicWaiting
        )
    }

    /// Whether this algorithm uses CV-adaptive weight blending.
    pub fn is_cv_adaptive(self) -> bool {
        matches!(
            self,
            AlgorithmName::S1Adaptive
                | AlgorithmName::S1Advanced
                | AlgorithmName::S2Adaptive
                | AlgorithmName::S2Advanced
        )
    }
}

/// Algorithm-specific parameters. Fields absent from config default to the
/// documented values in `scheduler-score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmParams {
    pub w_a: f64,
    pub w_b: f64,
    #[serde(default)]
    pub w_g: Option<f64>,
    #[serde(default)]
    pub transition_point: Option<f64>,
    #[serde(default)]
    pub steepness: Option<f64>,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            w_a: 0.5,
            w_b: 0.5,
            w_g: None,
            transition_point: None,
            steepness: None,
        }
    }
}

/// The tagged variant (name + parameter bag) a pool dispatches scoring
/// through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    pub name: AlgorithmName,
    pub params: AlgorithmParams,
}

impl Algorithm {
    pub fn new(name: AlgorithmName, params: AlgorithmParams) -> Self {
        Self { name, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn algorithm_name_round_trips_through_snake_case_strings() {
        for (name, text) in [
            (AlgorithmName::S1, "s1"),
            (AlgorithmName::S1Enhanced, "s1_enhanced"),
            (AlgorithmName::S1DynamicWaiting, "s1_dynamic_waiting"),
            (AlgorithmName::S2DynamicWaiting, "s2_dynamic_waiting"),
            (
                AlgorithmName::S1AdaptiveDistribution,
                "s1_adaptive_distribution",
            ),
        ] {
            assert_eq!(name.to_string(), text);
            assert_eq!(AlgorithmName::from_str(text).unwrap(), name);
        }
    }

    #[test]
    fn three_metric_family_is_exactly_the_s2_variants() {
        assert!(AlgorithmName::S2.is_three_metric());
        assert!(AlgorithmName::S2DynamicWaiting.is_three_metric());
        assert!(!AlgorithmName::S1.is_three_metric());
        assert!(!AlgorithmName::S1Advanced.is_three_metric());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AlgorithmName::S2DynamicWaiting).unwrap();
        assert_eq!(json, "\"s2_dynamic_waiting\"");
    }
}
