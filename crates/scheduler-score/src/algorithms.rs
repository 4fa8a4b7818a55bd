//! The closed sixteen-algorithm family (§4.3.2) and its dispatch.

use scheduler_types::{Algorithm, AlgorithmName};

use crate::{
    normalize::{
        adaptive_distribution_goodness, min_max_goodness, precise_log_goodness, raw_goodness,
        ratio_weight_goodness, smoothed_goodness, squared_nonlinear_goodness,
    },
    weights::{cv_adaptive_weights, waiting_progressive_weights_2, waiting_progressive_weights_3},
};

/// Per-member raw inputs for one scoring pass. `None` means "missing
/// metric" (§4.3.1: contributes 0 to the score regardless of algorithm).
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberMetrics {
    pub ready: bool,
    pub waiting_queue: Option<f64>,
    pub cache_usage: Option<f64>,
    pub running_req: Option<f64>,
}

/// How one metric axis is normalized for a given algorithm.
#[derive(Debug, Clone, Copy)]
enum Normalization {
    MinMax,
    None,
    PreciseLog { lo: f64, hi: f64 },
    Ratio,
    AdaptiveDistribution,
    Smoothed,
    Squared,
}

/// Adaptive-distribution's fixed `tanh` steepness constant (§4.3.1).
const ADAPTIVE_K: f64 = 1.0;

fn goodness_for(norm: Normalization, values: &[f64], i: usize) -> f64 {
    match norm {
        Normalization::MinMax => min_max_goodness(values, i),
        Normalization::None => raw_goodness(values[i]),
        Normalization::PreciseLog { lo, hi } => precise_log_goodness(values, i, lo, hi),
        Normalization::Ratio => ratio_weight_goodness(values, i),
        Normalization::AdaptiveDistribution => adaptive_distribution_goodness(values, i, ADAPTIVE_K),
        Normalization::Smoothed => smoothed_goodness(values, i),
        Normalization::Squared => squared_nonlinear_goodness(values, i),
    }
}

struct AlgorithmSpec {
    q: Normalization,
    c: Normalization,
    r: Option<Normalization>,
    weighting: Weighting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Weighting {
    Fixed,
    CvAdaptive,
    WaitingProgressive,
}

fn spec_for(name: AlgorithmName) -> AlgorithmSpec {
    use Normalization::*;
    use Weighting::*;
    match name {
        AlgorithmName::S1 => AlgorithmSpec { q: MinMax, c: None, r: Option::None, weighting: Fixed },
        AlgorithmName::S1Enhanced => AlgorithmSpec {
            q: MinMax,
            c: PreciseLog { lo: 0.2, hi: 1.0 },
            r: Option::None,
            weighting: Fixed,
        },
        AlgorithmName::S1Adaptive => AlgorithmSpec { q: MinMax, c: MinMax, r: Option::None, weighting: CvAdaptive },
        AlgorithmName::S1Ratio => AlgorithmSpec { q: None, c: Ratio, r: Option::None, weighting: Fixed },
        AlgorithmName::S1Precise => AlgorithmSpec { q: None, c: None, r: Option::None, weighting: Fixed },
        AlgorithmName::S1Nonlinear => AlgorithmSpec { q: MinMax, c: Squared, r: Option::None, weighting: Fixed },
        AlgorithmName::S1Balanced => AlgorithmSpec { q: Smoothed, c: Smoothed, r: Option::None, weighting: Fixed },
        AlgorithmName::S1AdaptiveDistribution => AlgorithmSpec {
            q: AdaptiveDistribution,
            c: AdaptiveDistribution,
            r: Option::None,
            weighting: Fixed,
        },
        AlgorithmName::S1Advanced => AlgorithmSpec {
            q: AdaptiveDistribution,
            c: AdaptiveDistribution,
            r: Option::None,
            weighting: CvAdaptive,
        },
        AlgorithmName::S1DynamicWaiting => AlgorithmSpec {
            q: AdaptiveDistribution,
            c: AdaptiveDistribution,
            r: Option::None,
            weighting: WaitingProgressive,
        },
        AlgorithmName::S2 => AlgorithmSpec { q: MinMax, c: None, r: Some(MinMax), weighting: Fixed },
        AlgorithmName::S2Enhanced => AlgorithmSpec {
            q: MinMax,
            c: PreciseLog { lo: 0.2, hi: 1.0 },
            r: Some(PreciseLog { lo: 0.15, hi: 0.95 }),
            weighting: Fixed,
        },
        AlgorithmName::S2Nonlinear => AlgorithmSpec { q: Squared, c: Squared, r: Some(Squared), weighting: Fixed },
        AlgorithmName::S2Adaptive => AlgorithmSpec { q: MinMax, c: MinMax, r: Some(MinMax), weighting: CvAdaptive },
        AlgorithmName::S2Advanced => AlgorithmSpec {
            q: AdaptiveDistribution,
            c: AdaptiveDistribution,
            r: Some(AdaptiveDistribution),
            weighting: CvAdaptive,
        },
        AlgorithmName::S2DynamicWaiting => AlgorithmSpec {
            q: AdaptiveDistribution,
            c: AdaptiveDistribution,
            r: Some(AdaptiveDistribution),
            weighting: WaitingProgressive,
        },
    }
}

/// Compute `score ∈ [0, 1]` for every member in `members`, in order, under
/// `algorithm`. Pure function — no I/O, deterministic given identical
/// inputs (§4.3.2 "Determinism").
pub fn compute_scores(algorithm: &Algorithm, members: &[MemberMetrics]) -> Vec<f64> {
    let spec = spec_for(algorithm.name);
    let n = members.len();
    if n == 0 {
        return Vec::new();
    }

    let q_goodness = axis_goodness(members, spec.q, |m| m.waiting_queue);
    let c_goodness = axis_goodness(members, spec.c, |m| m.cache_usage);
    let r_goodness = spec.r.map(|norm| axis_goodness(members, norm, |m| m.running_req));

    let base = base_weights(&algorithm.params, spec.r.is_some());
    let weights_per_member = effective_weights(&spec, &algorithm.params, members, &base);

    members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            if !member.ready {
                return 0.0;
            }
            let w = &weights_per_member[i];
            let mut score = w[0] * q_goodness[i] + w[1] * c_goodness[i];
            if let Some(r_goodness) = &r_goodness {
                score += w.get(2).copied().unwrap_or(0.0) * r_goodness[i];
            }
            if score.is_nan() || score.is_infinite() {
                0.0
            } else {
                score.clamp(0.0, 1.0)
            }
        })
        .collect()
}

/// Goodness contribution per member for one metric axis: `0.0` when the
/// member is missing that metric (§4.3.1), else the normalized goodness
/// computed over the subset of members that do have it.
fn axis_goodness(
    members: &[MemberMetrics],
    norm: Normalization,
    extract: impl Fn(&MemberMetrics) -> Option<f64>,
) -> Vec<f64> {
    let present: Vec<(usize, f64)> = members
        .iter()
        .enumerate()
        .filter_map(|(i, m)| extract(m).map(|v| (i, v)))
        .collect();

    let mut out = vec![0.0; members.len()];
    if present.is_empty() {
        return out;
    }
    let values: Vec<f64> = present.iter().map(|(_, v)| *v).collect();
    for (local_idx, (global_idx, _)) in present.iter().enumerate() {
        out[*global_idx] = goodness_for(norm, &values, local_idx);
    }
    out
}

fn base_weights(params: &scheduler_types::AlgorithmParams, three_metric: bool) -> Vec<f64> {
    let mut w = vec![params.w_a, params.w_b];
    if three_metric {
        w.push(params.w_g.unwrap_or(0.0));
    }
    w
}

/// Per-member effective weight vector (constant across members unless the
/// algorithm is waiting-progressive, whose `intensity` depends only on the
/// pool-wide `max(waiting_queue)`, so in practice this is also one shared
/// vector — computed per member only to keep the dispatch uniform).
fn effective_weights(
    spec: &AlgorithmSpec,
    params: &scheduler_types::AlgorithmParams,
    members: &[MemberMetrics],
    base: &[f64],
) -> Vec<Vec<f64>> {
    let shared = match spec.weighting {
        Weighting::Fixed => base.to_vec(),
        Weighting::CvAdaptive => {
            let q: Vec<f64> = members.iter().filter_map(|m| m.waiting_queue).collect();
            let c: Vec<f64> = members.iter().filter_map(|m| m.cache_usage).collect();
            let r: Vec<f64> = members.iter().filter_map(|m| m.running_req).collect();
            if q.is_empty() || c.is_empty() || (spec.r.is_some() && r.is_empty()) {
                base.to_vec()
            } else if spec.r.is_some() {
                cv_adaptive_weights(&base.to_vec(), &[&q, &c, &r])
            } else {
                cv_adaptive_weights(&base.to_vec(), &[&q, &c])
            }
        }
        Weighting::WaitingProgressive => {
            let max_waiting = members
                .iter()
                .filter_map(|m| m.waiting_queue)
                .fold(0.0_f64, f64::max);
            let transition_point = params.transition_point.unwrap_or(30.0);
            let steepness = params.steepness.unwrap_or(1.0);
            if spec.r.is_some() {
                let (a, b, g) = waiting_progressive_weights_3(
                    base[0],
                    base[1],
                    base.get(2).copied().unwrap_or(0.0),
                    max_waiting,
                    transition_point,
                    steepness,
                );
                vec![a, b, g]
            } else {
                let (a, b) = waiting_progressive_weights_2(
                    base[0],
                    base[1],
                    max_waiting,
                    transition_point,
                    steepness,
                );
                vec![a, b]
            }
        }
    };
    vec![shared; members.len()]
}
