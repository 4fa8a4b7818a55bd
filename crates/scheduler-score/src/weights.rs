//! Weight adaptation strategies (§4.3.2).

use crate::stats::{Stats, EPS};

/// Blend factor between base weights and CV-normalized weights. Fixed per
/// the spec's documented default.
const CV_ALPHA: f64 = 0.5;

/// Two- or three-metric base weights, in the fixed order the caller
/// chooses (`[w_a, w_b]` or `[w_a, w_b, w_g]`).
pub type BaseWeights = Vec<f64>;

/// CV-adaptive weighting: blend base weights with each metric's
/// coefficient-of-variation share, then renormalize to sum to 1.
///
/// `metric_values[m]` holds the raw values of metric `m` across the pool's
/// current candidates. Falls back to the base weights untouched if every
/// metric's CV is ~0 (no between-member spread to learn from).
pub fn cv_adaptive_weights(base: &BaseWeights, metric_values: &[&[f64]]) -> Vec<f64> {
    assert_eq!(base.len(), metric_values.len());

    let cvs: Vec<f64> = metric_values
        .iter()
        .map(|values| Stats::of(values).coefficient_of_variation())
        .collect();
    let cv_sum: f64 = cvs.iter().sum();

    if cv_sum <= EPS {
        return base.clone();
    }

    let cv_norm: Vec<f64> = cvs.iter().map(|cv| cv / cv_sum).collect();
    let blended: Vec<f64> = base
        .iter()
        .zip(cv_norm.iter())
        .map(|(w, cv)| CV_ALPHA * w + (1.0 - CV_ALPHA) * cv)
        .collect();

    let blended_sum: f64 = blended.iter().sum();
    if blended_sum <= EPS {
        return base.clone();
    }
    blended.into_iter().map(|w| w / blended_sum).collect()
}

/// Waiting-progressive weighting (two-metric form): `intensity =
/// tanh(max_waiting * steepness / transition_point)`, then scale `w_a` up
/// to 2.5x base and `w_b` down to 0.3x base as intensity approaches 1.
/// Weights are *not* renormalized — the selector tolerates arbitrary
/// positive magnitudes as unnormalized weights (§4.3.2).
pub fn waiting_progressive_weights_2(
    w_a: f64,
    w_b: f64,
    max_waiting: f64,
    transition_point: f64,
    steepness: f64,
) -> (f64, f64) {
    let intensity = intensity(max_waiting, transition_point, steepness);
    let w_a_prime = w_a * (0.2 + 2.3 * intensity);
    let w_b_prime = w_b * (1.8 - 1.5 * intensity);
    (w_a_prime, w_b_prime)
}

/// Waiting-progressive weighting (three-metric form): adds the
/// `running_req` axis, scaled down to 0.6x base as intensity approaches 1.
pub fn waiting_progressive_weights_3(
    w_a: f64,
    w_b: f64,
    w_g: f64,
    max_waiting: f64,
    transition_point: f64,
    steepness: f64,
) -> (f64, f64, f64) {
    let (w_a_prime, w_b_prime) =
        waiting_progressive_weights_2(w_a, w_b, max_waiting, transition_point, steepness);
    let intensity = intensity(max_waiting, transition_point, steepness);
    let w_g_prime = w_g * (1.4 - 0.8 * intensity);
    (w_a_prime, w_b_prime, w_g_prime)
}

fn intensity(max_waiting: f64, transition_point: f64, steepness: f64) -> f64 {
    (max_waiting * steepness / transition_point.max(EPS)).tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cv_adaptive_falls_back_to_base_when_no_spread() {
        let base = vec![0.5, 0.5];
        let q = [4.0, 4.0, 4.0];
        let c = [0.5, 0.5, 0.5];
        let adapted = cv_adaptive_weights(&base, &[&q, &c]);
        assert_eq!(adapted, base);
    }

    #[test]
    fn cv_adaptive_weights_sum_to_one() {
        let base = vec![0.5, 0.5];
        let q = [1.0, 10.0, 20.0];
        let c = [0.1, 0.1, 0.1];
        let adapted = cv_adaptive_weights(&base, &[&q, &c]);
        let sum: f64 = adapted.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cv_adaptive_gives_more_weight_to_higher_spread_metric() {
        let base = vec![0.5, 0.5];
        let q = [1.0, 50.0, 100.0]; // high spread
        let c = [0.5, 0.51, 0.49]; // low spread
        let adapted = cv_adaptive_weights(&base, &[&q, &c]);
        assert!(adapted[0] > adapted[1]);
    }

    #[test]
    fn waiting_progressive_zero_waiting_matches_scenario_e_low_end() {
        let (w_a, w_b) = waiting_progressive_weights_2(0.4, 0.3, 0.0, 30.0, 1.0);
        // intensity(0) == 0 -> w_a' = 0.4*0.2, w_b' = 0.3*1.8
        assert!((w_a - 0.4 * 0.2).abs() < 1e-9);
        assert!((w_b - 0.3 * 1.8).abs() < 1e-9);
        assert!((w_a / w_b - 0.0889).abs() < 1e-3);
    }

    #[test]
    fn waiting_progressive_high_waiting_matches_scenario_e_high_end() {
        let (w_a, w_b) = waiting_progressive_weights_2(0.4, 0.3, 60.0, 30.0, 1.0);
        // intensity(2) ~= tanh(2) ~= 0.964
        assert!((w_a - 0.99).abs() < 0.02);
        assert!((w_b - 0.13).abs() < 0.02);
    }

    #[test]
    fn waiting_progressive_three_metric_adds_running_axis() {
        let (_, _, w_g) = waiting_progressive_weights_3(0.4, 0.3, 0.3, 0.0, 30.0, 1.0);
        assert!((w_g - 0.3 * 1.4).abs() < 1e-9);
    }
}
