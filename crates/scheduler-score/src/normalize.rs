//! Normalization primitives (§4.3.1).
//!
//! Every function here returns a **goodness** value: bigger is always
//! better, already oriented for "smaller raw metric is better" (true of
//! `waiting_queue`, `cache_usage`, and `running_req` alike). Composition
//! (§4.3.2) sums these directly — no further inversion step is needed,
//! because each primitive folds the spec's "inverted when smaller is
//! better" step into its own definition. See DESIGN.md for why this
//! collapses the spec's two-step "normalize, then invert" description into
//! one function per primitive without changing the observable algorithm
//! behavior.

use crate::stats::{Stats, EPS};

/// `(max - x_i) / max(ε, max - min)`. Degenerates to a binary `{0, 1}` on
/// `N = 2` (§4.3.1), which is the documented motivation for the
/// precise-log and ratio-weight alternatives.
pub fn min_max_goodness(values: &[f64], i: usize) -> f64 {
    let stats = Stats::of(values);
    (stats.max - values[i]) / (stats.max - stats.min).max(EPS)
}

/// "none" — the raw value is used directly as the pre-inversion term, so
/// goodness is simply `1 - x_i`. Sensible when `x_i` is already a `[0, 1]`
/// fraction (e.g. `cache_usage`); for unbounded metrics this is a
/// deliberately naive legacy variant (`s1_precise`, the `q` axis of
/// `s1_ratio`) — its output is not clamped here, only at the end of
/// composition, matching §4.3.2's "clamp `score_i` to `[0, 1]`".
pub fn raw_goodness(x: f64) -> f64 {
    1.0 - x
}

/// Precise logarithmic normalization (§4.3.1). Maps `log2((x_i + δ) /
/// (mean + δ))` over the documented `[-2, +2]` input window into `[lo,
/// hi]`, clamping outliers, then inverts so smaller raw input yields
/// higher goodness.
pub fn precise_log_goodness(values: &[f64], i: usize, lo: f64, hi: f64) -> f64 {
    const DELTA: f64 = 1e-6;
    const LOG_WINDOW: (f64, f64) = (-2.0, 2.0);

    let stats = Stats::of(values);
    let ratio = (values[i] + DELTA) / (stats.mean + DELTA);
    let r = ratio.log2().clamp(LOG_WINDOW.0, LOG_WINDOW.1);
    let t = (r - LOG_WINDOW.0) / (LOG_WINDOW.1 - LOG_WINDOW.0);
    let badness = lo + t * (hi - lo);
    1.0 - badness
}

/// Ratio-weight (two-node only): `x_other / (x_i + x_other)`. For pools
/// where `N != 2` this has no defined two-node split, so it falls back to
/// `min_max_goodness` (a documented, conservative generalization — see
/// DESIGN.md).
pub fn ratio_weight_goodness(values: &[f64], i: usize) -> f64 {
    if values.len() != 2 {
        return min_max_goodness(values, i);
    }
    let other = values[1 - i];
    let denom = (values[i] + other).max(EPS);
    other / denom
}

/// Adaptive-distribution: z-score through `tanh`, affine-shifted into
/// `[0, 1]`, inverted. Degenerates to uniform `0.5` when `stddev == 0`
/// (§9 open question — this spec mandates neutrality, not `1.0`).
pub fn adaptive_distribution_goodness(values: &[f64], i: usize, k: f64) -> f64 {
    let stats = Stats::of(values);
    if stats.stddev <= EPS {
        return 0.5;
    }
    let z = (values[i] - stats.mean) / stats.stddev;
    let t = (k * z).tanh();
    let badness = (t + 1.0) / 2.0;
    1.0 - badness
}

/// Smoothed: min-max, then linearly compressed into `[0.2, 0.8]`.
pub fn smoothed_goodness(values: &[f64], i: usize) -> f64 {
    0.2 + 0.6 * min_max_goodness(values, i)
}

/// Squared non-linear: min-max (with ε), squared to amplify separation.
pub fn squared_nonlinear_goodness(values: &[f64], i: usize) -> f64 {
    min_max_goodness(values, i).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_goodness_best_member_gets_one() {
        let values = [1.0, 5.0, 10.0];
        assert_eq!(min_max_goodness(&values, 0), 1.0);
        assert_eq!(min_max_goodness(&values, 2), 0.0);
    }

    #[test]
    fn min_max_goodness_handles_n_equal_two_as_binary() {
        let values = [2.0, 9.0];
        assert_eq!(min_max_goodness(&values, 0), 1.0);
        assert_eq!(min_max_goodness(&values, 1), 0.0);
    }

    #[test]
    fn min_max_goodness_degenerate_all_equal_uses_eps_guard() {
        let values = [4.0, 4.0, 4.0];
        let g = min_max_goodness(&values, 1);
        assert!(g.is_finite());
    }

    #[test]
    fn raw_goodness_inverts_zero_to_one_fraction() {
        assert_eq!(raw_goodness(0.0), 1.0);
        assert_eq!(raw_goodness(1.0), 0.0);
        assert_eq!(raw_goodness(0.25), 0.75);
    }

    #[test]
    fn precise_log_goodness_stays_within_documented_bounds() {
        let values = [0.0, 0.5, 10.0];
        for i in 0..values.len() {
            let g = precise_log_goodness(&values, i, 0.2, 1.0);
            assert!((0.0..=0.8).contains(&g), "goodness {g} out of [1-hi, 1-lo]");
        }
    }

    #[test]
    fn precise_log_goodness_rewards_below_mean_values() {
        let values = [1.0, 1.0, 100.0];
        let low = precise_log_goodness(&values, 0, 0.2, 1.0);
        let high = precise_log_goodness(&values, 2, 0.2, 1.0);
        assert!(low > high);
    }

    #[test]
    fn ratio_weight_goodness_rewards_the_smaller_member() {
        let values = [2.0, 8.0];
        let g0 = ratio_weight_goodness(&values, 0);
        let g1 = ratio_weight_goodness(&values, 1);
        assert!(g0 > g1);
        assert!((g0 + g1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_weight_goodness_falls_back_for_non_pairwise_pools() {
        let values = [1.0, 2.0, 3.0];
        let g = ratio_weight_goodness(&values, 0);
        assert_eq!(g, min_max_goodness(&values, 0));
    }

    #[test]
    fn adaptive_distribution_is_neutral_when_stddev_is_zero() {
        let values = [5.0, 5.0, 5.0];
        assert_eq!(adaptive_distribution_goodness(&values, 0, 1.0), 0.5);
    }

    #[test]
    fn adaptive_distribution_rewards_below_mean_values() {
        let values = [1.0, 5.0, 9.0];
        let low = adaptive_distribution_goodness(&values, 0, 1.0);
        let high = adaptive_distribution_goodness(&values, 2, 1.0);
        assert!(low > high);
    }

    #[test]
    fn smoothed_goodness_stays_within_point_two_point_eight() {
        let values = [1.0, 5.0, 9.0];
        for i in 0..values.len() {
            let g = smoothed_goodness(&values, i);
            assert!((0.2..=0.8).contains(&g));
        }
    }

    #[test]
    fn squared_nonlinear_amplifies_separation_versus_min_max() {
        let values = [1.0, 5.0, 9.0];
        let mm = min_max_goodness(&values, 1);
        let sq = squared_nonlinear_goodness(&values, 1);
        assert!(sq <= mm);
    }
}
