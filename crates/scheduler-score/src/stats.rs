//! Cross-member statistics shared by every normalization primitive.
//!
//! `min`, `max`, `mean`, `stddev` are always computed over the pool's
//! *current candidate set* for one metric, per §4.3.1.

/// A small epsilon guarding every division in the Score Engine against a
/// zero denominator (degenerate pools: `N == 1`, or all values identical).
pub const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

impl Stats {
    pub fn of(values: &[f64]) -> Self {
        assert!(!values.is_empty(), "Stats::of requires at least one value");
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        Self {
            min,
            max,
            mean,
            stddev: variance.sqrt(),
        }
    }

    pub fn coefficient_of_variation(&self) -> f64 {
        self.stddev / self.mean.abs().max(EPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_uniform_values_has_zero_stddev() {
        let stats = Stats::of(&[3.0, 3.0, 3.0]);
        assert_eq!(stats.min, 3.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn stats_of_spread_values() {
        let stats = Stats::of(&[1.0, 2.0, 3.0]);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert!((stats.stddev - 0.8164966).abs() < 1e-6);
    }

    #[test]
    fn coefficient_of_variation_guards_zero_mean() {
        let stats = Stats::of(&[0.0, 0.0]);
        assert_eq!(stats.coefficient_of_variation(), 0.0);
    }
}
