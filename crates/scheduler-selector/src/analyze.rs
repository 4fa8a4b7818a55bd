//! Simulation/analysis mode (§4.5 "Analyze mode"): `N` independent draws
//! from a frozen score vector, reported as theoretical-vs-empirical
//! distributions plus a quality grade.

use rand::Rng;

use crate::{rng::with_thread_rng, select::weighted_draw};

/// One eligible member's frozen weight going into a simulation, and the
/// wire-level key it should be reported under.
#[derive(Debug, Clone)]
pub struct WeightedMember {
    pub key: String,
    pub score: f64,
}

/// Run `iterations` draws from `members`' frozen scores and return the raw
/// per-member selection counts, in `members` order. Used directly by
/// `/simulate`; `/analyze` layers statistics on top (`summarize`).
pub fn draw_counts(members: &[WeightedMember], iterations: u64) -> Vec<u64> {
    with_thread_rng(|rng| draw_counts_with_rng(members, iterations, rng))
}

pub fn draw_counts_with_rng(
    members: &[WeightedMember],
    iterations: u64,
    rng: &mut impl Rng,
) -> Vec<u64> {
    if members.is_empty() {
        return Vec::new();
    }
    let weights: Vec<f64> = members.iter().map(|m| m.score).collect();
    let mut counts = vec![0u64; members.len()];
    for _ in 0..iterations {
        counts[weighted_draw(&weights, rng)] += 1;
    }
    counts
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MemberDrawStats {
    pub theoretical_probability: f64,
    pub actual_probability: f64,
    pub selection_count: u64,
    pub deviation: f64,
    pub deviation_percentage: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OverallStatistics {
    pub mean_deviation_percentage: f64,
    pub max_deviation_percentage: f64,
    pub min_deviation_percentage: f64,
    pub stddev_deviation_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Excellent,
    Good,
    Average,
    NeedsOptimization,
}

#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    pub iterations: u64,
    pub per_member: Vec<(String, MemberDrawStats)>,
    pub overall: OverallStatistics,
    pub quality: QualityGrade,
}

/// §4.5 analyze mode + §6's quality-grade table. `success_rate` for the
/// grading table is taken as the share of members whose empirical
/// frequency falls within the invariant-8 three-sigma bound
/// (`|empirical - theoretical| <= 3*sqrt(p(1-p)/N)`) — the open question of
/// what "success rate" means against a single simulation run is resolved
/// this way because it is the only statistically grounded per-run
/// definition available (see DESIGN.md).
pub fn analyze(members: &[WeightedMember], iterations: u64) -> AnalyzeResult {
    let counts = draw_counts(members, iterations);
    summarize(members, &counts, iterations)
}

pub fn summarize(members: &[WeightedMember], counts: &[u64], iterations: u64) -> AnalyzeResult {
    let total_score: f64 = members.iter().map(|m| m.score).sum();
    let n = iterations.max(1) as f64;

    let mut within_bound = 0usize;
    let per_member: Vec<(String, MemberDrawStats)> = members
        .iter()
        .zip(counts.iter())
        .map(|(member, &count)| {
            let theoretical = if total_score > 0.0 { member.score / total_score } else { 0.0 };
            let actual = count as f64 / n;
            let deviation = (actual - theoretical).abs();
            let bound = 3.0 * (theoretical * (1.0 - theoretical) / n).max(0.0).sqrt();
            if deviation <= bound {
                within_bound += 1;
            }
            (
                member.key.clone(),
                MemberDrawStats {
                    theoretical_probability: theoretical,
                    actual_probability: actual,
                    selection_count: count,
                    deviation,
                    deviation_percentage: deviation * 100.0,
                },
            )
        })
        .collect();

    let deviations: Vec<f64> = per_member.iter().map(|(_, s)| s.deviation_percentage).collect();
    let mean = if deviations.is_empty() { 0.0 } else { deviations.iter().sum::<f64>() / deviations.len() as f64 };
    let max = deviations.iter().copied().fold(0.0_f64, f64::max);
    let min = deviations.iter().copied().fold(f64::INFINITY, f64::min);
    let min = if min.is_finite() { min } else { 0.0 };
    let variance = if deviations.is_empty() {
        0.0
    } else {
        deviations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / deviations.len() as f64
    };
    let stddev = variance.sqrt();

    let success_rate_pct = if members.is_empty() {
        100.0
    } else {
        100.0 * within_bound as f64 / members.len() as f64
    };

    let overall = OverallStatistics {
        mean_deviation_percentage: mean,
        max_deviation_percentage: max,
        min_deviation_percentage: min,
        stddev_deviation_percentage: stddev,
    };
    let quality = quality_grade(mean, max, success_rate_pct);

    AnalyzeResult { iterations, per_member, overall, quality }
}

fn quality_grade(mean_dev_pct: f64, max_dev_pct: f64, success_rate_pct: f64) -> QualityGrade {
    if mean_dev_pct < 1.0 && max_dev_pct < 2.0 && success_rate_pct > 99.0 {
        QualityGrade::Excellent
    } else if mean_dev_pct < 2.0 && max_dev_pct < 5.0 && success_rate_pct > 95.0 {
        QualityGrade::Good
    } else if mean_dev_pct < 5.0 && max_dev_pct < 10.0 && success_rate_pct > 90.0 {
        QualityGrade::Average
    } else {
        QualityGrade::NeedsOptimization
    }
}
