//! Weighted-random member selection and draw-distribution analysis.
//!
//! The Selector turns a pool's current scores (held by `scheduler-store`)
//! into a single chosen endpoint, or a `"none"`/`"fallback"` outcome, per
//! the pool's fallback gate and threshold configuration. `analyze` reruns
//! the same weighted draw `N` times to report how closely a simulation
//! tracks the theoretical distribution implied by the scores.

mod analyze;
mod error;
mod rng;
mod select;

pub use analyze::{
    analyze, draw_counts, draw_counts_with_rng, summarize, AnalyzeResult, MemberDrawStats,
    OverallStatistics, QualityGrade, WeightedMember,
};
pub use error::SelectError;
pub use select::{eligible_members, select, select_with_rng, Eligibility, SelectOutcome};
