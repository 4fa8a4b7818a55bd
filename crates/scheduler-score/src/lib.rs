//! The Score Engine (§4.3): normalization primitives, weight adaptation,
//! and the closed sixteen-algorithm family dispatched over them.
//!
//! Pure and non-suspending by construction — every function here takes
//! in-memory slices and returns `f64`s, matching §4.3.2's "Scoring takes no
//! I/O" / "Determinism" requirements. Callers (`scheduler-store`) are
//! responsible for snapshotting member state before calling in and writing
//! results back.

mod algorithms;
mod normalize;
mod stats;
mod weights;

pub use algorithms::{compute_scores, MemberMetrics};
pub use stats::Stats;
