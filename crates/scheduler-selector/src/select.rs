use std::collections::HashSet;

use rand::Rng;
use scheduler_store::PoolSnapshot;
use scheduler_types::{FallbackConfig, MemberKey, PoolMember};

use crate::rng::with_thread_rng;

/// What the Selector returns to the LB-facing handler (§4.5, §6).
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// `"ip:port"` of the chosen member.
    Selected(String),
    /// No eligible member; surfaced to the caller as the literal `"none"`.
    None,
    /// The pool's fallback gate is open; bypass scoring entirely.
    Fallback,
}

impl SelectOutcome {
    /// The exact wire-level text the `/scheduler/select` handler writes
    /// (§6): `"ip:port"`, `"none"`, or `"fallback"`.
    pub fn as_wire_text(&self) -> String {
        match self {
            SelectOutcome::Selected(endpoint) => endpoint.clone(),
            SelectOutcome::None => "none".to_string(),
            SelectOutcome::Fallback => "fallback".to_string(),
        }
    }
}

/// Select one member from `candidates` under `snapshot`, using this
/// thread's PRNG (§4.5 algorithm, steps 1-7).
pub fn select(snapshot: &PoolSnapshot, candidates: &HashSet<MemberKey>) -> SelectOutcome {
    with_thread_rng(|rng| select_with_rng(snapshot, candidates, rng))
}

/// Pure, RNG-injectable core of `select` for deterministic testing.
pub fn select_with_rng(
    snapshot: &PoolSnapshot,
    candidates: &HashSet<MemberKey>,
    rng: &mut impl Rng,
) -> SelectOutcome {
    let eligible = match eligible_members(snapshot, candidates) {
        Eligibility::Fallback => return SelectOutcome::Fallback,
        Eligibility::None => return SelectOutcome::None,
        Eligibility::Members(members) => members,
    };

    // Step 7: weighted-random draw over unnormalized scores.
    let weights: Vec<f64> = eligible.iter().map(|(_, member)| member.score).collect();
    let idx = weighted_draw(&weights, rng);
    SelectOutcome::Selected(eligible[idx].0.to_string())
}

/// Outcome of steps 2-6 (§4.5): the pool-fallback gate, candidate
/// intersection, threshold filtering, and zero-score exclusion, short of
/// the final weighted draw. Shared by `select_with_rng` and by
/// `/simulate`/`/analyze`, which repeat the draw step `N` times over the
/// same eligible set instead of drawing once.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility<'a> {
    Fallback,
    None,
    Members(Vec<(&'a MemberKey, &'a PoolMember)>),
}

/// Steps 2-6 of §4.5, exposed for reuse by simulation/analysis.
pub fn eligible_members<'a>(
    snapshot: &'a PoolSnapshot,
    candidates: &HashSet<MemberKey>,
) -> Eligibility<'a> {
    // Step 2: pool_fallback gate — no scoring or selection occurs.
    if snapshot.config.fallback.pool_fallback {
        return Eligibility::Fallback;
    }

    // Step 3: intersect candidates with the pool's current member set.
    let mut eligible: Vec<(&MemberKey, &PoolMember)> = snapshot
        .members
        .iter()
        .filter(|(key, _)| candidates.contains(*key))
        .collect();
    if eligible.is_empty() {
        return Eligibility::None;
    }

    // Step 4: threshold filtering on raw metrics. Conservative: a member
    // missing the thresholded metric is kept (§4.5).
    eligible.retain(|(_, member)| passes_thresholds(member, &snapshot.config.fallback));

    // Step 5: drop zero-score members.
    eligible.retain(|(_, member)| member.score > 0.0);

    if eligible.is_empty() {
        return Eligibility::None;
    }

    Eligibility::Members(eligible)
}

fn passes_thresholds(member: &PoolMember, fallback: &FallbackConfig) -> bool {
    if let Some(threshold) = fallback.member_running_req_threshold {
        if let Some(raw) = member.raw_metric("running_req") {
            if raw > threshold {
                return false;
            }
        }
    }
    if let Some(threshold) = fallback.member_waiting_queue_threshold {
        if let Some(raw) = member.raw_metric("waiting_queue") {
            if raw > threshold {
                return false;
            }
        }
    }
    true
}

/// `S = Σ s_i`; draw `u ~ Uniform(0, S)`; pick the smallest index `j` such
/// that the running sum reaches `u` (§4.5 step 7). Callers guarantee
/// `weights` is non-empty and every weight is `> 0`.
pub(crate) fn weighted_draw(weights: &[f64], rng: &mut impl Rng) -> usize {
    debug_assert!(!weights.is_empty());
    let total: f64 = weights.iter().sum();
    let u: f64 = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative >= u {
            return i;
        }
    }
    weights.len() - 1
}
