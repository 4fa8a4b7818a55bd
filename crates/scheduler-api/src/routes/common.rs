use std::collections::HashSet;

use scheduler_selector::{eligible_members, Eligibility, WeightedMember};
use scheduler_store::PoolSnapshot;
use scheduler_types::MemberKey;

/// Steps 2-6 of §4.5 applied to a simulation candidate set, converted to
/// the frozen `(key, score)` pairs `scheduler_selector::analyze` draws
/// from. `None` means the pool-fallback gate is open or nothing survived
/// filtering — both cases report zero eligible members to the caller
/// rather than erroring (§7 propagation policy).
pub(super) fn weighted_members(
    snapshot: &PoolSnapshot,
    candidates: &HashSet<MemberKey>,
) -> Vec<WeightedMember> {
    match eligible_members(snapshot, candidates) {
        Eligibility::Fallback | Eligibility::None => Vec::new(),
        Eligibility::Members(members) => members
            .into_iter()
            .map(|(key, member)| WeightedMember { key: key.to_string(), score: member.score })
            .collect(),
    }
}
