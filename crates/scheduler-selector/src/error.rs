/// §7 `SelectError`: always resolved internally to the literal string
/// `"none"` at the HTTP boundary, never surfaced as a 5xx. Kept as a typed
/// enum so `scheduler-api` can log the reason without re-deriving it from
/// string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("pool is not configured")]
    PoolNotFound,
    #[error("candidate set is disjoint from the pool's current members")]
    NoEligibleCandidates,
    #[error("no candidate survived threshold filtering and scoring")]
    NoMembersRemaining,
}
