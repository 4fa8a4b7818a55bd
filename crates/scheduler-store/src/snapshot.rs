use std::collections::HashMap;

use scheduler_types::{MemberKey, PoolConfig, PoolMember};

/// A consistent, owned read of one pool at a point in time. The Selector
/// and the `/pools/.../status` handlers both work from this rather than a
/// live reference, so a long-held read never blocks a writer (§4.5
/// "Latency target").
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub config: PoolConfig,
    pub members: HashMap<MemberKey, PoolMember>,
}
