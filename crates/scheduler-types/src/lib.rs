//! Shared domain vocabulary for the inference routing sidecar.
//!
//! Every other crate in the workspace depends on this one for the pool /
//! member / algorithm model so that the Score Engine, Pool Store, Selector,
//! Membership Fetcher and Metrics Collector all agree on the same types
//! without depending on each other.

mod algorithm;
mod engine;
mod keys;
mod member;
mod metrics_endpoint;
mod pool;

pub use algorithm::{Algorithm, AlgorithmName, AlgorithmParams};
pub use engine::{EngineKind, SemanticMetric};
pub use keys::{MemberKey, PoolKey};
pub use member::{MemberStatus, PoolMember};
pub use metrics_endpoint::{BasicAuthCredentials, MetricsEndpointConfig, Scheme};
pub use pool::{FallbackConfig, PoolConfig};
