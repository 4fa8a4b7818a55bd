use std::fmt;

/// Process-wide unique identity of a pool: `(partition, name)`.
///
/// Rendered as `"<partition>/<name>"` everywhere the spec calls for a
/// pool-key string (registry lookups, log fields).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    pub partition: String,
    pub name: String,
}

impl PoolKey {
    pub fn new(partition: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.name)
    }
}

/// Identity of a member within its pool: `(ip, port)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub ip: String,
    pub port: u16,
}

impl MemberKey {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self { ip: ip.into(), port }
    }

    /// Parse the `"ip:port"` wire form used by the LB-facing API.
    pub fn parse(endpoint: &str) -> Option<Self> {
        let (ip, port) = endpoint.rsplit_once(':')?;
        let port: u16 = port.parse().ok()?;
        if ip.is_empty() {
            return None;
        }
        Some(Self::new(ip, port))
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_key_renders_partition_slash_name() {
        let key = PoolKey::new("prod", "chat-7b");
        assert_eq!(key.to_string(), "prod/chat-7b");
    }

    #[test]
    fn member_key_parses_ip_port() {
        let key = MemberKey::parse("10.0.0.5:8000").unwrap();
        assert_eq!(key.ip, "10.0.0.5");
        assert_eq!(key.port, 8000);
        assert_eq!(key.to_string(), "10.0.0.5:8000");
    }

    #[test]
    fn member_key_rejects_malformed_endpoint() {
        assert!(MemberKey::parse("no-port").is_none());
        assert!(MemberKey::parse(":8000").is_none());
    }

    #[test]
    fn member_key_handles_ipv6_last_colon() {
        // rsplit_once on ':' keeps this correct for bracketed-less inputs
        // because the port is always the last colon-delimited segment.
        let key = MemberKey::parse("host.internal:443").unwrap();
        assert_eq!(key.port, 443);
    }
}
