//! Mana and resource pools as reported by the match service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Energy available to spend this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManaPool {
    #[serde(default)]
    pub available: u32,
    #[serde(default)]
    pub maximum: u32,
}

impl fmt::Display for ManaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.available, self.maximum)
    }
}

/// Power resources: a universal scalar plus per-domain amounts
///
/// Domains are opaque labels owned by the match service ("fury", "calm", ...).
/// A `BTreeMap` keeps display order stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePool {
    #[serde(default)]
    pub universal: u32,
    #[serde(default)]
    pub domains: BTreeMap<String, u32>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>, amount: u32) -> Self {
        self.domains.insert(domain.into(), amount);
        self
    }

    /// Amount available for a domain (universal resources excluded)
    pub fn domain(&self, domain: &str) -> u32 {
        self.domains.get(domain).copied().unwrap_or(0)
    }

    /// Universal plus every domain amount, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.domains
            .values()
            .fold(self.universal, |acc, amount| acc.saturating_add(*amount))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} universal", self.universal)?;
        for (domain, amount) in self.domains.iter().filter(|(_, a)| **a > 0) {
            write!(f, ", {amount} {domain}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_pool_total() {
        let mut pool = ResourcePool::new().with_domain("fury", 2).with_domain("calm", 1);
        pool.universal = 3;

        assert_eq!(pool.total(), 6);
        assert_eq!(pool.domain("fury"), 2);
        assert_eq!(pool.domain("chaos"), 0);
        assert!(!pool.is_empty());
        assert!(ResourcePool::new().is_empty());
    }

    #[test]
    fn test_resource_pool_total_saturates() {
        let mut pool = ResourcePool::new().with_domain("fury", 1).with_domain("calm", u32::MAX);
        pool.universal = u32::MAX;
        assert_eq!(pool.total(), u32::MAX);

        let pool = ResourcePool::new()
            .with_domain("fury", u32::MAX - 1)
            .with_domain("calm", 1);
        assert_eq!(pool.total(), u32::MAX);
    }

    #[test]
    fn test_resource_pool_display_skips_empty_domains() {
        let mut pool = ResourcePool::new().with_domain("fury", 2).with_domain("mind", 0);
        pool.universal = 1;
        assert_eq!(pool.to_string(), "1 universal, 2 fury");
    }

    #[test]
    fn test_resource_pool_wire_format() {
        let pool: ResourcePool =
            serde_json::from_str(r#"{"universal": 1, "domains": {"body": 2}}"#).unwrap();
        assert_eq!(pool.universal, 1);
        assert_eq!(pool.domain("body"), 2);

        let empty: ResourcePool = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
