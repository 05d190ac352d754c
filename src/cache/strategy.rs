//! Eviction Strategy Module
//!
//! The pluggable policy capability shared by the LRU and LFU implementations.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::cache::{ByteView, LfuStrategy, LruStrategy};
use crate::error::CacheError;

// == Removal Observer ==
/// Receives every entry a strategy removes, whether by expiry or eviction.
///
/// Strategies hold only this narrow capability, never the owning cache.
pub trait RemovalObserver: Send {
    fn on_removed(&mut self, key: &str, value: &ByteView);
}

// == Eviction Strategy ==
/// Policy-ordered entry storage.
///
/// Implementations never evict on their own; the owning cache calls
/// [`EvictionStrategy::remove_oldest`] while it is over budget.
pub trait EvictionStrategy: Send {
    /// Returns the value if present and unexpired, recording an access.
    ///
    /// An expired entry is removed (notifying the observer) and reported absent.
    fn get(&mut self, key: &str) -> Option<ByteView>;

    /// Inserts or replaces an entry, recording an access on replacement.
    ///
    /// Returns the replaced value so the caller can release its bytes.
    fn add(&mut self, key: &str, value: ByteView, expire: Option<Instant>) -> Option<ByteView>;

    /// Removes exactly one entry chosen by policy. No-op when empty.
    fn remove_oldest(&mut self);

    fn set_removal_observer(&mut self, observer: Box<dyn RemovalObserver>);

    /// Number of resident entries, expired ones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Eviction Policy ==
/// Closed set of built-in strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used, ties broken by recency
    Lfu,
}

impl EvictionPolicy {
    /// Builds a fresh, empty strategy for this policy.
    pub fn build(self) -> Box<dyn EvictionStrategy> {
        match self {
            EvictionPolicy::Lru => Box::new(LruStrategy::new()),
            EvictionPolicy::Lfu => Box::new(LfuStrategy::new()),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction policy '{}', expected 'lru' or 'lfu'",
                other
            ))),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Lru => f.write_str("lru"),
            EvictionPolicy::Lfu => f.write_str("lfu"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("lru".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Lru);
        assert_eq!(" LFU ".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Lfu);
        assert!(matches!(
            "arc".parse::<EvictionPolicy>(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_policy_default_is_lru() {
        assert_eq!(EvictionPolicy::default(), EvictionPolicy::Lru);
        assert_eq!(EvictionPolicy::Lfu.to_string(), "lfu");
    }

    #[test]
    fn test_contract_for_both_policies() {
        for policy in [EvictionPolicy::Lru, EvictionPolicy::Lfu] {
            contract::hit_and_miss(policy);
            contract::replace_returns_previous(policy);
            contract::remove_oldest_on_empty_is_noop(policy);
            contract::remove_oldest_notifies_observer(policy);
        }
    }

    #[test]
    fn test_expiry_contract_for_both_policies() {
        contract::expired_entry_is_removed_on_get(EvictionPolicy::Lru);
        contract::expired_entry_is_removed_on_get(EvictionPolicy::Lfu);
    }
}
