//! Exact membership set with no false positives

use crate::{FilterStats, MembershipFilter};
use dashmap::DashSet;

/// Exact set backed by a sharded concurrent hash set.
///
/// Memory grows with every key, so this suits bounded workloads and tests.
#[derive(Debug, Default)]
pub struct ExactFilter {
    keys: DashSet<Vec<u8>>,
}

impl ExactFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl MembershipFilter for ExactFilter {
    fn test_or_add(&self, key: &[u8]) -> bool {
        // Shard lock makes insert the check-and-set.
        !self.keys.insert(key.to_vec())
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.keys.contains(key)
    }

    fn stats(&self) -> FilterStats {
        FilterStats {
            capacity: 0,
            inserted: self.keys.len() as u64,
            num_bits: 0,
            num_hashes: 0,
            fill_ratio: 0.0,
            estimated_fp_rate: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_filter() {
        let filter = ExactFilter::new();
        assert!(filter.is_empty());
        assert!(!filter.test_or_add(b"a"));
        assert!(filter.test_or_add(b"a"));
        assert!(!filter.contains(b"b"));
        assert_eq!(filter.len(), 1);
        assert!(!filter.stats().over_capacity());
    }
}
