#![deny(clippy::pedantic, unsafe_code)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
#![allow(clippy::module_name_repetitions)]

//! Membership filters for trust-receive
//!
//! A membership filter is the fast path in front of the persistent store: it
//! answers "have we probably seen this dedup key before?" and records the key
//! in the same step. Filters never yield false negatives. A probable hit is
//! always re-checked against the store, so false positives only cost a read.

mod bloom;
mod exact;

pub use bloom::BloomFilter;
pub use exact::ExactFilter;

use serde::Serialize;

/// Default number of distinct keys the filter is sized for
pub const DEFAULT_CAPACITY: u64 = 1_000_000;

/// Default target false-positive rate
pub const DEFAULT_FP_RATE: f64 = 0.01;

/// Largest bit array a filter may allocate (4 GiB)
pub const MAX_NUM_BITS: u64 = 1 << 35;

/// Append-only probabilistic set over dedup keys.
///
/// Implementations must be safe to share across tasks. For a given key, at
/// most one of any set of concurrent `test_or_add` calls may return `false`.
pub trait MembershipFilter: Send + Sync {
    /// Check-and-insert. Returns whether the key was (probably) present before
    /// this call; the key is recorded as present either way.
    fn test_or_add(&self, key: &[u8]) -> bool;

    /// Read-only probe.
    fn contains(&self, key: &[u8]) -> bool;

    /// Sizing and fill information.
    fn stats(&self) -> FilterStats;
}

/// Snapshot of a filter's sizing and occupancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStats {
    /// Distinct keys the filter was sized for (0 when unbounded)
    pub capacity: u64,
    /// Keys inserted whose probe reported absent
    pub inserted: u64,
    /// Size of the bit array (0 for exact filters)
    pub num_bits: u64,
    /// Hash functions per key (0 for exact filters)
    pub num_hashes: u32,
    /// Fraction of bits set
    pub fill_ratio: f64,
    /// Probability that a never-inserted key currently probes as present
    pub estimated_fp_rate: f64,
}

impl FilterStats {
    /// Whether more keys were inserted than the filter was sized for.
    #[must_use]
    pub fn over_capacity(&self) -> bool {
        self.capacity > 0 && self.inserted > self.capacity
    }
}
