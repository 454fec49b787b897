//! Bloom filter with Kirsch-Mitzenmacher double hashing

use crate::{FilterStats, MembershipFilter, DEFAULT_CAPACITY, DEFAULT_FP_RATE, MAX_NUM_BITS};
use std::f64::consts::LN_2;
use std::sync::{Mutex, PoisonError};
use tr_errors::{ConfigError, Error};
use xxhash_rust::xxh3::xxh3_128;

#[derive(Debug)]
struct BitArray {
    words: Vec<u64>,
    set_bits: u64,
    inserted: u64,
}

impl BitArray {
    fn new(num_bits: u64) -> Self {
        Self {
            words: vec![0; num_bits.div_ceil(64) as usize],
            set_bits: 0,
            inserted: 0,
        }
    }

    fn get(&self, index: u64) -> bool {
        self.words[(index / 64) as usize] & (1 << (index % 64)) != 0
    }

    fn set(&mut self, index: u64) {
        let word = &mut self.words[(index / 64) as usize];
        let mask = 1 << (index % 64);
        if *word & mask == 0 {
            *word |= mask;
            self.set_bits += 1;
        }
    }
}

/// Fixed-size Bloom filter sized from an expected key count and FP rate.
///
/// The bit array sits behind a mutex held only for the probe and set of one
/// key. Store I/O never happens under this lock.
#[derive(Debug)]
pub struct BloomFilter {
    bits: Mutex<BitArray>,
    num_bits: u64,
    num_hashes: u32,
    capacity: u64,
}

impl BloomFilter {
    /// Size a filter for `capacity` distinct keys at `fp_rate` false positives.
    ///
    /// # Errors
    ///
    /// Returns a config error if `capacity` is zero or `fp_rate` is not
    /// strictly between 0 and 1.
    pub fn with_estimates(capacity: u64, fp_rate: f64) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "filter.capacity".to_string(),
                value: capacity.to_string(),
            }
            .into());
        }
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "filter.fp_rate".to_string(),
                value: fp_rate.to_string(),
            }
            .into());
        }

        let (num_bits, num_hashes) =
            optimal_parameters(capacity, fp_rate).ok_or_else(|| ConfigError::InvalidValue {
                field: "filter.capacity".to_string(),
                value: format!("{capacity} at fp_rate {fp_rate} needs more than {MAX_NUM_BITS} bits"),
            })?;
        tracing::debug!(
            capacity,
            fp_rate,
            num_bits,
            num_hashes,
            "sized membership filter"
        );
        Ok(Self {
            bits: Mutex::new(BitArray::new(num_bits)),
            num_bits,
            num_hashes,
            capacity,
        })
    }

    /// Filter for 1,000,000 keys at 1% false positives
    #[must_use]
    pub fn with_defaults() -> Self {
        // ~9.6 Mbit, far below MAX_NUM_BITS
        let (num_bits, num_hashes) =
            optimal_parameters(DEFAULT_CAPACITY, DEFAULT_FP_RATE).unwrap_or((9_585_059, 7));
        Self {
            bits: Mutex::new(BitArray::new(num_bits)),
            num_bits,
            num_hashes,
            capacity: DEFAULT_CAPACITY,
        }
    }

    #[must_use]
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    #[must_use]
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    fn indices(&self, key: &[u8]) -> impl Iterator<Item = u64> + '_ {
        let digest = xxh3_128(key);
        let h1 = digest as u64;
        // Odd step so successive probes never collapse onto one bit.
        let h2 = ((digest >> 64) as u64) | 1;
        (0..u64::from(self.num_hashes))
            .map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits)
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MembershipFilter for BloomFilter {
    fn test_or_add(&self, key: &[u8]) -> bool {
        // Bits only ever go from 0 to 1, so a poisoned guard is still valid.
        let mut bits = self.bits.lock().unwrap_or_else(PoisonError::into_inner);
        let mut present = true;
        for index in self.indices(key) {
            if !bits.get(index) {
                present = false;
                bits.set(index);
            }
        }
        if !present {
            bits.inserted += 1;
        }
        present
    }

    fn contains(&self, key: &[u8]) -> bool {
        let bits = self.bits.lock().unwrap_or_else(PoisonError::into_inner);
        self.indices(key).all(|index| bits.get(index))
    }

    fn stats(&self) -> FilterStats {
        let bits = self.bits.lock().unwrap_or_else(PoisonError::into_inner);
        let fill_ratio = bits.set_bits as f64 / self.num_bits as f64;
        FilterStats {
            capacity: self.capacity,
            inserted: bits.inserted,
            num_bits: self.num_bits,
            num_hashes: self.num_hashes,
            fill_ratio,
            estimated_fp_rate: fill_ratio.powi(self.num_hashes as i32),
        }
    }
}

/// Bit count `m = -n ln p / ln²2` and hash count `k = m/n · ln 2`, or `None`
/// when `m` exceeds [`MAX_NUM_BITS`].
fn optimal_parameters(capacity: u64, fp_rate: f64) -> Option<(u64, u32)> {
    let n = capacity as f64;
    let bits = (-n * fp_rate.ln() / (LN_2 * LN_2)).ceil().max(64.0);
    if !bits.is_finite() || bits > MAX_NUM_BITS as f64 {
        return None;
    }
    let num_bits = bits as u64;
    let num_hashes = ((num_bits as f64 / n) * LN_2).round().max(1.0) as u32;
    Some((num_bits, num_hashes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizing() {
        let filter = BloomFilter::with_defaults();
        // ~9.59 Mbit and 7 hashes for 1M keys at 1%
        assert!((9_500_000..9_700_000).contains(&filter.num_bits()));
        assert_eq!(filter.num_hashes(), 7);
    }

    #[test]
    fn test_rejects_invalid_sizing() {
        assert!(BloomFilter::with_estimates(0, 0.01).is_err());
        assert!(BloomFilter::with_estimates(100, 0.0).is_err());
        assert!(BloomFilter::with_estimates(100, 1.0).is_err());
        assert!(BloomFilter::with_estimates(100, f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_oversized_bit_array() {
        let err = BloomFilter::with_estimates(u64::MAX / 4, 0.01).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref field, .. }) if field == "filter.capacity"
        ));
        assert!(BloomFilter::with_estimates(1_000, 1e-300).is_ok());
        assert!(BloomFilter::with_estimates(1 << 40, 1e-9).is_err());
    }

    #[test]
    fn test_test_or_add_reports_prior_presence() {
        let filter = BloomFilter::with_estimates(1000, 0.01).unwrap();
        assert!(!filter.contains(b"alpha"));
        assert!(!filter.test_or_add(b"alpha"));
        assert!(filter.test_or_add(b"alpha"));
        assert!(filter.contains(b"alpha"));
        assert_eq!(filter.stats().inserted, 1);
    }

    #[test]
    fn test_no_false_negatives_past_capacity() {
        let filter = BloomFilter::with_estimates(100, 0.01).unwrap();
        let keys: Vec<String> = (0..1000).map(|i| format!("key-{i}")).collect();
        for key in &keys {
            filter.test_or_add(key.as_bytes());
        }
        for key in &keys {
            assert!(filter.test_or_add(key.as_bytes()), "lost {key}");
        }
        assert!(filter.stats().over_capacity());
    }

    #[test]
    fn test_false_positive_rate_near_target() {
        let filter = BloomFilter::with_estimates(10_000, 0.01).unwrap();
        for i in 0..10_000 {
            filter.test_or_add(format!("in-{i}").as_bytes());
        }
        let false_positives = (0..10_000)
            .filter(|i| filter.contains(format!("out-{i}").as_bytes()))
            .count();
        // 1% target; allow generous slack for hash variance.
        assert!(false_positives < 300, "{false_positives} false positives");
        let stats = filter.stats();
        assert!(stats.estimated_fp_rate < 0.03);
        assert!(stats.fill_ratio > 0.3 && stats.fill_ratio < 0.7);
    }
}
