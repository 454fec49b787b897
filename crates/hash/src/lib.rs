#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! BLAKE3 key derivation for trust-receive
//!
//! A report is reduced to two fixed-size digests:
//! - [`DedupKey`] identifies a resource version (URL + Last-Modified)
//! - [`Fingerprint`] identifies the claimed content (hash + size)
//!
//! Both use BLAKE3 in derive-key mode with distinct contexts, and every
//! variable-length field is length-prefixed so that shifting bytes between
//! fields always changes the digest.

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use tr_errors::{Error, StoreError};
use tr_types::FileReport;

/// Digest length in bytes
pub const DIGEST_LEN: usize = 32;

const DEDUP_KEY_CONTEXT: &str = "trust-receive 2024 dedup-key v1";
const FINGERPRINT_CONTEXT: &str = "trust-receive 2024 fingerprint v1";

fn update_field(hasher: &mut Hasher, field: &[u8]) {
    hasher.update(&(field.len() as u64).to_be_bytes());
    hasher.update(field);
}

fn decode_hex(s: &str) -> Result<[u8; DIGEST_LEN], Error> {
    let bytes = hex::decode(s).map_err(|e| StoreError::CorruptedData {
        message: format!("invalid hex: {e}"),
    })?;

    if bytes.len() != DIGEST_LEN {
        return Err(StoreError::CorruptedData {
            message: format!("digest must be {DIGEST_LEN} bytes, got {}", bytes.len()),
        }
        .into());
    }

    let mut array = [0u8; DIGEST_LEN];
    array.copy_from_slice(&bytes);
    Ok(array)
}

/// Identity of a resource version, independent of its claimed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    bytes: [u8; DIGEST_LEN],
}

impl DedupKey {
    /// Derive the key for a URL and Last-Modified pair
    #[must_use]
    pub fn derive(url: &str, last_modified: &str) -> Self {
        let mut hasher = Hasher::new_derive_key(DEDUP_KEY_CONTEXT);
        update_field(&mut hasher, url.as_bytes());
        update_field(&mut hasher, last_modified.as_bytes());
        Self {
            bytes: *hasher.finalize().as_bytes(),
        }
    }

    #[must_use]
    pub fn for_report(report: &FileReport) -> Self {
        Self::derive(&report.url, &report.last_modified)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or is not exactly 64 characters.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        Ok(Self {
            bytes: decode_hex(s)?,
        })
    }
}

/// Claimed content of a resource version: the reported hash bound to its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    bytes: [u8; DIGEST_LEN],
}

impl Fingerprint {
    /// Derive the fingerprint for a content hash and byte size
    #[must_use]
    pub fn derive(hash: &str, size: u64) -> Self {
        let mut hasher = Hasher::new_derive_key(FINGERPRINT_CONTEXT);
        update_field(&mut hasher, hash.as_bytes());
        hasher.update(&size.to_be_bytes());
        Self {
            bytes: *hasher.finalize().as_bytes(),
        }
    }

    #[must_use]
    pub fn for_report(report: &FileReport) -> Self {
        Self::derive(&report.hash, report.size)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string, as read back from the store
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or is not exactly 64 characters.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        Ok(Self {
            bytes: decode_hex(s)?,
        })
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for DedupKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DedupKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = DedupKey::derive("https://example.com/a.txt", "2023-01-01");
        let b = DedupKey::derive("https://example.com/a.txt", "2023-01-01");
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn test_key_depends_on_last_modified() {
        let a = DedupKey::derive("https://example.com/a.txt", "2023-01-01");
        let b = DedupKey::derive("https://example.com/a.txt", "2023-01-02");
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_fields_do_not_run_together() {
        let a = DedupKey::derive("https://example.com/ab", "c");
        let b = DedupKey::derive("https://example.com/a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_binds_hash_and_size() {
        let base = Fingerprint::derive("hash1", 100);
        assert_eq!(base, Fingerprint::derive("hash1", 100));
        assert_ne!(base, Fingerprint::derive("hash2", 100));
        assert_ne!(base, Fingerprint::derive("hash1", 200));
    }

    #[test]
    fn test_key_and_fingerprint_domains_are_separate() {
        // Same bytes fed to both derivations must not collide.
        let key = DedupKey::derive("x", "");
        let fp = Fingerprint::derive("x", 0);
        assert_ne!(key.as_bytes(), fp.as_bytes());
    }

    #[test]
    fn test_hex_roundtrip() {
        let fp = Fingerprint::derive("hash1", 100);
        assert_eq!(Fingerprint::from_hex(&fp.to_hex()).unwrap(), fp);
    }

    #[test]
    fn test_serialization() {
        let key = DedupKey::derive("https://example.com/a.txt", "2023-01-01");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.to_hex()));
        let deserialized: DedupKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, deserialized);
    }
}
