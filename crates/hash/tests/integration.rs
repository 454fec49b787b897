//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tr_hash::*;
    use tr_types::FileReport;

    #[test]
    fn test_report_helpers_match_field_derivation() {
        let report = FileReport::new("https://example.com/a.txt", "hash1", 100, "2023-01-01");
        assert_eq!(
            DedupKey::for_report(&report),
            DedupKey::derive("https://example.com/a.txt", "2023-01-01")
        );
        assert_eq!(
            Fingerprint::for_report(&report),
            Fingerprint::derive("hash1", 100)
        );
    }

    #[test]
    fn test_key_ignores_content_fields() {
        let a = FileReport::new("https://example.com/a.txt", "hash1", 100, "2023-01-01");
        let b = FileReport::new("https://example.com/a.txt", "hash2", 200, "2023-01-01");
        assert_eq!(DedupKey::for_report(&a), DedupKey::for_report(&b));
        assert_ne!(Fingerprint::for_report(&a), Fingerprint::for_report(&b));
    }

    #[test]
    fn test_from_hex_errors() {
        // Too short
        assert!(Fingerprint::from_hex("1234").is_err());
        // Too long
        assert!(Fingerprint::from_hex(&"a".repeat(66)).is_err());
        // Invalid hex
        assert!(DedupKey::from_hex("xyz123").is_err());
    }

    proptest! {
        #[test]
        fn prop_distinct_versions_get_distinct_keys(
            url in "[a-z]{1,12}",
            lm_a in "[0-9]{1,8}",
            lm_b in "[0-9]{1,8}",
        ) {
            prop_assume!(lm_a != lm_b);
            prop_assert_ne!(DedupKey::derive(&url, &lm_a), DedupKey::derive(&url, &lm_b));
        }

        #[test]
        fn prop_size_change_changes_fingerprint(hash in "[a-f0-9]{1,16}", a: u64, b: u64) {
            prop_assume!(a != b);
            prop_assert_ne!(Fingerprint::derive(&hash, a), Fingerprint::derive(&hash, b));
        }
    }
}
