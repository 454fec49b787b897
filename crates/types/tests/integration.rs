//! Integration tests for types

#[cfg(test)]
mod tests {
    use tr_errors::VerifyError;
    use tr_types::*;

    #[test]
    fn test_conflict_record_into_error() {
        let record = ConflictRecord {
            url: "https://example.com/b.txt".into(),
            last_modified: "2023-01-01".into(),
            stored: "11".into(),
            reported: "22".into(),
            size: 200,
        };
        let err: VerifyError = record.into();
        let VerifyError::Conflict { size, reported, .. } = err else {
            panic!("expected conflict");
        };
        assert_eq!(size, 200);
        assert_eq!(reported, "22");
    }

    #[test]
    fn test_report_roundtrips_canonical_names() {
        let report = FileReport::new("https://example.com/a.txt", "hash1", 100, "2023-01-01");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"last_modified\""));
        let back: FileReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
