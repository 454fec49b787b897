//! Integration tests for config

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use tr_config::*;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "TR_FILTER_CAPACITY",
        "TR_FILTER_FP_RATE",
        "TR_STORE_BACKEND",
        "TR_STORE_PATH",
        "TR_KEY_PREFIX",
        "TR_DEADLINE_MS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[filter]
capacity = 5000
fp_rate = 0.001

[store]
backend = "sqlite"
path = "/var/lib/trust-receive/trust.sqlite"

[verify]
deadline_ms = 250

[alert]
command = ["notify-oncall", "--team", "cdn"]
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.filter.capacity, 5000);
        assert!((config.filter.fp_rate - 0.001).abs() < f64::EPSILON);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.key_prefix, "file:");
        assert_eq!(config.deadline(), Some(Duration::from_millis(250)));
        assert_eq!(config.alert.command.as_ref().map(Vec::len), Some(3));
        assert_eq!(config.alert_timeout(), Duration::from_secs(10));
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.filter.capacity, 1_000_000);
        assert!((config.filter.fp_rate - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.deadline().is_none());
        config.validate().unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = Config::load_from_file(std::path::Path::new("/nonexistent/tr.toml")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[filter\ncapacity = ").unwrap();
        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("TR_FILTER_CAPACITY", "42");
        std::env::set_var("TR_STORE_BACKEND", "sqlite");
        std::env::set_var("TR_KEY_PREFIX", "cdn:");
        std::env::set_var("TR_DEADLINE_MS", "500");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.filter.capacity, 42);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.key_prefix, "cdn:");
        assert_eq!(config.verify.deadline_ms, Some(500));

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("TR_STORE_BACKEND", "redis");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }

    #[test]
    fn test_validate_rejects_bad_sizing() {
        let mut config = Config::default();
        config.filter.fp_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.alert.command = Some(Vec::new());
        assert!(config.validate().is_err());
    }
}
