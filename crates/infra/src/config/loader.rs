//! Configuration loader
//!
//! Loads instrumentation configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `DRIVERSCOPE_METRICS_ENABLED` is unset, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DRIVERSCOPE_METRICS_ENABLED`: Whether metrics are collected (required)
//! - `DRIVERSCOPE_METRICS_BACKEND`: `prometheus` or `memory`
//! - `DRIVERSCOPE_METRICS_NAMESPACE`: Prefix for exported series
//! - `DRIVERSCOPE_METRICS_SAMPLE_INTERVAL_MS`: Gauge sampling interval
//! - `DRIVERSCOPE_LOG_FILTER`: Default tracing filter directive
//! - `DRIVERSCOPE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./driverscope.json` or `./driverscope.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../driverscope.json` or `../driverscope.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use driverscope_domain::constants::{
    ENV_LOG_FILTER, ENV_LOG_JSON, ENV_METRICS_BACKEND, ENV_METRICS_ENABLED,
    ENV_METRICS_NAMESPACE, ENV_METRICS_SAMPLE_INTERVAL_MS,
};
use driverscope_domain::{BackendKind, Config, DriverScopeError, Result};

/// Load configuration with automatic fallback strategy
///
/// Environment variables are used whenever `DRIVERSCOPE_METRICS_ENABLED` is
/// set, and their errors are returned as-is. Only when it is unset does the
/// loader fall back to a config file.
///
/// # Errors
/// Returns `DriverScopeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Values fail validation
pub fn load() -> Result<Config> {
    if std::env::var_os(ENV_METRICS_ENABLED).is_none() {
        tracing::debug!(var = ENV_METRICS_ENABLED, "Environment not configured, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// `DRIVERSCOPE_METRICS_ENABLED` must be present; every other variable falls
/// back to its default when unset.
///
/// # Errors
/// Returns `DriverScopeError::Config` if the required variable is missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let enabled = env_bool(ENV_METRICS_ENABLED)?.ok_or_else(|| {
        DriverScopeError::Config(format!(
            "Missing required environment variable: {ENV_METRICS_ENABLED}"
        ))
    })?;

    let mut config = Config::default();
    config.metrics.enabled = enabled;

    if let Ok(backend) = std::env::var(ENV_METRICS_BACKEND) {
        config.metrics.backend = backend
            .parse::<BackendKind>()
            .map_err(|e| DriverScopeError::Config(format!("Invalid metrics backend: {e}")))?;
    }
    if let Ok(namespace) = std::env::var(ENV_METRICS_NAMESPACE) {
        config.metrics.namespace = namespace;
    }
    if let Ok(interval) = std::env::var(ENV_METRICS_SAMPLE_INTERVAL_MS) {
        config.metrics.sample_interval_ms = interval.parse::<u64>().map_err(|e| {
            DriverScopeError::Config(format!("Invalid sample interval: {e}"))
        })?;
    }
    if let Ok(filter) = std::env::var(ENV_LOG_FILTER) {
        config.logging.filter = filter;
    }
    if let Some(json) = env_bool(ENV_LOG_JSON)? {
        config.logging.json = json;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `DriverScopeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DriverScopeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DriverScopeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DriverScopeError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DriverScopeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DriverScopeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(DriverScopeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["driverscope.json", "driverscope.toml", "config.json", "config.toml"];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a boolean environment variable, `None` when unset
///
/// # Errors
/// Returns `DriverScopeError::Config` if the variable is set to anything
/// [`parse_bool`] rejects.
fn env_bool(key: &str) -> Result<Option<bool>> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| DriverScopeError::Config(format!("Invalid {key}: {raw}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 6] = [
        ENV_METRICS_ENABLED,
        ENV_METRICS_BACKEND,
        ENV_METRICS_NAMESPACE,
        ENV_METRICS_SAMPLE_INTERVAL_MS,
        ENV_LOG_FILTER,
        ENV_LOG_JSON,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_parse_bool() {
        for value in ["1", "true", "YES", "On"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["0", "false", "No", "OFF"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_env_bool_unset_and_invalid() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::remove_var("DRIVERSCOPE_TEST_BOOL");
        assert_eq!(env_bool("DRIVERSCOPE_TEST_BOOL").unwrap(), None);

        std::env::set_var("DRIVERSCOPE_TEST_BOOL", "off");
        assert_eq!(env_bool("DRIVERSCOPE_TEST_BOOL").unwrap(), Some(false));

        std::env::set_var("DRIVERSCOPE_TEST_BOOL", "sure");
        assert!(matches!(env_bool("DRIVERSCOPE_TEST_BOOL"), Err(DriverScopeError::Config(_))));
        std::env::remove_var("DRIVERSCOPE_TEST_BOOL");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_METRICS_ENABLED, "true");
        std::env::set_var(ENV_METRICS_BACKEND, "memory");
        std::env::set_var(ENV_METRICS_NAMESPACE, "cassandra");
        std::env::set_var(ENV_METRICS_SAMPLE_INTERVAL_MS, "250");
        std::env::set_var(ENV_LOG_FILTER, "driverscope=debug");
        std::env::set_var(ENV_LOG_JSON, "yes");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.backend, BackendKind::Memory);
        assert_eq!(config.metrics.namespace, "cassandra");
        assert_eq!(config.metrics.sample_interval_ms, 250);
        assert_eq!(config.logging.filter, "driverscope=debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_missing_enabled_flag() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, DriverScopeError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_METRICS_ENABLED, "sometimes");
        assert!(matches!(load_from_env(), Err(DriverScopeError::Config(_))));

        std::env::set_var(ENV_METRICS_ENABLED, "1");
        std::env::set_var(ENV_METRICS_SAMPLE_INTERVAL_MS, "soon");
        assert!(matches!(load_from_env(), Err(DriverScopeError::Config(_))));

        std::env::set_var(ENV_METRICS_SAMPLE_INTERVAL_MS, "0");
        assert!(matches!(load_from_env(), Err(DriverScopeError::Config(_))));

        std::env::remove_var(ENV_METRICS_SAMPLE_INTERVAL_MS);
        std::env::set_var(ENV_METRICS_BACKEND, "statsd");
        assert!(matches!(load_from_env(), Err(DriverScopeError::Config(_))));

        std::env::remove_var(ENV_METRICS_BACKEND);
        std::env::set_var(ENV_LOG_JSON, "verbose");
        assert!(matches!(load_from_env(), Err(DriverScopeError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_reports_env_error_instead_of_falling_back() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_METRICS_ENABLED, "true");
        std::env::set_var(ENV_METRICS_BACKEND, "statsd");
        let result = load();
        clear_env();

        match result {
            Err(DriverScopeError::Config(message)) => {
                assert!(message.contains("Invalid metrics backend"), "{message}");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_uses_env_when_enabled_flag_is_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_METRICS_ENABLED, "false");
        std::env::set_var(ENV_METRICS_NAMESPACE, "from_env");
        let result = load();
        clear_env();

        let config = result.expect("config from env");
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.namespace, "from_env");
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "metrics": { "enabled": true, "backend": "prometheus", "namespace": "app" },
                "logging": { "json": true }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config from JSON");
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.namespace, "app");
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[metrics]
enabled = true
backend = "memory"
sample_interval_ms = 1000
timer_buckets_ms = [1.0, 5.0, 25.0]

[logging]
filter = "warn"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from TOML");
        assert_eq!(config.metrics.backend, BackendKind::Memory);
        assert_eq!(config.metrics.sample_interval_ms, 1000);
        assert_eq!(config.metrics.timer_buckets_ms, vec![1.0, 5.0, 25.0]);
        assert_eq!(config.logging.filter, "warn");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let path = temp_config("[metrics]\nnamespace = \"bad-name\"\n", "toml");
        assert!(matches!(load_from_file(Some(path.clone())), Err(DriverScopeError::Config(_))));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/driverscope.json")));
        assert!(matches!(result, Err(DriverScopeError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = temp_config(r#"{ "metrics": "#, "json");
        assert!(load_from_file(Some(path.clone())).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("metrics: {}", &PathBuf::from("driverscope.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_parse_config_empty_toml_is_default() {
        let config = parse_config("", &PathBuf::from("driverscope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
