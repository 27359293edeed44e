#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use driverscope_domain::{BackendKind, MetricsConfig};
use tempfile::NamedTempFile;

/// Write `contents` to a temp file carrying `extension` and return its path.
pub fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

/// Enabled configuration for `backend` with a short sampling interval.
pub fn enabled_config(backend: BackendKind) -> MetricsConfig {
    MetricsConfig { enabled: true, backend, sample_interval_ms: 10, ..MetricsConfig::default() }
}

/// Shared counter standing in for a live pool size.
#[derive(Clone, Default)]
pub struct LiveValue(Arc<AtomicU64>);

impl LiveValue {
    pub fn set(&self, value: u64) {
        self.0.store(value, Ordering::SeqCst);
    }

    pub fn provider(&self) -> impl Fn() -> f64 + Send + Sync + 'static {
        let inner = Arc::clone(&self.0);
        move || inner.load(Ordering::SeqCst) as f64
    }
}
