//! Integration tests for the assembled metrics runtime
//!
//! Drives the manager through both backends and checks what a host would
//! read from the export side.

mod support;

use std::time::Duration;

use driverscope_common::testing::poll_until;
use driverscope_domain::{BackendKind, DriverError, SeriesKey, TableMeta};
use driverscope_infra::{build_metrics_runtime, MetricsExport};
use support::{enabled_config, LiveValue};

#[tokio::test(flavor = "multi_thread")]
async fn test_prometheus_runtime_records_requests_and_failures() {
    let runtime = build_metrics_runtime(&enabled_config(BackendKind::Prometheus)).unwrap();
    let manager = runtime.manager().clone();
    let users = TableMeta::new("shop", "users");

    for _ in 0..3 {
        let row = manager.instrument(Some(&users), async { Ok::<_, DriverError>(1) }).await;
        assert_eq!(row, Ok(1));
    }
    let failed = manager
        .instrument(Some(&users), async {
            Err::<u8, _>(DriverError::OperationTimedOut { host: "10.0.0.1".into(), timeout_ms: 500 })
        })
        .await;
    assert!(matches!(failed, Err(DriverError::OperationTimedOut { .. })));

    let MetricsExport::Prometheus(backend) = runtime.export() else {
        panic!("expected prometheus export");
    };
    let text = backend.encode_text().unwrap();
    assert!(text.contains("driver_request_timer_count{context=\"shop.users\"} 3"), "{text}");
    assert!(text.contains("driver_operation_time_out_errors{context=\"\"} 1"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_memory_runtime_snapshot() {
    let runtime = build_metrics_runtime(&enabled_config(BackendKind::Memory)).unwrap();
    let manager = runtime.manager();

    drop(manager.start_open_connection_timer());
    drop(manager.start_request_timer(None));
    manager.report_failure(&DriverError::Unavailable {
        consistency: "QUORUM".into(),
        required: 2,
        alive: 1,
    });

    let MetricsExport::Memory(backend) = runtime.export() else {
        panic!("expected memory export");
    };
    let snapshot = backend.snapshot();
    assert_eq!(snapshot.counters.get("unavailable-errors"), Some(&1));
    assert_eq!(snapshot.timers.get("open-connection-timer").map(|s| s.count), Some(1));
    assert_eq!(
        snapshot.timers.get("request-timer[undefined-keyspace.undefined-table]").map(|s| s.count),
        Some(1)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sampler_refreshes_live_gauges() {
    let mut runtime = build_metrics_runtime(&enabled_config(BackendKind::Memory)).unwrap();
    let in_flight = LiveValue::default();
    in_flight.set(2);
    runtime.manager().register_in_flight_requests_gauge(in_flight.provider());

    let MetricsExport::Memory(backend) = runtime.export().clone() else {
        panic!("expected memory export");
    };
    let key = SeriesKey::new("in-flight-requests", None);
    assert_eq!(backend.gauge(&key), Some(2.0));

    runtime.start_sampler().unwrap();
    in_flight.set(9);

    let refreshed = poll_until(Duration::from_secs(2), Duration::from_millis(10), || {
        let backend = backend.clone();
        let key = key.clone();
        async move { backend.gauge(&key) == Some(9.0) }
    })
    .await;
    assert!(refreshed, "sampler should publish the new provider value");

    runtime.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disabled_runtime_never_exports() {
    let mut config = enabled_config(BackendKind::Prometheus);
    config.enabled = false;
    let mut runtime = build_metrics_runtime(&config).unwrap();

    let value = runtime
        .manager()
        .instrument(None, async { Err::<(), _>(DriverError::Cancelled) })
        .await;
    assert_eq!(value, Err(DriverError::Cancelled));

    runtime.start_sampler().unwrap();
    assert!(!runtime.is_sampling());
    assert!(matches!(runtime.export(), MetricsExport::Disabled));
}
