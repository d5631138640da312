// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Integration tests for recovery into the JSON file store
//!
//! Capture into a real buffer directory, abandon the buffer, then recover it
//! through the traced JSON store as the binary does at startup.

use chrono::{DateTime, TimeZone, Utc};
use labcap_adapters::{JsonStore, TracedStore};
use labcap_core::{AuditLevel, FakeClock, Metadata, SessionId};
use labcap_recovery::{RecoveryScanner, RECOVERY_CATEGORY};
use labcap_storage::{BufferConfig, BufferDir, SessionBuffer};
use serde_json::json;
use tempfile::TempDir;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn metadata(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap()
}

struct Fixture {
    _tmp: TempDir,
    buffers: BufferDir,
    store: JsonStore,
}

fn fixture(threshold: u32) -> Fixture {
    let tmp = TempDir::new().unwrap();
    let buffers = BufferDir::open(
        BufferConfig::new(tmp.path().join("buffers")).with_flush_threshold(threshold),
    )
    .unwrap();
    let store = JsonStore::open(tmp.path().join("store")).unwrap();
    Fixture {
        _tmp: tmp,
        buffers,
        store,
    }
}

#[tokio::test]
async fn abandoned_capture_lands_in_json_store() {
    let fx = fixture(100);
    let mut buffer = SessionBuffer::create(
        &fx.buffers,
        SessionId(42),
        at(0),
        metadata(json!({"model": "XR-200", "serial": "A1"})),
        metadata(json!({"operator": "kim"})),
    )
    .unwrap();
    for i in 0..150 {
        buffer
            .append_measurement(
                at(i + 1),
                vec![0xAA, i as u8],
                json!({"value": i}),
                metadata(json!({"mean": 1.5})),
            )
            .unwrap();
        if i == 75 {
            buffer
                .append_audit_event(AuditLevel::Warning, "device", "drift detected", json!({"ppm": 3}))
                .unwrap();
            buffer
                .update_metadata(metadata(json!({"sample": {"id": "S-9"}})))
                .unwrap();
        }
    }
    let path = buffer.path().to_path_buf();
    drop(buffer);

    let scanner = RecoveryScanner::new(FakeClock::at(at(9_999)));
    let summary = scanner
        .run_at_startup(fx.buffers.path(), &TracedStore::new(fx.store.clone()))
        .await
        .unwrap();

    assert_eq!(summary.recovered_sessions, 1);
    assert_eq!(summary.recovered_measurements, 150);
    assert!(summary.is_clean());
    assert!(!path.exists());

    let row = fx.store.load_session(SessionId(42)).unwrap();
    assert_eq!(row.started_at, at(0));
    assert_eq!(row.ended_at, Some(at(150)));
    assert_eq!(row.measurement_count, Some(150));
    assert_eq!(
        row.metadata,
        metadata(json!({"operator": "kim", "sample": {"id": "S-9"}}))
    );

    let measurements = fx.store.load_measurements(SessionId(42)).unwrap();
    assert_eq!(measurements.len(), 150);
    assert_eq!(measurements[0].raw_frame, vec![0xAA, 0]);
    assert_eq!(measurements[149].captured_at, at(150));

    let audit = fx.store.load_audit_events(SessionId(42)).unwrap();
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[0].category, "device");
    assert_eq!(audit[1].category, RECOVERY_CATEGORY);
}

#[tokio::test]
async fn second_startup_after_recovery_is_a_no_op() {
    let fx = fixture(100);
    drop(
        SessionBuffer::create(&fx.buffers, SessionId(1), at(0), Metadata::new(), Metadata::new())
            .unwrap(),
    );

    let scanner = RecoveryScanner::new(FakeClock::at(at(50)));
    let first = scanner
        .run_at_startup(fx.buffers.path(), &fx.store)
        .await
        .unwrap();
    let second = scanner
        .run_at_startup(fx.buffers.path(), &fx.store)
        .await
        .unwrap();

    assert_eq!(first.recovered_sessions, 1);
    assert_eq!(second, Default::default());
    assert_eq!(fx.store.list_sessions().unwrap(), vec![SessionId(1)]);
}
