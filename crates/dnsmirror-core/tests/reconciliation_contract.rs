//! Contract Test: Desired-State Reconciliation
//!
//! This test verifies how set/append/delete drive remote calls and keep
//! the cache in step with the remote service.
//!
//! Constraints verified:
//! - A missing record is created exactly once; a present one is updated
//! - Empty content deletes a present record and is a no-op otherwise
//! - Append never overwrites; delete never guesses
//! - Unsupported types and conflicts issue zero remote calls
//! - A failing remote call stops the batch without rolling back
//!
//! If this test fails, reconciliation is broken.

mod common;

use common::*;
use dnsmirror_core::engine::ReconcileEvent;
use dnsmirror_core::traits::{RecordAppender, RecordDeleter, RecordGetter, RecordSetter, ZoneLister};
use dnsmirror_core::{Error, RecordType};
use tokio_test::{assert_err, assert_ok};

fn zone_with_www() -> MockRemoteClient {
    MockRemoteClient::new()
        .with_zone("z1", "Example.com.")
        .with_record("z1", "rec-www", "www.example.com", "A", "192.0.2.1")
}

async fn cached_count(engine: &dnsmirror_core::ReconciliationEngine, zone: &str, name: &str, record_type: RecordType) -> usize {
    let zone = engine.cache().find(zone).await.expect("zone cached");
    zone.records().find_all(name, &record_type).await.len()
}

#[tokio::test]
async fn list_zones_returns_normalized_cached_names_without_remote_calls() {
    let remote = MockRemoteClient::new()
        .with_zone("z1", "Example.COM.")
        .with_zone("z2", "other.org");
    let (engine, _events) = warmed_engine(&remote).await;
    let list_calls = remote.calls().list_zones.load(std::sync::atomic::Ordering::SeqCst);

    let zones = assert_ok!(engine.list_zones().await);

    assert_eq!(zones, vec!["example.com".to_string(), "other.org".to_string()]);
    assert_eq!(
        remote.calls().list_zones.load(std::sync::atomic::Ordering::SeqCst),
        list_calls,
        "listing zones must be served from the cache"
    );
}

#[tokio::test]
async fn get_records_is_case_and_trailing_dot_insensitive() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;

    let records = assert_ok!(engine.get_records("EXAMPLE.com.").await);

    assert_eq!(records, vec![spec("www.example.com", "A", "192.0.2.1")]);
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn get_records_unknown_zone_fails_without_remote_fallback() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;
    let list_calls = remote.calls().list_records.load(std::sync::atomic::Ordering::SeqCst);

    let err = assert_err!(engine.get_records("missing.net").await);

    assert!(matches!(err, Error::ZoneNotFound(ref z) if z == "missing.net"));
    assert_eq!(
        remote.calls().list_records.load(std::sync::atomic::Ordering::SeqCst),
        list_calls
    );
}

#[tokio::test]
async fn set_creates_missing_record_once() {
    let remote = MockRemoteClient::new().with_zone("z1", "example.com");
    let (engine, mut events) = warmed_engine(&remote).await;
    drain(&mut events);

    let result = assert_ok!(
        engine
            .set_records("example.com", &[spec("test.example.com", "A", "1.1.1.1")])
            .await
    );

    assert_eq!(result, vec![spec("test.example.com", "A", "1.1.1.1")]);
    assert_eq!(remote.create_count(), 1);
    assert_eq!(remote.update_count(), 0);
    assert_eq!(cached_count(&engine, "example.com", "test.example.com", RecordType::A).await, 1);
    assert_eq!(
        drain(&mut events),
        vec![ReconcileEvent::RecordCreated {
            zone: "example.com".to_string(),
            name: "test.example.com".to_string(),
            record_type: RecordType::A,
        }]
    );
}

#[tokio::test]
async fn set_twice_creates_then_updates() {
    let remote = MockRemoteClient::new().with_zone("z1", "example.com");
    let (engine, _events) = warmed_engine(&remote).await;
    let desired = [spec("Test.Example.com.", "A", "1.1.1.1")];

    assert_ok!(engine.set_records("example.com", &desired).await);
    assert_ok!(engine.set_records("example.com", &desired).await);

    assert_eq!(remote.create_count(), 1, "second call must not create again");
    assert_eq!(remote.update_count(), 1);
    assert_eq!(cached_count(&engine, "example.com", "test.example.com", RecordType::A).await, 1);
    assert_eq!(remote.remote_records("z1").len(), 1);
}

#[tokio::test]
async fn set_updates_in_place_keeping_id_and_order() {
    let remote = MockRemoteClient::new()
        .with_zone("z1", "example.com")
        .with_record("z1", "rec-1", "a.example.com", "A", "192.0.2.1")
        .with_record("z1", "rec-2", "b.example.com", "TXT", "hello")
        .with_record("z1", "rec-3", "c.example.com", "A", "192.0.2.3");
    let (engine, _events) = warmed_engine(&remote).await;

    let result = assert_ok!(
        engine
            .set_records("example.com", &[spec("b.example.com", "TXT", "world")])
            .await
    );
    assert_eq!(result[0].content, "world");

    let zone = engine.cache().find("example.com").await.unwrap();
    let records = zone.records().list().await;
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec-1", "rec-2", "rec-3"]);
    assert_eq!(records[1].content, "world");
}

#[tokio::test]
async fn set_with_empty_content_deletes_then_is_a_noop() {
    let remote = zone_with_www();
    let (engine, mut events) = warmed_engine(&remote).await;
    drain(&mut events);
    let removal = [spec("www.example.com", "A", "")];

    let result = assert_ok!(engine.set_records("example.com", &removal).await);
    assert!(result.is_empty(), "deleted records are not reported by set");
    assert_eq!(remote.delete_count(), 1);
    assert_eq!(cached_count(&engine, "example.com", "www.example.com", RecordType::A).await, 0);

    let result = assert_ok!(engine.set_records("example.com", &removal).await);
    assert!(result.is_empty());
    assert_eq!(remote.delete_count(), 1, "absent record must not be deleted again");
    assert_eq!(remote.mutation_count(), 1);

    let events = drain(&mut events);
    assert!(matches!(events[0], ReconcileEvent::RecordDeleted { .. }));
    assert!(matches!(events[1], ReconcileEvent::RecordSkipped { .. }));
}

#[tokio::test]
async fn set_mixed_batch_reports_only_surviving_records() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;

    let result = assert_ok!(
        engine
            .set_records(
                "example.com",
                &[
                    spec("www.example.com", "A", ""),
                    spec("api.example.com", "CNAME", "www.example.com"),
                    spec("gone.example.com", "TXT", ""),
                ],
            )
            .await
    );

    assert_eq!(result, vec![spec("api.example.com", "CNAME", "www.example.com")]);
    assert_eq!(remote.delete_count(), 1);
    assert_eq!(remote.create_count(), 1);
}

#[tokio::test]
async fn set_unsupported_type_fails_without_remote_call() {
    let remote = MockRemoteClient::new().with_zone("z1", "example.com");
    let (engine, _events) = warmed_engine(&remote).await;

    let err = assert_err!(
        engine
            .set_records("example.com", &[spec("example.com", "MX", "10 mail.example.com")])
            .await
    );

    assert!(matches!(err, Error::UnsupportedType(ref t) if t == "MX"));
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn set_on_duplicated_pair_is_a_conflict() {
    let remote = MockRemoteClient::new()
        .with_zone("z1", "example.com")
        .with_record("z1", "rec-1", "_acme-challenge.example.com", "TXT", "one")
        .with_record("z1", "rec-2", "_acme-challenge.example.com", "TXT", "two");
    let (engine, _events) = warmed_engine(&remote).await;

    let err = assert_err!(
        engine
            .set_records("example.com", &[spec("_acme-challenge.example.com", "TXT", "three")])
            .await
    );

    assert!(err.is_conflict());
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn set_unknown_zone_fails() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;

    let err = assert_err!(
        engine
            .set_records("nope.example", &[spec("a.nope.example", "A", "1.1.1.1")])
            .await
    );
    assert!(matches!(err, Error::ZoneNotFound(_)));
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn set_failure_keeps_earlier_records_and_converges_on_retry() {
    let remote = MockRemoteClient::new().with_zone("z1", "example.com");
    let (engine, _events) = warmed_engine(&remote).await;
    remote.fail_on("create:b.example.com");

    let desired = [
        spec("a.example.com", "A", "192.0.2.1"),
        spec("b.example.com", "A", "192.0.2.2"),
        spec("c.example.com", "A", "192.0.2.3"),
    ];

    let err = assert_err!(engine.set_records("example.com", &desired).await);
    match &err {
        Error::RemoteCall { operation, zone, target, .. } => {
            assert_eq!(*operation, "create");
            assert_eq!(zone, "example.com");
            assert_eq!(target, "b.example.com (A)");
        }
        other => panic!("expected RemoteCall, got {other:?}"),
    }
    assert_eq!(cached_count(&engine, "example.com", "a.example.com", RecordType::A).await, 1);
    assert_eq!(cached_count(&engine, "example.com", "b.example.com", RecordType::A).await, 0);
    assert_eq!(cached_count(&engine, "example.com", "c.example.com", RecordType::A).await, 0);

    remote.recover("create:b.example.com");
    assert_ok!(engine.set_records("example.com", &desired).await);

    assert_eq!(remote.remote_records("z1").len(), 3);
    let zone = engine.cache().find("example.com").await.unwrap();
    assert_eq!(zone.records().len().await, 3);
}

#[tokio::test]
async fn failed_update_leaves_cached_record_untouched() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;
    remote.fail_on("update:rec-www");

    assert_err!(
        engine
            .set_records("example.com", &[spec("www.example.com", "A", "203.0.113.9")])
            .await
    );

    let records = assert_ok!(engine.get_records("example.com").await);
    assert_eq!(records[0].content, "192.0.2.1");
}

#[tokio::test]
async fn append_creates_new_records() {
    let remote = MockRemoteClient::new().with_zone("z1", "example.com");
    let (engine, _events) = warmed_engine(&remote).await;

    let result = assert_ok!(
        engine
            .append_records(
                "example.com",
                &[
                    spec("_acme-challenge.example.com", "TXT", "token"),
                    spec("v6.example.com", "AAAA", "2001:db8::1"),
                ],
            )
            .await
    );

    assert_eq!(result.len(), 2);
    assert_eq!(remote.create_count(), 2);
    assert_eq!(assert_ok!(engine.get_records("example.com").await).len(), 2);
}

#[tokio::test]
async fn append_existing_pair_conflicts_without_remote_call() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;

    let err = assert_err!(
        engine
            .append_records("example.com", &[spec("WWW.example.com", "A", "198.51.100.1")])
            .await
    );

    match err {
        Error::Conflict { zone, name, record_type, .. } => {
            assert_eq!(zone, "example.com");
            assert_eq!(name, "www.example.com");
            assert_eq!(record_type, "A");
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn append_conflict_mid_batch_keeps_earlier_appends() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;

    assert_err!(
        engine
            .append_records(
                "example.com",
                &[
                    spec("new.example.com", "A", "198.51.100.1"),
                    spec("www.example.com", "A", "198.51.100.2"),
                    spec("never.example.com", "A", "198.51.100.3"),
                ],
            )
            .await
    );

    assert_eq!(remote.create_count(), 1);
    assert_eq!(cached_count(&engine, "example.com", "new.example.com", RecordType::A).await, 1);
    assert_eq!(cached_count(&engine, "example.com", "never.example.com", RecordType::A).await, 0);
}

#[tokio::test]
async fn append_unsupported_type_fails() {
    let remote = MockRemoteClient::new().with_zone("z1", "example.com");
    let (engine, _events) = warmed_engine(&remote).await;

    let err = assert_err!(
        engine
            .append_records("example.com", &[spec("example.com", "CAA", "0 issue \"ca.example\"")])
            .await
    );
    assert!(matches!(err, Error::UnsupportedType(_)));
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn delete_echoes_requested_records() {
    let remote = zone_with_www()
        .with_record("z1", "rec-txt", "txt.example.com", "TXT", "cached value");
    let (engine, _events) = warmed_engine(&remote).await;

    let requested = [
        spec("www.example.com.", "A", "ignored"),
        spec("TXT.example.com", "TXT", "requested value"),
    ];
    let result = assert_ok!(engine.delete_records("example.com", &requested).await);

    assert_eq!(result, requested.to_vec());
    assert_eq!(remote.delete_count(), 2);
    assert!(assert_ok!(engine.get_records("example.com").await).is_empty());
    assert!(remote.remote_records("z1").is_empty());
}

#[tokio::test]
async fn delete_absent_record_fails_without_remote_call() {
    let remote = zone_with_www();
    let (engine, _events) = warmed_engine(&remote).await;

    let err = assert_err!(
        engine
            .delete_records("example.com", &[spec("missing.example.com", "A", "")])
            .await
    );

    assert!(matches!(err, Error::RecordNotFound { ref name, .. } if name == "missing.example.com"));
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn delete_stops_at_first_missing_record_without_rollback() {
    let remote = zone_with_www()
        .with_record("z1", "rec-last", "last.example.com", "A", "192.0.2.9");
    let (engine, _events) = warmed_engine(&remote).await;

    assert_err!(
        engine
            .delete_records(
                "example.com",
                &[
                    spec("www.example.com", "A", ""),
                    spec("missing.example.com", "A", ""),
                    spec("last.example.com", "A", ""),
                ],
            )
            .await
    );

    assert_eq!(remote.delete_count(), 1);
    assert_eq!(cached_count(&engine, "example.com", "www.example.com", RecordType::A).await, 0);
    assert_eq!(cached_count(&engine, "example.com", "last.example.com", RecordType::A).await, 1);
}

#[tokio::test]
async fn delete_accepts_any_type_tag() {
    let remote = MockRemoteClient::new()
        .with_zone("z1", "example.com")
        .with_record("z1", "rec-mx", "example.com", "MX", "10 mail.example.com");
    let (engine, _events) = warmed_engine(&remote).await;

    assert_ok!(
        engine
            .delete_records("example.com", &[spec("example.com", "mx", "")])
            .await
    );
    assert_eq!(remote.delete_count(), 1);
}
