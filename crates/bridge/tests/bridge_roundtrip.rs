#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Bridge round trips over the in-process channel and failing transports.

use async_trait::async_trait;
use desktop_control_bridge::*;
use desktop_control_readiness::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct MockScreen {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ScreenCaptureProbe for MockScreen {
    async fn media_access_status(&self) -> Result<MediaAccessStatus, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(MediaAccessStatus::Granted)
    }
}

struct MockAccessibility;

#[async_trait]
impl AccessibilityProbe for MockAccessibility {
    async fn is_trusted(&self) -> Result<bool, ProbeError> {
        Ok(true)
    }
}

struct MockRuntime;

#[async_trait]
impl RuntimeEnvironment for MockRuntime {
    fn runtime_root(&self) -> PathBuf {
        PathBuf::from("/opt/desktop-control/runtime")
    }

    fn exists(&self, _path: &Path) -> bool {
        true
    }

    async fn resolve_executable(&self) -> Result<Option<PathBuf>, ProbeError> {
        Ok(Some(PathBuf::from("/usr/bin/python3")))
    }
}

fn start_bridge(calls: Arc<AtomicUsize>) -> ChannelTransport {
    let probes = ProbeSet::new(
        Arc::new(MockScreen { calls }),
        Arc::new(MockAccessibility),
        Arc::new(MockRuntime),
    );
    let config = ReadinessConfig::uniform(RetryPolicy::new(200, 1), 60_000);
    let evaluator = Arc::new(ReadinessEvaluator::new(probes, config).unwrap());
    let router = Arc::new(BridgeRouter::new(Arc::new(ReadinessCache::new(evaluator))));

    let (transport, receiver) = channel(8);
    tokio::spawn(serve(router, receiver));
    transport
}

struct FailingTransport(TransportError);

#[async_trait]
impl Transport for FailingTransport {
    async fn invoke(&self, _request: &str, _payload: Value) -> Result<Value, TransportError> {
        Err(self.0.clone())
    }
}

struct GarbageTransport;

#[async_trait]
impl Transport for GarbageTransport {
    async fn invoke(&self, _request: &str, _payload: Value) -> Result<Value, TransportError> {
        Ok(json!({ "status": "ready" }))
    }
}

struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn invoke(&self, _request: &str, _payload: Value) -> Result<Value, TransportError> {
        std::future::pending::<()>().await;
        Ok(Value::Null)
    }
}

fn assert_fallback(snapshot: &ReadinessSnapshot, code: &str) {
    assert_eq!(snapshot.status, DesktopControlStatus::Unknown);
    assert_eq!(snapshot.error_code.as_deref(), Some(code));
    assert!(snapshot.message.contains("IPC"));
    for kind in CapabilityKind::ALL {
        let result = snapshot.capabilities.get(kind);
        assert_eq!(result.reason_code, code);
        let detail = result.detail.as_ref().unwrap();
        assert!(detail["error"].is_string());
    }
}

#[tokio::test]
async fn test_canonical_and_aliases_share_one_operation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let transport = start_bridge(calls.clone());

    let first = ReadinessClient::new(transport.clone()).get_readiness(false).await;
    assert_eq!(first.status, DesktopControlStatus::Ready);
    assert!(!first.cache.from_cache);

    for alias in READINESS_ALIASES {
        let snapshot = ReadinessClient::new(transport.clone())
            .with_request_name(*alias)
            .get_readiness(false)
            .await;
        assert!(snapshot.cache.from_cache);
        assert_eq!(snapshot.checked_at, first.checked_at);
        assert_eq!(snapshot.capabilities, first.capabilities);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_force_refresh_through_alias() {
    let calls = Arc::new(AtomicUsize::new(0));
    let transport = start_bridge(calls.clone());
    let client = ReadinessClient::new(transport).with_request_name(READINESS_ALIASES[0]);

    client.get_readiness(false).await;
    let forced = client.get_readiness(true).await;

    assert!(!forced.cache.from_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_closed_channel_yields_fallback() {
    let (transport, receiver) = channel(1);
    drop(receiver);

    let snapshot = ReadinessClient::new(transport).get_readiness(false).await;
    assert_fallback(&snapshot, IPC_INVOKE_FAILED);
    assert!(snapshot.message.contains("IPC channel closed"));
    assert_eq!(
        snapshot.capabilities.screen_capture.detail.as_ref().unwrap()["error"],
        "IPC channel closed"
    );
}

#[tokio::test]
async fn test_transport_error_yields_fallback() {
    let client = ReadinessClient::new(FailingTransport(TransportError::ReplyDropped));
    let snapshot = client.get_readiness(true).await;
    assert_fallback(&snapshot, IPC_INVOKE_FAILED);
    assert!(snapshot.message.contains("reply dropped"));
}

#[tokio::test]
async fn test_unknown_request_name_yields_fallback() {
    let calls = Arc::new(AtomicUsize::new(0));
    let transport = start_bridge(calls.clone());
    let client = ReadinessClient::new(transport).with_request_name("desktop_control.bogus");

    let snapshot = client.get_readiness(false).await;
    assert_fallback(&snapshot, IPC_INVOKE_FAILED);
    assert!(snapshot.message.contains("Unknown request"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreadable_response_yields_fallback() {
    let snapshot = ReadinessClient::new(GarbageTransport).get_readiness(false).await;
    assert_fallback(&snapshot, IPC_INVALID_RESPONSE);
}

#[tokio::test]
async fn test_hung_transport_bounded_by_timeout() {
    let client = ReadinessClient::new(HangingTransport).with_timeout(Duration::from_millis(20));
    let snapshot = client.get_readiness(false).await;
    assert_fallback(&snapshot, IPC_INVOKE_FAILED);
    assert!(snapshot.message.contains("timed out"));
}

#[tokio::test]
async fn test_router_rejects_bad_payload() {
    let calls = Arc::new(AtomicUsize::new(0));
    let transport = start_bridge(calls);
    let result = transport
        .invoke(READINESS_REQUEST, json!({ "forceRefresh": "always" }))
        .await;
    match result {
        Err(TransportError::Rejected(msg)) => assert!(msg.contains("Invalid payload")),
        other => panic!("Expected Rejected, got {:?}", other),
    }
}
