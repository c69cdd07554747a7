//! Connection lifecycle: release on every path.

use super::harness::{CommandReply, FakeBackend, Script};
use crate::client::ChannelClient;
use crate::config::ChannelConfig;
use crate::error::{ErrorKind, CODE_REQUEST_TIMEOUT, CODE_SERVICE_UNAVAILABLE};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn connection_closed_after_success() {
    let backend = FakeBackend::start("k", vec![Script::reply(json!({"ok": true}))]).await;
    let client = ChannelClient::new(backend.config("k"));

    client.call("m", "f", vec![]).await.unwrap();

    assert!(backend.wait_closed(1).await);
}

#[tokio::test]
async fn connection_closed_after_auth_failure() {
    let backend = FakeBackend::start("k", vec![Script::reject(json!({"status": "FAIL"}))]).await;
    let client = ChannelClient::new(backend.config("k"));

    client.call("m", "f", vec![]).await.unwrap_err();

    assert!(backend.wait_closed(1).await);
}

#[tokio::test]
async fn connection_closed_after_truncated_reply() {
    let backend = FakeBackend::start("k", vec![Script::then(CommandReply::PrefixThenClose(32))]).await;
    let client = ChannelClient::new(backend.config("k"));

    client.call("m", "f", vec![]).await.unwrap_err();

    assert!(backend.wait_closed(1).await);
}

#[tokio::test]
async fn connection_closed_after_decrypt_failure() {
    let backend = FakeBackend::start(
        "k",
        vec![Script::then(CommandReply::Unencrypted(vec![1, 2, 3]))],
    )
    .await;
    let client = ChannelClient::new(backend.config("k"));

    client.call("m", "f", vec![]).await.unwrap_err();

    assert!(backend.wait_closed(1).await);
}

#[tokio::test]
async fn timeout_is_protocol_error_and_closes() {
    let backend = FakeBackend::start("k", vec![Script::then(CommandReply::Hang)]).await;
    let client = ChannelClient::new(backend.config("k").with_timeout(Duration::from_millis(100)));

    let err = client.call("m", "f", vec![]).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Protocol);
    assert_eq!(err.code, Some(CODE_REQUEST_TIMEOUT));
    assert_eq!(err.details.get("timeout_ms"), Some(&json!(100)));
    assert!(backend.wait_closed(1).await);
}

#[tokio::test]
async fn timeout_does_not_trigger_on_fast_backend() {
    let backend = FakeBackend::start("k", vec![Script::reply(json!(42))]).await;
    let client = ChannelClient::new(backend.config("k").with_timeout(Duration::from_secs(5)));

    assert_eq!(client.call("m", "f", vec![]).await.unwrap(), json!(42));
}

#[tokio::test]
async fn cancelled_call_closes_connection() {
    let backend = FakeBackend::start("k", vec![Script::then(CommandReply::Hang)]).await;
    let client = ChannelClient::new(backend.config("k"));

    let task = tokio::spawn(async move { client.call("m", "f", vec![]).await });

    // Let the call reach the hanging read.
    for _ in 0..100 {
        if !backend.state().commands.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(backend.state().commands.len(), 1);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(backend.wait_closed(1).await);
}

#[tokio::test]
async fn refused_connection_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = ChannelClient::new(ChannelConfig::new("127.0.0.1", port, "k"));
    let err = client.call("m", "f", vec![]).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Connection);
    assert_eq!(err.code, Some(CODE_SERVICE_UNAVAILABLE));
    assert!(err.is_transient());
    assert!(err.details.contains_key("exception"));
}

#[tokio::test]
async fn unresolvable_host_is_connection_error() {
    let client = ChannelClient::new(ChannelConfig::new("host.invalid", 9999, "k"));
    let err = client.call("m", "f", vec![]).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Connection);
}
