//! Malformed replies on the wire.

use super::harness::{CommandReply, FakeBackend, Script};
use crate::client::ChannelClient;
use crate::error::{ErrorKind, CODE_REQUEST_TIMEOUT};
use serde_json::json;

#[tokio::test]
async fn prefix_without_body_is_protocol_error() {
    let backend = FakeBackend::start("s3cret", vec![Script::then(CommandReply::PrefixThenClose(64))]).await;
    let client = ChannelClient::new(backend.config("s3cret"));

    let err = client.call("perso", "list", vec![json!("42")]).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Protocol);
    assert_eq!(err.code, Some(CODE_REQUEST_TIMEOUT));
    assert!(err.is_transient());
}

#[tokio::test]
async fn zero_length_prefix_then_close_is_not_a_result() {
    // An empty body decrypts to nothing valid; never a partial result.
    let backend = FakeBackend::start("k", vec![Script::then(CommandReply::PrefixThenClose(0))]).await;
    let client = ChannelClient::new(backend.config("k"));

    assert!(client.call("m", "f", vec![]).await.is_err());
}

#[tokio::test]
async fn undecryptable_reply_is_unexpected_error() {
    let backend = FakeBackend::start(
        "k",
        vec![Script::then(CommandReply::Unencrypted(b"{\"plain\":true}".to_vec()))],
    )
    .await;
    let client = ChannelClient::new(backend.config("k"));

    let err = client.call("m", "f", vec![]).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unexpected);
    assert_eq!(err.code, None);
    let cause = err.details.get("exception").and_then(|v| v.as_str()).unwrap();
    assert!(cause.contains("decryption failed"));
}

#[tokio::test]
async fn non_json_reply_is_unexpected_error() {
    let backend = FakeBackend::start(
        "k",
        vec![Script::then(CommandReply::Plaintext(b"not json".to_vec()))],
    )
    .await;
    let client = ChannelClient::new(backend.config("k"));

    let err = client.call("m", "f", vec![]).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unexpected);
    assert!(err.details.contains_key("exception"));
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_reading_body() {
    let backend = FakeBackend::start("k", vec![Script::reply(json!({"ok": true}))]).await;
    let client = ChannelClient::new(backend.config("k").with_max_frame_len(8));

    let err = client.call("m", "f", vec![]).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Protocol);
    assert!(err.details.contains_key("declared_len"));
}
