//! Command and reply payloads carried inside channel frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handshake payload, the first frame of every connection.
#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub auth: &'a str,
}

/// Status the server must answer the handshake with.
pub(crate) const AUTH_OK: &str = "OK";

/// Status a backend function uses to signal its own failure.
pub const REMOTE_ERROR_STATUS: &str = "ERROR";

/// One remote operation.
///
/// Serialized field names are the backend's: `action`, `modul`, `funktion`,
/// `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub action: String,
    #[serde(rename = "modul")]
    pub module: String,
    #[serde(rename = "funktion")]
    pub function: String,
    pub data: Vec<Value>,
}

impl Command {
    /// A `call` of `module.function` with positional arguments.
    pub fn call(module: impl Into<String>, function: impl Into<String>, data: Vec<Value>) -> Self {
        Self {
            action: "call".to_string(),
            module: module.into(),
            function: function.into(),
            data,
        }
    }
}

/// Interpretation of a final reply.
///
/// The channel returns replies untouched. Backend functions that fail
/// answer `{"status": "ERROR", "msg": ...}`; this lets callers tell that
/// apart from a successful result.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteReply {
    /// The function ran; its result as sent.
    Ok(Value),
    /// The function reported a failure.
    Failed { message: String, body: Value },
}

impl RemoteReply {
    pub fn from_value(value: Value) -> Self {
        let failed = value
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|status| status == REMOTE_ERROR_STATUS);

        if !failed {
            return Self::Ok(value);
        }

        let message = value
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("Remote function failed")
            .to_string();

        Self::Failed {
            message,
            body: value,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_serializes_with_backend_field_names() {
        let command = Command::call("perso", "list", vec![json!("42")]);
        let encoded = serde_json::to_string(&command).unwrap();
        assert_eq!(
            encoded,
            r#"{"action":"call","modul":"perso","funktion":"list","data":["42"]}"#
        );
    }

    #[test]
    fn auth_request_is_compact() {
        let encoded = serde_json::to_string(&AuthRequest { auth: "s3cret" }).unwrap();
        assert_eq!(encoded, r#"{"auth":"s3cret"}"#);
    }

    #[test]
    fn reply_without_status_is_ok() {
        let reply = RemoteReply::from_value(json!({"result": ["a", "b"]}));
        assert_eq!(reply, RemoteReply::Ok(json!({"result": ["a", "b"]})));
    }

    #[test]
    fn reply_with_error_status_is_failure() {
        let reply = RemoteReply::from_value(json!({"status": "ERROR", "msg": "no such function"}));
        assert!(reply.is_failure());
        match reply {
            RemoteReply::Failed { message, .. } => assert_eq!(message, "no such function"),
            RemoteReply::Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn non_object_reply_is_ok() {
        let reply = RemoteReply::from_value(json!([1, 2, 3]));
        assert!(!reply.is_failure());
    }
}
