//! TCP client for the encrypted command channel.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cipher::SessionCipher;
use crate::command::{AuthRequest, Command, AUTH_OK};
use crate::config::ChannelConfig;
use crate::error::{ChannelError, ChannelResult};
use crate::frame::{read_frame, write_frame};

/// Client for one backend destination.
///
/// Holds only immutable state, so it is cheap to clone and safe to call
/// from many tasks at once. Each call uses its own connection.
#[derive(Debug, Clone)]
pub struct ChannelClient {
    config: Arc<ChannelConfig>,
    cipher: SessionCipher,
}

impl ChannelClient {
    /// Create a client, deriving the session key from the config's secret.
    pub fn new(config: ChannelConfig) -> Self {
        let cipher = SessionCipher::new(config.secret(), config.cipher, config.nonce_mode);
        Self {
            config: Arc::new(config),
            cipher,
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Call `module.function(arguments...)` on the backend.
    ///
    /// Returns the backend's reply exactly as decoded.
    pub async fn call(
        &self,
        module: &str,
        function: &str,
        arguments: Vec<Value>,
    ) -> ChannelResult<Value> {
        let command = Command::call(module, function, arguments);
        self.send_command(&command).await
    }

    /// Send an arbitrary command object and return the decoded reply.
    pub async fn send_command<C>(&self, command: &C) -> ChannelResult<Value>
    where
        C: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(command).map_err(ChannelError::unexpected)?;

        match self.config.timeout {
            Some(limit) => match timeout(limit, self.exchange(&payload)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        address = %self.config.address(),
                        timeout_ms = limit.as_millis() as u64,
                        "Channel exchange timed out"
                    );
                    Err(ChannelError::timeout(limit))
                }
            },
            None => self.exchange(&payload).await,
        }
    }

    /// One connection: connect, authenticate, send, receive, close.
    ///
    /// The stream is owned by this future. Normal exits shut it down
    /// explicitly; a timeout or cancelled caller drops it, which closes the
    /// socket as well.
    async fn exchange(&self, command: &[u8]) -> ChannelResult<Value> {
        let address = self.config.address();
        let mut stream = TcpStream::connect(&address).await.map_err(|e| {
            debug!(address = %address, error = %e, "Failed to connect to backend");
            ChannelError::connection(e)
        })?;

        debug!(address = %address, "Connected to backend");

        let result = self.authenticated_exchange(&mut stream, command).await;

        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "Error shutting down channel connection");
        }
        drop(stream);

        result
    }

    async fn authenticated_exchange(
        &self,
        stream: &mut TcpStream,
        command: &[u8],
    ) -> ChannelResult<Value> {
        let auth = serde_json::to_vec(&AuthRequest {
            auth: self.config.secret(),
        })
        .map_err(ChannelError::unexpected)?;

        self.send_frame(stream, &auth).await?;
        let auth_reply = self.recv_frame(stream).await?;

        let status = auth_reply.get("status").and_then(Value::as_str);
        if status != Some(AUTH_OK) {
            let err = ChannelError::authentication(&auth_reply);
            warn!(message = %err.message, "Backend rejected handshake");
            return Err(err);
        }

        debug!("Handshake accepted");

        self.send_frame(stream, command).await?;
        let reply = self.recv_frame(stream).await?;

        debug!("Received command reply");
        Ok(reply)
    }

    async fn send_frame(&self, stream: &mut TcpStream, plaintext: &[u8]) -> ChannelResult<()> {
        let sealed = self.cipher.encrypt(plaintext)?;
        write_frame(stream, &sealed).await
    }

    async fn recv_frame(&self, stream: &mut TcpStream) -> ChannelResult<Value> {
        let sealed = read_frame(stream, self.config.max_frame_len).await?;
        let plaintext = self.cipher.decrypt(&sealed)?;
        serde_json::from_slice(&plaintext).map_err(ChannelError::unexpected)
    }
}
