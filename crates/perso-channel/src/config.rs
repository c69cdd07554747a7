//! Configuration for one channel destination.

use std::fmt;
use std::time::Duration;

use crate::cipher::{CipherSuite, NonceMode};
use crate::frame::DEFAULT_MAX_FRAME_LEN;

/// Where and how to reach the backend.
///
/// Built once per destination and shared by every call made through a
/// [`crate::ChannelClient`].
#[derive(Clone)]
pub struct ChannelConfig {
    /// Backend host name or address.
    pub host: String,
    /// Backend TCP port.
    pub port: u16,
    secret: String,
    /// Budget for the whole four-frame exchange. `None` waits forever.
    pub timeout: Option<Duration>,
    /// AEAD construction for frames.
    pub cipher: CipherSuite,
    /// Nonce policy for frames.
    pub nonce_mode: NonceMode,
    /// Largest frame body accepted from the server.
    pub max_frame_len: usize,
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("cipher", &self.cipher)
            .field("nonce_mode", &self.nonce_mode)
            .field("max_frame_len", &self.max_frame_len)
            .finish()
    }
}

impl ChannelConfig {
    /// Create a config with backend-compatible defaults: AES-256-GCM, fixed
    /// nonce, no timeout.
    pub fn new(host: impl Into<String>, port: u16, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            secret: secret.into(),
            timeout: None,
            cipher: CipherSuite::default(),
            nonce_mode: NonceMode::default(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cipher(mut self, cipher: CipherSuite) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_nonce_mode(mut self, nonce_mode: NonceMode) -> Self {
        self.nonce_mode = nonce_mode;
        self
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// The handshake secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// `host:port` for connecting.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ChannelConfig::new("localhost", 9999, "s3cret");
        assert_eq!(config.address(), "localhost:9999");
        assert_eq!(config.secret(), "s3cret");
        assert_eq!(config.timeout, None);
        assert_eq!(config.cipher, CipherSuite::Aes256Gcm);
        assert_eq!(config.nonce_mode, NonceMode::Fixed);
        assert_eq!(config.max_frame_len, DEFAULT_MAX_FRAME_LEN);
    }

    #[test]
    fn test_config_builders() {
        let config = ChannelConfig::new("10.0.0.1", 1, "k")
            .with_timeout(Duration::from_secs(3))
            .with_cipher(CipherSuite::ChaCha20Poly1305)
            .with_nonce_mode(NonceMode::PerFrame)
            .with_max_frame_len(1024);
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.cipher, CipherSuite::ChaCha20Poly1305);
        assert_eq!(config.nonce_mode, NonceMode::PerFrame);
        assert_eq!(config.max_frame_len, 1024);
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ChannelConfig::new("localhost", 9999, "s3cret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
