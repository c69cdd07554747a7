//! Session cipher for channel frames.
//!
//! The key is SHA-256 of the handshake secret. Frames are sealed with an
//! AEAD cipher, no associated data, tag appended to the ciphertext.
//!
//! With [`NonceMode::Fixed`] every frame under one secret uses the same
//! nonce, so equal plaintexts produce equal ciphertexts and the AEAD
//! confidentiality guarantees do not hold. The backend expects exactly this
//! format. [`NonceMode::PerFrame`] draws a fresh nonce per frame and sends
//! it in front of the ciphertext; both ends must be configured for it.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
};
use chacha20poly1305::ChaCha20Poly1305;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChannelError, ChannelResult};

/// Derived key size (256 bits).
pub const KEY_SIZE: usize = 32;
/// AEAD nonce size (96 bits).
pub const NONCE_SIZE: usize = 12;
/// Nonce the backend uses for every frame.
pub const FIXED_NONCE: [u8; NONCE_SIZE] = *b"000000000000";

/// AEAD construction used for frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherSuite {
    /// AES-256-GCM, what the backend speaks.
    #[default]
    Aes256Gcm,
    /// ChaCha20-Poly1305.
    ChaCha20Poly1305,
}

impl FromStr for CipherSuite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes-256-gcm" | "aes256gcm" | "aes" => Ok(Self::Aes256Gcm),
            "chacha20-poly1305" | "chacha20poly1305" | "chacha" => Ok(Self::ChaCha20Poly1305),
            other => Err(format!("unknown cipher suite: {}", other)),
        }
    }
}

/// How nonces are chosen per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonceMode {
    /// [`FIXED_NONCE`] for every frame.
    #[default]
    Fixed,
    /// Random nonce per frame, prepended to the ciphertext.
    PerFrame,
}

impl FromStr for NonceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "per-frame" | "per_frame" | "random" => Ok(Self::PerFrame),
            other => Err(format!("unknown nonce mode: {}", other)),
        }
    }
}

/// Derive the 32-byte session key from the handshake secret.
pub fn derive_key(secret: &str) -> [u8; KEY_SIZE] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Seals and opens frame payloads for one channel configuration.
#[derive(Clone)]
pub struct SessionCipher {
    key: [u8; KEY_SIZE],
    suite: CipherSuite,
    nonce_mode: NonceMode,
}

impl fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCipher")
            .field("key", &"<redacted>")
            .field("suite", &self.suite)
            .field("nonce_mode", &self.nonce_mode)
            .finish()
    }
}

impl SessionCipher {
    /// Build a cipher keyed from the handshake secret.
    pub fn new(secret: &str, suite: CipherSuite, nonce_mode: NonceMode) -> Self {
        Self {
            key: derive_key(secret),
            suite,
            nonce_mode,
        }
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    pub fn nonce_mode(&self) -> NonceMode {
        self.nonce_mode
    }

    /// Encrypt a frame payload.
    pub fn encrypt(&self, plaintext: &[u8]) -> ChannelResult<Vec<u8>> {
        match self.nonce_mode {
            NonceMode::Fixed => self.seal(&FIXED_NONCE, plaintext),
            NonceMode::PerFrame => {
                let mut nonce = [0u8; NONCE_SIZE];
                rand::thread_rng().fill_bytes(&mut nonce);
                let sealed = self.seal(&nonce, plaintext)?;
                let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
                out.extend_from_slice(&nonce);
                out.extend_from_slice(&sealed);
                Ok(out)
            }
        }
    }

    /// Decrypt a frame payload, verifying its tag.
    pub fn decrypt(&self, ciphertext: &[u8]) -> ChannelResult<Vec<u8>> {
        match self.nonce_mode {
            NonceMode::Fixed => self.open(&FIXED_NONCE, ciphertext),
            NonceMode::PerFrame => {
                if ciphertext.len() < NONCE_SIZE {
                    return Err(ChannelError::unexpected(format!(
                        "ciphertext too short for nonce: {} bytes",
                        ciphertext.len()
                    )));
                }
                let (nonce, sealed) = ciphertext.split_at(NONCE_SIZE);
                let nonce: [u8; NONCE_SIZE] = nonce
                    .try_into()
                    .map_err(|_| ChannelError::unexpected("invalid nonce length"))?;
                self.open(&nonce, sealed)
            }
        }
    }

    fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> ChannelResult<Vec<u8>> {
        let sealed = match self.suite {
            CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(&self.key)
                .map_err(|e| ChannelError::unexpected(format!("encryption failed: {}", e)))?
                .encrypt(aes_gcm::Nonce::from_slice(nonce), plaintext),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(&self.key)
                .map_err(|e| ChannelError::unexpected(format!("encryption failed: {}", e)))?
                .encrypt(chacha20poly1305::Nonce::from_slice(nonce), plaintext),
        };
        sealed.map_err(|e| ChannelError::unexpected(format!("encryption failed: {}", e)))
    }

    fn open(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> ChannelResult<Vec<u8>> {
        let opened = match self.suite {
            CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(&self.key)
                .map_err(|e| ChannelError::unexpected(format!("decryption failed: {}", e)))?
                .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(&self.key)
                .map_err(|e| ChannelError::unexpected(format!("decryption failed: {}", e)))?
                .decrypt(chacha20poly1305::Nonce::from_slice(nonce), ciphertext),
        };
        opened.map_err(|e| ChannelError::unexpected(format!("decryption failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const TAG_SIZE: usize = 16;

    #[test]
    fn derive_key_is_sha256_of_secret() {
        let key = derive_key("s3cret");
        let expected: [u8; KEY_SIZE] = Sha256::digest(b"s3cret").into();
        assert_eq!(key, expected);
        assert_ne!(derive_key("other"), key);
    }

    #[test]
    fn fixed_nonce_is_ascii_zeros() {
        assert_eq!(&FIXED_NONCE, b"000000000000");
    }

    #[test]
    fn fixed_nonce_encryption_is_deterministic() {
        let cipher = SessionCipher::new("s3cret", CipherSuite::Aes256Gcm, NonceMode::Fixed);
        let a = cipher.encrypt(br#"{"auth":"s3cret"}"#).unwrap();
        let b = cipher.encrypt(br#"{"auth":"s3cret"}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn per_frame_nonce_changes_ciphertext() {
        let cipher = SessionCipher::new("s3cret", CipherSuite::Aes256Gcm, NonceMode::PerFrame);
        let a = cipher.encrypt(b"same").unwrap();
        let b = cipher.encrypt(b"same").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), b"same");
        assert_eq!(cipher.decrypt(&b).unwrap(), b"same");
    }

    #[test]
    fn ciphertext_carries_tag() {
        let cipher = SessionCipher::new("k", CipherSuite::Aes256Gcm, NonceMode::Fixed);
        let sealed = cipher.encrypt(b"hello").unwrap();
        assert_eq!(sealed.len(), 5 + TAG_SIZE);

        let cipher = SessionCipher::new("k", CipherSuite::ChaCha20Poly1305, NonceMode::PerFrame);
        let sealed = cipher.encrypt(b"hello").unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + 5 + TAG_SIZE);
    }

    #[test]
    fn chacha_suite_decrypts_own_frames() {
        let cipher = SessionCipher::new("k", CipherSuite::ChaCha20Poly1305, NonceMode::Fixed);
        let sealed = cipher.encrypt(b"payload").unwrap();
        assert_eq!(cipher.decrypt(&sealed).unwrap(), b"payload");
    }

    #[test]
    fn suites_are_not_interchangeable() {
        let aes = SessionCipher::new("k", CipherSuite::Aes256Gcm, NonceMode::Fixed);
        let chacha = SessionCipher::new("k", CipherSuite::ChaCha20Poly1305, NonceMode::Fixed);
        let sealed = aes.encrypt(b"payload").unwrap();
        assert!(chacha.decrypt(&sealed).is_err());
    }

    #[test]
    fn wrong_secret_fails_to_decrypt() {
        let ours = SessionCipher::new("right", CipherSuite::Aes256Gcm, NonceMode::Fixed);
        let theirs = SessionCipher::new("wrong", CipherSuite::Aes256Gcm, NonceMode::Fixed);
        let sealed = ours.encrypt(b"payload").unwrap();
        let err = theirs.decrypt(&sealed).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unexpected);
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let cipher = SessionCipher::new("k", CipherSuite::Aes256Gcm, NonceMode::Fixed);
        let mut sealed = cipher.encrypt(b"payload").unwrap();
        sealed[0] ^= 0x01;
        assert!(cipher.decrypt(&sealed).is_err());
    }

    #[test]
    fn per_frame_rejects_short_input() {
        let cipher = SessionCipher::new("k", CipherSuite::Aes256Gcm, NonceMode::PerFrame);
        assert!(cipher.decrypt(&[0u8; 4]).is_err());
    }

    #[test]
    fn parse_suite_and_mode() {
        assert_eq!("aes-256-gcm".parse::<CipherSuite>().unwrap(), CipherSuite::Aes256Gcm);
        assert_eq!(
            "ChaCha20-Poly1305".parse::<CipherSuite>().unwrap(),
            CipherSuite::ChaCha20Poly1305
        );
        assert!("rot13".parse::<CipherSuite>().is_err());
        assert_eq!("fixed".parse::<NonceMode>().unwrap(), NonceMode::Fixed);
        assert_eq!("per-frame".parse::<NonceMode>().unwrap(), NonceMode::PerFrame);
        assert!("sometimes".parse::<NonceMode>().is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let cipher = SessionCipher::new("s3cret", CipherSuite::Aes256Gcm, NonceMode::Fixed);
        let rendered = format!("{:?}", cipher);
        assert!(rendered.contains("<redacted>"));
    }
}
