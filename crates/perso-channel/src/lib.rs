//! Perso channel: authenticated, encrypted one-shot commands to the backend.
//!
//! Every call opens its own TCP connection, proves knowledge of the shared
//! secret, sends exactly one encrypted command and reads exactly one
//! encrypted reply before the connection is torn down.
//!
//! # Wire protocol
//!
//! ```text
//! Client -> Server: [4: BE len][ciphertext of {"auth": "<secret>"}]
//! Server -> Client: [4: BE len][ciphertext of {"status": "OK", ...}]
//! Client -> Server: [4: BE len][ciphertext of {"action":"call","modul":..,"funktion":..,"data":[..]}]
//! Server -> Client: [4: BE len][ciphertext of <any JSON>]
//! ```
//!
//! # Invariants
//!
//! 1. **One connection per call**: nothing survives between calls except
//!    the configuration and the derived key.
//! 2. **Auth gates the command**: the command frame is only written after
//!    the server answered the handshake with `status == "OK"`.
//! 3. **All or nothing**: a call either completes all four frames or fails.
//! 4. **Always closed**: the socket is released on every exit path,
//!    including timeout and cancellation of the calling future.

pub mod cipher;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod frame;

#[cfg(test)]
mod tests;

pub use cipher::{derive_key, CipherSuite, NonceMode, SessionCipher, FIXED_NONCE};
pub use client::ChannelClient;
pub use command::{Command, RemoteReply};
pub use config::ChannelConfig;
pub use error::{ChannelError, ChannelResult, ErrorKind};
