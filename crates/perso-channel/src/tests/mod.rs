//! Integration tests for the channel client against a fake backend.
//!
//! - `harness.rs`   - Scripted fake backend speaking the channel protocol
//! - `round_trip.rs` - Successful calls, payload fidelity, cipher options
//! - `auth.rs`      - Handshake rejection and secret mismatch
//! - `framing.rs`   - Truncated, oversized and undecryptable frames
//! - `lifecycle.rs` - Connection release, timeout, cancellation, refusal

mod framing;
mod lifecycle;
