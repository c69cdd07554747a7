//! Length-prefixed framing.
//!
//! Wire format:
//! ```text
//! [4: body_len, big-endian u32][body_len: ciphertext]
//! ```
//! The same framing carries the handshake, the command and both replies.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ChannelError, ChannelResult};

/// Size of the length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default upper bound for a frame body read from the server (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Encode a body into a frame (prefix included).
pub fn encode_frame(body: &[u8]) -> ChannelResult<Vec<u8>> {
    let len = u32::try_from(body.len()).map_err(|_| {
        ChannelError::unexpected(format!("frame body too large: {} bytes", body.len()))
    })?;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + body.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(body);
    Ok(buf)
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> ChannelResult<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(body)?;
    writer.write_all(&frame).await.map_err(map_io_error)?;
    writer.flush().await.map_err(map_io_error)?;
    Ok(())
}

/// Read exactly one frame body.
///
/// Fails with a protocol error if the stream ends early or the declared
/// length exceeds `max_len`.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> ChannelResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).await.map_err(map_io_error)?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max_len {
        return Err(ChannelError::oversized(len, max_len));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(map_io_error)?;
    Ok(body)
}

/// Early EOF is a protocol failure; everything else is unexpected.
pub(crate) fn map_io_error(err: io::Error) -> ChannelError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        ChannelError::truncated()
    } else {
        ChannelError::unexpected(err)
    }
}
