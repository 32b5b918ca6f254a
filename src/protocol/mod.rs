//! Protocol definitions for client-server communication
//!
//! Uses MessagePack for compact binary serialization. Every message travels
//! in a frame of `[4-byte length BE][payload]`.

mod message;

pub use message::{Caller, Request, Response};

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Protocol version for compatibility checking
pub const PROTOCOL_VERSION: u32 = 1;

/// Maximum message size accepted from a peer (10 MB)
pub const MAX_MESSAGE_SIZE: u32 = 10 * 1024 * 1024;

/// Protocol-specific errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Protocol version mismatch: client={client}, server={server}")]
    VersionMismatch { client: u32, server: u32 },

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: u32, max: u32 },
}

/// Serialize a message to MessagePack bytes
pub fn serialize<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec(msg)?)
}

/// Deserialize a message from MessagePack bytes
pub fn deserialize<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| {
        anyhow!(ProtocolError::MalformedMessage(format!(
            "Failed to deserialize: {}",
            e
        )))
    })
}

/// Frame a message with its length prefix
pub fn frame_message(payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u32;
    let mut framed = Vec::with_capacity(4 + payload.len());
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(payload);
    framed
}

/// Check if client and server protocol versions are compatible
pub fn check_version_compatibility(client_version: u32, server_version: u32) -> Result<()> {
    if client_version != server_version {
        bail!(ProtocolError::VersionMismatch {
            client: client_version,
            server: server_version
        });
    }
    Ok(())
}

/// Read one framed payload. Returns `None` on a clean end of stream.
pub async fn read_message<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];

    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_bytes);
    if len > MAX_MESSAGE_SIZE {
        bail!(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE
        });
    }

    let mut buffer = vec![0u8; len as usize];
    reader.read_exact(&mut buffer).await?;

    Ok(Some(buffer))
}

/// Write one framed payload
pub async fn write_message<W: AsyncWriteExt + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let framed = frame_message(payload);
    writer.write_all(&framed).await?;
    writer.flush().await?;
    Ok(())
}

/// Serialize `msg` and write it as one frame
pub async fn send<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWriteExt + Unpin,
    T: Serialize,
{
    let payload = serialize(msg)?;
    write_message(writer, &payload).await
}

/// Read one frame and deserialize it. Returns `None` on end of stream.
pub async fn receive<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncReadExt + Unpin,
    T: for<'de> Deserialize<'de>,
{
    match read_message(reader).await? {
        Some(bytes) => Ok(Some(deserialize(&bytes)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_has_length_prefix() {
        let framed = frame_message(b"abc");
        assert_eq!(&framed[..4], &3u32.to_be_bytes());
        assert_eq!(&framed[4..], b"abc");
    }

    #[test]
    fn test_version_mismatch() {
        assert!(check_version_compatibility(1, 1).is_ok());
        let err = check_version_compatibility(2, 1).unwrap_err();
        assert!(err.to_string().contains("Protocol version mismatch"));
    }

    #[tokio::test]
    async fn test_read_rejects_oversized_frame() {
        let mut bytes: &[u8] = &(MAX_MESSAGE_SIZE + 1).to_be_bytes();
        let err = read_message(&mut bytes).await.unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn test_read_empty_stream_is_eof() {
        let mut bytes: &[u8] = &[];
        assert!(read_message(&mut bytes).await.unwrap().is_none());
    }
}
