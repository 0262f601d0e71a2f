//! Distributed mode protocol
//!
//! This module defines the messages exchanged between the coordinator rank and
//! worker ranks. Over TCP they are serialized with MessagePack (rmp-serde);
//! the in-process transport moves them through channels untouched.
//!
//! # Protocol Version
//!
//! Current version: 1
//!
//! # Message Flow
//!
//! ```text
//! Coordinator (rank 0)            Worker (rank r)
//!     |                              |
//!     |-- ASSIGN(rank, workers) ---->|   bootstrap (TCP only)
//!     |<------- READY ---------------|
//!     |                              |
//!     |-- BUCKET_SIZE(count) ------->|
//!     |-- BUCKET(count values) ----->|
//!     |                              |   local quicksort
//!     |<----- BUCKET(count values) --|
//! ```
//!
//! The sorted bucket is sent back without a size; the coordinator already
//! knows it from the distribute phase.
//!
//! # Message Framing
//!
//! Each message is prefixed with a 4-byte length field (little-endian u32):
//!
//! ```text
//! [4 bytes: message length][N bytes: MessagePack-serialized message]
//! ```

use crate::bucket::Rank;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol version
///
/// Increment this when making breaking changes to the protocol.
/// Coordinator and workers must have matching protocol versions.
pub const PROTOCOL_VERSION: u32 = 1;

/// Largest accepted frame body
///
/// A bucket of f32 values costs 5 bytes per value in MessagePack.
pub const MAX_MESSAGE_BYTES: usize = 512 * 1024 * 1024;

/// Protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Rank assignment (Coordinator → Worker)
    ///
    /// First message on every TCP connection. Tells the worker its rank and
    /// the size of the rank group.
    Assign(AssignMessage),

    /// Ready acknowledgement (Worker → Coordinator)
    Ready(ReadyMessage),

    /// Number of values in the bucket that follows (Coordinator → Worker)
    BucketSize(u64),

    /// Bucket payload
    ///
    /// Unsorted when sent by the coordinator, sorted when sent back.
    Bucket(Vec<f32>),

    /// Error report (Worker → Coordinator)
    ///
    /// Sent by a worker that refuses the assignment.
    Error(ErrorMessage),
}

impl Message {
    /// Short name of the message kind for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Assign(_) => "ASSIGN",
            Message::Ready(_) => "READY",
            Message::BucketSize(_) => "BUCKET_SIZE",
            Message::Bucket(_) => "BUCKET",
            Message::Error(_) => "ERROR",
        }
    }

    /// Unwrap a `BucketSize` message
    pub fn into_bucket_size(self) -> std::result::Result<u64, ProtocolError> {
        match self {
            Message::BucketSize(count) => Ok(count),
            other => Err(ProtocolError::unexpected("BUCKET_SIZE", &other)),
        }
    }

    /// Unwrap a `Bucket` message
    pub fn into_bucket(self) -> std::result::Result<Vec<f32>, ProtocolError> {
        match self {
            Message::Bucket(values) => Ok(values),
            other => Err(ProtocolError::unexpected("BUCKET", &other)),
        }
    }
}

/// Rank assignment message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignMessage {
    /// Protocol version (must match)
    pub protocol_version: u32,

    /// Rank assigned to the worker (1..num_workers)
    pub rank: Rank,

    /// Total number of ranks, coordinator included
    pub num_workers: usize,

    /// Longest list the worker prints in full
    pub display_limit: usize,
}

/// Ready message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyMessage {
    /// Protocol version
    pub protocol_version: u32,

    /// Node identifier (hostname)
    pub node_id: String,

    /// Rank the worker accepted
    pub rank: Rank,
}

/// Error message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Node identifier
    pub node_id: String,

    /// Error description
    pub error: String,
}

/// Protocol violations
///
/// All of these are fatal for the run; nothing is retried.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("expected {expected} message, got {got}")]
    UnexpectedMessage { expected: &'static str, got: &'static str },

    #[error("protocol version mismatch: coordinator={coordinator}, node={node}")]
    VersionMismatch { coordinator: u32, node: u32 },

    #[error("rank {rank} is not a worker rank for {num_workers} ranks")]
    InvalidRank { rank: Rank, num_workers: usize },

    #[error("channel to rank {peer} closed")]
    Disconnected { peer: Rank },

    #[error("node {node_id} reported: {error}")]
    Remote { node_id: String, error: String },
}

impl ProtocolError {
    fn unexpected(expected: &'static str, got: &Message) -> Self {
        match got {
            Message::Error(err) => ProtocolError::Remote {
                node_id: err.node_id.clone(),
                error: err.error.clone(),
            },
            other => ProtocolError::UnexpectedMessage {
                expected,
                got: other.kind(),
            },
        }
    }
}

/// Serialize a message to bytes
///
/// Prepends a 4-byte length field for framing.
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>> {
    let msg_bytes = rmp_serde::to_vec(msg)
        .context("Failed to serialize message")?;

    let msg_len = u32::try_from(msg_bytes.len())
        .context("Message length does not fit the frame header")?;
    let mut framed = Vec::with_capacity(4 + msg_bytes.len());
    framed.extend_from_slice(&msg_len.to_le_bytes());
    framed.extend_from_slice(&msg_bytes);

    Ok(framed)
}

/// Deserialize a message from bytes
///
/// Expects a 4-byte length prefix followed by MessagePack-serialized message.
///
/// # Returns
///
/// Returns (message, bytes_consumed) where bytes_consumed includes the length prefix.
pub fn deserialize_message(buf: &[u8]) -> Result<(Message, usize)> {
    if buf.len() < 4 {
        anyhow::bail!("Buffer too small for message length (need 4 bytes, got {})", buf.len());
    }

    let msg_len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

    if buf.len() < 4 + msg_len {
        anyhow::bail!("Incomplete message (need {} bytes, got {})", 4 + msg_len, buf.len());
    }

    let msg = rmp_serde::from_slice(&buf[4..4 + msg_len])
        .context("Failed to deserialize message")?;

    Ok((msg, 4 + msg_len))
}

/// Read a complete message from a TCP stream
pub async fn read_message(stream: &mut tokio::net::TcpStream) -> Result<Message> {
    use tokio::io::AsyncReadExt;

    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await
        .context("Failed to read message length")?;

    let msg_len = u32::from_le_bytes(len_buf) as usize;
    if msg_len > MAX_MESSAGE_BYTES {
        anyhow::bail!("Message too large: {} bytes (max {})", msg_len, MAX_MESSAGE_BYTES);
    }

    let mut msg_buf = vec![0u8; msg_len];
    stream.read_exact(&mut msg_buf).await
        .context("Failed to read message body")?;

    let msg = rmp_serde::from_slice(&msg_buf)
        .context("Failed to deserialize message")?;

    Ok(msg)
}

/// Write a message to a TCP stream
pub async fn write_message(stream: &mut tokio::net::TcpStream, msg: &Message) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let framed = serialize_message(msg)?;

    stream.write_all(&framed).await
        .context("Failed to write message")?;
    stream.flush().await
        .context("Failed to flush stream")?;

    Ok(())
}
