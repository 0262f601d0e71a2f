//! Point-to-point channels between the coordinator and one worker rank
//!
//! Every exchange in the sort is a blocking send or receive between rank 0 and
//! exactly one worker. A [`Channel`] is one end of such a link. Messages on a
//! single channel arrive in the order they were sent; nothing is promised
//! across different channels.
//!
//! There are no timeouts. A peer that never sends blocks the receiver forever.
//!
//! # Transports
//!
//! - [`LocalChannel`]: ranks are threads in one process, linked by zero-capacity
//!   crossbeam channels, so every send waits for the matching receive.
//! - [`TcpChannel`]: ranks are separate processes, linked by one TCP
//!   connection carrying length-prefixed MessagePack frames.

use crate::bucket::Rank;
use crate::distributed::protocol::{read_message, write_message, Message, ProtocolError};
use anyhow::Result;
use crossbeam::channel::{bounded, Receiver, Sender};
use tokio::net::TcpStream;
use tokio::runtime::Handle;

/// One end of a blocking point-to-point link
pub trait Channel: Send {
    /// Rank at the other end of the link
    fn peer(&self) -> Rank;

    /// Send a message, blocking until the transport has accepted it
    fn send(&mut self, msg: Message) -> Result<()>;

    /// Receive the next message, blocking until one arrives
    fn receive(&mut self) -> Result<Message>;
}

/// In-process channel end
pub struct LocalChannel {
    peer: Rank,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl LocalChannel {
    /// Create a linked pair of channel ends between rank `a` and rank `b`
    ///
    /// The first end belongs to `a` (its peer is `b`), the second to `b`.
    pub fn pair(a: Rank, b: Rank) -> (LocalChannel, LocalChannel) {
        let (a_tx, b_rx) = bounded(0);
        let (b_tx, a_rx) = bounded(0);

        (
            LocalChannel { peer: b, tx: a_tx, rx: a_rx },
            LocalChannel { peer: a, tx: b_tx, rx: b_rx },
        )
    }
}

impl Channel for LocalChannel {
    fn peer(&self) -> Rank {
        self.peer
    }

    fn send(&mut self, msg: Message) -> Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| ProtocolError::Disconnected { peer: self.peer })?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Message> {
        let msg = self
            .rx
            .recv()
            .map_err(|_| ProtocolError::Disconnected { peer: self.peer })?;
        Ok(msg)
    }
}

/// TCP channel end
///
/// Wraps an async stream and drives it to completion on every call through a
/// runtime handle. Must be used from a thread outside the runtime's async
/// context (the main thread, or a `spawn_blocking` task), and the runtime must
/// be multi-threaded so its IO driver keeps running.
pub struct TcpChannel {
    peer: Rank,
    stream: TcpStream,
    handle: Handle,
}

impl TcpChannel {
    pub fn new(peer: Rank, stream: TcpStream, handle: Handle) -> Self {
        Self { peer, stream, handle }
    }
}

impl Channel for TcpChannel {
    fn peer(&self) -> Rank {
        self.peer
    }

    fn send(&mut self, msg: Message) -> Result<()> {
        let Self { stream, handle, .. } = self;
        handle.block_on(write_message(stream, &msg))
    }

    fn receive(&mut self) -> Result<Message> {
        let Self { stream, handle, .. } = self;
        handle.block_on(read_message(stream))
    }
}
