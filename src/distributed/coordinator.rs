//! Distributed coordinator
//!
//! Rank 0 in a multi-process run. The coordinator:
//! - Connects to every worker service, in rank order
//! - Assigns ranks and waits for each READY
//! - Runs the bucket sort over the open connections

use crate::bucket::{Rank, SortOutcome, WorkerCount};
use crate::config::SortConfig;
use crate::coordinator::run_rank_zero;
use crate::distributed::channel::TcpChannel;
use crate::distributed::protocol::*;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::runtime::Handle;

/// Distributed coordinator
///
/// Worker rank `r` is the service at `node_addresses[r - 1]`.
pub struct DistributedCoordinator {
    /// Run configuration
    config: Arc<SortConfig>,

    /// List of worker service addresses (IP:port), in rank order
    node_addresses: Vec<String>,
}

impl DistributedCoordinator {
    /// Create a new distributed coordinator
    pub fn new(config: Arc<SortConfig>, node_addresses: Vec<String>) -> Result<Self> {
        if node_addresses.is_empty() {
            anyhow::bail!("No worker nodes specified for distributed mode");
        }
        if config.workers.get() != node_addresses.len() + 1 {
            anyhow::bail!(
                "{} ranks configured but {} worker nodes given",
                config.workers,
                node_addresses.len()
            );
        }

        Ok(Self {
            config,
            node_addresses,
        })
    }

    /// Run the distributed sort
    ///
    /// Must be called outside any tokio runtime; it owns one for the duration
    /// of the run.
    pub fn run(self) -> Result<SortOutcome> {
        let runtime = tokio::runtime::Runtime::new()
            .context("Failed to create tokio runtime")?;

        println!("Connecting to {} worker nodes...", self.node_addresses.len());
        let channels = runtime.block_on(self.connect_all())?;
        println!("All {} worker nodes connected!", channels.len());

        run_rank_zero(&self.config, channels)
    }

    /// Connect to every node and complete the ASSIGN/READY handshake
    async fn connect_all(&self) -> Result<Vec<TcpChannel>> {
        let handle = Handle::current();
        let workers = self.config.workers;
        let mut channels = Vec::with_capacity(self.node_addresses.len());

        for (rank, addr) in workers.worker_ranks().zip(&self.node_addresses) {
            println!("  Connecting to rank {} ({})...", rank, addr);
            let mut stream = TcpStream::connect(addr).await
                .with_context(|| format!("Failed to connect to {}", addr))?;
            stream.set_nodelay(true)
                .with_context(|| format!("Failed to set TCP_NODELAY for {}", addr))?;

            let node_id = handshake(&mut stream, rank, workers, self.config.display_limit).await
                .with_context(|| format!("Handshake with {} failed", addr))?;
            println!("  ✅ Rank {} ready on node {}", rank, node_id);

            channels.push(TcpChannel::new(rank, stream, handle.clone()));
        }

        Ok(channels)
    }
}

/// Assign `rank` to the service behind `stream`; returns its node id
async fn handshake(
    stream: &mut TcpStream,
    rank: Rank,
    workers: WorkerCount,
    display_limit: usize,
) -> Result<String> {
    let assign = AssignMessage {
        protocol_version: PROTOCOL_VERSION,
        rank,
        num_workers: workers.get(),
        display_limit,
    };
    write_message(stream, &Message::Assign(assign)).await?;

    match read_message(stream).await? {
        Message::Ready(ready) => {
            if ready.protocol_version != PROTOCOL_VERSION {
                return Err(ProtocolError::VersionMismatch {
                    coordinator: PROTOCOL_VERSION,
                    node: ready.protocol_version,
                }
                .into());
            }
            if ready.rank != rank {
                anyhow::bail!("node {} accepted rank {} instead of {}", ready.node_id, ready.rank, rank);
            }
            Ok(ready.node_id)
        }
        Message::Error(err) => Err(ProtocolError::Remote {
            node_id: err.node_id,
            error: err.error,
        }
        .into()),
        other => Err(ProtocolError::UnexpectedMessage {
            expected: "READY",
            got: other.kind(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize) -> Arc<SortConfig> {
        Arc::new(SortConfig {
            size: 10,
            workers: WorkerCount::new(workers).unwrap(),
            seed: None,
            display_limit: 100,
            verify: false,
            json_output: None,
        })
    }

    #[test]
    fn test_requires_nodes() {
        assert!(DistributedCoordinator::new(config(1), Vec::new()).is_err());
    }

    #[test]
    fn test_worker_count_must_match_nodes() {
        let nodes = vec!["127.0.0.1:1".to_string()];
        assert!(DistributedCoordinator::new(config(3), nodes.clone()).is_err());
        assert!(DistributedCoordinator::new(config(2), nodes).is_ok());
    }
}
