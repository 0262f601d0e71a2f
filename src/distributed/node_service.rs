//! Node service for distributed mode
//!
//! Runs on each worker node. The node service:
//! - Listens for connections from the coordinator
//! - Accepts a rank assignment (ASSIGN) and confirms it (READY)
//! - Runs the worker side of the bucket sort on that connection
//! - Goes back to waiting for the next coordinator

use crate::bucket::{BucketWorker, COORDINATOR_RANK};
use crate::distributed::channel::TcpChannel;
use crate::distributed::protocol::*;
use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Handle;

/// Node service
pub struct NodeService {
    /// Port to listen on
    listen_port: u16,

    /// Node identifier (hostname)
    node_id: String,
}

impl NodeService {
    /// Create a new node service
    pub fn new(listen_port: u16) -> Result<Self> {
        let node_id = get_node_id()?;

        Ok(Self {
            listen_port,
            node_id,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Run the node service
    ///
    /// Serves one coordinator at a time, forever. A failed run is reported
    /// and the service keeps listening.
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.listen_port);
        let listener = TcpListener::bind(&addr).await
            .context("Failed to bind node service")?;

        println!("Node service listening on port {}", self.listen_port);
        println!("Node ID: {}", self.node_id);

        loop {
            println!("Waiting for coordinator connection...");
            match self.serve_once(&listener).await {
                Ok(count) => println!("Sort complete ({} values). Waiting for next connection...", count),
                Err(e) => eprintln!("Sort failed: {:#}", e),
            }
        }
    }

    /// Accept one coordinator and run the worker protocol for it
    ///
    /// Returns the number of values this rank sorted. The runtime driving
    /// this future must be multi-threaded.
    pub async fn serve_once(&self, listener: &TcpListener) -> Result<usize> {
        let (stream, addr) = listener.accept().await
            .context("Failed to accept connection")?;
        println!("Coordinator connected from: {}", addr);

        self.handle_sort(stream).await
    }

    /// Handle a single sort on an accepted connection
    async fn handle_sort(&self, mut stream: TcpStream) -> Result<usize> {
        stream.set_nodelay(true)
            .context("Failed to set TCP_NODELAY")?;

        let assign = match read_message(&mut stream).await? {
            Message::Assign(assign) => assign,
            other => {
                return Err(ProtocolError::UnexpectedMessage {
                    expected: "ASSIGN",
                    got: other.kind(),
                }
                .into())
            }
        };

        if let Err(e) = check_assignment(&assign) {
            let error = ErrorMessage {
                node_id: self.node_id.clone(),
                error: e.to_string(),
            };
            write_message(&mut stream, &Message::Error(error)).await?;
            return Err(e.into());
        }

        println!("Assigned rank {} of {}", assign.rank, assign.num_workers);

        let ready = ReadyMessage {
            protocol_version: PROTOCOL_VERSION,
            node_id: self.node_id.clone(),
            rank: assign.rank,
        };
        write_message(&mut stream, &Message::Ready(ready)).await?;

        // The worker protocol is blocking; run it off the async workers
        let handle = Handle::current();
        let rank = assign.rank;
        let display_limit = assign.display_limit;
        tokio::task::spawn_blocking(move || {
            let channel = TcpChannel::new(COORDINATOR_RANK, stream, handle);
            BucketWorker::new(rank, channel)?
                .with_report(display_limit)
                .run()
        })
        .await
        .context("Worker task panicked")?
    }
}

/// Reject assignments this node cannot honor
fn check_assignment(assign: &AssignMessage) -> std::result::Result<(), ProtocolError> {
    if assign.protocol_version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch {
            coordinator: assign.protocol_version,
            node: PROTOCOL_VERSION,
        });
    }
    if assign.rank == COORDINATOR_RANK || assign.rank >= assign.num_workers {
        return Err(ProtocolError::InvalidRank {
            rank: assign.rank,
            num_workers: assign.num_workers,
        });
    }
    Ok(())
}

/// Get node identifier (hostname)
fn get_node_id() -> Result<String> {
    let name = hostname::get()
        .context("Failed to get hostname")?;
    Ok(name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(rank: usize, num_workers: usize, protocol_version: u32) -> AssignMessage {
        AssignMessage {
            protocol_version,
            rank,
            num_workers,
            display_limit: 100,
        }
    }

    #[test]
    fn test_check_assignment_accepts_worker_rank() {
        assert!(check_assignment(&assign(1, 2, PROTOCOL_VERSION)).is_ok());
        assert!(check_assignment(&assign(3, 4, PROTOCOL_VERSION)).is_ok());
    }

    #[test]
    fn test_check_assignment_rejects_coordinator_rank() {
        assert!(matches!(
            check_assignment(&assign(0, 4, PROTOCOL_VERSION)),
            Err(ProtocolError::InvalidRank { .. })
        ));
    }

    #[test]
    fn test_check_assignment_rejects_out_of_range() {
        assert!(matches!(
            check_assignment(&assign(4, 4, PROTOCOL_VERSION)),
            Err(ProtocolError::InvalidRank { .. })
        ));
    }

    #[test]
    fn test_check_assignment_rejects_version() {
        assert!(matches!(
            check_assignment(&assign(1, 2, PROTOCOL_VERSION + 1)),
            Err(ProtocolError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_node_id() {
        let service = NodeService::new(0).unwrap();
        assert!(!service.node_id().is_empty());
    }
}
