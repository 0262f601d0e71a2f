//! Distributed mode implementation
//!
//! # Architecture
//!
//! A run has a fixed number of ranks. Rank 0 is the coordinator; every other
//! rank is a worker that sorts exactly one bucket.
//!
//! - **Coordinator**: Connects to all worker services, assigns ranks, runs the sort
//! - **Node Service**: Runs on worker nodes, plays one worker rank per connection
//!
//! # Modules
//!
//! - `protocol`: Message definitions and serialization
//! - `channel`: Blocking point-to-point channels (in-process and TCP)
//! - `node_service`: Worker node service
//! - `coordinator`: Distributed coordinator

pub mod channel;
pub mod coordinator;
pub mod node_service;
pub mod protocol;

// Re-export key types
pub use channel::{Channel, LocalChannel, TcpChannel};
pub use protocol::{
    Message,
    AssignMessage,
    ReadyMessage,
    ErrorMessage,
    ProtocolError,
    PROTOCOL_VERSION,
};

pub use node_service::NodeService;
pub use coordinator::DistributedCoordinator;
