//! Coordinator and worker services over localhost TCP

use anyhow::Result;
use bucketsort::config::SortConfig;
use bucketsort::distributed::protocol::{read_message, write_message};
use bucketsort::distributed::{AssignMessage, DistributedCoordinator, Message, NodeService, PROTOCOL_VERSION};
use bucketsort::WorkerCount;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Start a worker service that handles exactly one coordinator
fn spawn_service() -> (String, JoinHandle<Result<usize>>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    listener.set_nonblocking(true).unwrap();

    let handle = thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::from_std(listener)?;
            let service = NodeService::new(0)?;
            service.serve_once(&listener).await
        })
    });

    (addr, handle)
}

#[test]
fn test_distributed_sort_over_tcp() {
    let services: Vec<_> = (0..3).map(|_| spawn_service()).collect();
    let addresses: Vec<String> = services.iter().map(|(addr, _)| addr.clone()).collect();

    let config = SortConfig {
        size: 5_000,
        workers: WorkerCount::new(4).unwrap(),
        seed: Some(2024),
        display_limit: 0,
        verify: true,
        json_output: None,
    };

    let outcome = DistributedCoordinator::new(Arc::new(config), addresses)
        .unwrap()
        .run()
        .unwrap();

    assert!(outcome.sorted.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(outcome.sorted.len() + outcome.dropped, 5_000);

    for (rank, (_, handle)) in services.into_iter().enumerate() {
        let sorted = handle.join().unwrap().unwrap();
        assert_eq!(sorted, outcome.bucket_sizes[rank + 1]);
    }
}

#[test]
fn test_service_rejects_coordinator_rank() {
    let (addr, service) = spawn_service();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let reply = runtime
        .block_on(async {
            let mut stream = tokio::net::TcpStream::connect(&addr).await?;
            let assign = AssignMessage {
                protocol_version: PROTOCOL_VERSION,
                rank: 0,
                num_workers: 2,
                display_limit: 0,
            };
            write_message(&mut stream, &Message::Assign(assign)).await?;
            read_message(&mut stream).await
        })
        .unwrap();

    assert!(matches!(reply, Message::Error(_)));
    assert!(service.join().unwrap().is_err());
}

#[test]
fn test_unreachable_node_is_fatal() {
    // Bind then drop to get a port nobody listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let config = SortConfig {
        size: 10,
        workers: WorkerCount::new(2).unwrap(),
        seed: Some(1),
        display_limit: 0,
        verify: false,
        json_output: None,
    };

    let result = DistributedCoordinator::new(Arc::new(config), vec![addr])
        .unwrap()
        .run();
    assert!(result.is_err());
}
