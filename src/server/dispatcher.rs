//! Fixed-size worker pool dispatching accepted connections.
//!
//! The accept loop is the single producer; a bounded FIFO queue feeds the
//! workers, so submission applies backpressure on queue capacity but never
//! waits for a task to finish.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::http::connection::Connection;
use crate::router::AppState;
use crate::server::listener::Endpoint;

/// One-shot unit of work: an accepted connection plus the shared read-only
/// server state. Moved into the queue and owned by whichever worker
/// dequeues it; the socket is released when the connection loop returns.
pub struct ConnectionTask {
    pub stream: TcpStream,
    pub endpoint: Endpoint,
    pub state: Arc<AppState>,
}

pub struct WorkerPool {
    sender: mpsc::Sender<ConnectionTask>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` long-lived workers sharing one task queue.
    pub fn new(size: usize) -> Self {
        assert!(size > 0);

        let (sender, receiver) = mpsc::channel(size);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                tokio::spawn(worker_loop(id, receiver))
            })
            .collect();

        Self { sender, workers }
    }

    /// Enqueues a connection for the next idle worker, waiting only if the
    /// queue is full.
    pub async fn submit(&self, task: ConnectionTask) -> anyhow::Result<()> {
        self.sender
            .send(task)
            .await
            .map_err(|_| anyhow::anyhow!("worker pool is shut down"))
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

async fn worker_loop(id: usize, receiver: Arc<Mutex<mpsc::Receiver<ConnectionTask>>>) {
    loop {
        // holding the lock while waiting keeps dequeue order FIFO
        let task = receiver.lock().await.recv().await;
        let Some(task) = task else {
            // all senders gone, the pool is shutting down
            break;
        };

        let ConnectionTask {
            stream,
            endpoint,
            state,
        } = task;

        info!(
            worker = id,
            client = %endpoint.peer_dns,
            port = endpoint.peer_port,
            ip = %endpoint.peer_addr,
            "client connected"
        );

        let mut connection = Connection::new(stream, state);
        if let Err(e) = connection.run().await {
            error!(worker = id, ip = %endpoint.peer_addr, error = %e, "connection error");
        }
    }
}
