//! Worker loop
//!
//! A worker is one OS thread running a single-threaded runtime. It owns
//! every connection handed to it and multiplexes them in one explicit
//! readiness loop, so connection state is never shared or locked.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::io::Ready;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::connection::{Connection, Readiness};
use crate::constants::stats::WORKER_FLUSH_INTERVAL;
use crate::metrics::{GlobalStats, WorkerCounters};
use crate::network::SocketOptimizer;
use crate::session::ProtocolHandler;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// What woke the loop up
enum Event {
    Accepted(std::net::TcpStream),
    ChannelClosed,
    Ready(u64, io::Result<Ready>),
    Tick,
}

pub(crate) struct Worker {
    id: usize,
    handler: ProtocolHandler,
    stats: GlobalStats,
    connections: HashMap<u64, Connection>,
    /// Closed connections waiting to be dropped at the top of the loop
    deferred: Vec<Connection>,
    counters: WorkerCounters,
}

impl Worker {
    pub(crate) fn new(id: usize, handler: ProtocolHandler, stats: GlobalStats) -> Self {
        Self {
            id,
            handler,
            stats,
            connections: HashMap::new(),
            deferred: Vec::new(),
            counters: WorkerCounters::default(),
        }
    }

    /// Start a worker on its own thread
    ///
    /// The worker is built on that thread: its connections hold `Rc`
    /// sockets and never cross threads.
    pub(crate) fn spawn(
        id: usize,
        handler: ProtocolHandler,
        stats: GlobalStats,
        accepted: UnboundedReceiver<std::net::TcpStream>,
    ) -> io::Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        std::thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || runtime.block_on(Self::new(id, handler, stats).run(accepted)))
    }

    /// Run until the accept channel closes
    pub(crate) async fn run(mut self, mut accepted: UnboundedReceiver<std::net::TcpStream>) {
        let mut pending: FuturesUnordered<Readiness> = FuturesUnordered::new();
        let mut ticker = tokio::time::interval(WORKER_FLUSH_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(worker = self.id, "Worker started");

        loop {
            self.reap();

            let event = tokio::select! {
                socket = accepted.recv() => match socket {
                    Some(socket) => Event::Accepted(socket),
                    None => Event::ChannelClosed,
                },
                Some((id, ready)) = pending.next(), if !pending.is_empty() => Event::Ready(id, ready),
                _ = ticker.tick() => Event::Tick,
            };

            match event {
                Event::Accepted(socket) => {
                    if let Some(readiness) = self.adopt(socket) {
                        pending.push(readiness);
                    }
                }
                Event::Ready(id, ready) => {
                    if let Some(readiness) = self.on_ready(id, ready).await {
                        pending.push(readiness);
                    }
                }
                Event::Tick => self.stats.flush(&mut self.counters),
                Event::ChannelClosed => break,
            }
        }

        self.stats.flush(&mut self.counters);
        debug!(worker = self.id, "Worker stopped");
    }

    /// Register a freshly accepted socket and greet the client
    fn adopt(&mut self, socket: std::net::TcpStream) -> Option<Readiness> {
        SocketOptimizer::tune_accepted(&socket);
        let stream = match TcpStream::from_std(socket) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(worker = self.id, "Failed to register socket: {}", e);
                return None;
            }
        };

        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        let mut conn = Connection::new(id, stream);
        self.counters.opened += 1;
        info!(worker = self.id, conn = id, peer = ?conn.peer(), "Client connected");

        if !conn.greet(&self.handler) {
            self.close(conn);
            return None;
        }
        let readiness = conn.readiness();
        self.connections.insert(id, conn);
        Some(readiness)
    }

    /// Dispatch a readiness event to its connection
    async fn on_ready(&mut self, id: u64, ready: io::Result<Ready>) -> Option<Readiness> {
        let mut conn = self.connections.remove(&id)?;
        let keep = match ready {
            Ok(ready) => conn.on_ready(ready, &self.handler, &mut self.counters).await,
            Err(e) => {
                debug!(conn = id, "Readiness error: {}", e);
                false
            }
        };

        if keep {
            let readiness = conn.readiness();
            self.connections.insert(id, conn);
            Some(readiness)
        } else {
            self.close(conn);
            None
        }
    }

    /// Stop a connection's I/O and queue it for destruction
    fn close(&mut self, conn: Connection) {
        self.counters.closed += 1;
        debug!(worker = self.id, conn = conn.id(), "Closing connection");
        self.deferred.push(conn);
    }

    /// Drop every connection closed since the last iteration
    fn reap(&mut self) {
        for conn in self.deferred.drain(..) {
            debug!(conn = conn.id(), peer = ?conn.peer(), "Client session ended");
        }
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpoolConfig;
    use crate::error::FetchError;
    use crate::render::RfcRenderer;
    use crate::session::Features;
    use crate::source::{ContentSource, Refresher};
    use crate::store::{SharedStore, Store};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::time::timeout;

    struct Offline;

    #[async_trait]
    impl ContentSource for Offline {
        async fn fetch_listing(&self, _: &str) -> Result<Value, FetchError> {
            Err(FetchError::Other("offline".to_string()))
        }
        async fn fetch_thread(&self, _: &str, _: &str) -> Result<Value, FetchError> {
            Err(FetchError::Other("offline".to_string()))
        }
    }

    fn worker(dir: &std::path::Path) -> Worker {
        let config = SpoolConfig {
            spool_path: dir.join("spool"),
            newsrc_path: dir.join("newsrc"),
            max_age_days: 14,
        };
        let store = SharedStore::new(Store::new(&config));
        let handler = ProtocolHandler::new(
            Refresher::new(Arc::new(Offline), store),
            Arc::new(RfcRenderer::default()),
            Features::default(),
        );
        Worker::new(0, handler, GlobalStats::new())
    }

    const WAIT: Duration = Duration::from_secs(5);

    enum Step {
        Read(usize),
        Ready(u64, io::Result<Ready>),
    }

    /// Feed readiness events to the worker until `client` has read `expected`
    ///
    /// A freshly registered socket starts with no readiness, so even the
    /// greeting only goes out once the worker handles a writable event.
    async fn exchange(
        worker: &mut Worker,
        mut readiness: Readiness,
        client: &mut tokio::net::TcpStream,
        expected: &[u8],
    ) -> Readiness {
        let mut received = Vec::new();
        let mut buf = [0u8; 256];
        while received.len() < expected.len() {
            let step = timeout(WAIT, async {
                tokio::select! {
                    n = client.read(&mut buf) => Step::Read(n.unwrap()),
                    (id, ready) = &mut readiness => Step::Ready(id, ready),
                }
            })
            .await
            .expect("connection stalled");

            match step {
                Step::Read(0) => panic!("connection closed early"),
                Step::Read(n) => received.extend_from_slice(&buf[..n]),
                Step::Ready(id, ready) => {
                    readiness = worker
                        .on_ready(id, ready)
                        .await
                        .expect("connection closed unexpectedly");
                }
            }
        }
        assert_eq!(received, expected);
        readiness
    }

    #[tokio::test]
    async fn test_quit_in_batch_defers_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = worker(dir.path());

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = tokio::net::TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (server_side, _) = listener.accept().unwrap();
        server_side.set_nonblocking(true).unwrap();

        let readiness = worker.adopt(server_side).unwrap();
        assert_eq!(worker.live(), 1);
        let mut readiness =
            exchange(&mut worker, readiness, &mut client, b"200 newsgate ready.\r\n").await;

        client
            .write_all(b"CHECK <a@x>\r\nQUIT\r\nCHECK <b@x>\r\n")
            .await
            .unwrap();

        // Run events until the QUIT inside the batch closes the connection
        loop {
            let (id, ready) = timeout(WAIT, readiness).await.expect("no readiness event");
            match worker.on_ready(id, ready).await {
                Some(next) => readiness = next,
                None => break,
            }
        }

        // Closed but not yet destroyed
        assert_eq!(worker.live(), 0);
        assert_eq!(worker.deferred.len(), 1);
        assert_eq!(worker.counters.closed, 1);
        assert_eq!(worker.counters.offered, 1);

        worker.reap();
        assert!(worker.deferred.is_empty());

        // Only the reply to the command before QUIT went out, then EOF
        let mut rest = Vec::new();
        timeout(WAIT, client.read_to_end(&mut rest))
            .await
            .expect("socket not closed")
            .unwrap();
        assert_eq!(rest, b"238 <a@x>\r\n");
    }

    #[tokio::test]
    async fn test_connection_stays_open_between_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = worker(dir.path());

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = tokio::net::TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (server_side, _) = listener.accept().unwrap();
        server_side.set_nonblocking(true).unwrap();

        let readiness = worker.adopt(server_side).unwrap();
        let readiness =
            exchange(&mut worker, readiness, &mut client, b"200 newsgate ready.\r\n").await;

        client.write_all(b"MODE STREAM\r\n").await.unwrap();
        let readiness =
            exchange(&mut worker, readiness, &mut client, b"203 Streaming OK.\r\n").await;
        client.write_all(b"CHECK <c@x>\r\n").await.unwrap();
        exchange(&mut worker, readiness, &mut client, b"238 <c@x>\r\n").await;

        assert_eq!(worker.live(), 1);
        assert!(worker.deferred.is_empty());
        assert_eq!(worker.counters.opened, 1);
        assert_eq!(worker.counters.closed, 0);
    }
}
