//! Connection engine
//!
//! A fixed pool of worker threads, each multiplexing many connections, fed
//! round-robin by acceptor tasks on the main runtime.
//!
//! - [`Dispatcher`]: round-robin hand-off over per-worker channels
//! - `worker`: per-thread readiness loop with deferred close
//! - `connection`: buffers, protocol session and socket of one client
//! - `acceptor`: drains listening sockets into the dispatcher

mod acceptor;
mod connection;
mod dispatcher;
mod worker;

pub use dispatcher::Dispatcher;

use std::future::Future;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};

use crate::metrics::GlobalStats;
use crate::network::bind_listener;
use crate::session::ProtocolHandler;
use worker::Worker;

/// Listen settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker thread count, at least 1
    pub threads: usize,
}

/// Bound listeners plus running workers
pub struct Server {
    listeners: Vec<std::net::TcpListener>,
    dispatcher: Arc<Dispatcher<std::net::TcpStream>>,
    workers: Vec<JoinHandle<()>>,
}

impl Server {
    /// Bind every address `host` resolves to and start the workers
    ///
    /// Fails if no address could be bound.
    pub fn bind(config: &ServerConfig, handler: ProtocolHandler, stats: GlobalStats) -> Result<Self> {
        let addrs: Vec<SocketAddr> = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .with_context(|| format!("Cannot resolve listen host '{}'", config.host))?
            .collect();

        let mut listeners = Vec::new();
        let mut last_error = None;
        for addr in addrs {
            match bind_listener(addr) {
                Ok(listener) => listeners.push(listener),
                Err(e) => {
                    warn!("Cannot listen on {}: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }
        if listeners.is_empty() {
            let reason = last_error.map_or_else(|| "no addresses".to_string(), |e| e.to_string());
            anyhow::bail!("Failed to bind {}:{}: {}", config.host, config.port, reason);
        }

        let threads = config.threads.max(1);
        let mut senders = Vec::with_capacity(threads);
        let mut workers = Vec::with_capacity(threads);
        for id in 0..threads {
            let (tx, rx) = unbounded_channel();
            workers.push(
                Worker::spawn(id, handler.clone(), stats.clone(), rx)
                    .with_context(|| format!("Failed to start worker {}", id))?,
            );
            senders.push(tx);
        }

        Ok(Self {
            listeners,
            dispatcher: Arc::new(Dispatcher::new(senders)),
            workers,
        })
    }

    /// Addresses actually bound (useful with port 0)
    #[must_use]
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners
            .iter()
            .filter_map(|l| l.local_addr().ok())
            .collect()
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Accept connections until `shutdown` completes
    ///
    /// Listeners close on return. Workers are not drained; they exit once
    /// their accept channel closes.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let mut acceptors = Vec::with_capacity(self.listeners.len());
        for listener in self.listeners {
            let addr = listener.local_addr()?;
            let listener = tokio::net::TcpListener::from_std(listener)
                .with_context(|| format!("Failed to register listener {}", addr))?;
            info!("Listening on {}", addr);
            acceptors.push(tokio::spawn(acceptor::run_acceptor(
                listener,
                Arc::clone(&self.dispatcher),
            )));
        }

        shutdown.await;

        for acceptor in &acceptors {
            acceptor.abort();
        }
        for acceptor in acceptors {
            let _ = acceptor.await;
        }
        info!("Stopped accepting connections");
        Ok(())
    }
}
