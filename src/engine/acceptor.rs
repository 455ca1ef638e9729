//! Accept loop
//!
//! One acceptor task per listening socket runs on the main runtime. Each
//! wake-up accepts every pending connection before waiting again.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::net::TcpListener;
use tracing::{debug, error, warn};

use super::dispatcher::Dispatcher;

/// Pause after an accept failure such as descriptor exhaustion
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub(crate) async fn run_acceptor(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<std::net::TcpStream>>,
) {
    loop {
        let first = listener.accept().await;
        let mut failed = !hand_off(first, &dispatcher);

        // Drain everything else already queued on the listener
        while !failed {
            match listener.accept().now_or_never() {
                Some(result) => failed = !hand_off(result, &dispatcher),
                None => break,
            }
        }

        if failed {
            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
        }
    }
}

/// Pass an accepted socket to the next worker; `false` on accept failure
fn hand_off(
    result: io::Result<(tokio::net::TcpStream, std::net::SocketAddr)>,
    dispatcher: &Dispatcher<std::net::TcpStream>,
) -> bool {
    let (stream, peer) = match result {
        Ok(accepted) => accepted,
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => return true,
        Err(e) => {
            error!("Accept failed: {}", e);
            return false;
        }
    };

    let socket = match stream.into_std() {
        Ok(socket) => socket,
        Err(e) => {
            warn!(peer = %peer, "Failed to detach accepted socket: {}", e);
            return true;
        }
    };

    match dispatcher.dispatch(socket) {
        Ok(worker) => debug!(peer = %peer, worker, "Accepted connection"),
        Err(_) => warn!(peer = %peer, "No worker available, dropping connection"),
    }
    true
}
