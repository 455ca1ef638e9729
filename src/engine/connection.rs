//! One client connection inside a worker

use std::io;
use std::net::SocketAddr;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tokio::io::{Interest, Ready};
use tokio::net::TcpStream;
use tracing::debug;

use crate::constants::buffer::EAGER_FLUSH;
use crate::metrics::WorkerCounters;
use crate::queue::{ByteQueue, Transfer};
use crate::session::{ProtocolHandler, Session};

/// Readiness wait for one connection, tagged with its id
pub(crate) type Readiness = LocalBoxFuture<'static, (u64, io::Result<Ready>)>;

/// Socket, buffers and protocol state of one client
///
/// Owned by exactly one worker. The socket is shared only with the
/// connection's own pending readiness future, so dropping the connection
/// after that future has resolved closes the socket.
pub(crate) struct Connection {
    id: u64,
    peer: Option<SocketAddr>,
    stream: Rc<TcpStream>,
    session: Session,
    inbound: ByteQueue,
    outbound: ByteQueue,
}

impl Connection {
    pub(crate) fn new(id: u64, stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            id,
            peer,
            stream: Rc::new(stream),
            session: Session::new(id),
            inbound: ByteQueue::new(),
            outbound: ByteQueue::new(),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Queue the greeting and try to send it right away
    pub(crate) fn greet(&mut self, handler: &ProtocolHandler) -> bool {
        handler.greeting(&mut self.outbound);
        self.flush()
    }

    /// Writable interest only while there is something to write
    fn interest(&self) -> Interest {
        if self.outbound.is_empty() {
            Interest::READABLE
        } else {
            Interest::READABLE | Interest::WRITABLE
        }
    }

    /// Wait for the socket to become ready for what this connection needs
    pub(crate) fn readiness(&self) -> Readiness {
        let stream = Rc::clone(&self.stream);
        let id = self.id;
        let interest = self.interest();
        async move { (id, stream.ready(interest).await) }.boxed_local()
    }

    /// Handle one readiness event; `false` means the connection must close
    ///
    /// Reads at most once, then runs every complete command line that
    /// arrived. A QUIT inside the batch stops dispatch of the lines after it,
    /// but the socket and buffers stay valid until the worker reaps the
    /// connection.
    pub(crate) async fn on_ready(
        &mut self,
        ready: Ready,
        handler: &ProtocolHandler,
        counters: &mut WorkerCounters,
    ) -> bool {
        if ready.is_writable() && !self.flush() {
            return false;
        }
        if !(ready.is_readable() || ready.is_read_closed()) {
            return true;
        }

        match self.inbound.read_from(&*self.stream) {
            Ok(Transfer::Bytes(_)) => {}
            Ok(Transfer::WouldBlock) => return true,
            Ok(Transfer::Closed) => {
                debug!(conn = self.id, "Client disconnected");
                return false;
            }
            Err(e) => {
                debug!(conn = self.id, "Read error: {}", e);
                return false;
            }
        }

        self.process_lines(handler, counters).await;
        let flushed = self.flush();
        flushed && !self.session.is_closing()
    }

    async fn process_lines(&mut self, handler: &ProtocolHandler, counters: &mut WorkerCounters) {
        while !self.session.is_closing() {
            let Some(line) = self.inbound.read_line() else {
                break;
            };
            handler
                .handle_line(&mut self.session, &line, &mut self.outbound, counters)
                .await;
            if self.outbound.len() >= EAGER_FLUSH && !self.flush() {
                self.session.close();
            }
        }
    }

    /// Write until the queue is empty or the socket would block
    fn flush(&mut self) -> bool {
        while !self.outbound.is_empty() {
            match self.outbound.write_to(&*self.stream) {
                Ok(Transfer::Bytes(_)) => {}
                Ok(Transfer::WouldBlock) => return true,
                Ok(Transfer::Closed) => return false,
                Err(e) => {
                    debug!(conn = self.id, "Write error: {}", e);
                    return false;
                }
            }
        }
        true
    }
}
