//! Socket setup
//!
//! Listening sockets are built with socket2 so the backlog and address
//! reuse can be set before `listen`; accepted sockets are tuned for
//! low-latency request/response traffic.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};

use socket2::{Domain, Protocol, SockRef, Socket, Type};
use tracing::debug;

use crate::constants::socket::LISTEN_BACKLOG;

/// Bind a non-blocking listener on `addr`
///
/// IPv6 sockets are v6-only so the same port can also be bound on IPv4.
pub fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

/// Per-connection socket options for accepted sockets
pub struct SocketOptimizer;

impl SocketOptimizer {
    /// Disable Nagle and make sure the socket is non-blocking
    ///
    /// Failures are logged; the connection is still usable without them.
    pub fn tune_accepted(stream: &TcpStream) {
        let sock_ref = SockRef::from(stream);
        if let Err(e) = sock_ref.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }
        if let Err(e) = sock_ref.set_nonblocking(true) {
            debug!("Failed to set O_NONBLOCK: {}", e);
        }
    }
}
