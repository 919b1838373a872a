//! Resolve-then-connect with first-success-wins candidate fallback.
//!
//! The connector walks the resolved list in the order the resolver returned
//! it. For each candidate it opens a stream socket of the matching family;
//! failing to open a socket is fatal, since that points at the host rather
//! than at one address. A failed connect closes that socket and moves on. The
//! first successful connect ends the walk.
//!
//! When every candidate fails, [`ConnectError::NoReachableAddress`] is
//! returned and no connection exists.

use std::io;
use std::net::TcpStream;
use std::os::fd::OwnedFd;

use rustix::net::{AddressFamily, SocketType};

use crate::error::ConnectError;
use crate::trace::{debug, info};

use super::{Candidate, Connection, Family, Resolver, SystemResolver, Transport};

/// Creates sockets and connects them to candidates.
pub trait Dialer {
    /// An opened, not yet connected socket.
    type Socket;
    /// The connected stream.
    type Stream: Transport;

    /// Creates a stream socket for `family`.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be created.
    fn open(&mut self, family: Family) -> io::Result<Self::Socket>;

    /// Connects `socket` to `candidate`. On failure the socket is dropped,
    /// which closes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection attempt fails.
    fn connect(&mut self, socket: Self::Socket, candidate: &Candidate)
    -> io::Result<Self::Stream>;
}

/// Dialer over real TCP sockets.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDialer;

impl Dialer for SystemDialer {
    type Socket = OwnedFd;
    type Stream = TcpStream;

    fn open(&mut self, family: Family) -> io::Result<OwnedFd> {
        let domain = match family {
            Family::V4 => AddressFamily::INET,
            Family::V6 => AddressFamily::INET6,
        };
        Ok(rustix::net::socket(domain, SocketType::STREAM, None)?)
    }

    fn connect(&mut self, socket: OwnedFd, candidate: &Candidate) -> io::Result<TcpStream> {
        rustix::net::connect(&socket, &candidate.as_socket_addr())?;
        Ok(TcpStream::from(socket))
    }
}

/// Establishes the single connection of a fetch.
pub struct Connector<R = SystemResolver, D = SystemDialer> {
    resolver: R,
    dialer: D,
}

impl Default for Connector {
    fn default() -> Self {
        Self::new(SystemResolver, SystemDialer)
    }
}

impl<R: Resolver, D: Dialer> Connector<R, D> {
    #[must_use]
    pub const fn new(resolver: R, dialer: D) -> Self {
        Self { resolver, dialer }
    }

    /// Resolves `host` and connects to the first reachable candidate.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::Resolve`] if resolution fails.
    /// - [`ConnectError::Socket`] if a socket cannot be created; no further
    ///   candidates are tried.
    /// - [`ConnectError::NoReachableAddress`] if every candidate fails.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<Connection<D::Stream>, ConnectError> {
        let candidates = self.resolver.resolve(host, port)?;

        let mut attempted = 0;
        for candidate in &candidates {
            debug!(%candidate, "trying");
            attempted += 1;

            let socket = self.dialer.open(candidate.family()).map_err(ConnectError::Socket)?;
            match self.dialer.connect(socket, candidate) {
                Ok(stream) => {
                    info!(%candidate, port, "connected");
                    return Ok(Connection::new(stream, *candidate));
                }
                Err(_e) => {
                    debug!(%candidate, error = %_e, "connect failed, trying next candidate");
                }
            }
        }

        Err(ConnectError::NoReachableAddress {
            host: host.to_owned(),
            attempted,
        })
    }

    pub fn dialer(&self) -> &D {
        &self.dialer
    }
}
