//! Candidate addresses produced by name resolution.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};

/// Address family of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}

/// One resolved stream endpoint eligible for a connection attempt.
///
/// The socket type is always stream, so it is not stored. The port is part
/// of the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate(SocketAddr);

impl Candidate {
    #[must_use]
    pub const fn new(addr: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(addr, port))
    }

    /// Creates an IPv4 candidate.
    #[must_use]
    pub const fn new_v4(a: u8, b: u8, c: u8, d: u8, port: u16) -> Self {
        Self(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::new(a, b, c, d),
            port,
        )))
    }

    /// Creates a loopback candidate on the given port.
    #[must_use]
    pub const fn localhost(port: u16) -> Self {
        Self::new_v4(127, 0, 0, 1, port)
    }

    #[must_use]
    pub const fn family(&self) -> Family {
        match self.0 {
            SocketAddr::V4(_) => Family::V4,
            SocketAddr::V6(_) => Family::V6,
        }
    }

    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.0.port()
    }

    #[must_use]
    pub const fn as_socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for Candidate {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<Candidate> for SocketAddr {
    fn from(candidate: Candidate) -> Self {
        candidate.0
    }
}

/// Numeric host text, for diagnostics only.
impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.ip().fmt(f)
    }
}
