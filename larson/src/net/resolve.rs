//! Host name resolution.

use std::net::ToSocketAddrs;

use crate::error::ResolveError;
use crate::trace::debug;

use super::Candidate;

/// Resolves a host and port into stream candidates.
///
/// Implementations must keep the order the underlying resolver produced;
/// the connector tries candidates first to last.
pub trait Resolver {
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the name cannot be resolved or resolves to
    /// nothing.
    fn resolve(&mut self, host: &str, port: u16) -> Result<Vec<Candidate>, ResolveError>;
}

/// Resolver backed by the operating system (`getaddrinfo`).
///
/// Any address family is accepted; v4 and v6 results are interleaved
/// exactly as the system returns them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&mut self, host: &str, port: u16) -> Result<Vec<Candidate>, ResolveError> {
        debug!(host, port, "resolving");
        let candidates: Vec<Candidate> = (host, port)
            .to_socket_addrs()
            .map_err(|source| ResolveError::Lookup {
                host: host.to_owned(),
                source,
            })?
            .map(Candidate::from)
            .collect();

        if candidates.is_empty() {
            return Err(ResolveError::NoAddresses {
                host: host.to_owned(),
            });
        }
        debug!(host, ?candidates, "found stream addresses");
        Ok(candidates)
    }
}
