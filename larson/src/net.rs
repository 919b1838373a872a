//! Name resolution and the single TCP connection of the fetch client.
//!
//! A [`Resolver`] turns a host and port into an ordered list of
//! [`Candidate`]s; the [`Connector`] walks that list through a [`Dialer`]
//! and hands back the first [`Connection`] that succeeds.

pub mod connector;
pub mod endpoint;
pub mod resolve;
pub mod stream;

pub use connector::{Connector, Dialer, SystemDialer};
pub use endpoint::{Candidate, Family};
pub use resolve::{Resolver, SystemResolver};
pub use stream::{Connection, RECV_BUFFER_LEN, Transport};
