//! Tools for a 20-LED GPIO array ("Larson scanner").
//!
//! The core is a fetch-and-display client: [`net::Connector`] resolves a host
//! and opens one TCP stream, and [`display::LineDisplay`] renders every
//! received byte in binary on the LED array. [`fetch::run_fetch`] ties the
//! two together. The remaining modules back the demo binaries: a CGI bridge
//! ([`cgi`]), the scanner itself ([`scanner`]) and a button counter
//! ([`button`]).

pub mod button;
pub mod cgi;
pub mod display;
pub mod error;
pub mod fetch;
pub mod gpio;
pub mod http;
pub mod net;
pub mod scanner;
pub mod shutdown;

mod trace;

pub use trace::init_tracing;
