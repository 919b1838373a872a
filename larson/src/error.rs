//! Error types for each layer of the fetch-and-display pipeline.
//!
//! Library code returns these; only the binaries turn them into a printed
//! diagnostic and exit status 1.

use std::io;

use thiserror::Error;

/// Name resolution failed.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The system resolver reported an error.
    #[error("DNS failed for {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },
    /// The resolver succeeded but returned no stream addresses.
    #[error("DNS failed for {host}: no addresses")]
    NoAddresses { host: String },
}

/// Establishing the single stream connection failed.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Creating a socket failed. Treated as systemic, so no further
    /// candidates are tried.
    #[error("unable to create socket: {0}")]
    Socket(io::Error),
    /// Every candidate refused or failed to connect.
    #[error("no reachable address for {host} ({attempted} tried)")]
    NoReachableAddress { host: String, attempted: usize },
}

/// GPIO setup failed.
#[derive(Debug, Error)]
pub enum GpioError {
    /// The channel map needs exactly one pin per LED.
    #[error("channel map needs {expected} pins, got {actual}")]
    PinCount { expected: usize, actual: usize },
    #[cfg(feature = "rpi")]
    #[error("gpio: {0}")]
    Rppal(#[from] rppal::gpio::Error),
}

/// The fetch-and-display loop stopped on a fatal error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("error on send: {0}")]
    Send(io::Error),
    #[error("error on receive: {0}")]
    Receive(io::Error),
}

/// Command-line or console input could not be understood.
#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("unknown argument: {0}")]
    Unknown(String),
}

/// Top-level error for the binaries.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Gpio(#[from] GpioError),
    #[error("failed to install signal handler: {0}")]
    Signal(io::Error),
    #[error("console i/o: {0}")]
    Io(#[from] io::Error),
}
