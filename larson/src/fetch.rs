//! The read-reset-display loop.
//!
//! Connect, send one GET, then alternate between reading a chunk and
//! rendering it until the requested number of reads is done or the
//! keep-running flag clears. The connection is closed and the array forced
//! off exactly once on the way out.

use crate::display::{LineDisplay, Rendered};
use crate::error::FetchError;
use crate::gpio::OutputPin;
use crate::http::{self, HTTP_PORT, TRAILER};
use crate::net::{Connector, Dialer, RECV_BUFFER_LEN, Resolver};
use crate::trace::info;

/// What to fetch and how many reads to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Host name or numeric address of the web server.
    pub host: String,
    /// TCP port, 80 unless overridden.
    pub port: u16,
    /// Number of reads ("lines") to display.
    pub lines: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: HTTP_PORT,
            lines: 1,
        }
    }
}

/// Outcome of a completed fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Reads performed.
    pub reads: usize,
    /// Bytes received over all reads.
    pub bytes_received: usize,
    /// The keep-running flag cleared before all reads were displayed.
    pub interrupted: bool,
}

/// Fetches `config.host`'s index page and shows it on `display`.
///
/// The array is cleared before returning, on success and on error alike.
///
/// # Errors
///
/// - [`FetchError::Connect`] if resolution, socket creation or every
///   connection attempt fails.
/// - [`FetchError::Send`] if the request cannot be written.
/// - [`FetchError::Receive`] if a read fails; the failed read is never
///   displayed.
pub fn run_fetch<R, D, P>(
    config: &FetchConfig,
    connector: &mut Connector<R, D>,
    display: &mut LineDisplay<P>,
) -> Result<FetchSummary, FetchError>
where
    R: Resolver,
    D: Dialer,
    P: OutputPin,
{
    run_fetch_with(config, connector, display, |_| {})
}

/// Like [`run_fetch`], handing every received chunk to `on_chunk` before it
/// is rendered.
///
/// # Errors
///
/// As [`run_fetch`].
pub fn run_fetch_with<R, D, P, F>(
    config: &FetchConfig,
    connector: &mut Connector<R, D>,
    display: &mut LineDisplay<P>,
    on_chunk: F,
) -> Result<FetchSummary, FetchError>
where
    R: Resolver,
    D: Dialer,
    P: OutputPin,
    F: FnMut(&[u8]),
{
    let result = fetch_and_render(config, connector, display, on_chunk);
    display.clear();
    result
}

fn fetch_and_render<R, D, P, F>(
    config: &FetchConfig,
    connector: &mut Connector<R, D>,
    display: &mut LineDisplay<P>,
    mut on_chunk: F,
) -> Result<FetchSummary, FetchError>
where
    R: Resolver,
    D: Dialer,
    P: OutputPin,
    F: FnMut(&[u8]),
{
    let request = http::index_request(&config.host);
    let mut conn = connector.connect(&config.host, config.port)?;

    info!(request = %request.trim_end(), "sending HTTP request");
    conn.send(request.as_bytes()).map_err(FetchError::Send)?;
    conn.send(TRAILER.as_bytes()).map_err(FetchError::Send)?;

    let keep_running = display.keep_running().clone();
    let mut buf = [0u8; RECV_BUFFER_LEN];
    let mut summary = FetchSummary::default();

    for _ in 0..config.lines {
        if !keep_running.is_running() {
            summary.interrupted = true;
            break;
        }
        let chunk = conn.read_chunk(&mut buf).map_err(FetchError::Receive)?;
        summary.reads += 1;
        summary.bytes_received += chunk.len();
        info!(received = %String::from_utf8_lossy(chunk), "received");
        on_chunk(chunk);

        if let Rendered::Interrupted { .. } = display.write_text(chunk) {
            summary.interrupted = true;
        }
    }

    conn.close();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read, Write};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::error::{ConnectError, ResolveError};
    use crate::gpio::{ChannelMap, DEFAULT_PINS, MemoryPin};
    use crate::net::{Candidate, Family, Transport};
    use crate::shutdown::KeepRunning;

    struct Loopback;

    impl Resolver for Loopback {
        fn resolve(&mut self, _host: &str, port: u16) -> Result<Vec<Candidate>, ResolveError> {
            Ok(vec![Candidate::localhost(port)])
        }
    }

    /// Stream serving scripted reads; `None` entries fail.
    struct Script {
        reads: Vec<Option<Vec<u8>>>,
        sent: Arc<Mutex<Vec<u8>>>,
        broken_pipe: bool,
    }

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.reads.is_empty() {
                return Ok(0);
            }
            match self.reads.remove(0) {
                Some(data) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                None => Err(io::ErrorKind::ConnectionReset.into()),
            }
        }
    }

    impl Write for Script {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken_pipe {
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            self.sent.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for Script {}

    struct ScriptDialer(Option<Script>);

    impl Dialer for ScriptDialer {
        type Socket = ();
        type Stream = Script;

        fn open(&mut self, _family: Family) -> io::Result<()> {
            Ok(())
        }

        fn connect(&mut self, _socket: (), _candidate: &Candidate) -> io::Result<Script> {
            self.0
                .take()
                .ok_or_else(|| io::ErrorKind::ConnectionRefused.into())
        }
    }

    fn setup(
        reads: Vec<Option<Vec<u8>>>,
    ) -> (
        Connector<Loopback, ScriptDialer>,
        LineDisplay<MemoryPin>,
        Arc<Mutex<Vec<u8>>>,
    ) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let script = Script {
            reads,
            sent: Arc::clone(&sent),
            broken_pipe: false,
        };
        let connector = Connector::new(Loopback, ScriptDialer(Some(script)));
        let display = LineDisplay::new(ChannelMap::memory(&DEFAULT_PINS), KeepRunning::new())
            .with_delay(Duration::ZERO);
        (connector, display, sent)
    }

    fn total_lit(display: &LineDisplay<MemoryPin>) -> u32 {
        display.channels().pins().iter().map(MemoryPin::lit_count).sum()
    }

    fn config(lines: usize) -> FetchConfig {
        FetchConfig {
            host: "example.com".into(),
            lines,
            ..Default::default()
        }
    }

    #[test]
    fn sends_request_then_trailer() {
        let (mut connector, mut display, sent) = setup(vec![Some(b"x".to_vec())]);
        run_fetch(&config(1), &mut connector, &mut display).unwrap();

        let expected = format!("{}\r\n", http::index_request("example.com"));
        assert_eq!(*sent.lock().unwrap(), expected.into_bytes());
    }

    #[test]
    fn displays_each_read_and_clears() {
        let (mut connector, mut display, _) =
            setup(vec![Some(b"\x01".to_vec()), Some(b"\x03\x07".to_vec())]);
        let summary = run_fetch(&config(2), &mut connector, &mut display).unwrap();

        assert_eq!(summary.reads, 2);
        assert_eq!(summary.bytes_received, 3);
        assert!(!summary.interrupted);
        // 1 + 2 + 3 set bits.
        assert_eq!(total_lit(&display), 6);
        assert_eq!(display.channels().pattern(), 0);
    }

    #[test]
    fn stops_after_requested_reads() {
        let (mut connector, mut display, _) = setup(vec![
            Some(b"a".to_vec()),
            Some(b"b".to_vec()),
            Some(b"c".to_vec()),
        ]);
        let summary = run_fetch(&config(2), &mut connector, &mut display).unwrap();
        assert_eq!(summary.reads, 2);
    }

    #[test]
    fn receive_error_is_fatal_and_not_displayed() {
        let (mut connector, mut display, _) = setup(vec![None, Some(b"late".to_vec())]);
        let err = run_fetch(&config(3), &mut connector, &mut display).unwrap_err();

        assert!(matches!(err, FetchError::Receive(_)));
        assert_eq!(total_lit(&display), 0);
        assert_eq!(display.channels().pattern(), 0);
    }

    #[test]
    fn send_error_is_fatal_and_not_displayed() {
        let script = Script {
            reads: vec![Some(b"never read".to_vec())],
            sent: Arc::new(Mutex::new(Vec::new())),
            broken_pipe: true,
        };
        let mut connector = Connector::new(Loopback, ScriptDialer(Some(script)));
        let mut display = LineDisplay::new(ChannelMap::memory(&DEFAULT_PINS), KeepRunning::new())
            .with_delay(Duration::ZERO);
        let err = run_fetch(&config(3), &mut connector, &mut display).unwrap_err();

        assert!(matches!(err, FetchError::Send(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(total_lit(&display), 0);
        assert_eq!(display.channels().pattern(), 0);
    }

    #[test]
    fn chunks_reach_hook_in_order() {
        let (mut connector, mut display, _) =
            setup(vec![Some(b"HTTP/1.1".to_vec()), Some(b" 200 OK".to_vec())]);
        let mut seen = Vec::new();
        let summary = run_fetch_with(&config(2), &mut connector, &mut display, |chunk| {
            seen.push(chunk.to_vec());
        })
        .unwrap();

        assert_eq!(summary.reads, 2);
        assert_eq!(seen, vec![b"HTTP/1.1".to_vec(), b" 200 OK".to_vec()]);
    }

    #[test]
    fn peer_close_reads_render_nothing() {
        let (mut connector, mut display, _) = setup(vec![]);
        let summary = run_fetch(&config(3), &mut connector, &mut display).unwrap();
        assert_eq!(summary.reads, 3);
        assert_eq!(summary.bytes_received, 0);
        assert_eq!(total_lit(&display), 0);
    }

    #[test]
    fn cleared_flag_skips_reads() {
        let (mut connector, mut display, _) = setup(vec![Some(b"a".to_vec())]);
        display.keep_running().stop();
        let summary = run_fetch(&config(5), &mut connector, &mut display).unwrap();
        assert_eq!(summary.reads, 0);
        assert!(summary.interrupted);
    }

    #[test]
    fn connect_failure_surfaces() {
        let mut connector = Connector::new(Loopback, ScriptDialer(None));
        let mut display = LineDisplay::new(ChannelMap::memory(&DEFAULT_PINS), KeepRunning::new());
        let err = run_fetch(&config(1), &mut connector, &mut display).unwrap_err();
        assert!(matches!(
            err,
            FetchError::Connect(ConnectError::NoReachableAddress { attempted: 1, .. })
        ));
    }
}
