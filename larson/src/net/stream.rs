//! The live connection handle of the fetch client.
//!
//! Provides a thin wrapper around a byte stream (normally
//! [`std::net::TcpStream`]) with the bounded-read and send semantics the
//! display loop expects.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::trace::{debug, warn};

use super::Candidate;

/// Size of the receive buffer. One byte stays reserved, so a single read
/// returns at most `RECV_BUFFER_LEN - 1` bytes.
pub const RECV_BUFFER_LEN: usize = 150;

/// A bidirectional byte stream a [`Connection`] can own.
pub trait Transport: Read + Write {
    /// Shuts both directions down before the stream is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer already tore the connection down.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// An open stream to one remote candidate.
///
/// Exactly one exists per fetch. [`Connection::close`] consumes the handle,
/// so it can only be closed once; dropping it on an error path closes the
/// underlying descriptor as well.
pub struct Connection<S = TcpStream> {
    stream: S,
    peer: Candidate,
}

impl<S: Transport> Connection<S> {
    #[must_use]
    pub const fn new(stream: S, peer: Candidate) -> Self {
        Self { stream, peer }
    }

    /// The candidate this connection reached.
    #[must_use]
    pub const fn peer(&self) -> Candidate {
        self.peer
    }

    /// Sends `data` in full.
    ///
    /// Returns the number of bytes sent.
    ///
    /// # Errors
    ///
    /// Returns an error on any write failure.
    pub fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        debug!(bytes = data.len(), "sent bytes to server");
        Ok(data.len())
    }

    /// Performs one read into `buf`, never filling its last byte.
    ///
    /// Returns the received bytes; an empty slice means the peer closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn read_chunk<'b>(&mut self, buf: &'b mut [u8; RECV_BUFFER_LEN]) -> io::Result<&'b [u8]> {
        let n = self.stream.read(&mut buf[..RECV_BUFFER_LEN - 1])?;
        debug!(bytes = n, "received bytes from server");
        Ok(&buf[..n])
    }

    /// Closes the connection.
    pub fn close(mut self) {
        if let Err(_e) = self.stream.shutdown() {
            warn!(error = %_e, "shutdown on close failed");
        }
        debug!(peer = %self.peer, "connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::net::TcpListener;

    /// In-memory stream: reads from a script, records writes.
    struct Scripted {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for Scripted {}

    fn scripted(input: &[u8]) -> Connection<Scripted> {
        Connection::new(
            Scripted {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            },
            Candidate::localhost(80),
        )
    }

    #[test]
    fn read_chunk_leaves_last_byte_free() {
        let mut conn = scripted(&[b'x'; 400]);
        let mut buf = [0u8; RECV_BUFFER_LEN];
        let chunk = conn.read_chunk(&mut buf).unwrap();
        assert_eq!(chunk.len(), RECV_BUFFER_LEN - 1);
        assert_eq!(buf[RECV_BUFFER_LEN - 1], 0);
    }

    #[test]
    fn read_chunk_empty_at_eof() {
        let mut conn = scripted(b"");
        let mut buf = [0u8; RECV_BUFFER_LEN];
        assert!(conn.read_chunk(&mut buf).unwrap().is_empty());
    }

    #[test]
    fn send_writes_everything() {
        let mut conn = scripted(b"");
        assert_eq!(conn.send(b"GET / HTTP/1.1\r\n").unwrap(), 16);
        assert_eq!(conn.stream.output, b"GET / HTTP/1.1\r\n");
    }

    #[test]
    fn tcp_connection_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            let mut got = [0u8; 4];
            peer.read_exact(&mut got).unwrap();
            peer.write_all(b"pong").unwrap();
            got
        });

        let stream = TcpStream::connect(addr).unwrap();
        let mut conn = Connection::new(stream, Candidate::from(addr));
        conn.send(b"ping").unwrap();
        let mut buf = [0u8; RECV_BUFFER_LEN];
        let mut received = Vec::new();
        while received.len() < 4 {
            let chunk = conn.read_chunk(&mut buf).unwrap();
            assert!(!chunk.is_empty());
            received.extend_from_slice(chunk);
        }
        assert_eq!(received, b"pong");
        conn.close();
        assert_eq!(&server.join().unwrap(), b"ping");
    }
}
