//! The one HTTP request the fetch client sends.
//!
//! No response parsing happens anywhere: whatever the server returns,
//! headers included, is display payload.

/// Standard HTTP port.
pub const HTTP_PORT: u16 = 80;

/// Path requested from the server.
pub const INDEX_PATH: &str = "/index.html";

/// Extra blank line sent as a second write after the request.
pub const TRAILER: &str = "\r\n";

/// Builds the GET request for `host`'s index page.
///
/// The request line carries the absolute URL and the `host` header repeats
/// the name; a blank line terminates the header block.
#[must_use]
pub fn index_request(host: &str) -> String {
    format!("GET http://{host}{INDEX_PATH} HTTP/1.1\r\nhost:{host}\r\n\r\n")
}
