//! CGI bridge: show a form field posted by a web server on the LEDs.
//!
//! The server pipes the urlencoded POST body to stdin. Only the `+` space
//! encoding is undone; percent escapes pass through untouched.

/// Form field carrying the text to display.
pub const FIELD: &str = "in_text";

/// Content type line that opens the CGI reply.
pub const CONTENT_TYPE: &str = "Content-type:text/html\n\n";

/// Pulls `field`'s value out of a urlencoded body.
///
/// The first `field=` is removed and every `+` becomes a space. A body
/// without `field=` is returned with only the `+` replacement applied.
#[must_use]
pub fn extract_field(body: &str, field: &str) -> String {
    let key = format!("{field}=");
    let stripped = body.replacen(&key, "", 1);
    stripped.replace('+', " ")
}

/// HTML fragment confirming what was written.
#[must_use]
pub fn reply_body(message: &str) -> String {
    format!("<p>Wrote: \"{message}\" to GPIO.</p>")
}
