//! CGI program: show a posted form field in binary on the LED array.
//!
//! A web server runs this with the urlencoded POST body on stdin. The
//! `in_text` field is acknowledged to the browser first, then displayed one
//! byte per 100 ms.

use std::io::{self, BufRead, Write};

use larson::cgi::{self, CONTENT_TYPE, FIELD};
use larson::display::LineDisplay;
use larson::error::AppError;
use larson::gpio::{ChannelMap, DEFAULT_PINS, OutputPin};
use larson::shutdown::KeepRunning;

fn main() {
    larson::init_tracing();
    if let Err(e) = run() {
        eprintln!("larson-post: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let keep_running = KeepRunning::with_signals().map_err(AppError::Signal)?;

    let mut body = String::new();
    io::stdin().lock().read_line(&mut body)?;
    let message = cgi::extract_field(body.trim_end_matches(['\r', '\n']), FIELD);

    let mut out = io::stdout().lock();
    write!(out, "{CONTENT_TYPE}")?;
    writeln!(out, "{}", cgi::reply_body(&message))?;
    out.flush()?;
    drop(out);

    #[cfg(feature = "rpi")]
    if std::env::var_os("LARSON_DRY_RUN").is_none() {
        let gpio = rppal::gpio::Gpio::new().map_err(larson::error::GpioError::from)?;
        return show(ChannelMap::open(&gpio, &DEFAULT_PINS)?, &message, keep_running);
    }
    show(ChannelMap::memory(&DEFAULT_PINS), &message, keep_running)
}

fn show<P: OutputPin>(
    channels: ChannelMap<P>,
    message: &str,
    keep_running: KeepRunning,
) -> Result<(), AppError> {
    let mut display = LineDisplay::new(channels, keep_running);
    display.write_text(message.as_bytes());
    display.clear();
    Ok(())
}
