//! Fetch a web page and show it in binary on the LED array.
//!
//! Asks for a host and a number of reads on stdin, connects on port 80,
//! sends `GET /index.html` and renders every received byte.
//!
//! # Usage
//!
//! ```sh
//! larson-fetch [--port 8080] [--delay-ms 100] [--dry-run]
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: stop after the current byte, then clean up

use std::io::{self, BufRead};
use std::time::Duration;

use larson::display::{BYTE_DELAY, LineDisplay};
use larson::error::{AppError, ArgsError};
use larson::fetch::{FetchConfig, run_fetch_with};
use larson::gpio::{ChannelMap, DEFAULT_PINS, OutputPin};
use larson::http::{self, HTTP_PORT};
use larson::net::Connector;
use larson::shutdown::KeepRunning;

/// Command-line options; host and read count come from stdin.
struct Options {
    port: u16,
    delay: Duration,
    dry_run: bool,
}

fn main() {
    larson::init_tracing();
    if let Err(e) = run() {
        eprintln!("larson-fetch: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;
    let keep_running = KeepRunning::with_signals().map_err(AppError::Signal)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    println!("What address should I connect to?");
    let host = read_host(&mut input)?;
    println!("How many lines should I read?");
    let lines = read_count(&mut input)?;

    let config = FetchConfig {
        host,
        port: options.port,
        lines,
    };

    #[cfg(feature = "rpi")]
    if !options.dry_run {
        let gpio = rppal::gpio::Gpio::new().map_err(larson::error::GpioError::from)?;
        let channels = ChannelMap::open(&gpio, &DEFAULT_PINS)?;
        return fetch_with(channels, &config, &options, keep_running);
    }
    if !options.dry_run {
        println!("Built without GPIO support, using in-memory LEDs.");
    }
    fetch_with(ChannelMap::memory(&DEFAULT_PINS), &config, &options, keep_running)
}

fn fetch_with<P: OutputPin>(
    channels: ChannelMap<P>,
    config: &FetchConfig,
    options: &Options,
    keep_running: KeepRunning,
) -> Result<(), AppError> {
    println!("Clearing GPIO pins.");
    let mut display = LineDisplay::new(channels, keep_running).with_delay(options.delay);

    println!("Connecting socket to {} on port {}.", config.host, config.port);
    println!("Sending HTTP request: {}", http::index_request(&config.host).trim_end());
    let mut connector = Connector::default();
    let summary = run_fetch_with(config, &mut connector, &mut display, |chunk| {
        println!("Received: {}.", String::from_utf8_lossy(chunk));
    })?;

    println!(
        "Read {} time(s), {} byte(s) received{}.",
        summary.reads,
        summary.bytes_received,
        if summary.interrupted { ", interrupted" } else { "" }
    );
    Ok(())
}

fn read_host(input: &mut impl BufRead) -> Result<String, AppError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let host = line.trim().to_owned();
    if host.is_empty() {
        return Err(ArgsError::MissingValue("address").into());
    }
    Ok(host)
}

/// Reads the next whitespace-separated token as a count.
fn read_count(input: &mut impl BufRead) -> Result<usize, AppError> {
    let mut line = String::new();
    while line.trim().is_empty() {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(ArgsError::MissingValue("line count").into());
        }
    }
    let token = line.split_whitespace().next().unwrap_or_default();
    token.parse().map_err(|_| {
        ArgsError::InvalidValue {
            flag: "line count",
            value: token.to_owned(),
        }
        .into()
    })
}

fn parse_args(args: &[String]) -> Result<Options, ArgsError> {
    let mut options = Options {
        port: HTTP_PORT,
        delay: BYTE_DELAY,
        dry_run: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                i += 1;
                let value = args.get(i).ok_or(ArgsError::MissingValue("--port"))?;
                options.port = value.parse().map_err(|_| ArgsError::InvalidValue {
                    flag: "--port",
                    value: value.clone(),
                })?;
            }
            "--delay-ms" | "-d" => {
                i += 1;
                let value = args.get(i).ok_or(ArgsError::MissingValue("--delay-ms"))?;
                let ms: u64 = value.parse().map_err(|_| ArgsError::InvalidValue {
                    flag: "--delay-ms",
                    value: value.clone(),
                })?;
                options.delay = Duration::from_millis(ms);
            }
            "--dry-run" | "-n" => options.dry_run = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            arg => return Err(ArgsError::Unknown(arg.to_owned())),
        }
        i += 1;
    }
    Ok(options)
}

fn print_usage() {
    eprintln!(
        r#"larson-fetch - show a web page in binary on the LED array

USAGE:
    larson-fetch [OPTIONS]

The host and the number of reads are asked for on stdin.

OPTIONS:
    -p, --port <PORT>       Server port (default: 80)
    -d, --delay-ms <MS>     Pause per displayed byte (default: 100)
    -n, --dry-run           Use in-memory LEDs instead of GPIO
    -h, --help              Print this help message

SIGNALS:
    SIGTERM, SIGINT         Stop after the current byte and clear the LEDs
"#
    );
}
