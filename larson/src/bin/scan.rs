//! Larson scanner demo: a lit LED bouncing along the array.
//!
//! # Usage
//!
//! ```sh
//! larson-scan [--split] [--delay-ms 40] [--dry-run]
//! ```
//!
//! Runs until `SIGINT` or `SIGTERM`, then turns every LED off.

use std::time::Duration;

use larson::error::{AppError, ArgsError};
use larson::gpio::{ChannelMap, DEFAULT_PINS, OutputPin};
use larson::scanner::{self, Mode, ScanConfig};
use larson::shutdown::KeepRunning;

struct Options {
    scan: ScanConfig,
    dry_run: bool,
}

fn main() {
    larson::init_tracing();
    if let Err(e) = run() {
        eprintln!("larson-scan: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;
    let keep_running = KeepRunning::with_signals().map_err(AppError::Signal)?;

    #[cfg(feature = "rpi")]
    if !options.dry_run {
        let gpio = rppal::gpio::Gpio::new().map_err(larson::error::GpioError::from)?;
        return scan(ChannelMap::open(&gpio, &DEFAULT_PINS)?, &options.scan, &keep_running);
    }
    if !options.dry_run {
        println!("Built without GPIO support, using in-memory LEDs.");
    }
    scan(ChannelMap::memory(&DEFAULT_PINS), &options.scan, &keep_running)
}

fn scan<P: OutputPin + Send>(
    mut channels: ChannelMap<P>,
    config: &ScanConfig,
    keep_running: &KeepRunning,
) -> Result<(), AppError> {
    println!("Scanning, press Ctrl-C to stop.");
    let report = scanner::run(&mut channels, config, keep_running)?;
    println!("Stopped after {:?} sweep(s).", report.sweeps);
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options, ArgsError> {
    let mut options = Options {
        scan: ScanConfig::default(),
        dry_run: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--split" | "-s" => options.scan.mode = Mode::Split,
            "--delay-ms" | "-d" => {
                i += 1;
                let value = args.get(i).ok_or(ArgsError::MissingValue("--delay-ms"))?;
                let ms: u64 = value.parse().map_err(|_| ArgsError::InvalidValue {
                    flag: "--delay-ms",
                    value: value.clone(),
                })?;
                options.scan.delay = Duration::from_millis(ms);
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
        r#"larson-scan - bounce a lit LED along the array

USAGE:
    larson-scan [OPTIONS]

OPTIONS:
    -s, --split             Two dots, one per half of the array
    -d, --delay-ms <MS>     Time each LED stays lit (default: 40)
    -n, --dry-run           Use in-memory LEDs instead of GPIO
    -h, --help              Print this help message
"#
    );
}
