//! Push-button demo on BCM 12.
//!
//! The scanner runs across the whole array in both modes. In polled mode the
//! button is sampled once per sweep. In interrupt mode releases are counted
//! through a falling-edge callback, debounced to 100 ms, while the sweep
//! carries on untouched.
//!
//! With `--dry-run` the button is simulated: each line on stdin presses it.
//!
//! # Usage
//!
//! ```sh
//! larson-button [--interrupt] [--dry-run]
//! ```

use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use larson::button::{self, DEBOUNCE, Debouncer, Press};
use larson::error::{AppError, ArgsError};
use larson::gpio::{ChannelMap, DEFAULT_PINS, InputPin, MemoryInput, OutputPin};
use larson::scanner::{self, SCAN_DELAY, ScanConfig};
use larson::shutdown::KeepRunning;

/// How long a simulated press holds the line high.
const SIMULATED_PRESS: Duration = Duration::from_millis(20);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Watch {
    Polled,
    Interrupt,
}

struct Options {
    watch: Watch,
    dry_run: bool,
}

fn main() {
    larson::init_tracing();
    if let Err(e) = run() {
        eprintln!("larson-button: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;
    let keep_running = KeepRunning::with_signals().map_err(AppError::Signal)?;

    #[cfg(feature = "rpi")]
    if !options.dry_run {
        return run_gpio(options.watch, &keep_running);
    }
    if !options.dry_run {
        println!("Built without GPIO support, the button is simulated.");
    }

    let input = MemoryInput::new();
    drive_from_stdin(input.clone(), options.watch)?;
    let mut channels = ChannelMap::memory(&DEFAULT_PINS);
    match options.watch {
        Watch::Polled => {
            polled(channels, &input, &keep_running);
        }
        Watch::Interrupt => {
            let handle = button::watch_edges(
                input,
                Debouncer::new(DEBOUNCE),
                keep_running.clone(),
                report,
            )?;
            scan(&mut channels, &keep_running)?;
            if let Ok(debouncer) = handle.join() {
                println!("Button Pressed {} Times.", debouncer.presses());
            }
        }
    }
    Ok(())
}

#[cfg(feature = "rpi")]
fn run_gpio(watch: Watch, keep_running: &KeepRunning) -> Result<(), AppError> {
    use larson::error::GpioError;
    use larson::gpio::BUTTON_PIN;

    let gpio = rppal::gpio::Gpio::new().map_err(GpioError::from)?;
    let mut input = gpio.get(BUTTON_PIN).map_err(GpioError::from)?.into_input_pulldown();
    let mut channels = ChannelMap::open(&gpio, &DEFAULT_PINS)?;
    match watch {
        Watch::Polled => {
            polled(channels, &input, keep_running);
        }
        Watch::Interrupt => {
            button::on_falling_edge(&mut input, Debouncer::new(DEBOUNCE), report)?;
            scan(&mut channels, keep_running)?;
        }
    }
    Ok(())
}

fn polled<P: OutputPin, I: InputPin>(
    mut channels: ChannelMap<P>,
    button: &I,
    keep_running: &KeepRunning,
) {
    let held = button::scan_polled(&mut channels, button, SCAN_DELAY, keep_running, || {
        println!("Button is Pressed");
    });
    println!("Button seen held on {held} sweep(s).");
}

fn report(press: Press) {
    println!("Time Since Last Interrupt: {} ms", press.since_last.as_millis());
    println!("Button Pressed {} Times.", press.count);
}

/// Runs the full-array scanner while presses are counted elsewhere.
fn scan<P: OutputPin + Send>(
    channels: &mut ChannelMap<P>,
    keep_running: &KeepRunning,
) -> Result<(), AppError> {
    println!("Scanning, press Ctrl-C to stop.");
    scanner::run(channels, &ScanConfig::default(), keep_running)?;
    Ok(())
}

/// Simulates the button from stdin. In polled mode each line toggles the
/// button between held and released; in interrupt mode each line is one
/// short press.
fn drive_from_stdin(input: MemoryInput, watch: Watch) -> io::Result<()> {
    println!("Press Enter to operate the simulated button.");
    thread::Builder::new()
        .name("stdin-button".into())
        .spawn(move || {
            let mut held = false;
            for line in io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                match watch {
                    Watch::Polled => {
                        held = !held;
                        input.set(held);
                    }
                    Watch::Interrupt => {
                        input.set(true);
                        thread::sleep(SIMULATED_PRESS);
                        input.set(false);
                    }
                }
            }
        })?;
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options, ArgsError> {
    let mut options = Options {
        watch: Watch::Polled,
        dry_run: false,
    };

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--interrupt" | "-i" => options.watch = Watch::Interrupt,
            "--dry-run" | "-n" => options.dry_run = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(ArgsError::Unknown(other.to_owned())),
        }
    }
    Ok(options)
}

fn print_usage() {
    eprintln!(
        r#"larson-button - count presses of the button on BCM 12

USAGE:
    larson-button [OPTIONS]

OPTIONS:
    -i, --interrupt         Count releases on a falling-edge callback
                            instead of polling between scanner sweeps
    -n, --dry-run           Use in-memory LEDs and a simulated button;
                            each line on stdin operates the button
    -h, --help              Print this help message
"#
    );
}
