//! Push-button demo support: debounced press counting.
//!
//! The button pulls its line high while held (pull-down otherwise), so a
//! release shows up as a falling edge. Contacts bounce, so edges closer
//! together than [`DEBOUNCE`] are not counted; every edge still restarts the
//! window.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use minstant::Instant;

use crate::gpio::{ChannelMap, InputPin, OutputPin};
use crate::scanner;
use crate::shutdown::KeepRunning;
use crate::trace::{debug, info};

/// Minimum spacing between counted edges.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// How often the software edge watcher samples the line.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

/// A counted press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Press {
    /// Presses counted so far, this one included.
    pub count: u32,
    /// Time since the previous edge, counted or not.
    pub since_last: Duration,
}

/// Counts edges that are at least one window apart.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_edge: Instant,
    presses: u32,
}

impl Debouncer {
    /// Starts the window now, so an edge right after startup is ignored.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self::starting_at(window, Instant::now())
    }

    #[must_use]
    pub const fn starting_at(window: Duration, start: Instant) -> Self {
        Self {
            window,
            last_edge: start,
            presses: 0,
        }
    }

    /// Records an edge seen now.
    pub fn edge(&mut self) -> Option<Press> {
        self.edge_at(Instant::now())
    }

    /// Records an edge seen at `now`; returns the press if it counts.
    pub fn edge_at(&mut self, now: Instant) -> Option<Press> {
        let since_last = now
            .checked_duration_since(self.last_edge)
            .unwrap_or_default();
        self.last_edge = now;
        if since_last > self.window {
            self.presses += 1;
            Some(Press {
                count: self.presses,
                since_last,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn presses(&self) -> u32 {
        self.presses
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE)
    }
}

/// Detects high-to-low transitions in a stream of samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallingEdge {
    was_high: bool,
}

impl FallingEdge {
    /// Feeds one sample; true when it completes a falling edge.
    pub fn update(&mut self, high: bool) -> bool {
        let fell = self.was_high && !high;
        self.was_high = high;
        fell
    }
}

/// Runs the scanner across the whole array, sampling `button` before every
/// sweep and calling `on_pressed` whenever it reads high.
///
/// Returns the number of sweeps that saw the button held. The array is
/// forced off on return.
pub fn scan_polled<P, I, F>(
    channels: &mut ChannelMap<P>,
    button: &I,
    delay: Duration,
    keep_running: &KeepRunning,
    mut on_pressed: F,
) -> usize
where
    P: OutputPin,
    I: InputPin,
    F: FnMut(),
{
    let mut held = 0;
    scanner::scan_with(channels.pins_mut(), true, delay, keep_running, || {
        if button.is_high() {
            held += 1;
            on_pressed();
        }
    });
    channels.clear();
    debug!(held, "polled scan stopped");
    held
}

/// Samples `button` on a background thread, feeding falling edges through
/// `debouncer` and reporting counted presses to `on_press`.
///
/// The thread exits once `keep_running` clears and returns the debouncer.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn watch_edges<I, F>(
    button: I,
    mut debouncer: Debouncer,
    keep_running: KeepRunning,
    mut on_press: F,
) -> io::Result<JoinHandle<Debouncer>>
where
    I: InputPin + Send + 'static,
    F: FnMut(Press) + Send + 'static,
{
    thread::Builder::new()
        .name("button-watch".into())
        .spawn(move || {
            let mut edge = FallingEdge::default();
            while keep_running.is_running() {
                if edge.update(button.is_high()) {
                    if let Some(press) = debouncer.edge() {
                        info!(count = press.count, since_last = ?press.since_last, "button pressed");
                        on_press(press);
                    }
                }
                thread::sleep(SAMPLE_INTERVAL);
            }
            debouncer
        })
}

/// Falling-edge interrupt through the kernel's GPIO event interface.
#[cfg(feature = "rpi")]
pub fn on_falling_edge<F>(
    pin: &mut rppal::gpio::InputPin,
    mut debouncer: Debouncer,
    mut on_press: F,
) -> Result<(), crate::error::GpioError>
where
    F: FnMut(Press) + Send + 'static,
{
    pin.set_async_interrupt(rppal::gpio::Trigger::FallingEdge, None, move |_event| {
        if let Some(press) = debouncer.edge() {
            on_press(press);
        }
    })?;
    Ok(())
}
