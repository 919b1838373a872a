//! The Larson scanner: a single lit LED bouncing along the array.
//!
//! In [`Mode::Split`] the array is cut into two halves, each bouncing on its
//! own thread. The lower half starts on its way down while the upper half
//! starts on its way up, so the two dots move in mirror image.

use std::io;
use std::thread;
use std::time::Duration;

use crate::gpio::{ChannelMap, LED_COUNT, OutputPin};
use crate::shutdown::KeepRunning;
use crate::trace::{debug, info};

/// Time each LED stays lit before the dot moves on.
pub const SCAN_DELAY: Duration = Duration::from_millis(40);

/// One move of the dot: light `on`, wait, then darken `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub on: usize,
    pub off: Option<usize>,
}

/// Steps of one sweep across `len` channels.
///
/// With `upward` the sweep runs low to high and back; without it only the
/// high-to-low leg is produced.
#[must_use]
pub fn sweep(len: usize, upward: bool) -> Vec<Step> {
    let mut steps = Vec::with_capacity(len * 2);
    if upward {
        steps.extend((0..len).map(|c| Step {
            on: c,
            off: c.checked_sub(1),
        }));
    }
    steps.extend((0..len).rev().map(|c| Step {
        on: c,
        off: (c + 1 < len).then_some(c + 1),
    }));
    steps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One dot across all twenty LEDs.
    #[default]
    Full,
    /// Two dots, one per half, on two threads.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub mode: Mode,
    pub delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Full,
            delay: SCAN_DELAY,
        }
    }
}

/// Completed sweeps, per scanned span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub sweeps: Vec<usize>,
}

/// Scans until `keep_running` clears, then forces the array off.
///
/// # Errors
///
/// Returns an error if a scanner thread cannot be spawned.
pub fn run<P>(
    channels: &mut ChannelMap<P>,
    config: &ScanConfig,
    keep_running: &KeepRunning,
) -> io::Result<ScanReport>
where
    P: OutputPin + Send,
{
    info!(mode = ?config.mode, "scanning");
    let sweeps = match config.mode {
        Mode::Full => vec![scan_span(channels.pins_mut(), true, config.delay, keep_running)],
        Mode::Split => {
            let (lower, upper) = channels.pins_mut().split_at_mut(LED_COUNT / 2);
            thread::scope(|s| -> io::Result<Vec<usize>> {
                let upper = thread::Builder::new()
                    .name("scan-upper".into())
                    .spawn_scoped(s, move || scan_span(upper, true, config.delay, keep_running))?;
                let lower = match thread::Builder::new()
                    .name("scan-lower".into())
                    .spawn_scoped(s, move || scan_span(lower, false, config.delay, keep_running))
                {
                    Ok(handle) => handle,
                    Err(e) => {
                        // The scope joins the upper thread on exit.
                        keep_running.stop();
                        return Err(e);
                    }
                };
                let lower = lower.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
                let upper = upper.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
                Ok(vec![lower, upper])
            })?
        }
    };
    channels.clear();
    debug!(?sweeps, "scanner stopped");
    Ok(ScanReport { sweeps })
}

fn scan_span<P: OutputPin>(
    pins: &mut [P],
    start_low: bool,
    delay: Duration,
    keep_running: &KeepRunning,
) -> usize {
    scan_with(pins, start_low, delay, keep_running, || {})
}

/// Bounces a dot across `pins` until the flag clears, calling
/// `before_sweep` at the start of every sweep. Returns completed sweeps.
///
/// The first sweep skips the upward leg unless `start_low` is set. The flag
/// is checked before every step, so a stop takes effect within one `delay`.
/// The last lit LED is left on.
pub fn scan_with<P, F>(
    pins: &mut [P],
    start_low: bool,
    delay: Duration,
    keep_running: &KeepRunning,
    mut before_sweep: F,
) -> usize
where
    P: OutputPin,
    F: FnMut(),
{
    let mut upward = start_low;
    let mut sweeps = 0;
    while keep_running.is_running() {
        before_sweep();
        for step in sweep(pins.len(), upward) {
            if !keep_running.is_running() {
                return sweeps;
            }
            pins[step.on].turn_on();
            thread::sleep(delay);
            if let Some(off) = step.off {
                pins[off].turn_off();
            }
        }
        upward = true;
        sweeps += 1;
    }
    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{DEFAULT_PINS, MemoryPin};

    fn step(on: usize, off: Option<usize>) -> Step {
        Step { on, off }
    }

    #[test]
    fn sweep_up_and_down() {
        assert_eq!(
            sweep(3, true),
            vec![
                step(0, None),
                step(1, Some(0)),
                step(2, Some(1)),
                step(2, None),
                step(1, Some(2)),
                step(0, Some(1)),
            ]
        );
    }

    #[test]
    fn sweep_down_only() {
        assert_eq!(sweep(2, false), vec![step(1, None), step(0, Some(1))]);
    }

    #[test]
    fn sweep_never_leaves_span() {
        for len in 1..=LED_COUNT {
            for s in sweep(len, true) {
                assert!(s.on < len);
                assert!(s.off.is_none_or(|off| off < len));
            }
        }
    }

    #[test]
    fn one_dot_lit_after_every_step() {
        let mut pins: Vec<MemoryPin> = (0..10).map(MemoryPin::new).collect();
        let steps = [sweep(10, false), sweep(10, true), sweep(10, true)].concat();
        for s in steps {
            pins[s.on].turn_on();
            if let Some(off) = s.off {
                pins[off].turn_off();
            }
            assert_eq!(pins.iter().filter(|p| p.is_on()).count(), 1);
        }
    }

    #[test]
    fn stopped_scanner_touches_nothing() {
        let mut map = ChannelMap::memory(&DEFAULT_PINS);
        let token = KeepRunning::new();
        token.stop();
        let report = run(&mut map, &ScanConfig::default(), &token).unwrap();
        assert_eq!(report.sweeps, vec![0]);
        assert!(map.pins().iter().all(|p| p.lit_count() == 0));
    }

    #[test]
    fn split_scan_covers_both_halves_and_clears() {
        let mut map = ChannelMap::memory(&DEFAULT_PINS);
        let token = KeepRunning::new();
        let stopper = {
            let token = token.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(200));
                token.stop();
            })
        };
        let config = ScanConfig {
            mode: Mode::Split,
            delay: Duration::from_millis(1),
        };
        let report = run(&mut map, &config, &token).unwrap();
        stopper.join().unwrap();

        assert_eq!(report.sweeps.len(), 2);
        assert!(map.pins().iter().all(|p| p.lit_count() > 0));
        assert_eq!(map.pattern(), 0);
    }
}
