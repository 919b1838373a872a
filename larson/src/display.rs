//! Byte-by-byte binary display on the LED array.
//!
//! Each byte lights the channels of its set bits, mirrored: bit 0 lands on
//! channel 8 and bit 7 on channel 1. Channels 0 and 9..20 are never lit by
//! this sink.

use std::thread;
use std::time::Duration;

use crate::gpio::{ChannelMap, OutputPin};
use crate::shutdown::KeepRunning;
use crate::trace::{debug, trace};

/// Pause after each rendered byte.
pub const BYTE_DELAY: Duration = Duration::from_millis(100);

/// Channel showing bit `bit` (0..=7) of a byte.
#[inline]
#[must_use]
pub const fn channel_for_bit(bit: u32) -> usize {
    8 - bit as usize
}

/// Recovers the byte shown by a channel pattern (bit `i` = channel `i` lit).
///
/// Channels outside 1..=8 are ignored.
#[must_use]
pub fn byte_from_pattern(pattern: u32) -> u8 {
    (0..8).fold(0u8, |byte, bit| {
        if pattern & (1 << channel_for_bit(bit)) != 0 {
            byte | (1 << bit)
        } else {
            byte
        }
    })
}

/// How a call to [`LineDisplay::write_text`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendered {
    /// Every byte was shown.
    Complete,
    /// The keep-running flag was cleared; `written` bytes were shown and the
    /// last one is still lit.
    Interrupted { written: usize },
}

/// Renders text on the channel map, one byte per [`BYTE_DELAY`].
pub struct LineDisplay<P> {
    channels: ChannelMap<P>,
    delay: Duration,
    keep_running: KeepRunning,
}

impl<P: OutputPin> LineDisplay<P> {
    #[must_use]
    pub fn new(channels: ChannelMap<P>, keep_running: KeepRunning) -> Self {
        Self {
            channels,
            delay: BYTE_DELAY,
            keep_running,
        }
    }

    /// Overrides the pause between bytes.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shows one byte: all channels off, then one channel per set bit.
    pub fn render_byte(&mut self, byte: u8) {
        self.channels.clear();
        for bit in 0..8 {
            if byte & (1 << bit) != 0 {
                self.channels.turn_on(channel_for_bit(bit));
            }
        }
    }

    /// Shows `text` byte by byte, blocking for about `len * delay`.
    ///
    /// The keep-running flag is checked before every byte. When it is
    /// cleared the call returns at once and leaves the last byte lit; the
    /// caller clears the array.
    pub fn write_text(&mut self, text: &[u8]) -> Rendered {
        self.write_text_with(text, |_, _| {})
    }

    /// Like [`write_text`](Self::write_text), calling `inspect` with the
    /// byte index and the channel map right after each byte is rendered.
    pub fn write_text_with<F>(&mut self, text: &[u8], mut inspect: F) -> Rendered
    where
        F: FnMut(usize, &ChannelMap<P>),
    {
        debug!(len = text.len(), text = %String::from_utf8_lossy(text), "writing string");
        for (index, &byte) in text.iter().enumerate() {
            if !self.keep_running.is_running() {
                debug!(written = index, "stop requested, abandoning string");
                return Rendered::Interrupted { written: index };
            }
            trace!(index, character = %char::from(byte), "rendering");
            self.render_byte(byte);
            inspect(index, &self.channels);
            thread::sleep(self.delay);
        }
        Rendered::Complete
    }

    /// Forces every channel off.
    pub fn clear(&mut self) {
        self.channels.clear();
    }

    #[must_use]
    pub const fn channels(&self) -> &ChannelMap<P> {
        &self.channels
    }

    #[must_use]
    pub fn keep_running(&self) -> &KeepRunning {
        &self.keep_running
    }
}
