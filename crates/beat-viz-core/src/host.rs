//! Capabilities the visualizer borrows from its host.
//!
//! Playback, spectrum analysis, frame scheduling and the wall clock are all
//! provided from outside; the native app wires real devices, tests wire fakes.

use std::time::Instant;

use crate::error::Result;

/// Transport notifications, drained once per display refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Played,
    Paused,
    Seeked,
    Ended,
}

/// Media transport of the loaded track
pub trait MediaPlayback {
    /// Playback position in seconds
    fn current_position(&self) -> f64;
    /// Track length in seconds, NaN when unknown
    fn duration(&self) -> f64;
    fn is_paused(&self) -> bool;
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    /// Next pending transport notification, if any
    fn poll_event(&mut self) -> Option<PlaybackEvent>;
    /// Stops output and frees the device. Safe to call more than once.
    fn release(&mut self);
}

/// Frequency-domain view of what is currently playing
pub trait SpectrumSource {
    fn sample_rate(&self) -> f32;
    fn bin_count(&self) -> usize;
    /// Writes one byte magnitude (0-255) per bin into `buffer`.
    ///
    /// Fails while the analysis graph is suspended or disconnected.
    fn fill_latest_magnitudes(&mut self, buffer: &mut [u8]) -> Result<()>;
    /// Connects or un-suspends the analysis graph
    fn resume(&mut self);
    /// Disconnects the analysis graph. Safe to call more than once.
    fn release(&mut self);
}

/// Opaque id of a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Display-synchronized callback scheduling
pub trait FrameScheduler {
    /// Asks for a callback on the next display refresh
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraws a request. Unknown or already fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// The callback to run on this refresh, if one was requested
    fn take_due(&mut self) -> Option<FrameHandle>;
}

/// Single-slot scheduler: a new request replaces whatever was pending.
#[derive(Debug, Default)]
pub struct RefreshScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}

impl FrameScheduler for RefreshScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

/// Monotonic milliseconds, used for visual decay
pub trait WallClock {
    fn now_ms(&self) -> f64;
}

/// `Instant`-based clock counting from its creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_scheduler_fires_once() {
        let mut scheduler = RefreshScheduler::new();
        let handle = scheduler.request_frame();
        assert_eq!(scheduler.take_due(), Some(handle));
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn refresh_scheduler_cancel() {
        let mut scheduler = RefreshScheduler::new();
        let first = scheduler.request_frame();
        scheduler.cancel_frame(first);
        assert_eq!(scheduler.pending(), None);

        let second = scheduler.request_frame();
        assert_ne!(first, second);
        // cancelling a stale handle leaves the live one alone
        scheduler.cancel_frame(first);
        assert_eq!(scheduler.pending(), Some(second));
    }

    #[test]
    fn monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
