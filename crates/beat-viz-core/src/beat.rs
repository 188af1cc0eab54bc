//! Beat detection on the bass band.
//!
//! A rising-edge detector with a refractory gate: a beat fires when the bass
//! average crosses the threshold from below, unless the last beat is too
//! recent. Time is the playback position, so detection follows the music under
//! any playback rate. There is no smoothing; this drives a visual pulse, not a
//! tempo estimate.

/// Sensitivity settings for beat detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatConfig {
    /// Bass average (0-255 scale) that must be crossed from below
    pub threshold: f32,
    /// Minimum playback seconds between two beats
    pub min_interval: f64,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            threshold: 120.0,
            min_interval: 0.2,
        }
    }
}

/// Per-track detector state. `Default` is the fresh-track value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeatState {
    /// Bass average seen on the previous call
    pub last_bass: f32,
    /// Playback position of the last beat, `None` before the first one
    pub last_beat_time: Option<f64>,
    /// Whether the most recent call fired
    pub detected: bool,
}

impl BeatState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BeatDetector {
    config: BeatConfig,
}

impl BeatDetector {
    pub fn new(config: BeatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BeatConfig {
        &self.config
    }

    /// Feeds one bass sample taken at playback position `now` (seconds).
    ///
    /// Returns `true` if a beat fired on this call.
    pub fn detect(&self, bass: f32, now: f64, state: &mut BeatState) -> bool {
        let rising = bass > self.config.threshold && state.last_bass <= self.config.threshold;
        let rested = match state.last_beat_time {
            Some(last) => now - last > self.config.min_interval,
            None => true,
        };

        state.detected = rising && rested;
        if state.detected {
            state.last_beat_time = Some(now);
        }
        state.last_bass = bass;
        state.detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(detector: &BeatDetector, samples: &[(f32, f64)]) -> Vec<bool> {
        let mut state = BeatState::default();
        samples
            .iter()
            .map(|&(bass, t)| detector.detect(bass, t, &mut state))
            .collect()
    }

    #[test]
    fn fires_on_rising_edges_outside_refractory() {
        let detector = BeatDetector::default();
        let fired = run(&detector, &[(0.0, 0.0), (130.0, 0.05), (50.0, 0.1), (135.0, 0.3)]);
        assert_eq!(fired, vec![false, true, false, true]);
    }

    #[test]
    fn second_spike_inside_refractory_is_ignored() {
        let detector = BeatDetector::default();
        let fired = run(&detector, &[(0.0, 0.0), (130.0, 0.05), (50.0, 0.1), (135.0, 0.15)]);
        assert_eq!(fired, vec![false, true, false, false]);
    }

    #[test]
    fn sustained_bass_fires_once() {
        let detector = BeatDetector::default();
        let fired = run(&detector, &[(150.0, 0.0), (160.0, 1.0), (170.0, 2.0)]);
        assert_eq!(fired, vec![true, false, false]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let detector = BeatDetector::default();
        let fired = run(&detector, &[(120.0, 0.0), (121.0, 1.0)]);
        // 120 is not above the threshold but counts as "below" for the next edge
        assert_eq!(fired, vec![false, true]);
    }

    #[test]
    fn suppressed_spike_still_updates_last_bass() {
        let detector = BeatDetector::default();
        let mut state = BeatState::default();
        assert!(detector.detect(130.0, 1.0, &mut state));
        assert!(!detector.detect(0.0, 1.05, &mut state));
        assert!(!detector.detect(140.0, 1.1, &mut state));
        assert_eq!(state.last_bass, 140.0);
        // still above threshold, so no new edge once the window has passed
        assert!(!detector.detect(140.0, 2.0, &mut state));
        assert_eq!(state.last_beat_time, Some(1.0));
    }

    #[test]
    fn backward_seek_holds_beats_until_past_the_last_one() {
        let detector = BeatDetector::default();
        let fired = run(
            &detector,
            &[
                (0.0, 99.9),
                (130.0, 100.0),
                // seek back to 10s
                (0.0, 10.0),
                (130.0, 10.5),
                (0.0, 11.0),
                (130.0, 50.0),
                (0.0, 51.0),
                (130.0, 100.31),
            ],
        );
        assert_eq!(fired, vec![false, true, false, false, false, false, false, true]);
    }

    #[test]
    fn custom_config() {
        let detector = BeatDetector::new(BeatConfig {
            threshold: 50.0,
            min_interval: 1.0,
        });
        let fired = run(
            &detector,
            &[(60.0, 0.0), (10.0, 0.5), (60.0, 0.9), (10.0, 1.0), (60.0, 1.5)],
        );
        assert_eq!(fired, vec![true, false, false, false, true]);
    }

    #[test]
    fn reset_restores_fresh_state() {
        let detector = BeatDetector::default();
        let mut state = BeatState::default();
        detector.detect(200.0, 3.0, &mut state);
        state.reset();
        assert_eq!(state, BeatState::default());
        assert!(detector.detect(200.0, 0.01, &mut state));
    }
}
