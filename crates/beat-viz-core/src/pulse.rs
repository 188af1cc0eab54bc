//! Beat pulse decay for the circle renderer.
//!
//! A beat kicks the circle radius up by `magnitude` pixels, which then drains
//! linearly in wall-clock milliseconds. Wall clock, not playback position,
//! keeps the snap identical at any playback rate.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseConfig {
    /// Radius boost right after a beat, in pixels
    pub magnitude: f32,
    /// Boost lost per wall-clock millisecond
    pub decay_per_ms: f32,
    /// Circle radius with no bass and no pulse
    pub base: f32,
    /// Bass average is divided by this before adding to the base radius
    pub bass_divisor: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            magnitude: 30.0,
            decay_per_ms: 0.15,
            base: 40.0,
            bass_divisor: 2.5,
        }
    }
}

/// Per-track pulse state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PulseState {
    /// Wall-clock milliseconds of the last beat
    pub last_pulse_ms: Option<f64>,
}

impl PulseState {
    pub fn reset(&mut self) {
        self.last_pulse_ms = None;
    }
}

impl PulseConfig {
    pub fn base_radius(&self, bass: f32) -> f32 {
        self.base + bass / self.bass_divisor
    }

    /// Remaining boost at `now_ms`, without touching the state
    pub fn boost(&self, now_ms: f64, state: &PulseState) -> f32 {
        match state.last_pulse_ms {
            Some(last) => {
                let elapsed = (now_ms - last) as f32;
                (self.magnitude - elapsed * self.decay_per_ms).max(0.0)
            }
            None => 0.0,
        }
    }

    /// Radius of the beat circle for this frame.
    ///
    /// Records `now_ms` as the pulse start when `is_beat` is set.
    pub fn compute_radius(
        &self,
        base_radius: f32,
        is_beat: bool,
        now_ms: f64,
        state: &mut PulseState,
    ) -> f32 {
        if is_beat {
            state.last_pulse_ms = Some(now_ms);
        }
        base_radius + self.boost(now_ms, state)
    }
}
