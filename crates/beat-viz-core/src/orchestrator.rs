//! Frame orchestration.
//!
//! `Visualizer` owns everything that lives for one track (the session) and
//! drives the per-frame pipeline: magnitudes -> band averages -> beat ->
//! pulse -> display list. The animation loop is a chain of single frame
//! requests; at most one request is outstanding at any time, and every
//! path that stops the loop cancels it before returning.

use tracing::{debug, info, trace, warn};

use crate::bands::{BandAverages, BandLayout};
use crate::beat::{BeatConfig, BeatDetector, BeatState};
use crate::draw::{DisplayList, DrawCommand};
use crate::error::Result;
use crate::host::{
    FrameHandle, FrameScheduler, MediaPlayback, PlaybackEvent, SpectrumSource, WallClock,
};
use crate::pulse::{PulseConfig, PulseState};
use crate::rect::Rect;
use crate::render::{self, FlashThresholds};

/// Playback speeds cycled by `cycle_speed`
pub const DEFAULT_SPEEDS: [f64; 4] = [1.0, 1.5, 2.0, 0.5];

#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerConfig {
    pub beat: BeatConfig,
    pub pulse: PulseConfig,
    pub flash: FlashThresholds,
    pub speeds: Vec<f64>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            beat: BeatConfig::default(),
            pulse: PulseConfig::default(),
            flash: FlashThresholds::default(),
            speeds: DEFAULT_SPEEDS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// A loaded track: its transport plus the analysis tapped off it
pub struct Track<P, A> {
    pub label: String,
    pub playback: P,
    pub analysis: A,
}

impl<P, A> Track<P, A> {
    pub fn new(label: impl Into<String>, playback: P, analysis: A) -> Self {
        Self {
            label: label.into(),
            playback,
            analysis,
        }
    }
}

/// Per-track state, dropped as a whole on track change
struct Session<P, A> {
    track: Track<P, A>,
    magnitudes: Vec<u8>,
    layout: Option<BandLayout>,
    beat: BeatState,
    pulse: PulseState,
}

impl<P: MediaPlayback, A: SpectrumSource> Session<P, A> {
    fn new(track: Track<P, A>) -> Self {
        Self {
            track,
            magnitudes: Vec::new(),
            layout: None,
            beat: BeatState::default(),
            pulse: PulseState::default(),
        }
    }

    /// Pulls one magnitude sample and averages it per band
    fn sample(&mut self) -> Result<BandAverages> {
        let sample_rate = self.track.analysis.sample_rate();
        let bin_count = self.track.analysis.bin_count();

        let stale = self
            .layout
            .as_ref()
            .map_or(true, |layout| !layout.matches(sample_rate, bin_count));
        if stale {
            debug!(sample_rate, bin_count, "rebuilding band layout");
            self.layout = Some(BandLayout::new(sample_rate, bin_count));
            self.magnitudes = vec![0; bin_count];
        }

        self.track.analysis.fill_latest_magnitudes(&mut self.magnitudes)?;
        Ok(self
            .layout
            .as_ref()
            .map(|layout| layout.averages(&self.magnitudes))
            .unwrap_or_default())
    }

    fn release(&mut self) {
        self.track.playback.pause();
        self.track.playback.release();
        self.track.analysis.release();
    }
}

pub struct Visualizer<P, A, S, C> {
    config: VisualizerConfig,
    detector: BeatDetector,
    scheduler: S,
    clock: C,
    canvas: Rect,
    session: Option<Session<P, A>>,
    pending: Option<FrameHandle>,
    state: LoopState,
    speed_index: usize,
    averages: BandAverages,
    display: DisplayList,
}

impl<P, A, S, C> Visualizer<P, A, S, C>
where
    P: MediaPlayback,
    A: SpectrumSource,
    S: FrameScheduler,
    C: WallClock,
{
    pub fn new(mut config: VisualizerConfig, scheduler: S, clock: C, canvas: Rect) -> Self {
        config.speeds.retain(|s| s.is_finite() && *s > 0.0);
        if config.speeds.is_empty() {
            warn!("no usable playback speeds configured, using 1x");
            config.speeds.push(1.0);
        }

        let mut visualizer = Self {
            detector: BeatDetector::new(config.beat),
            config,
            scheduler,
            clock,
            canvas,
            session: None,
            pending: None,
            state: LoopState::Idle,
            speed_index: 0,
            averages: BandAverages::default(),
            display: DisplayList::new(),
        };
        visualizer.reset_display();
        visualizer
    }

    /// Replaces the current track and starts playing the new one.
    pub fn start(&mut self, track: Track<P, A>) {
        self.teardown();
        info!(track = %track.label, "starting track");

        let mut session = Session::new(track);
        session.track.playback.set_playback_rate(self.current_speed());
        let played = session.track.playback.play();
        self.session = Some(session);

        match played {
            Ok(()) => self.on_played(),
            Err(err) => warn!(%err, "autoplay failed, waiting for play"),
        }
    }

    /// Stops the loop and releases the current track, if any.
    pub fn stop(&mut self) {
        if self.session.is_some() {
            info!("stopping visualizer");
        }
        self.teardown();
    }

    /// Host hook for one display refresh.
    ///
    /// Applies pending transport notifications, then runs the frame that was
    /// requested for this refresh.
    pub fn refresh(&mut self) {
        while let Some(event) = self
            .session
            .as_mut()
            .and_then(|session| session.track.playback.poll_event())
        {
            self.handle_event(event);
        }

        if let Some(handle) = self.scheduler.take_due() {
            self.run_frame(handle);
        }
    }

    pub fn handle_event(&mut self, event: PlaybackEvent) {
        trace!(?event, "playback event");
        match event {
            PlaybackEvent::Played => self.on_played(),
            PlaybackEvent::Paused | PlaybackEvent::Ended => self.cancel_loop(),
            PlaybackEvent::Seeked => {
                if let Some(session) = self.session.as_mut() {
                    session.track.analysis.resume();
                    if self.pending.is_none() && !session.track.playback.is_paused() {
                        self.start_loop();
                    }
                }
            }
        }
    }

    /// The scheduled frame callback. Handles that are no longer the pending
    /// request are ignored.
    pub fn run_frame(&mut self, handle: FrameHandle) {
        if self.pending != Some(handle) {
            trace!(?handle, "ignoring stale frame");
            return;
        }
        self.pending = None;

        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                self.state = LoopState::Idle;
                return;
            }
        };
        if session.track.playback.is_paused() {
            debug!("playback paused, frame loop ends");
            self.state = LoopState::Idle;
            return;
        }

        self.pending = Some(self.scheduler.request_frame());

        let averages = match session.sample() {
            Ok(averages) => averages,
            Err(err) => {
                trace!(%err, "skipping frame");
                return;
            }
        };

        let position = session.track.playback.current_position();
        let duration = session.track.playback.duration();
        let is_beat = self.detector.detect(averages.bass, position, &mut session.beat);
        if is_beat {
            trace!(position, bass = averages.bass, "beat");
        }

        let pulse = &self.config.pulse;
        let radius = pulse.compute_radius(
            pulse.base_radius(averages.bass),
            is_beat,
            self.clock.now_ms(),
            &mut session.pulse,
        );

        let canvas = self.canvas;
        let display = &mut self.display;
        display.clear();
        display.push(DrawCommand::Clear);
        render::draw_frequency_line(display, canvas, &session.magnitudes);
        render::draw_bars(display, canvas, &averages);
        render::draw_beat_circle(display, render::circle_center(canvas), radius);
        if self.config.flash.triggered(&averages) {
            render::draw_flash(display, canvas);
        }
        render::draw_time_left(display, canvas, duration, position);

        self.averages = averages;
    }

    pub fn toggle_playback(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let playback = &mut session.track.playback;
            if playback.is_paused() {
                if let Err(err) = playback.play() {
                    warn!(%err, "play failed");
                }
            } else {
                playback.pause();
            }
        }
    }

    /// Moves to the next configured speed and applies it to the current track.
    pub fn cycle_speed(&mut self) -> f64 {
        self.speed_index = (self.speed_index + 1) % self.config.speeds.len();
        let speed = self.current_speed();
        if let Some(session) = self.session.as_mut() {
            session.track.playback.set_playback_rate(speed);
        }
        debug!(speed, "playback speed");
        speed
    }

    /// Relative seek, clamped to the track.
    pub fn seek_by(&mut self, seconds: f64) {
        if let Some(session) = self.session.as_mut() {
            let playback = &mut session.track.playback;
            let duration = playback.duration();
            let mut target = (playback.current_position() + seconds).max(0.0);
            if duration.is_finite() {
                target = target.min(duration);
            }
            playback.seek(target);
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.canvas = Rect::from_w_h(width, height);
    }

    pub fn current_speed(&self) -> f64 {
        self.config.speeds[self.speed_index]
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.display
    }

    pub fn averages(&self) -> &BandAverages {
        &self.averages
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn track(&self) -> Option<&Track<P, A>> {
        self.session.as_ref().map(|session| &session.track)
    }

    pub fn track_mut(&mut self) -> Option<&mut Track<P, A>> {
        self.session.as_mut().map(|session| &mut session.track)
    }

    pub fn beat_state(&self) -> Option<&BeatState> {
        self.session.as_ref().map(|session| &session.beat)
    }

    pub fn pulse_state(&self) -> Option<&PulseState> {
        self.session.as_ref().map(|session| &session.pulse)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    fn on_played(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.track.analysis.resume();
            if self.pending.is_none() && !session.track.playback.is_paused() {
                self.start_loop();
            }
        }
    }

    /// Cancel-before-request, so only one frame is ever outstanding
    fn start_loop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.pending = Some(self.scheduler.request_frame());
        if self.state != LoopState::Running {
            debug!("frame loop running");
        }
        self.state = LoopState::Running;
    }

    fn cancel_loop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        if self.state != LoopState::Idle {
            debug!("frame loop idle");
        }
        self.state = LoopState::Idle;
    }

    fn teardown(&mut self) {
        self.cancel_loop();
        if let Some(mut session) = self.session.take() {
            session.release();
        }
        self.averages = BandAverages::default();
        self.reset_display();
    }

    fn reset_display(&mut self) {
        self.display.clear();
        self.display.push(DrawCommand::Clear);
        render::draw_time_left(&mut self.display, self.canvas, 0.0, 0.0);
    }
}
