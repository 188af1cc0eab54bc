//! Host-independent core of beat-viz
//!
//! Band averaging, beat detection, pulse decay, the draw-command model and
//! the frame orchestrator. Audio devices, windows and clocks come in through
//! the traits in [`host`].

pub mod bands;
pub mod beat;
pub mod draw;
pub mod error;
pub mod host;
pub mod orchestrator;
pub mod pulse;
pub mod rect;
pub mod render;

pub use bands::{average_in_band, BandAverages, BandLayout, FrequencyBand};
pub use beat::{BeatConfig, BeatDetector, BeatState};
pub use draw::{Color, DisplayList, DrawCommand, RadialGradient, Surface, TextAlign};
pub use error::{HostError, Result};
pub use host::{
    FrameHandle, FrameScheduler, MediaPlayback, MonotonicClock, PlaybackEvent, RefreshScheduler,
    SpectrumSource, WallClock,
};
pub use orchestrator::{LoopState, Track, Visualizer, VisualizerConfig, DEFAULT_SPEEDS};
pub use pulse::{PulseConfig, PulseState};
pub use rect::Rect;
pub use render::FlashThresholds;
