//! File playback on the default output device.
//!
//! The decoded track is shared with the cpal callback; the transport (cursor,
//! rate, paused flag, pending notifications) sits behind a mutex that both the
//! callback and the UI thread take briefly.

use beat_viz_core::{HostError, MediaPlayback, PlaybackEvent};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

use super::{AudioError, DecodedTrack};

#[derive(Debug)]
pub(crate) struct Transport {
    /// Position in track frames, fractional while resampling
    cursor: f64,
    rate: f64,
    paused: bool,
    ended: bool,
    events: VecDeque<PlaybackEvent>,
}

pub(crate) type SharedTransport = Arc<Mutex<Transport>>;

/// The audio callback never panics while holding the lock, but a poisoned
/// transport is still usable.
pub(crate) fn lock(transport: &SharedTransport) -> MutexGuard<'_, Transport> {
    transport.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Transport {
    pub(crate) fn new() -> Self {
        Self {
            cursor: 0.0,
            rate: 1.0,
            paused: true,
            ended: false,
            events: VecDeque::new(),
        }
    }

    pub(crate) fn cursor_frame(&self) -> usize {
        self.cursor as usize
    }

    /// Frame to output next, advancing by `step * rate` track frames.
    ///
    /// `None` means silence. Reaching the end pauses and queues `Ended` once.
    fn advance(&mut self, frames: usize, step: f64) -> Option<usize> {
        if self.paused {
            return None;
        }
        let index = self.cursor_frame();
        if index >= frames {
            if !self.ended {
                self.ended = true;
                self.paused = true;
                self.events.push_back(PlaybackEvent::Ended);
            }
            return None;
        }
        self.cursor += step * self.rate;
        Some(index)
    }
}

pub struct FilePlayback {
    track: Arc<DecodedTrack>,
    transport: SharedTransport,
    stream: Option<Stream>,
    released: bool,
}

impl FilePlayback {
    /// Opens the default output device. The stream starts paused.
    pub fn new(track: Arc<DecodedTrack>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoOutputDevice)?;
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let transport = Arc::new(Mutex::new(Transport::new()));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, &track, &transport)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, &track, &transport)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, &track, &transport)?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };
        stream.play()?;

        info!(
            device = %device.name().unwrap_or_default(),
            device_rate = config.sample_rate.0,
            track_rate = track.sample_rate,
            channels = track.channels,
            "output stream open"
        );

        Ok(Self {
            track,
            transport,
            stream: Some(stream),
            released: false,
        })
    }

    /// Transport without an output stream, for tests
    #[cfg(test)]
    pub(crate) fn detached(track: Arc<DecodedTrack>) -> Self {
        Self {
            track,
            transport: Arc::new(Mutex::new(Transport::new())),
            stream: None,
            released: false,
        }
    }

    pub(crate) fn transport(&self) -> SharedTransport {
        Arc::clone(&self.transport)
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    track: &Arc<DecodedTrack>,
    transport: &SharedTransport,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let step = track.sample_rate as f64 / config.sample_rate.0 as f64;
    let track = Arc::clone(track);
    let transport = Arc::clone(transport);

    let err_fn = |err: cpal::StreamError| error!(%err, "output stream error");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let mut transport = lock(&transport);
            for out in data.chunks_mut(channels) {
                match transport.advance(track.frames(), step) {
                    Some(index) => write_frame(out, track.frame(index)),
                    None => out.fill(T::EQUILIBRIUM),
                }
            }
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

/// Maps track channels onto device channels; mono is duplicated.
fn write_frame<T>(out: &mut [T], frame: &[f32])
where
    T: SizedSample + FromSample<f32>,
{
    if frame.is_empty() {
        out.fill(T::EQUILIBRIUM);
        return;
    }
    for (channel, sample) in out.iter_mut().enumerate() {
        *sample = T::from_sample(frame[channel % frame.len()]);
    }
}

impl MediaPlayback for FilePlayback {
    fn current_position(&self) -> f64 {
        lock(&self.transport).cursor / self.track.sample_rate as f64
    }

    fn duration(&self) -> f64 {
        self.track.duration()
    }

    fn is_paused(&self) -> bool {
        lock(&self.transport).paused
    }

    fn playback_rate(&self) -> f64 {
        lock(&self.transport).rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        lock(&self.transport).rate = rate;
    }

    fn play(&mut self) -> beat_viz_core::Result<()> {
        if self.released {
            return Err(HostError::PlaybackUnavailable("output stream released".into()));
        }
        let frames = self.track.frames();
        let mut transport = lock(&self.transport);
        if !transport.paused {
            return Ok(());
        }
        // playing again after the end starts over
        if transport.ended || transport.cursor_frame() >= frames {
            transport.cursor = 0.0;
            transport.ended = false;
        }
        transport.paused = false;
        transport.events.push_back(PlaybackEvent::Played);
        Ok(())
    }

    fn pause(&mut self) {
        let mut transport = lock(&self.transport);
        if !transport.paused {
            transport.paused = true;
            transport.events.push_back(PlaybackEvent::Paused);
        }
    }

    fn seek(&mut self, position: f64) {
        let duration = self.track.duration();
        let position = if position.is_finite() { position.clamp(0.0, duration) } else { 0.0 };
        let mut transport = lock(&self.transport);
        transport.cursor = position * self.track.sample_rate as f64;
        transport.ended = false;
        transport.events.push_back(PlaybackEvent::Seeked);
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        lock(&self.transport).events.pop_front()
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        lock(&self.transport).paused = true;
        // dropping the stream closes the device
        self.stream = None;
    }
}
