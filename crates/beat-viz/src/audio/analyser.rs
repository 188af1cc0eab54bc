//! Spectrum analysis of the playing track.
//!
//! Behaves like a browser analyser node: a Blackman-windowed FFT over the
//! samples just before the playback cursor, smoothed over time and mapped from
//! decibels to bytes.

use beat_viz_core::{HostError, SpectrumSource};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::debug;

use super::player::{lock, SharedTransport};
use super::DecodedTrack;

/// FFT size - gives 1024 magnitude bins
const FFT_SIZE: usize = 2048;

const SMOOTHING: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

pub struct SpectrumAnalyser {
    track: Arc<DecodedTrack>,
    transport: SharedTransport,

    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,

    /// Smoothed linear magnitude per bin
    smoothed: Vec<f32>,
    connected: bool,
}

impl SpectrumAnalyser {
    pub(crate) fn new(track: Arc<DecodedTrack>, transport: SharedTransport) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Blackman window
        let window = (0..FFT_SIZE)
            .map(|i| {
                let x = 2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            track,
            transport,
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            window,
            smoothed: vec![0.0; FFT_SIZE / 2],
            connected: false,
        }
    }

    /// Transforms the `FFT_SIZE` mono samples ending at frame `end`.
    fn analyse(&mut self, end: usize, out: &mut [u8]) {
        let mono = &self.track.mono;
        let end = end.min(mono.len());
        let start = end.saturating_sub(FFT_SIZE);
        // left-pad with silence near the start of the track
        let offset = FFT_SIZE - (end - start);

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = if i < offset { 0.0 } else { mono[start + i - offset] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        let bins = self.fft_buffer.iter().zip(self.smoothed.iter_mut());
        for ((bin, smoothed), byte) in bins.zip(out.iter_mut()) {
            let magnitude = bin.norm() * scale;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;
            *byte = to_byte(20.0 * smoothed.log10());
        }
    }
}

/// Maps `[MIN_DECIBELS, MAX_DECIBELS]` onto `0..=255`
fn to_byte(decibels: f32) -> u8 {
    let scaled = 255.0 * (decibels - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0) as u8
}

impl SpectrumSource for SpectrumAnalyser {
    fn sample_rate(&self) -> f32 {
        self.track.sample_rate as f32
    }

    fn bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    fn fill_latest_magnitudes(&mut self, buffer: &mut [u8]) -> beat_viz_core::Result<()> {
        if !self.connected {
            return Err(HostError::AnalysisUnavailable);
        }
        if buffer.len() != self.bin_count() {
            return Err(HostError::BufferSize {
                expected: self.bin_count(),
                got: buffer.len(),
            });
        }
        let end = lock(&self.transport).cursor_frame();
        self.analyse(end, buffer);
        Ok(())
    }

    fn resume(&mut self) {
        if !self.connected {
            debug!("analyser connected");
            self.connected = true;
        }
    }

    fn release(&mut self) {
        self.connected = false;
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::FilePlayback;
    use beat_viz_core::MediaPlayback;

    const RATE: u32 = 44100;

    fn analyser(mono: Vec<f32>) -> (FilePlayback, SpectrumAnalyser) {
        let track = Arc::new(DecodedTrack::from_interleaved(1, RATE, mono).unwrap());
        let playback = FilePlayback::detached(Arc::clone(&track));
        let analyser = SpectrumAnalyser::new(track, playback.transport());
        (playback, analyser)
    }

    /// Sine sitting exactly on `bin`
    fn sine(bin: usize, frames: usize) -> Vec<f32> {
        let freq = bin as f32 * RATE as f32 / FFT_SIZE as f32;
        (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / RATE as f32).sin())
            .collect()
    }

    #[test]
    fn unavailable_until_resumed() {
        let (_playback, mut analyser) = analyser(vec![0.0; 4096]);
        let mut out = vec![0u8; 1024];
        assert_eq!(analyser.fill_latest_magnitudes(&mut out), Err(HostError::AnalysisUnavailable));

        analyser.resume();
        assert!(analyser.fill_latest_magnitudes(&mut out).is_ok());

        analyser.release();
        assert_eq!(analyser.fill_latest_magnitudes(&mut out), Err(HostError::AnalysisUnavailable));
    }

    #[test]
    fn buffer_must_match_bin_count() {
        let (_playback, mut analyser) = analyser(vec![0.0; 4096]);
        analyser.resume();
        let mut out = vec![0u8; 512];
        assert_eq!(
            analyser.fill_latest_magnitudes(&mut out),
            Err(HostError::BufferSize { expected: 1024, got: 512 })
        );
    }

    #[test]
    fn silence_maps_to_zero() {
        let (_playback, mut analyser) = analyser(vec![0.0; 4096]);
        analyser.resume();
        let mut out = vec![7u8; 1024];
        analyser.fill_latest_magnitudes(&mut out).unwrap();
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let (mut playback, mut analyser) = analyser(sine(100, 8192));
        playback.seek(4096.0 / RATE as f64);
        analyser.resume();

        let mut out = vec![0u8; 1024];
        analyser.fill_latest_magnitudes(&mut out).unwrap();
        assert_eq!(out[100], 255);
        assert!(out[600] < out[100]);
    }

    #[test]
    fn smoothing_carries_over() {
        let (mut playback, mut analyser) = analyser(sine(100, 8192));
        playback.seek(4096.0 / RATE as f64);
        analyser.resume();
        let mut out = vec![0u8; 1024];
        analyser.fill_latest_magnitudes(&mut out).unwrap();
        let first = analyser.smoothed[100];
        analyser.fill_latest_magnitudes(&mut out).unwrap();
        assert!(analyser.smoothed[100] > first);
    }

    #[test]
    fn byte_mapping() {
        assert_eq!(to_byte(-100.0), 0);
        assert_eq!(to_byte(-30.0), 255);
        assert_eq!(to_byte(-65.0), 127);
        assert_eq!(to_byte(f32::NEG_INFINITY), 0);
        assert_eq!(to_byte(0.0), 255);
    }
}
