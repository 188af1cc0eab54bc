//! Whole-file decoding.
//!
//! Tracks are decoded up front into interleaved f32 so playback can seek
//! freely and the analyser can look at any window around the cursor.

use rodio::{Decoder, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::AudioError;

pub struct DecodedTrack {
    pub sample_rate: u32,
    pub channels: u16,
    /// Interleaved samples, whole frames only
    pub samples: Vec<f32>,
    /// Per-frame channel average, used for analysis
    pub mono: Vec<f32>,
}

impl DecodedTrack {
    /// Decodes any format rodio understands (wav, mp3, flac, vorbis)
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file))?;
        let sample_rate = decoder.sample_rate();
        let channels = decoder.channels();
        let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();

        Self::from_interleaved(channels, sample_rate, samples)
    }

    pub fn from_interleaved(
        channels: u16,
        sample_rate: u32,
        mut samples: Vec<f32>,
    ) -> Result<Self, AudioError> {
        let width = channels as usize;
        if width == 0 || sample_rate == 0 || samples.len() < width {
            return Err(AudioError::EmptyTrack);
        }
        samples.truncate(samples.len() / width * width);

        let mono = samples
            .chunks(width)
            .map(|frame| frame.iter().sum::<f32>() / width as f32)
            .collect();

        Ok(Self {
            sample_rate,
            channels,
            samples,
            mono,
        })
    }

    pub fn frames(&self) -> usize {
        self.mono.len()
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Interleaved samples of one frame, empty past the end
    pub fn frame(&self, index: usize) -> &[f32] {
        let width = self.channels as usize;
        let start = index * width;
        self.samples.get(start..start + width).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// 16-bit PCM mono wav
    fn wav_bytes(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn mono_mixdown() {
        let samples = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let track = DecodedTrack::from_interleaved(2, 48000, samples).unwrap();
        assert_eq!(track.mono, vec![0.5, 0.5, 0.0]);
        assert_eq!(track.frames(), 3);
        assert_eq!(track.frame(1), &[0.5, 0.5]);
        assert!(track.frame(3).is_empty());
    }

    #[test]
    fn partial_frames_are_dropped() {
        let track = DecodedTrack::from_interleaved(2, 48000, vec![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(track.samples.len(), 2);
        assert_eq!(track.frames(), 1);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            DecodedTrack::from_interleaved(2, 44100, Vec::new()),
            Err(AudioError::EmptyTrack)
        ));
        assert!(matches!(
            DecodedTrack::from_interleaved(0, 44100, vec![0.0]),
            Err(AudioError::EmptyTrack)
        ));
    }

    #[test]
    fn duration_in_seconds() {
        let track = DecodedTrack::from_interleaved(1, 8000, vec![0.0; 4000]).unwrap();
        assert_eq!(track.duration(), 0.5);
    }

    #[test]
    fn decodes_wav_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&wav_bytes(8000, &[0; 800])).unwrap();

        let track = DecodedTrack::open(file.path()).unwrap();
        assert_eq!(track.sample_rate, 8000);
        assert_eq!(track.channels, 1);
        assert_eq!(track.frames(), 800);
        assert!((track.duration() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DecodedTrack::open(&dir.path().join("nope.mp3"));
        assert!(matches!(result, Err(AudioError::Io { .. })));
    }

    #[test]
    fn garbage_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not audio").unwrap();
        assert!(matches!(DecodedTrack::open(file.path()), Err(AudioError::Decode(_))));
    }
}
