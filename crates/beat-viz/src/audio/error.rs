use std::path::PathBuf;

/// Failures while loading a track or opening the output device
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt audio file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("output device has no usable config: {0}")]
    OutputConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported output sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("track contains no audio")]
    EmptyTrack,
}
