mod analyser;
mod decoder;
mod error;
mod player;

pub use analyser::SpectrumAnalyser;
pub use decoder::DecodedTrack;
pub use error::AudioError;
pub use player::FilePlayback;

use beat_viz_core::Track;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub type FileTrack = Track<FilePlayback, SpectrumAnalyser>;

/// Decodes `path` and wires playback and analysis onto the same transport.
pub fn open_track(path: &Path) -> Result<FileTrack, AudioError> {
    let decoded = Arc::new(DecodedTrack::open(path)?);
    info!(
        path = %path.display(),
        duration = decoded.duration(),
        sample_rate = decoded.sample_rate,
        "decoded track"
    );

    let playback = FilePlayback::new(Arc::clone(&decoded))?;
    let analysis = SpectrumAnalyser::new(decoded, playback.transport());
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Track::new(label, playback, analysis))
}
