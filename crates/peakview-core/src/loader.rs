use crate::waveform_data::WaveformData;
use parking_lot::Mutex;
use peakview_ports::decode::{AudioDecodePort, DecodeError, DecodedAudio, LoadProgress};
use peakview_ports::types::{BufferFormat, SourceId};
use peakview_ports::waveform::WaveformError;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid audio data: {0}")]
    InvalidData(#[from] WaveformError),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadSummary {
    pub source_id: SourceId,
    pub format: BufferFormat,
    pub frames: usize,
    pub duration_secs: f64,
}

/// Invoked after a buffer has been handed to the engine; peaks for the new
/// data are available from that point on.
pub type LoadListener = Box<dyn Fn(&LoadSummary) + Send + Sync>;

pub struct WaveformLoader {
    decoder: Box<dyn AudioDecodePort>,
    waveform: Arc<WaveformData>,
    listeners: Mutex<Vec<LoadListener>>,
}

impl WaveformLoader {
    pub fn new(decoder: Box<dyn AudioDecodePort>, waveform: Arc<WaveformData>) -> Self {
        Self {
            decoder,
            waveform,
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn waveform(&self) -> &Arc<WaveformData> {
        &self.waveform
    }

    pub fn subscribe(&self, listener: LoadListener) {
        self.listeners.lock().push(listener);
    }

    /// Decodes `path` and replaces the engine's buffer. The engine keeps its
    /// previous data if decoding or validation fails.
    pub fn load_path(
        &self,
        path: &Path,
        progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<LoadSummary, LoadError> {
        let started = Instant::now();
        let decoded = self.decoder.decode_path(path, progress).map_err(|err| {
            warn!(path = %path.display(), error = %err, "failed to load audio");
            err
        })?;
        info!(
            path = %path.display(),
            frames = decoded.frames(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "decoded audio"
        );
        self.load_decoded(SourceId::from_path(path), decoded)
    }

    pub fn load_decoded(
        &self,
        source_id: SourceId,
        decoded: DecodedAudio,
    ) -> Result<LoadSummary, LoadError> {
        let format = decoded.format;
        let frames = decoded.frames();
        self.waveform
            .set_data(
                decoded.samples,
                format.sample_rate_hz,
                format.channels,
                Some(source_id.clone()),
            )
            .map_err(|err| {
                warn!(source = %source_id, error = %err, "failed to load audio");
                err
            })?;

        let summary = LoadSummary {
            source_id,
            format,
            frames,
            duration_secs: self.waveform.duration(),
        };
        for listener in self.listeners.lock().iter() {
            listener(&summary);
        }
        Ok(summary)
    }
}
