use crate::types::*;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("io error: {0}")]
    Io(String),
    #[error("unsupported format: {0}")]
    Unsupported(String),
    #[error("malformed audio: {0}")]
    Format(String),
}

/// Fully decoded, frame-interleaved audio ready for the peak engine.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub format: BufferFormat,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.format.frames_in(self.samples.len())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub frames_decoded: u64,
    pub frames_total: Option<u64>,
}

impl LoadProgress {
    pub fn fraction(&self) -> Option<f32> {
        match self.frames_total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.frames_decoded as f64 / total as f64).min(1.0) as f32),
            None => None,
        }
    }
}

/// Decoders run on the loader's thread; they may block on I/O.
pub trait AudioDecodePort: Send + Sync {
    fn decode_path(
        &self,
        path: &Path,
        progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<DecodedAudio, DecodeError>;
}
