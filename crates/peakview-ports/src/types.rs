use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub type FrameIndex = usize; // frame position within one channel
pub type SampleRateHz = u32;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Layout of an interleaved sample buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferFormat {
    pub sample_rate_hz: SampleRateHz,
    pub channels: u16,
}

impl BufferFormat {
    pub fn frames_in(&self, sample_count: usize) -> usize {
        if self.channels == 0 {
            return 0;
        }
        sample_count / self.channels as usize
    }
}
