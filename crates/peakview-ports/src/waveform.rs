use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WaveformError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Bass/mid/high energy relative to the loudest of the three.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBands {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

impl FrequencyBands {
    pub const SILENT: FrequencyBands = FrequencyBands {
        bass: 0.0,
        mid: 0.0,
        high: 0.0,
    };

    pub fn max_band(&self) -> f32 {
        self.bass.max(self.mid).max(self.high)
    }

    pub fn is_silent(&self) -> bool {
        self.bass == 0.0 && self.mid == 0.0 && self.high == 0.0
    }

    pub fn element_max(self, other: FrequencyBands) -> FrequencyBands {
        FrequencyBands {
            bass: self.bass.max(other.bass),
            mid: self.mid.max(other.mid),
            high: self.high.max(other.high),
        }
    }
}

/// Summary of a contiguous run of frames in one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub min: f32,
    pub max: f32,
    pub rms: f32,
    pub bands: FrequencyBands,
}

impl Peak {
    pub fn min_max(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            rms: 0.0,
            bands: FrequencyBands::SILENT,
        }
    }

    pub fn amplitude(&self) -> f32 {
        self.min.abs().max(self.max.abs())
    }
}

/// Per-channel peaks for one normalized samples-per-pixel factor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakTable {
    pub samples_per_pixel: usize,
    pub channels: Vec<Vec<Peak>>,
}

impl PeakTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, channel: usize) -> Option<&[Peak]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    /// Number of peaks per channel (all channels have the same length).
    pub fn len(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }
}
