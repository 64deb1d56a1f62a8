use serde::{Deserialize, Serialize};

fn default_bass_cutoff_hz() -> f32 {
    300.0
}

fn default_high_cutoff_hz() -> f32 {
    2000.0
}

fn default_max_filter_coefficient() -> f32 {
    0.99
}

fn default_silence_epsilon() -> f32 {
    1e-4
}

fn default_min_band_samples() -> usize {
    4
}

fn default_decode_progress_interval_frames() -> u32 {
    65_536
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    #[serde(default = "default_bass_cutoff_hz")]
    pub bass_cutoff_hz: f32,
    #[serde(default = "default_high_cutoff_hz")]
    pub high_cutoff_hz: f32,
    #[serde(default = "default_max_filter_coefficient")]
    pub max_filter_coefficient: f32,
    #[serde(default = "default_silence_epsilon")]
    pub silence_epsilon: f32,
    #[serde(default = "default_min_band_samples")]
    pub min_band_samples: usize,
    #[serde(default = "default_decode_progress_interval_frames")]
    pub decode_progress_interval_frames: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            bass_cutoff_hz: default_bass_cutoff_hz(),
            high_cutoff_hz: default_high_cutoff_hz(),
            max_filter_coefficient: default_max_filter_coefficient(),
            silence_epsilon: default_silence_epsilon(),
            min_band_samples: default_min_band_samples(),
            decode_progress_interval_frames: default_decode_progress_interval_frames(),
        }
    }
}

pub trait SettingsPort: Send + Sync {
    fn load_settings(&self) -> Result<AnalysisSettings, StorageError>;
    fn save_settings(&self, s: &AnalysisSettings) -> Result<(), StorageError>;
}
