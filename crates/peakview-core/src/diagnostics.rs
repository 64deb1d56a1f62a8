use crate::waveform_data::WaveformData;
use peakview_ports::settings::{AnalysisSettings, StorageError};
use peakview_ports::types::SourceId;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct AppVersion {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineState {
    pub loaded: bool,
    pub sample_rate_hz: u32,
    pub channels: usize,
    pub frames_per_channel: usize,
    pub duration_secs: f64,
    pub source_id: Option<SourceId>,
    pub cached_samples_per_pixel: Vec<usize>,
}

impl EngineState {
    pub fn capture(waveform: &WaveformData) -> Self {
        Self {
            loaded: waveform.is_loaded(),
            sample_rate_hz: waveform.sample_rate(),
            channels: waveform.channel_count(),
            frames_per_channel: waveform.frames_per_channel(),
            duration_secs: waveform.duration(),
            source_id: waveform.source_id(),
            cached_samples_per_pixel: waveform.cached_samples_per_pixel(),
        }
    }
}

pub fn export_diagnostics(
    dir: &Path,
    settings: &AnalysisSettings,
    waveform: &WaveformData,
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let app_version = AppVersion {
        name: "Peakview".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let platform = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    write_json(&dir.join("app_version.json"), &app_version)?;
    write_json(&dir.join("platform.json"), &platform)?;
    write_json(&dir.join("settings.json"), settings)?;
    write_json(
        &dir.join("engine_state.json"),
        &EngineState::capture(waveform),
    )?;

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}
