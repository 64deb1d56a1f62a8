use hound::{SampleFormat, WavReader};
use peakview_ports::decode::{AudioDecodePort, DecodeError, DecodedAudio, LoadProgress};
use peakview_ports::settings::AnalysisSettings;
use peakview_ports::types::BufferFormat;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// WAV decoder producing frame-interleaved `f32` samples.
pub struct HoundDecoder {
    progress_interval_frames: u32,
}

impl HoundDecoder {
    pub fn new(progress_interval_frames: u32) -> Self {
        Self {
            progress_interval_frames: progress_interval_frames.max(1),
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(settings.decode_progress_interval_frames)
    }

    pub fn decode_reader<R: Read>(
        &self,
        reader: R,
        progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<DecodedAudio, DecodeError> {
        let reader = WavReader::new(reader).map_err(map_hound_error)?;
        self.decode(reader, progress)
    }

    fn decode<R: Read>(
        &self,
        mut reader: WavReader<R>,
        progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<DecodedAudio, DecodeError> {
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(DecodeError::Format("wav header declares no channels".to_string()));
        }
        let channels = spec.channels as usize;
        let frames_total = reader.duration() as u64;
        let mut samples = Vec::with_capacity(reader.len() as usize);
        let report_every = self.progress_interval_frames as usize * channels;

        let mut report = |decoded_samples: usize| {
            progress(LoadProgress {
                frames_decoded: (decoded_samples / channels) as u64,
                frames_total: Some(frames_total),
            })
        };

        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => {
                for sample in reader.samples::<f32>() {
                    samples.push(sample.map_err(map_hound_error)?);
                    if samples.len() % report_every == 0 {
                        report(samples.len());
                    }
                }
            }
            (SampleFormat::Int, bits @ 1..=32) => {
                let scale = 1.0 / (1_u64 << (bits - 1)) as f64;
                for sample in reader.samples::<i32>() {
                    let value = sample.map_err(map_hound_error)?;
                    samples.push((value as f64 * scale) as f32);
                    if samples.len() % report_every == 0 {
                        report(samples.len());
                    }
                }
            }
            (format, bits) => {
                return Err(DecodeError::Unsupported(format!(
                    "{:?} samples with {} bits",
                    format, bits
                )));
            }
        }
        report(samples.len());

        debug!(
            sample_rate_hz = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            samples = samples.len(),
            "decoded wav"
        );

        Ok(DecodedAudio {
            samples,
            format: BufferFormat {
                sample_rate_hz: spec.sample_rate,
                channels: spec.channels,
            },
        })
    }
}

impl Default for HoundDecoder {
    fn default() -> Self {
        Self::from_settings(&AnalysisSettings::default())
    }
}

impl AudioDecodePort for HoundDecoder {
    fn decode_path(
        &self,
        path: &Path,
        progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<DecodedAudio, DecodeError> {
        let reader = WavReader::open(path).map_err(map_hound_error)?;
        self.decode(reader, progress)
    }
}

fn map_hound_error(err: hound::Error) -> DecodeError {
    match err {
        hound::Error::IoError(e) => DecodeError::Io(e.to_string()),
        hound::Error::Unsupported | hound::Error::TooWide | hound::Error::InvalidSampleFormat => {
            DecodeError::Unsupported(err.to_string())
        }
        other => DecodeError::Format(other.to_string()),
    }
}
