use crate::segment::ChannelSegment;
use peakview_ports::settings::AnalysisSettings;
use peakview_ports::types::SampleRateHz;
use peakview_ports::waveform::{FrequencyBands, Peak};
use std::f32::consts::TAU;

/// Summarizes one window of one channel into a `Peak`.
///
/// Called once per window while a peak table is built, possibly from
/// several threads at once.
pub trait SegmentAnalyzer: Send + Sync {
    fn analyze(&self, segment: ChannelSegment<'_>, sample_rate_hz: SampleRateHz) -> Peak;
}

/// Min/max/RMS scan plus three single-pole filters for band energy.
#[derive(Clone, Copy, Debug)]
pub struct BandAnalyzer {
    bass_cutoff_hz: f32,
    high_cutoff_hz: f32,
    max_coefficient: f32,
    silence_epsilon: f32,
    min_band_samples: usize,
}

impl BandAnalyzer {
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            bass_cutoff_hz: settings.bass_cutoff_hz,
            high_cutoff_hz: settings.high_cutoff_hz,
            max_coefficient: settings.max_filter_coefficient,
            silence_epsilon: settings.silence_epsilon,
            min_band_samples: settings.min_band_samples,
        }
    }

    fn coefficient(&self, cutoff_hz: f32, sample_rate_hz: SampleRateHz) -> f32 {
        if sample_rate_hz == 0 {
            return self.max_coefficient;
        }
        (TAU * cutoff_hz / sample_rate_hz as f32).min(self.max_coefficient)
    }

    /// Filter state starts from zero for every window.
    pub fn band_energy(
        &self,
        segment: ChannelSegment<'_>,
        sample_rate_hz: SampleRateHz,
    ) -> FrequencyBands {
        let len = segment.len();
        if len < self.min_band_samples || len == 0 {
            return FrequencyBands::SILENT;
        }

        let a_low = self.coefficient(self.bass_cutoff_hz, sample_rate_hz);
        let a_high = self.coefficient(self.high_cutoff_hz, sample_rate_hz);

        let mut low = OnePole::new(a_low);
        let mut upper = OnePole::new(a_high);
        let mut bass_sq = 0.0_f64;
        let mut mid_sq = 0.0_f64;
        let mut high_sq = 0.0_f64;

        for x in segment.iter() {
            let lp_low = low.process(x);
            let lp_high = upper.process(x);
            let mid = lp_high - lp_low;
            let high = x - lp_high;
            bass_sq += (lp_low as f64) * (lp_low as f64);
            mid_sq += (mid as f64) * (mid as f64);
            high_sq += (high as f64) * (high as f64);
        }

        let n = len as f64;
        let bass = (bass_sq / n).sqrt();
        let mid = (mid_sq / n).sqrt();
        let high = (high_sq / n).sqrt();

        let total = bass + mid + high;
        if total < self.silence_epsilon as f64 {
            return FrequencyBands::SILENT;
        }

        let loudest = bass.max(mid).max(high);
        FrequencyBands {
            bass: (bass / loudest) as f32,
            mid: (mid / loudest) as f32,
            high: (high / loudest) as f32,
        }
    }
}

impl Default for BandAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl SegmentAnalyzer for BandAnalyzer {
    fn analyze(&self, segment: ChannelSegment<'_>, sample_rate_hz: SampleRateHz) -> Peak {
        if segment.is_empty() {
            return Peak::default();
        }

        let (min, max, sum_sq) = segment.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0_f64),
            |(min, max, sum), s| (min.min(s), max.max(s), sum + (s as f64) * (s as f64)),
        );

        Peak {
            min,
            max,
            rms: (sum_sq / segment.len() as f64).sqrt() as f32,
            bands: self.band_energy(segment, sample_rate_hz),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct OnePole {
    coefficient: f32,
    state: f32,
}

impl OnePole {
    fn new(coefficient: f32) -> Self {
        Self {
            coefficient,
            state: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        self.state += self.coefficient * (x - self.state);
        self.state
    }
}
