use parking_lot::{Mutex, RwLock};
use peakview_domain_waveform::{
    build_peak_table, mix_down, normalize_samples_per_pixel, peaks_for_range, BandAnalyzer,
    SegmentAnalyzer,
};
use peakview_ports::settings::AnalysisSettings;
use peakview_ports::types::{BufferFormat, FrameIndex, SampleRateHz, SourceId};
use peakview_ports::waveform::{Peak, PeakTable, WaveformError};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct SampleBuffer {
    samples: Vec<f32>,
    format: BufferFormat,
    frames: usize,
    source_id: Option<SourceId>,
    generation: u64,
}

impl SampleBuffer {
    fn unloaded() -> Self {
        Self {
            samples: Vec::new(),
            format: BufferFormat {
                sample_rate_hz: 0,
                channels: 0,
            },
            frames: 0,
            source_id: None,
            generation: 0,
        }
    }

    fn is_loaded(&self) -> bool {
        self.frames > 0 && self.format.sample_rate_hz > 0 && self.format.channels > 0
    }

    fn sample(&self, channel: usize, frame: FrameIndex) -> f32 {
        let channels = self.format.channels as usize;
        if channel >= channels || frame >= self.frames {
            return 0.0;
        }
        self.samples[frame * channels + channel]
    }
}

/// Tables belong to the buffer generation they were built from.
#[derive(Debug, Default)]
struct PeakCache {
    generation: u64,
    tables: HashMap<usize, Arc<PeakTable>>,
}

impl PeakCache {
    fn get(&self, generation: u64, samples_per_pixel: usize) -> Option<Arc<PeakTable>> {
        if self.generation != generation {
            return None;
        }
        self.tables.get(&samples_per_pixel).cloned()
    }

    fn insert(
        &mut self,
        generation: u64,
        samples_per_pixel: usize,
        table: Arc<PeakTable>,
    ) -> Arc<PeakTable> {
        if self.generation != generation {
            return table;
        }
        self.tables
            .entry(samples_per_pixel)
            .or_insert(table)
            .clone()
    }

    fn reset(&mut self, generation: u64) {
        self.generation = generation;
        self.tables.clear();
    }
}

/// One channel's peaks, borrowed from a shared table.
#[derive(Clone, Debug)]
pub struct ChannelPeaks {
    table: Arc<PeakTable>,
    channel: usize,
}

impl ChannelPeaks {
    pub fn table(&self) -> &Arc<PeakTable> {
        &self.table
    }
}

impl Deref for ChannelPeaks {
    type Target = [Peak];

    fn deref(&self) -> &[Peak] {
        self.table.channel(self.channel).unwrap_or(&[])
    }
}

/// Sample buffer plus a lazily built peak cache keyed by power-of-two
/// samples-per-pixel.
///
/// Thread model:
/// - the buffer and the cache have separate locks; peak tables are built
///   outside both on an `Arc` snapshot of the buffer
/// - read paths never fail, they return empty results or `0.0`
pub struct WaveformData {
    buffer: RwLock<Arc<SampleBuffer>>,
    cache: Mutex<PeakCache>,
    analyzer: Arc<dyn SegmentAnalyzer>,
}

impl WaveformData {
    pub fn new() -> Self {
        Self::with_analyzer(Arc::new(BandAnalyzer::default()))
    }

    pub fn with_settings(settings: &AnalysisSettings) -> Self {
        Self::with_analyzer(Arc::new(BandAnalyzer::new(settings)))
    }

    pub fn with_analyzer(analyzer: Arc<dyn SegmentAnalyzer>) -> Self {
        Self {
            buffer: RwLock::new(Arc::new(SampleBuffer::unloaded())),
            cache: Mutex::new(PeakCache::default()),
            analyzer,
        }
    }

    /// Replaces the buffer and drops every cached table. On error nothing
    /// changes.
    pub fn set_data(
        &self,
        samples: Vec<f32>,
        sample_rate_hz: SampleRateHz,
        channels: u16,
        source_id: Option<SourceId>,
    ) -> Result<(), WaveformError> {
        if sample_rate_hz == 0 {
            warn!("rejected waveform data: sample rate is zero");
            return Err(WaveformError::InvalidArgument(
                "sample rate must be positive".to_string(),
            ));
        }
        if channels == 0 {
            warn!("rejected waveform data: channel count is zero");
            return Err(WaveformError::InvalidArgument(
                "channel count must be positive".to_string(),
            ));
        }

        let format = BufferFormat {
            sample_rate_hz,
            channels,
        };
        let frames = format.frames_in(samples.len());

        let mut buffer = self.buffer.write();
        let generation = buffer.generation + 1;
        *buffer = Arc::new(SampleBuffer {
            samples,
            format,
            frames,
            source_id,
            generation,
        });
        self.cache.lock().reset(generation);
        drop(buffer);

        info!(
            sample_rate_hz,
            channels,
            frames,
            generation,
            "waveform data replaced"
        );
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.read().is_loaded()
    }

    pub fn sample_rate(&self) -> SampleRateHz {
        self.buffer.read().format.sample_rate_hz
    }

    pub fn channel_count(&self) -> usize {
        self.buffer.read().format.channels as usize
    }

    pub fn frames_per_channel(&self) -> usize {
        self.buffer.read().frames
    }

    pub fn source_id(&self) -> Option<SourceId> {
        self.buffer.read().source_id.clone()
    }

    pub fn duration(&self) -> f64 {
        let buffer = self.buffer.read();
        if !buffer.is_loaded() {
            return 0.0;
        }
        buffer.frames as f64 / buffer.format.sample_rate_hz as f64
    }

    /// Full per-channel table. `samples_per_pixel` is rounded up to a power
    /// of two, so nearby zoom levels share one cached table.
    pub fn peaks(&self, samples_per_pixel: usize) -> Arc<PeakTable> {
        let Some(spp) = normalize_samples_per_pixel(samples_per_pixel) else {
            return Arc::new(PeakTable::empty());
        };
        let buffer = self.snapshot();
        if !buffer.is_loaded() {
            return Arc::new(PeakTable::empty());
        }

        if let Some(table) = self.cache.lock().get(buffer.generation, spp) {
            return table;
        }

        let started = Instant::now();
        let table = Arc::new(build_peak_table(
            &buffer.samples,
            buffer.format,
            spp,
            self.analyzer.as_ref(),
        ));
        debug!(
            samples_per_pixel = spp,
            peaks = table.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "built peak table"
        );

        self.cache.lock().insert(buffer.generation, spp, table)
    }

    pub fn channel_peaks(&self, channel: usize, samples_per_pixel: usize) -> ChannelPeaks {
        ChannelPeaks {
            table: self.peaks(samples_per_pixel),
            channel,
        }
    }

    /// Mono mix-down of the cached table. Not cached itself.
    pub fn mixed_peaks(&self, samples_per_pixel: usize) -> Vec<Peak> {
        mix_down(&self.peaks(samples_per_pixel))
    }

    /// Pixel-exact min/max peaks over `[start_frame, end_frame)` across all
    /// channels, at most `target_width` of them. Bypasses the cache.
    pub fn peaks_for_range(
        &self,
        start_frame: FrameIndex,
        end_frame: FrameIndex,
        target_width: usize,
    ) -> Vec<Peak> {
        let buffer = self.snapshot();
        if !buffer.is_loaded() {
            return Vec::new();
        }
        peaks_for_range(
            &buffer.samples[..buffer.frames * buffer.format.channels as usize],
            buffer.format.channels as usize,
            start_frame,
            end_frame,
            target_width,
        )
    }

    pub fn sample(&self, channel: usize, frame: FrameIndex) -> f32 {
        self.buffer.read().sample(channel, frame)
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        let dropped = cache.tables.len();
        cache.tables.clear();
        debug!(dropped, "peak cache cleared");
    }

    /// Sorted keys of the tables currently cached.
    pub fn cached_samples_per_pixel(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.cache.lock().tables.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn time_to_frame(&self, seconds: f64) -> FrameIndex {
        let rate = self.sample_rate();
        if rate == 0 || seconds.is_nan() || seconds <= 0.0 {
            return 0;
        }
        (seconds * rate as f64).floor() as FrameIndex
    }

    pub fn frame_to_time(&self, frame: FrameIndex) -> f64 {
        let rate = self.sample_rate();
        if rate == 0 {
            return 0.0;
        }
        frame as f64 / rate as f64
    }

    fn snapshot(&self) -> Arc<SampleBuffer> {
        self.buffer.read().clone()
    }
}

impl Default for WaveformData {
    fn default() -> Self {
        Self::new()
    }
}
