use peakview_core::WaveformData;
use peakview_domain_waveform::{BandAnalyzer, ChannelSegment, SegmentAnalyzer};
use peakview_ports::types::SourceId;
use peakview_ports::waveform::{FrequencyBands, Peak, WaveformError};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Default)]
struct CountingAnalyzer {
    calls: AtomicUsize,
    inner: BandAnalyzer,
}

impl CountingAnalyzer {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SegmentAnalyzer for CountingAnalyzer {
    fn analyze(&self, segment: ChannelSegment<'_>, sample_rate_hz: u32) -> Peak {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.analyze(segment, sample_rate_hz)
    }
}

fn example_waveform() -> WaveformData {
    let waveform = WaveformData::new();
    waveform
        .set_data(
            vec![1.0, -1.0, 0.5, -0.5, 0.2, -0.2, 0.0, 0.0],
            8000,
            1,
            Some(SourceId::new("example")),
        )
        .unwrap();
    waveform
}

fn stereo_ramp(frames: usize) -> Vec<f32> {
    (0..frames)
        .flat_map(|i| {
            let t = i as f32 / frames as f32;
            [t, -t * 0.5]
        })
        .collect()
}

#[test]
fn example_buffer_reduces_to_two_peaks() {
    let waveform = example_waveform();
    let table = waveform.peaks(4);

    assert_eq!(table.samples_per_pixel, 4);
    let peaks = table.channel(0).unwrap();
    assert_eq!(peaks.len(), 2);
    assert_eq!((peaks[0].min, peaks[0].max), (-1.0, 1.0));
    assert_eq!((peaks[1].min, peaks[1].max), (-0.2, 0.2));
}

#[test]
fn peak_count_matches_normalized_factor() {
    let waveform = WaveformData::new();
    waveform.set_data(stereo_ramp(1000), 44_100, 2, None).unwrap();

    for (requested, normalized) in [(1, 1), (3, 4), (5, 8), (64, 64), (100, 128), (5000, 8192)] {
        let table = waveform.peaks(requested);
        assert_eq!(table.samples_per_pixel, normalized);
        for channel in &table.channels {
            assert_eq!(channel.len(), 1000_usize.div_ceil(normalized));
        }
    }
}

#[test]
fn rounded_factors_share_one_table() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let waveform = WaveformData::with_analyzer(analyzer.clone());
    waveform.set_data(stereo_ramp(64), 48_000, 2, None).unwrap();

    let five = waveform.peaks(5);
    let calls_after_first = analyzer.calls();
    assert_eq!(calls_after_first, 2 * 64_usize.div_ceil(8));

    let eight = waveform.peaks(8);
    let eight_again = waveform.peaks(8);
    assert!(Arc::ptr_eq(&five, &eight));
    assert!(Arc::ptr_eq(&eight, &eight_again));
    assert_eq!(analyzer.calls(), calls_after_first);
    assert_eq!(waveform.cached_samples_per_pixel(), vec![8]);
}

#[test]
fn set_data_invalidates_cached_tables() {
    let waveform = example_waveform();
    let before = waveform.peaks(4);

    waveform
        .set_data(vec![0.25, -0.75, 0.0, 0.0], 8000, 1, None)
        .unwrap();
    let after = waveform.peaks(4);

    assert!(!Arc::ptr_eq(&before, &after));
    let peaks = after.channel(0).unwrap();
    assert_eq!(peaks.len(), 1);
    assert_eq!((peaks[0].min, peaks[0].max), (-0.75, 0.25));
    assert_eq!(waveform.source_id(), None);
}

#[test]
fn clear_cache_keeps_the_buffer() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let waveform = WaveformData::with_analyzer(analyzer.clone());
    waveform.set_data(vec![0.5; 16], 1000, 1, None).unwrap();

    let first = waveform.peaks(4);
    waveform.clear_cache();
    assert!(waveform.cached_samples_per_pixel().is_empty());
    assert!(waveform.is_loaded());

    let second = waveform.peaks(4);
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert_eq!(analyzer.calls(), 8);
}

#[test]
fn invalid_set_data_keeps_previous_buffer() {
    let waveform = example_waveform();
    let cached = waveform.peaks(4);

    let err = waveform.set_data(vec![0.1; 8], 0, 1, None).unwrap_err();
    assert!(matches!(err, WaveformError::InvalidArgument(_)));
    let err = waveform.set_data(vec![0.1; 8], 8000, 0, None).unwrap_err();
    assert!(matches!(err, WaveformError::InvalidArgument(_)));

    assert!(waveform.is_loaded());
    assert_eq!(waveform.sample_rate(), 8000);
    assert_eq!(waveform.frames_per_channel(), 8);
    assert_eq!(waveform.sample(0, 1), -1.0);
    assert_eq!(waveform.source_id(), Some(SourceId::new("example")));
    assert!(Arc::ptr_eq(&cached, &waveform.peaks(4)));
}

#[test]
fn unloaded_engine_returns_empty_results() {
    let waveform = WaveformData::new();

    assert!(!waveform.is_loaded());
    assert!(waveform.peaks(8).is_empty());
    assert!(waveform.channel_peaks(0, 8).is_empty());
    assert!(waveform.mixed_peaks(8).is_empty());
    assert!(waveform.peaks_for_range(0, 100, 10).is_empty());
    assert_eq!(waveform.sample(0, 0), 0.0);
    assert_eq!(waveform.duration(), 0.0);
    assert_eq!(waveform.time_to_frame(1.0), 0);
    assert_eq!(waveform.frame_to_time(100), 0.0);
    assert!(waveform.cached_samples_per_pixel().is_empty());
}

#[test]
fn empty_buffer_is_not_loaded() {
    let waveform = WaveformData::new();
    waveform.set_data(Vec::new(), 48_000, 2, None).unwrap();
    assert!(!waveform.is_loaded());
    assert!(waveform.peaks(1).is_empty());
}

#[test]
fn zero_samples_per_pixel_is_empty() {
    let waveform = example_waveform();
    assert!(waveform.peaks(0).is_empty());
    assert!(waveform.channel_peaks(0, 0).is_empty());
    assert!(waveform.mixed_peaks(0).is_empty());
    assert!(waveform.cached_samples_per_pixel().is_empty());
}

#[test]
fn channel_peaks_select_one_channel() {
    let waveform = WaveformData::new();
    waveform.set_data(stereo_ramp(100), 48_000, 2, None).unwrap();

    let left = waveform.channel_peaks(0, 16);
    let right = waveform.channel_peaks(1, 16);
    assert_eq!(left.len(), 7);
    assert!(left.iter().all(|p| p.min >= 0.0));
    assert!(right.iter().all(|p| p.max <= 0.0));
    assert!(Arc::ptr_eq(left.table(), right.table()));

    assert!(waveform.channel_peaks(2, 16).is_empty());
}

#[test]
fn mixed_peaks_combine_channels() {
    let waveform = WaveformData::new();
    waveform
        .set_data(vec![0.5, -0.1, -0.4, 0.9, 0.0, 0.0, 0.1, -0.3], 1000, 2, None)
        .unwrap();

    let mixed = waveform.mixed_peaks(2);
    assert_eq!(mixed.len(), 2);
    assert_eq!((mixed[0].min, mixed[0].max), (-0.4, 0.9));
    assert_eq!((mixed[1].min, mixed[1].max), (-0.3, 0.1));
}

#[test]
fn range_query_bounds_width_and_keeps_extremes() {
    let frames = 1001;
    let waveform = WaveformData::new();
    let samples = stereo_ramp(frames);
    let global_min = samples.iter().copied().fold(f32::INFINITY, f32::min);
    let global_max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    waveform.set_data(samples, 48_000, 2, None).unwrap();

    for width in [1, 7, 100, 333, 1001, 5000] {
        let peaks = waveform.peaks_for_range(0, frames, width);
        assert!(!peaks.is_empty());
        assert!(peaks.len() <= width, "width {width} gave {}", peaks.len());
        let min = peaks.iter().map(|p| p.min).fold(f32::INFINITY, f32::min);
        let max = peaks.iter().map(|p| p.max).fold(f32::NEG_INFINITY, f32::max);
        assert_eq!((min, max), (global_min, global_max));
        assert!(peaks
            .iter()
            .all(|p| p.rms == 0.0 && p.bands == FrequencyBands::SILENT));
    }
    assert!(waveform.cached_samples_per_pixel().is_empty());
}

#[test]
fn range_query_handles_degenerate_input() {
    let waveform = example_waveform();
    assert!(waveform.peaks_for_range(4, 4, 10).is_empty());
    assert!(waveform.peaks_for_range(6, 2, 10).is_empty());
    assert!(waveform.peaks_for_range(0, 8, 0).is_empty());
    assert!(waveform.peaks_for_range(100, 200, 10).is_empty());

    let clamped = waveform.peaks_for_range(4, 1_000, 1);
    assert_eq!(clamped, vec![Peak::min_max(-0.2, 0.2)]);
}

#[test]
fn sample_lookup_and_time_conversions() {
    let waveform = example_waveform();
    assert_eq!(waveform.sample(0, 2), 0.5);
    assert_eq!(waveform.sample(0, 8), 0.0);
    assert_eq!(waveform.sample(1, 0), 0.0);

    assert_eq!(waveform.duration(), 0.001);
    assert_eq!(waveform.time_to_frame(0.0005), 4);
    assert_eq!(waveform.time_to_frame(-1.0), 0);
    assert_eq!(waveform.time_to_frame(f64::NAN), 0);
    assert_eq!(waveform.frame_to_time(4), 0.0005);
}

#[test]
fn trailing_partial_frame_is_ignored() {
    let waveform = WaveformData::new();
    waveform
        .set_data(vec![0.1, 0.2, 0.3, 0.4, 0.5], 100, 2, None)
        .unwrap();
    assert_eq!(waveform.frames_per_channel(), 2);
    assert_eq!(waveform.sample(0, 2), 0.0);
    assert_eq!(waveform.peaks(1).len(), 2);
    assert_eq!(waveform.peaks_for_range(0, 10, 10).len(), 2);
}

#[test]
fn concurrent_reads_never_see_mixed_buffers() {
    let waveform = Arc::new(WaveformData::new());
    waveform.set_data(vec![0.0; 4096], 48_000, 1, None).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let waveform = waveform.clone();
            thread::spawn(move || {
                for spp in (1..200).cycle().take(400) {
                    let table = waveform.peaks(spp);
                    if let Some(peaks) = table.channel(0) {
                        let first = peaks[0].max;
                        assert!(peaks.iter().all(|p| p.max == first && p.min == first));
                    }
                }
            })
        })
        .collect();

    for level in 1..=20 {
        let value = level as f32 / 20.0;
        waveform.set_data(vec![value; 4096], 48_000, 1, None).unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }

    let table = waveform.peaks(64);
    assert!(table.channel(0).unwrap().iter().all(|p| p.max == 1.0));
}
