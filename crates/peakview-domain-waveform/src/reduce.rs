use crate::analyzer::SegmentAnalyzer;
use crate::segment::ChannelSegment;
use crate::zoom::peak_count;
use peakview_ports::types::BufferFormat;
use peakview_ports::waveform::{Peak, PeakTable};

/// Splits every channel into consecutive windows of `samples_per_pixel`
/// frames (the last one may be shorter) and analyzes each window.
pub fn build_peak_table(
    samples: &[f32],
    format: BufferFormat,
    samples_per_pixel: usize,
    analyzer: &dyn SegmentAnalyzer,
) -> PeakTable {
    let channels = format.channels as usize;
    let frames = format.frames_in(samples.len());
    if channels == 0 || frames == 0 || samples_per_pixel == 0 {
        return PeakTable::empty();
    }

    let count = peak_count(frames, samples_per_pixel);
    let channels = (0..channels)
        .map(|channel| {
            let mut peaks = Vec::with_capacity(count);
            for window in 0..count {
                let start = window * samples_per_pixel;
                let len = samples_per_pixel.min(frames - start);
                let segment = ChannelSegment::new(samples, channels, channel, start, len);
                peaks.push(analyzer.analyze(segment, format.sample_rate_hz));
            }
            peaks
        })
        .collect();

    PeakTable {
        samples_per_pixel,
        channels,
    }
}

/// Combines all channels index by index: lowest min, highest max, loudest
/// rms and the element-wise max of the band energies.
pub fn mix_down(table: &PeakTable) -> Vec<Peak> {
    let Some(first) = table.channels.first() else {
        return Vec::new();
    };

    let mut mixed = first.clone();
    for channel in &table.channels[1..] {
        for (out, peak) in mixed.iter_mut().zip(channel) {
            out.min = out.min.min(peak.min);
            out.max = out.max.max(peak.max);
            out.rms = out.rms.max(peak.rms);
            out.bands = out.bands.element_max(peak.bands);
        }
    }
    mixed
}

/// Min/max peaks across all channels for `[start_frame, end_frame)`, at most
/// `target_width` of them. Bounds are clamped to the buffer. Only `min` and
/// `max` are filled in.
pub fn peaks_for_range(
    samples: &[f32],
    channels: usize,
    start_frame: usize,
    end_frame: usize,
    target_width: usize,
) -> Vec<Peak> {
    if channels == 0 || target_width == 0 {
        return Vec::new();
    }
    let frames = samples.len() / channels;
    let start = start_frame.min(frames);
    let end = end_frame.min(frames);
    if start >= end {
        return Vec::new();
    }

    let range_len = end - start;
    let width = range_len.div_ceil(target_width).max(1);

    let mut peaks = Vec::with_capacity(range_len.div_ceil(width));
    let mut seg_start = start;
    while seg_start < end {
        let seg_end = (seg_start + width).min(end);
        let frame_samples = &samples[seg_start * channels..seg_end * channels];
        let (min, max) = frame_samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &s| {
                (min.min(s), max.max(s))
            });
        peaks.push(Peak::min_max(min, max));
        seg_start = seg_end;
    }
    peaks
}
