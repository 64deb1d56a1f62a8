const LARGEST_POWER_OF_TWO: usize = 1 << (usize::BITS - 1);

/// Rounds a requested samples-per-pixel factor up to the power of two used
/// as the cache key. Zero has no table and yields `None`.
pub fn normalize_samples_per_pixel(samples_per_pixel: usize) -> Option<usize> {
    match samples_per_pixel {
        0 => None,
        1 => Some(1),
        spp => Some(
            spp.checked_next_power_of_two()
                .unwrap_or(LARGEST_POWER_OF_TWO),
        ),
    }
}

pub fn peak_count(frames: usize, samples_per_pixel: usize) -> usize {
    if samples_per_pixel == 0 {
        return 0;
    }
    frames.div_ceil(samples_per_pixel)
}
