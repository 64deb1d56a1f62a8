/// A run of frames of one channel inside a frame-interleaved buffer.
#[derive(Clone, Copy, Debug)]
pub struct ChannelSegment<'a> {
    interleaved: &'a [f32],
    channels: usize,
    channel: usize,
    start_frame: usize,
    frames: usize,
}

impl<'a> ChannelSegment<'a> {
    /// Out-of-range windows are clipped to the frames actually present.
    pub fn new(
        interleaved: &'a [f32],
        channels: usize,
        channel: usize,
        start_frame: usize,
        frames: usize,
    ) -> Self {
        let total_frames = if channels == 0 {
            0
        } else {
            interleaved.len() / channels
        };
        let (start_frame, frames) = if channel >= channels || start_frame >= total_frames {
            (0, 0)
        } else {
            (start_frame, frames.min(total_frames - start_frame))
        };
        Self {
            interleaved,
            channels,
            channel,
            start_frame,
            frames,
        }
    }

    /// Wraps a mono slice.
    pub fn mono(samples: &'a [f32]) -> Self {
        Self::new(samples, 1, 0, 0, samples.len())
    }

    pub fn len(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn start_frame(&self) -> usize {
        self.start_frame
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + 'a {
        let offset = if self.frames == 0 {
            0
        } else {
            self.start_frame * self.channels + self.channel
        };
        self.interleaved[offset..]
            .iter()
            .step_by(self.channels.max(1))
            .take(self.frames)
            .copied()
    }
}
