use super::Sink;
use crate::error::SinkResult;

/// Collects interleaved samples in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    samples: Vec<i32>,
    channels: usize,
}

impl BufferSink {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with room for `frames` frames of `channels` samples.
    pub fn with_capacity(frames: usize, channels: usize) -> Self {
        Self {
            samples: Vec::with_capacity(frames * channels),
            channels,
        }
    }

    /// Interleaved samples collected so far.
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Number of complete frames collected.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Consumes the sink, returning the samples.
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }
}

impl Sink for BufferSink {
    fn name(&self) -> &str {
        "buffer"
    }

    fn write_frame(&mut self, frame: &[i32]) -> SinkResult<()> {
        self.channels = frame.len();
        self.samples.extend_from_slice(frame);
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        Ok(())
    }
}
