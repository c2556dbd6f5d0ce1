//! Destinations for synthesized frames.
//!
//! The engine hands every frame (one value per channel) to each registered
//! [`Sink`] in registration order and calls [`Sink::finish`] on all of them
//! when the run ends, however it ends.

mod buffer;
#[cfg(feature = "playback")]
mod device;
mod file;
mod playback;
mod raw;


pub use buffer::BufferSink;
#[cfg(feature = "playback")]
pub use device::CpalOutput;
pub use file::FileSink;
pub use playback::{AudioOutput, PlaybackFormat, PlaybackMode, PlaybackSink};
pub use raw::{RawFileSink, RawSink};

use crate::error::SinkResult;

/// Consumes frames as they are produced.
pub trait Sink {
    /// Name used in error reports.
    fn name(&self) -> &str;

    /// Accepts one interleaved frame.
    fn write_frame(&mut self, frame: &[i32]) -> SinkResult<()>;

    /// Flushes and closes the sink. Calling it again is a no-op.
    fn finish(&mut self) -> SinkResult<()>;
}
