//! Pixtone Synthesis Backend
//!
//! This crate turns images into sound. Every image column becomes a short
//! slice of time; every row of that column contributes a sine partial whose
//! frequency comes from the row's height and whose amplitude comes from the
//! pixel's brightness and opacity. Several images can be mixed, each with its
//! own gain and frequency range.
//!
//! # Overview
//!
//! - **Timeline** - exact conversion between durations and sample counts
//! - **FrequencyMap** - one frequency per pixel row, bottom row lowest
//! - **WaveTable** - precomputed sine waves shared by frequency
//! - **MixSource** - one image bound to its oscillators
//! - **SynthesisEngine** - the per-sample loop: mix, clip, dispatch
//! - **Sinks** - WAVE file, raw PCM, in-memory buffer, live playback
//!
//! # Determinism
//!
//! Synthesis is deterministic: the same images and configuration produce the
//! same samples, and [`RunSummary::pcm_hash`] records a BLAKE3 hash of the
//! emitted stream.
//!
//! # Crate Structure
//!
//! - [`engine`] - [`EngineBuilder`], [`SynthesisEngine`], [`RunSummary`]
//! - [`timeline`] - duration and sample count resolution
//! - [`frequency`] - row-to-frequency mapping
//! - [`wavetable`] - wave tables, oscillators, and the table cache
//! - [`source`] - images taking part in the mix
//! - [`pixels`] - column-major pixel grids
//! - [`pcm`] - quantization and little-endian encoding
//! - [`sink`] - output destinations
//! - [`progress`] - progress events and the reporter interface
//! - [`cancel`] - cooperative cancellation

pub mod cancel;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod pcm;
pub mod pixels;
pub mod progress;
pub mod sink;
pub mod source;
pub mod timeline;
pub mod wavetable;

// Re-export main types at crate root
pub use cancel::CancelToken;
pub use engine::{EngineBuilder, RunSummary, SynthesisEngine};
pub use error::{SinkError, SinkFailure, SinkResult, SynthError, SynthResult};
pub use frequency::FrequencyMap;
pub use pixels::{Pixel, PixelGrid};
pub use progress::{ProgressEvent, Reporter, SilentReporter, DEFAULT_PROGRESS_GRANULARITY};
#[cfg(feature = "playback")]
pub use sink::CpalOutput;
pub use sink::{
    AudioOutput, BufferSink, FileSink, PlaybackFormat, PlaybackMode, PlaybackSink, RawFileSink,
    RawSink, Sink,
};
pub use source::MixSource;
pub use timeline::Timeline;
pub use wavetable::{Oscillator, WaveTable, WaveTableCache};
