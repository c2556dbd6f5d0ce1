//! Error types for the synthesis backend.

use std::fmt;

use pixtone_spec::ConfigError;
use thiserror::Error;

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors that can occur while preparing or running a synthesis.
#[derive(Debug, Error)]
pub enum SynthError {
    /// The render configuration or an image's settings are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A wave table was requested for a non-positive frequency.
    #[error("invalid frequency: {freq} Hz (must be positive)")]
    InvalidFrequency {
        /// The rejected frequency.
        freq: String,
    },

    /// A frequency map or pixel grid was requested with no rows.
    #[error("invalid row count: {rows} (must be at least 1)")]
    InvalidRange {
        /// The rejected row count.
        rows: usize,
    },

    /// Pixel data does not match the declared grid size.
    #[error("pixel data has {actual} entries, expected {expected}")]
    PixelDataMismatch {
        /// Entries implied by the grid size.
        expected: usize,
        /// Entries actually supplied.
        actual: usize,
    },

    /// The timing resolves to zero samples.
    #[error(
        "timeline is empty: {columns} column(s), {one_column_samples} sample(s) per column, \
         {total_samples} sample(s) total"
    )]
    EmptyTimeline {
        /// Maximum column count across sources.
        columns: u64,
        /// Samples per image column.
        one_column_samples: u64,
        /// Samples in the whole run.
        total_samples: u64,
    },

    /// Timeline arithmetic does not fit the exact representation.
    #[error("timeline overflow while computing {what}")]
    TimelineOverflow {
        /// The quantity being computed.
        what: &'static str,
    },

    /// Frequency arithmetic does not fit the exact representation.
    #[error("frequency overflow while computing {what}")]
    FrequencyOverflow {
        /// The quantity being computed.
        what: &'static str,
    },

    /// One or more sinks failed during the run.
    #[error("{} sink(s) failed: {}", .0.len(), SinkFailures(.0))]
    Sinks(Vec<SinkFailure>),

    /// The run was cancelled before all samples were produced.
    #[error("cancelled after {samples_written} sample(s)")]
    Cancelled {
        /// Samples forwarded to the sinks before cancellation.
        samples_written: u64,
    },
}

impl SynthError {
    /// Creates an invalid frequency error.
    pub fn invalid_frequency(freq: impl fmt::Display) -> Self {
        Self::InvalidFrequency {
            freq: freq.to_string(),
        }
    }

    /// Returns a stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            SynthError::Config(_) => "SYNTH_001",
            SynthError::InvalidFrequency { .. } => "SYNTH_002",
            SynthError::InvalidRange { .. } => "SYNTH_003",
            SynthError::PixelDataMismatch { .. } => "SYNTH_004",
            SynthError::EmptyTimeline { .. } => "SYNTH_005",
            SynthError::TimelineOverflow { .. } => "SYNTH_006",
            SynthError::Sinks(_) => "SYNTH_007",
            SynthError::Cancelled { .. } => "SYNTH_008",
            SynthError::FrequencyOverflow { .. } => "SYNTH_009",
        }
    }

    /// Returns true for errors detected before any sample is produced.
    pub fn is_config(&self) -> bool {
        !matches!(self, SynthError::Sinks(_) | SynthError::Cancelled { .. })
    }
}

/// Errors raised by a single sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink was configured with an invalid format.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error on the backing writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the WAVE container writer.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// The audio output device failed or is unavailable.
    #[error("playback error: {message}")]
    Playback {
        /// Error message.
        message: String,
    },
}

impl SinkError {
    /// Creates a playback error.
    pub fn playback(message: impl Into<String>) -> Self {
        Self::Playback {
            message: message.into(),
        }
    }
}

/// A sink error tagged with the sink it came from.
#[derive(Debug, Error)]
#[error("{sink}: {error}")]
pub struct SinkFailure {
    /// Name of the failed sink.
    pub sink: String,
    /// What went wrong.
    #[source]
    pub error: SinkError,
}

struct SinkFailures<'a>(&'a [SinkFailure]);

impl fmt::Display for SinkFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
