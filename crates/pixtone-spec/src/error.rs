//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while parsing a number with an optional unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The text is not `<number>` or `<number> <unit>`.
    #[error("cannot parse '{input}' as a number with an optional unit")]
    Malformed {
        /// The offending text.
        input: String,
    },

    /// The unit (or its prefix) is not recognized.
    #[error("unknown unit '{unit}'")]
    UnknownUnit {
        /// The unrecognized unit.
        unit: String,
    },

    /// The unit measures a different quantity than the one expected.
    #[error("unit '{found}' cannot be converted to '{expected}'")]
    Incompatible {
        /// Unit found in the input.
        found: String,
        /// Unit the value is converted into.
        expected: String,
    },

    /// A unit was given where a plain number is required.
    #[error("'{input}' must be a plain number")]
    UnexpectedUnit {
        /// The offending text.
        input: String,
    },

    /// The value does not fit the exact rational representation.
    #[error("'{input}' is out of range")]
    OutOfRange {
        /// The offending text.
        input: String,
    },
}

/// Errors that can occur while building or validating a render configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Channel count must be positive.
    #[error("invalid channel count: {channels} (must be at least 1)")]
    InvalidChannels {
        /// The rejected channel count.
        channels: u16,
    },

    /// Sample width must be 8, 16, 24, or 32 bits.
    #[error("invalid sample width: {bits} bits (expected 8, 16, 24, or 32)")]
    InvalidSampleWidth {
        /// The rejected width.
        bits: u16,
    },

    /// Sample rate must be positive.
    #[error("invalid sample rate: {rate} Hz")]
    InvalidSampleRate {
        /// The rejected rate.
        rate: u32,
    },

    /// A duration that must be positive was zero or negative.
    #[error("{name} must be positive, got {value}")]
    NonPositiveDuration {
        /// Which duration was rejected.
        name: &'static str,
        /// The rejected value, formatted with its unit.
        value: String,
    },

    /// Frequency bounds must both be positive.
    #[error("invalid frequency range: min={min}, max={max} (both must be positive)")]
    InvalidFrequencyRange {
        /// Lower bound as given.
        min: String,
        /// Upper bound as given.
        max: String,
    },

    /// Gain must lie in `[0, 1]`.
    #[error("invalid gain: {gain} (must be between 0 and 1)")]
    InvalidGain {
        /// The rejected gain.
        gain: String,
    },

    /// Per-image settings only accept `gain`, `min`, and `max`.
    #[error("unknown image setting '{key}' (expected gain, min, or max)")]
    UnknownSetting {
        /// The unrecognized key.
        key: String,
    },

    /// A settings entry is not of the form `KEY=VALUE`.
    #[error("malformed image setting '{entry}' (expected KEY=VALUE)")]
    MalformedSetting {
        /// The offending entry.
        entry: String,
    },

    /// A value could not be parsed.
    #[error("invalid value for '{key}': {source}")]
    Unit {
        /// The setting or option the value belongs to.
        key: String,
        /// The underlying parse error.
        #[source]
        source: UnitError,
    },

    /// An input image does not exist.
    #[error("input file does not exist: {}", path.display())]
    InputNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// I/O error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a unit error tagged with the key it was parsed for.
    pub fn unit(key: impl Into<String>, source: UnitError) -> Self {
        Self::Unit {
            key: key.into(),
            source,
        }
    }

    /// Returns a stable error code for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidChannels { .. } => "CONFIG_001",
            ConfigError::InvalidSampleWidth { .. } => "CONFIG_002",
            ConfigError::InvalidSampleRate { .. } => "CONFIG_003",
            ConfigError::NonPositiveDuration { .. } => "CONFIG_004",
            ConfigError::InvalidFrequencyRange { .. } => "CONFIG_005",
            ConfigError::InvalidGain { .. } => "CONFIG_006",
            ConfigError::UnknownSetting { .. } => "CONFIG_007",
            ConfigError::MalformedSetting { .. } => "CONFIG_008",
            ConfigError::Unit { .. } => "CONFIG_009",
            ConfigError::InputNotFound { .. } => "CONFIG_010",
            ConfigError::Io(_) => "CONFIG_011",
            ConfigError::Json(_) => "CONFIG_012",
        }
    }
}
