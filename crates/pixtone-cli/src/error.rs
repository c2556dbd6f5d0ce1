//! Errors that end a render, with their exit codes.

use std::path::PathBuf;

use pixtone_backend_audio::{SinkError, SynthError};
use pixtone_spec::ConfigError;
use thiserror::Error;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Exit status for a finished render.
pub mod exit_codes {
    /// Every sample was produced and every sink succeeded.
    pub const SUCCESS: u8 = 0;
    /// Bad configuration, settings, or input images.
    pub const CONFIG: u8 = 1;
    /// Synthesis or a sink failed.
    pub const SYNTHESIS: u8 = 2;
    /// Interrupted by the user.
    pub const CANCELLED: u8 = 130;
}

/// Stable error codes for CLI-level failures in JSON output.
pub mod error_codes {
    /// Image could not be decoded
    pub const IMAGE_DECODE: &str = "CLI_001";
    /// Output file exists and overwriting was not requested
    pub const OUTPUT_EXISTS: &str = "CLI_002";
    /// WAVE output cannot be streamed to stdout
    pub const WAV_TO_STDOUT: &str = "CLI_003";
    /// JSON output and raw PCM would share stdout
    pub const STDOUT_CONFLICT: &str = "CLI_004";
    /// Playback requested in a build without audio output
    pub const PLAYBACK_UNAVAILABLE: &str = "CLI_005";
    /// No input images
    pub const NO_INPUTS: &str = "CLI_006";
    /// A sink could not be opened
    pub const SINK_OPEN: &str = "CLI_007";
}

/// Why a render did not complete.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Invalid configuration, settings, or missing input.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An input could not be decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        /// The image path.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The output file exists and `--overwrite` was not given.
    #[error("output file {} already exists (use --overwrite to replace it)", path.display())]
    OutputExists {
        /// The existing file.
        path: PathBuf,
    },

    /// WAVE needs a seekable destination.
    #[error("WAVE output cannot be written to stdout; use --output-format raw")]
    WavToStdout,

    /// `--json` and `-o -` both want stdout.
    #[error("--json cannot be combined with PCM output to stdout")]
    StdoutConflict,

    /// Playback needs the `playback` feature.
    #[error("audio playback is not available in this build (enable the 'playback' feature)")]
    PlaybackUnavailable,

    /// Nothing to render.
    #[error("no input images given")]
    NoInputs,

    /// A sink failed before the run started.
    #[error("failed to open {what}: {source}")]
    SinkOpen {
        /// Which output.
        what: String,
        /// The underlying error.
        #[source]
        source: SinkError,
    },

    /// The run itself failed or was cancelled.
    #[error(transparent)]
    Synth(#[from] SynthError),
}

impl RenderError {
    /// Stable code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::Config(e) => e.code(),
            RenderError::Image { .. } => error_codes::IMAGE_DECODE,
            RenderError::OutputExists { .. } => error_codes::OUTPUT_EXISTS,
            RenderError::WavToStdout => error_codes::WAV_TO_STDOUT,
            RenderError::StdoutConflict => error_codes::STDOUT_CONFLICT,
            RenderError::PlaybackUnavailable => error_codes::PLAYBACK_UNAVAILABLE,
            RenderError::NoInputs => error_codes::NO_INPUTS,
            RenderError::SinkOpen { .. } => error_codes::SINK_OPEN,
            RenderError::Synth(e) => e.code(),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RenderError::Synth(SynthError::Cancelled { .. }) => exit_codes::CANCELLED,
            RenderError::Synth(e) if e.is_config() => exit_codes::CONFIG,
            RenderError::Synth(_) | RenderError::SinkOpen { .. } => exit_codes::SYNTHESIS,
            _ => exit_codes::CONFIG,
        }
    }

    /// True if the user interrupted the run.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenderError::Synth(SynthError::Cancelled { .. }))
    }
}
