//! Render options gathered from the command line.
//!
//! [`RenderArgs`] mirrors the flags one to one and keeps durations as the text
//! the user typed, so that a bad value is reported as a configuration error
//! rather than a usage error.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use pixtone_backend_audio::PlaybackMode;
use pixtone_spec::{ConfigError, ConfigResult, Millis, RenderConfig, SampleWidth, Timing};

/// Output file used when none is given.
pub const DEFAULT_OUTPUT_FILE: &str = "out.wav";

/// Output path that selects raw PCM on standard output.
pub const STDOUT_PATH: &str = "-";

/// Extensions that select raw PCM when no format is given.
pub const RAW_EXTENSIONS: &[&str] = &["raw", "pcm"];

/// Container for the generated samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// RIFF WAVE file
    Wav,
    /// Headerless little-endian PCM
    Raw,
}

impl OutputFormat {
    /// Picks a format from the file extension (`.raw`/`.pcm` are raw).
    pub fn from_path(path: &Path) -> Self {
        let is_raw = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| RAW_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_raw {
            OutputFormat::Raw
        } else {
            OutputFormat::Wav
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Raw => "raw",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the samples are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Raw PCM on standard output.
    Stdout,
    /// A file of the given format.
    File {
        /// Destination path.
        path: PathBuf,
        /// Container.
        format: OutputFormat,
    },
}

impl OutputTarget {
    /// Display form: the path, or `<stdout>`.
    pub fn describe(&self) -> String {
        match self {
            OutputTarget::Stdout => "<stdout>".to_string(),
            OutputTarget::File { path, .. } => path.display().to_string(),
        }
    }

    /// The container written to this target.
    pub fn format(&self) -> OutputFormat {
        match self {
            OutputTarget::Stdout => OutputFormat::Raw,
            OutputTarget::File { format, .. } => *format,
        }
    }
}

/// Everything the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderArgs {
    /// `PATH` or `PATH/KEY=VALUE,...` for each image.
    pub inputs: Vec<String>,
    /// Explicit output file.
    pub output_file: Option<PathBuf>,
    /// Skip file output entirely.
    pub no_output_file: bool,
    /// Explicit container.
    pub output_format: Option<OutputFormat>,
    /// Replace an existing output file.
    pub overwrite: bool,
    /// Play after generating.
    pub play: bool,
    /// Play while generating.
    pub play_at_once: bool,
    /// Time per column, default unit ms.
    pub pixel_duration: Option<String>,
    /// Total time, default unit ms; wins over `pixel_duration`.
    pub full_duration: Option<String>,
    /// Output channels.
    pub channels: Option<u16>,
    /// Bits per sample.
    pub sample_width: Option<u16>,
    /// Frames per second.
    pub framerate: Option<u32>,
    /// Silence ahead of playback when playing while generating.
    pub latency: Option<String>,
    /// JSON configuration loaded before the flags are applied.
    pub config: Option<PathBuf>,
    /// No notices and no progress bar.
    pub quiet: bool,
    /// No progress bar.
    pub no_progressbar: bool,
    /// Machine-readable output.
    pub json: bool,
}

impl RenderArgs {
    /// Builds the render configuration: the config file (or defaults), then
    /// every flag that was given.
    pub fn render_config(&self) -> ConfigResult<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::from_json_file(path)?,
            None => RenderConfig::default(),
        };

        if let Some(channels) = self.channels {
            config.channels = channels;
        }
        if let Some(bits) = self.sample_width {
            config.sample_width = SampleWidth::from_bits(bits)?;
        }
        if let Some(rate) = self.framerate {
            config.sample_rate = rate;
        }
        if let Some(text) = &self.pixel_duration {
            config.timing = Timing::PixelDuration(parse_millis("pixel-duration", text)?);
        }
        if let Some(text) = &self.full_duration {
            config.timing = Timing::FullDuration(parse_millis("full-duration", text)?);
        }
        if let Some(text) = &self.latency {
            config.playback_latency = parse_millis("latency", text)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolves the output destination, or `None` without file output.
    pub fn output_target(&self) -> Option<OutputTarget> {
        if self.no_output_file {
            return None;
        }
        let path = self
            .output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
        if path.as_os_str() == STDOUT_PATH {
            return Some(OutputTarget::Stdout);
        }
        let format = self
            .output_format
            .unwrap_or_else(|| OutputFormat::from_path(&path));
        Some(OutputTarget::File { path, format })
    }

    /// Requested playback, if any. `--play-at-once` implies `--play`.
    pub fn playback_mode(&self, latency: Millis) -> Option<PlaybackMode> {
        if self.play_at_once {
            Some(PlaybackMode::WhileGenerating { latency })
        } else if self.play {
            Some(PlaybackMode::AfterGenerating)
        } else {
            None
        }
    }

    /// Whether notices are printed.
    pub fn show_notices(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Whether a progress bar is drawn.
    pub fn show_progress(&self) -> bool {
        self.show_notices() && !self.no_progressbar
    }
}

fn parse_millis(key: &str, text: &str) -> ConfigResult<Millis> {
    text.parse::<Millis>()
        .map_err(|source| ConfigError::unit(key, source))
}
