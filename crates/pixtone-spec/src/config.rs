//! Render configuration: output format and timing.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::units::Millis;

/// Default number of output channels.
pub const DEFAULT_CHANNELS: u16 = 1;

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default time per image column in milliseconds.
pub const DEFAULT_PIXEL_DURATION_MS: i128 = 10;

/// Default offset between synthesis and playback in play-at-once mode.
pub const DEFAULT_PLAYBACK_LATENCY_MS: i128 = 200;

/// Bit depth of one output sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum SampleWidth {
    /// 8-bit samples.
    Bits8,
    /// 16-bit samples.
    #[default]
    Bits16,
    /// 24-bit samples.
    Bits24,
    /// 32-bit samples.
    Bits32,
}

impl SampleWidth {
    /// Converts a bit count into a sample width.
    pub fn from_bits(bits: u16) -> ConfigResult<Self> {
        match bits {
            8 => Ok(SampleWidth::Bits8),
            16 => Ok(SampleWidth::Bits16),
            24 => Ok(SampleWidth::Bits24),
            32 => Ok(SampleWidth::Bits32),
            _ => Err(ConfigError::InvalidSampleWidth { bits }),
        }
    }

    /// Bits per sample.
    pub fn bits(self) -> u16 {
        match self {
            SampleWidth::Bits8 => 8,
            SampleWidth::Bits16 => 16,
            SampleWidth::Bits24 => 24,
            SampleWidth::Bits32 => 32,
        }
    }

    /// Bytes per sample.
    pub fn bytes(self) -> usize {
        usize::from(self.bits() / 8)
    }

    /// `2^(bits-1)`: the magnitude of the most negative sample.
    pub fn max_amplitude(self) -> i64 {
        1i64 << (self.bits() - 1)
    }

    /// Smallest representable sample, `-max_amplitude`.
    pub fn min_sample(self) -> i32 {
        (-self.max_amplitude()) as i32
    }

    /// Largest representable sample, `max_amplitude - 1`.
    pub fn max_sample(self) -> i32 {
        (self.max_amplitude() - 1) as i32
    }
}

impl TryFrom<u16> for SampleWidth {
    type Error = ConfigError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl From<SampleWidth> for u16 {
    fn from(width: SampleWidth) -> u16 {
        width.bits()
    }
}

impl fmt::Display for SampleWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Which duration the user supplied; the other one is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Time per image column.
    PixelDuration(Millis),
    /// Total output time.
    FullDuration(Millis),
}

impl Default for Timing {
    fn default() -> Self {
        Timing::PixelDuration(Millis::from_integer(DEFAULT_PIXEL_DURATION_MS))
    }
}

impl Timing {
    /// Returns the supplied duration.
    pub fn duration(&self) -> Millis {
        match self {
            Timing::PixelDuration(ms) | Timing::FullDuration(ms) => *ms,
        }
    }

    /// Human-readable name of the supplied duration.
    pub fn name(&self) -> &'static str {
        match self {
            Timing::PixelDuration(_) => "pixel duration",
            Timing::FullDuration(_) => "full duration",
        }
    }
}

/// Output format and timing for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Number of interleaved output channels.
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Bit depth of each sample.
    #[serde(default)]
    pub sample_width: SampleWidth,
    /// Samples per second per channel.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Pixel or full duration.
    #[serde(default)]
    pub timing: Timing,
    /// Silence queued ahead of playback when playing while generating.
    #[serde(default = "default_playback_latency")]
    pub playback_latency: Millis,
}

fn default_channels() -> u16 {
    DEFAULT_CHANNELS
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_playback_latency() -> Millis {
    Millis::from_integer(DEFAULT_PLAYBACK_LATENCY_MS)
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            sample_width: SampleWidth::default(),
            sample_rate: default_sample_rate(),
            timing: Timing::default(),
            playback_latency: default_playback_latency(),
        }
    }
}

impl RenderConfig {
    /// Checks channel count, sample rate, and the supplied duration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.channels == 0 {
            return Err(ConfigError::InvalidChannels {
                channels: self.channels,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        let duration = self.timing.duration();
        if !duration.is_positive() {
            return Err(ConfigError::NonPositiveDuration {
                name: self.timing.name(),
                value: duration.to_string(),
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
