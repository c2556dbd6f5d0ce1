//! Per-image settings and input arguments.
//!
//! Every input image carries its own gain and frequency range. On the command
//! line these are appended to the path: `photo.png/gain=0.5,min=300,max=3 kHz`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::units::{approx, parse_scalar, Hertz, Rational};

/// Default lowest frequency, assigned to the bottom pixel row.
pub const DEFAULT_MIN_FREQUENCY: i128 = 220;

/// Default highest frequency, assigned to the top pixel row.
pub const DEFAULT_MAX_FREQUENCY: i128 = 2200;

/// Gain and frequency range for one input image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSettings {
    /// Linear gain in `[0, 1]`.
    pub gain: Rational,
    /// Frequency of the bottom row.
    pub min: Hertz,
    /// Frequency of the top row.
    pub max: Hertz,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            gain: Rational::from_integer(1),
            min: Hertz::from_integer(DEFAULT_MIN_FREQUENCY),
            max: Hertz::from_integer(DEFAULT_MAX_FREQUENCY),
        }
    }
}

impl ImageSettings {
    /// Parses a comma-separated `KEY=VALUE` list on top of the defaults.
    ///
    /// Recognized keys are `gain` (plain number), `min` and `max` (frequency,
    /// `Hz` when no unit is given). Empty entries are ignored.
    ///
    /// # Errors
    /// Returns an error for unknown keys, entries without `=`, unparseable
    /// values, or settings that fail [`ImageSettings::validate`].
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut settings = Self::default();

        for entry in text.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let (key, value) =
                entry
                    .split_once('=')
                    .ok_or_else(|| ConfigError::MalformedSetting {
                        entry: entry.to_string(),
                    })?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "gain" => {
                    settings.gain = parse_scalar(value).map_err(|e| ConfigError::unit(key, e))?;
                }
                "min" => {
                    settings.min = value.parse().map_err(|e| ConfigError::unit(key, e))?;
                }
                "max" => {
                    settings.max = value.parse().map_err(|e| ConfigError::unit(key, e))?;
                }
                _ => {
                    return Err(ConfigError::UnknownSetting {
                        key: key.to_string(),
                    })
                }
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the gain lies in `[0, 1]` and both frequencies are positive.
    pub fn validate(&self) -> ConfigResult<()> {
        let zero = Rational::from_integer(0);
        let one = Rational::from_integer(1);
        if self.gain < zero || self.gain > one {
            return Err(ConfigError::InvalidGain {
                gain: self.gain.to_string(),
            });
        }
        if !self.min.is_positive() || !self.max.is_positive() {
            return Err(ConfigError::InvalidFrequencyRange {
                min: self.min.to_string(),
                max: self.max.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ImageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gain={}, min={}, max={}",
            approx(self.gain),
            self.min.approx(),
            self.max.approx()
        )
    }
}

/// One input image argument: a path plus its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    /// Path to the image file.
    pub path: PathBuf,
    /// Settings for this image.
    pub settings: ImageSettings,
}

impl InputSpec {
    /// Parses an input argument, using `exists` to probe the filesystem.
    ///
    /// An argument naming an existing file is taken as-is with default
    /// settings. Otherwise it is split at the last `/` before the first `=`
    /// into a path and a settings list, so fractions such as `gain=1/2`
    /// stay in the settings.
    pub fn parse(arg: &str, exists: impl Fn(&Path) -> bool) -> ConfigResult<Self> {
        let whole = Path::new(arg);
        if exists(whole) {
            return Ok(Self {
                path: whole.to_path_buf(),
                settings: ImageSettings::default(),
            });
        }

        let split = arg
            .find('=')
            .and_then(|eq| arg[..eq].rfind('/'))
            .map(|at| (&arg[..at], &arg[at + 1..]));
        match split {
            Some((path, settings)) => {
                let path = Path::new(path);
                if !exists(path) {
                    return Err(ConfigError::InputNotFound {
                        path: path.to_path_buf(),
                    });
                }
                Ok(Self {
                    path: path.to_path_buf(),
                    settings: ImageSettings::parse(settings)?,
                })
            }
            _ => Err(ConfigError::InputNotFound {
                path: whole.to_path_buf(),
            }),
        }
    }

    /// Parses an input argument against the real filesystem.
    pub fn parse_arg(arg: &str) -> ConfigResult<Self> {
        Self::parse(arg, Path::is_file)
    }
}
