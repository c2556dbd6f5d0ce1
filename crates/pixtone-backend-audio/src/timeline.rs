//! Timeline resolution: durations to sample counts and back.
//!
//! The user supplies either the time per image column or the total output
//! time; the other is derived from the column count. Both are converted into
//! whole sample counts and then re-derived from those counts, so the reported
//! durations are exactly what the samples represent. All arithmetic here is
//! exact.

use num_traits::{CheckedDiv, CheckedMul};
use pixtone_spec::{ConfigError, Millis, Rational, Timing};
use serde::Serialize;

use crate::error::{SynthError, SynthResult};

/// Resolved sample counts and durations for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    /// Samples per second.
    pub sample_rate: u32,
    /// Maximum column count across all sources.
    pub columns: u64,
    /// Pixel duration before sample alignment.
    pub requested_pixel: Millis,
    /// Full duration before sample alignment.
    pub requested_full: Millis,
    /// `requested_full / requested_pixel`.
    pub duration_ratio: Rational,
    /// Samples per image column.
    pub one_column_samples: u64,
    /// Samples in the whole run.
    pub total_samples: u64,
    /// Pixel duration represented by `one_column_samples`.
    pub pixel_duration: Millis,
    /// Full duration represented by `total_samples`.
    pub full_duration: Millis,
}

impl Timeline {
    /// Resolves a timing against a sample rate and column count.
    ///
    /// # Errors
    /// * [`SynthError::Config`] for a zero sample rate or a non-positive duration
    /// * [`SynthError::EmptyTimeline`] if either sample count is zero
    /// * [`SynthError::TimelineOverflow`] if an intermediate value overflows
    pub fn resolve(timing: Timing, sample_rate: u32, columns: u64) -> SynthResult<Self> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate { rate: sample_rate }.into());
        }
        let supplied = timing.duration();
        if !supplied.is_positive() {
            return Err(ConfigError::NonPositiveDuration {
                name: timing.name(),
                value: supplied.to_string(),
            }
            .into());
        }
        if columns == 0 {
            return Err(SynthError::EmptyTimeline {
                columns,
                one_column_samples: 0,
                total_samples: 0,
            });
        }

        let column_count = Rational::from_integer(i128::from(columns));
        let (pixel, full) = match timing {
            Timing::PixelDuration(pixel) => {
                let full = checked(pixel.value().checked_mul(&column_count), "full duration")?;
                (pixel.value(), full)
            }
            Timing::FullDuration(full) => {
                let pixel = checked(full.value().checked_div(&column_count), "pixel duration")?;
                (pixel, full.value())
            }
        };
        let duration_ratio = checked(full.checked_div(&pixel), "duration ratio")?;

        let rate = Rational::from_integer(i128::from(sample_rate));
        let per_ms = rate / Rational::from_integer(1000);
        let one_column_samples = checked(pixel.checked_mul(&per_ms), "samples per column")?;
        let one_column_samples = to_count(one_column_samples, "samples per column")?;

        let total_samples = checked(
            Rational::from_integer(i128::from(one_column_samples)).checked_mul(&duration_ratio),
            "total samples",
        )?;
        let total_samples = to_count(total_samples, "total samples")?;

        if one_column_samples == 0 || total_samples == 0 {
            return Err(SynthError::EmptyTimeline {
                columns,
                one_column_samples,
                total_samples,
            });
        }

        Ok(Self {
            sample_rate,
            columns,
            requested_pixel: Millis::new(pixel),
            requested_full: Millis::new(full),
            duration_ratio,
            one_column_samples,
            total_samples,
            pixel_duration: samples_to_millis(one_column_samples, sample_rate),
            full_duration: samples_to_millis(total_samples, sample_rate),
        })
    }

    /// Image column playing at a global sample index.
    pub fn column_at(&self, index: u64) -> u64 {
        index / self.one_column_samples
    }

    /// Exact duration of `samples` samples.
    pub fn duration_of(&self, samples: u64) -> Millis {
        samples_to_millis(samples, self.sample_rate)
    }

    /// Snapshot for reports, with durations rendered as unit strings.
    pub fn report(&self) -> TimelineReport {
        TimelineReport {
            columns: self.columns,
            one_column_samples: self.one_column_samples,
            total_samples: self.total_samples,
            requested_pixel_duration: self.requested_pixel.to_string(),
            requested_full_duration: self.requested_full.to_string(),
            pixel_duration: self.pixel_duration.to_string(),
            full_duration: self.full_duration.to_string(),
        }
    }
}

/// Serializable view of a [`Timeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineReport {
    /// Maximum column count across all sources.
    pub columns: u64,
    /// Samples per image column.
    pub one_column_samples: u64,
    /// Samples in the whole run.
    pub total_samples: u64,
    /// Pixel duration before sample alignment.
    pub requested_pixel_duration: String,
    /// Full duration before sample alignment.
    pub requested_full_duration: String,
    /// Sample-aligned pixel duration.
    pub pixel_duration: String,
    /// Sample-aligned full duration.
    pub full_duration: String,
}

fn samples_to_millis(samples: u64, sample_rate: u32) -> Millis {
    Millis::new(Rational::new(
        i128::from(samples) * 1000,
        i128::from(sample_rate),
    ))
}

fn checked(value: Option<Rational>, what: &'static str) -> SynthResult<Rational> {
    value.ok_or(SynthError::TimelineOverflow { what })
}

fn to_count(value: Rational, what: &'static str) -> SynthResult<u64> {
    u64::try_from(value.floor().to_integer()).map_err(|_| SynthError::TimelineOverflow { what })
}
