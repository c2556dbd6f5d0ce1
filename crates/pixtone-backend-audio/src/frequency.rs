//! Row-to-frequency mapping.

use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub};
use pixtone_spec::{Hertz, Rational};

use crate::error::{SynthError, SynthResult};

/// Frequencies for the rows of one image, ordered bottom row first.
///
/// Index `i` holds `min + (max - min) / rows * i`, so the bottom pixel row gets
/// `min` and each row above it one equal step more. The top row stays one step
/// short of `max`. A `max` below `min` yields a decreasing map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMap {
    frequencies: Vec<Rational>,
}

impl FrequencyMap {
    /// Builds the map for `rows` rows.
    ///
    /// # Errors
    /// * [`SynthError::InvalidRange`] if `rows` is zero
    /// * [`SynthError::FrequencyOverflow`] if a row frequency does not fit
    pub fn build(min: Hertz, max: Hertz, rows: usize) -> SynthResult<Self> {
        if rows == 0 {
            return Err(SynthError::InvalidRange { rows });
        }

        let min = min.value();
        let span = checked(max.value().checked_sub(&min), "frequency span")?;
        let step = checked(
            span.checked_div(&Rational::from_integer(rows as i128)),
            "row step",
        )?;
        let frequencies = (0..rows)
            .map(|i| {
                let offset = step.checked_mul(&Rational::from_integer(i as i128));
                checked(offset.and_then(|o| min.checked_add(&o)), "row frequency")
            })
            .collect::<SynthResult<_>>()?;

        Ok(Self { frequencies })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always false for a successfully built map.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency for the `index`-th row counted from the bottom.
    pub fn get(&self, index: usize) -> Option<Rational> {
        self.frequencies.get(index).copied()
    }

    /// Frequency for a pixel row counted from the top (row 0 = top).
    pub fn for_pixel_row(&self, row: usize) -> Option<Rational> {
        let index = self.frequencies.len().checked_sub(row + 1)?;
        self.get(index)
    }

    /// All frequencies, bottom row first.
    pub fn as_slice(&self) -> &[Rational] {
        &self.frequencies
    }
}

fn checked(value: Option<Rational>, what: &'static str) -> SynthResult<Rational> {
    value.ok_or(SynthError::FrequencyOverflow { what })
}
