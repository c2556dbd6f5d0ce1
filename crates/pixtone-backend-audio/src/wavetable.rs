//! Precomputed sine waves.
//!
//! A [`WaveTable`] describes one sine wave at one frequency and sample rate so
//! that an [`Oscillator`] can produce it sample by sample without calling
//! `sin`. Two layouts exist:
//!
//! - **Cycle**: when `sample_rate / frequency` reduces to a fraction `p / q`
//!   with a short numerator, the wave repeats exactly every `p` samples. The
//!   table stores the `p` offsets between consecutive samples and the
//!   oscillator adds them to a running value.
//! - **Phase**: otherwise the oscillator advances a phase accumulator by
//!   `frequency / sample_rate` per sample and reads a shared one-period sine
//!   table with linear interpolation.
//!
//! Tables are immutable once built and shared through [`WaveTableCache`],
//! keyed by the exact frequency.

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::Arc;

use num_traits::CheckedDiv;
use pixtone_spec::units::to_f64;
use pixtone_spec::Rational;

use crate::error::{SynthError, SynthResult};


/// Longest exact cycle stored as an offset table, in samples.
pub const MAX_CYCLE_LEN: usize = 4096;

/// Entries in one period of the shared sine table.
pub const SINE_TABLE_SIZE: usize = 4096;

/// Builds one sine period with a guard entry so interpolation never wraps.
pub fn sine_table() -> Arc<[f64]> {
    (0..=SINE_TABLE_SIZE)
        .map(|i| (TAU * i as f64 / SINE_TABLE_SIZE as f64).sin())
        .collect()
}

#[derive(Debug)]
enum Layout {
    Cycle { offsets: Box<[f64]> },
    Phase { increment: f64, sine: Arc<[f64]> },
}

/// An immutable sine wave description for one frequency.
#[derive(Debug)]
pub struct WaveTable {
    frequency: Rational,
    sample_rate: u32,
    layout: Layout,
}

impl WaveTable {
    /// Builds a table with its own sine lookup.
    ///
    /// # Errors
    /// [`SynthError::InvalidFrequency`] if `frequency <= 0`.
    pub fn build(frequency: Rational, sample_rate: u32) -> SynthResult<Self> {
        Self::build_with_sine(frequency, sample_rate, sine_table())
    }

    /// Builds a table, reusing `sine` if a phase layout is needed.
    pub fn build_with_sine(
        frequency: Rational,
        sample_rate: u32,
        sine: Arc<[f64]>,
    ) -> SynthResult<Self> {
        if frequency <= Rational::from_integer(0) {
            return Err(SynthError::invalid_frequency(frequency));
        }
        if sample_rate == 0 {
            return Err(pixtone_spec::ConfigError::InvalidSampleRate { rate: sample_rate }.into());
        }

        let samples_per_cycles = Rational::from_integer(i128::from(sample_rate))
            .checked_div(&frequency)
            .ok_or(SynthError::FrequencyOverflow {
                what: "samples per cycle",
            })?;
        let period = usize::try_from(*samples_per_cycles.numer())
            .ok()
            .filter(|&p| p <= MAX_CYCLE_LEN);

        let layout = match period {
            Some(period) => {
                let cycles = *samples_per_cycles.denom() as f64;
                let value = |k: usize| (TAU * cycles * k as f64 / period as f64).sin();
                let offsets = (0..period)
                    .map(|k| {
                        let next = if k + 1 == period { 0.0 } else { value(k + 1) };
                        next - value(k)
                    })
                    .collect();
                Layout::Cycle { offsets }
            }
            None => Layout::Phase {
                increment: to_f64(frequency) / f64::from(sample_rate),
                sine,
            },
        };

        Ok(Self {
            frequency,
            sample_rate,
            layout,
        })
    }

    /// The exact frequency.
    pub fn frequency(&self) -> Rational {
        self.frequency
    }

    /// The sample rate the table was built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the exact cycle in samples, or `None` for a phase table.
    pub fn cycle_len(&self) -> Option<usize> {
        match &self.layout {
            Layout::Cycle { offsets } => Some(offsets.len()),
            Layout::Phase { .. } => None,
        }
    }
}

/// Running state reading one [`WaveTable`].
#[derive(Debug, Clone)]
pub struct Oscillator {
    table: Arc<WaveTable>,
    position: usize,
    value: f64,
    phase: f64,
}

impl Oscillator {
    /// Starts an oscillator at phase zero.
    pub fn new(table: Arc<WaveTable>) -> Self {
        Self {
            table,
            position: 0,
            value: 0.0,
            phase: 0.0,
        }
    }

    /// Returns the current sample in `[-1, 1]` and advances by one sample.
    pub fn next_sample(&mut self) -> f64 {
        match &self.table.layout {
            Layout::Cycle { offsets } => {
                let current = self.value;
                self.value += offsets[self.position];
                self.position += 1;
                if self.position == offsets.len() {
                    // Every cycle starts from an exact zero.
                    self.position = 0;
                    self.value = 0.0;
                }
                current
            }
            Layout::Phase { increment, sine } => {
                let current = lookup(sine, self.phase);
                self.phase += increment;
                if self.phase >= 1.0 {
                    self.phase -= self.phase.floor();
                }
                current
            }
        }
    }

    /// The table this oscillator reads.
    pub fn table(&self) -> &Arc<WaveTable> {
        &self.table
    }
}

fn lookup(sine: &[f64], phase: f64) -> f64 {
    let pos = phase * SINE_TABLE_SIZE as f64;
    let idx = (pos.floor() as usize).min(SINE_TABLE_SIZE - 1);
    let frac = pos - idx as f64;
    let a = sine[idx];
    let b = sine[idx + 1];
    a + (b - a) * frac
}

/// Per-run memo of wave tables keyed by exact frequency.
#[derive(Debug)]
pub struct WaveTableCache {
    sample_rate: u32,
    sine: Arc<[f64]>,
    tables: HashMap<Rational, Arc<WaveTable>>,
}

impl WaveTableCache {
    /// Creates an empty cache for one sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            sine: sine_table(),
            tables: HashMap::new(),
        }
    }

    /// Returns the table for `frequency`, building it on first request.
    pub fn get_or_build(&mut self, frequency: Rational) -> SynthResult<Arc<WaveTable>> {
        if let Some(table) = self.tables.get(&frequency) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(WaveTable::build_with_sine(
            frequency,
            self.sample_rate,
            Arc::clone(&self.sine),
        )?);
        self.tables.insert(frequency, Arc::clone(&table));
        Ok(table)
    }

    /// Number of distinct tables built so far.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True if no table has been built.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// The sample rate every table is built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
