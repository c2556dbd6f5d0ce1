//! One image bound to its frequencies, gain, and oscillators.

use pixtone_spec::units::to_f64;
use pixtone_spec::ImageSettings;

use crate::error::{SynthError, SynthResult};
use crate::frequency::FrequencyMap;
use crate::pixels::PixelGrid;
use crate::wavetable::{Oscillator, WaveTableCache};

/// An image taking part in the mix.
///
/// The column being played is always derived from the global sample index,
/// so every source stays in step with the others. The only state carried from
/// one sample to the next is each row's oscillator.
#[derive(Debug, Clone)]
pub struct MixSource {
    name: String,
    grid: PixelGrid,
    settings: ImageSettings,
    frequencies: FrequencyMap,
    gain: f64,
    one_column_samples: u64,
    /// Indexed by pixel row (row 0 = top).
    oscillators: Vec<Oscillator>,
}

impl MixSource {
    /// Binds an image to its settings, sharing wave tables through `cache`.
    ///
    /// # Errors
    /// Fails if the settings are invalid, `one_column_samples` is zero, or a
    /// wave table cannot be built.
    pub fn new(
        name: impl Into<String>,
        grid: PixelGrid,
        settings: ImageSettings,
        one_column_samples: u64,
        cache: &mut WaveTableCache,
    ) -> SynthResult<Self> {
        settings.validate()?;
        if one_column_samples == 0 {
            return Err(SynthError::EmptyTimeline {
                columns: grid.columns() as u64,
                one_column_samples,
                total_samples: 0,
            });
        }

        let rows = grid.rows();
        let frequencies = FrequencyMap::build(settings.min, settings.max, rows)?;
        let oscillators = (0..rows)
            .map(|row| {
                let frequency = frequencies
                    .for_pixel_row(row)
                    .ok_or(SynthError::InvalidRange { rows })?;
                Ok(Oscillator::new(cache.get_or_build(frequency)?))
            })
            .collect::<SynthResult<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            gain: to_f64(settings.gain),
            grid,
            settings,
            frequencies,
            one_column_samples,
            oscillators,
        })
    }

    /// Normalized contribution at a global sample index, at most `gain` in
    /// magnitude.
    ///
    /// Each row adds `weight * oscillator * gain`, and the sum is divided by
    /// the row count so a fully white image reaches exactly `gain`. `gain`
    /// therefore bounds the whole column, not each row: a tall image with a
    /// few bright rows plays at roughly `gain * bright_rows / rows`. Every
    /// row's oscillator advances once per call, whatever its weight. Past the
    /// last column the source is silent.
    pub fn sample_at(&mut self, index: u64) -> f64 {
        let column = index / self.one_column_samples;
        if column >= self.grid.columns() as u64 {
            return 0.0;
        }

        let pixels = self.grid.column(column as usize);
        let mut total = 0.0;
        for (pixel, osc) in pixels.iter().zip(self.oscillators.iter_mut()) {
            total += pixel.weight() * osc.next_sample() * self.gain;
        }
        total / pixels.len() as f64
    }

    /// Display name (usually the image path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of image columns.
    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    /// Number of image rows.
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Settings the source was built with.
    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Row frequencies, bottom row first.
    pub fn frequencies(&self) -> &FrequencyMap {
        &self.frequencies
    }

    /// First sample index at which this source is silent.
    pub fn end_sample(&self) -> u64 {
        self.grid.columns() as u64 * self.one_column_samples
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use pixtone_spec::{Hertz, Rational};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::pixels::Pixel;

    fn tone(min: i128, max: i128, gain: Rational) -> ImageSettings {
        ImageSettings {
            gain,
            min: Hertz::from_integer(min),
            max: Hertz::from_integer(max),
        }
    }

    fn full() -> Rational {
        Rational::from_integer(1)
    }

    #[test]
    fn test_single_white_pixel_is_pure_sine() {
        let mut cache = WaveTableCache::new(8000);
        let grid = PixelGrid::filled(1, 1, Pixel::WHITE).unwrap();
        let mut source = MixSource::new("a", grid, tone(440, 440, full()), 8000, &mut cache).unwrap();

        for n in 0..8000u64 {
            let expected = (TAU * 440.0 * n as f64 / 8000.0).sin();
            assert!((source.sample_at(n) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_silent_past_last_column() {
        let mut cache = WaveTableCache::new(8000);
        let grid = PixelGrid::filled(3, 2, Pixel::WHITE).unwrap();
        let mut source = MixSource::new("a", grid, ImageSettings::default(), 10, &mut cache).unwrap();

        assert_eq!(source.end_sample(), 30);
        for index in [30, 31, 1000, u64::MAX] {
            assert_eq!(source.sample_at(index), 0.0);
        }
    }

    #[test]
    fn test_weight_scales_contribution() {
        let mut cache = WaveTableCache::new(8000);
        let bright = PixelGrid::filled(1, 1, Pixel::WHITE).unwrap();
        let dim = PixelGrid::filled(1, 1, Pixel::new(255, 0)).unwrap();
        let settings = tone(1000, 1000, full());
        let mut bright = MixSource::new("bright", bright, settings, 100, &mut cache).unwrap();
        let mut dim = MixSource::new("dim", dim, settings, 100, &mut cache).unwrap();

        bright.sample_at(0);
        dim.sample_at(0);
        assert!(bright.sample_at(1).abs() > 0.5);
        assert_eq!(dim.sample_at(1), 0.0);
    }

    #[test]
    fn test_phase_continues_across_columns() {
        let mut cache = WaveTableCache::new(8000);
        // Column 0 is black, column 1 is white: the tone must resume mid-phase.
        let grid = PixelGrid::from_columns(vec![vec![Pixel::BLACK], vec![Pixel::WHITE]]).unwrap();
        let mut source = MixSource::new("a", grid, tone(440, 440, full()), 5, &mut cache).unwrap();

        for n in 0..5 {
            assert_eq!(source.sample_at(n), 0.0);
        }
        let expected = (TAU * 440.0 * 5.0 / 8000.0).sin();
        assert!((source.sample_at(5) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rows_share_tables_with_other_sources() {
        let mut cache = WaveTableCache::new(44_100);
        let grid = PixelGrid::filled(2, 4, Pixel::WHITE).unwrap();
        MixSource::new("a", grid.clone(), ImageSettings::default(), 441, &mut cache).unwrap();
        MixSource::new("b", grid, ImageSettings::default(), 441, &mut cache).unwrap();
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_white_image_peaks_at_gain() {
        let mut cache = WaveTableCache::new(8000);
        let grid = PixelGrid::filled(1, 3, Pixel::WHITE).unwrap();
        let half = Rational::new(1, 2);
        let mut source = MixSource::new("a", grid, tone(100, 100, half), 8000, &mut cache).unwrap();

        let peak = (0..8000).map(|n| source.sample_at(n).abs()).fold(0.0, f64::max);
        assert!((peak - 0.5).abs() < 1e-12, "peak {peak}");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut cache = WaveTableCache::new(8000);
        let grid = PixelGrid::filled(1, 1, Pixel::WHITE).unwrap();
        let err = MixSource::new("a", grid, tone(0, 440, full()), 10, &mut cache).unwrap_err();
        assert_eq!(err.code(), "SYNTH_001");
    }
}
