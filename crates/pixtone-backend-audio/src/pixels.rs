//! Column-major pixel grids.

use crate::error::{SynthError, SynthResult};

/// One pixel reduced to what synthesis needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    /// Brightness, 0 (black) to 255.
    pub intensity: u8,
    /// Opacity, 0 (transparent) to 255.
    pub alpha: u8,
}

impl Pixel {
    /// A fully opaque, fully bright pixel.
    pub const WHITE: Pixel = Pixel::new(255, 255);

    /// A fully opaque black pixel.
    pub const BLACK: Pixel = Pixel::new(0, 255);

    /// Creates a pixel from intensity and alpha.
    pub const fn new(intensity: u8, alpha: u8) -> Self {
        Self { intensity, alpha }
    }

    /// Reduces an RGBA pixel; intensity is the HSV value (brightest channel).
    pub fn from_rgba([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r.max(g).max(b), a)
    }

    /// Amplitude weight in `[0, 1]`: intensity fraction times alpha fraction.
    pub fn weight(&self) -> f64 {
        (f64::from(self.intensity) / 255.0) * (f64::from(self.alpha) / 255.0)
    }
}

/// A `columns x rows` grid of pixels stored column by column.
///
/// Row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    columns: usize,
    rows: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Wraps column-major pixel data.
    ///
    /// # Errors
    /// [`SynthError::InvalidRange`] for zero rows, and
    /// [`SynthError::PixelDataMismatch`] if `pixels.len() != columns * rows`.
    pub fn new(columns: usize, rows: usize, pixels: Vec<Pixel>) -> SynthResult<Self> {
        if rows == 0 {
            return Err(SynthError::InvalidRange { rows });
        }
        let expected = columns * rows;
        if pixels.len() != expected {
            return Err(SynthError::PixelDataMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            pixels,
        })
    }

    /// Builds a grid where every pixel is `pixel`.
    pub fn filled(columns: usize, rows: usize, pixel: Pixel) -> SynthResult<Self> {
        Self::new(columns, rows, vec![pixel; columns * rows])
    }

    /// Builds a grid from a list of columns, each listed top to bottom.
    pub fn from_columns(columns: Vec<Vec<Pixel>>) -> SynthResult<Self> {
        let rows = columns.first().map_or(0, Vec::len);
        let count = columns.len();
        if let Some(ragged) = columns.iter().find(|column| column.len() != rows) {
            return Err(SynthError::PixelDataMismatch {
                expected: rows,
                actual: ragged.len(),
            });
        }
        let pixels: Vec<Pixel> = columns.into_iter().flatten().collect();
        Self::new(count, rows, pixels)
    }

    /// Converts row-major RGBA bytes (as decoded from an image) into a grid.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> SynthResult<Self> {
        let columns = width as usize;
        let rows = height as usize;
        let expected = columns * rows * 4;
        if rgba.len() != expected {
            return Err(SynthError::PixelDataMismatch {
                expected,
                actual: rgba.len(),
            });
        }

        let mut pixels = Vec::with_capacity(columns * rows);
        for column in 0..columns {
            for row in 0..rows {
                let offset = (row * columns + column) * 4;
                let px = [
                    rgba[offset],
                    rgba[offset + 1],
                    rgba[offset + 2],
                    rgba[offset + 3],
                ];
                pixels.push(Pixel::from_rgba(px));
            }
        }
        Self::new(columns, rows, pixels)
    }

    /// Number of columns (time slices).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows (partials).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Pixels of one column, top to bottom.
    pub fn column(&self, column: usize) -> &[Pixel] {
        let start = column * self.rows;
        &self.pixels[start..start + self.rows]
    }

    /// Pixel at `(column, row)`.
    pub fn get(&self, column: usize, row: usize) -> Pixel {
        self.pixels[column * self.rows + row]
    }
}
