//! Loading input images.
//!
//! Each argument names an image file, optionally followed by per-image
//! settings (`photo.png/gain=1/2,min=100Hz`). Images are decoded with the
//! `image` crate and reduced to intensity and alpha per pixel.

use std::path::{Path, PathBuf};

use pixtone_backend_audio::PixelGrid;
use pixtone_spec::{ImageSettings, InputSpec};

use crate::error::{RenderError, RenderResult};

/// A decoded image ready to be mixed.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Name shown in notices: the file name.
    pub name: String,
    /// Path the image was read from.
    pub path: PathBuf,
    /// Gain and frequency range for this image.
    pub settings: ImageSettings,
    /// The pixels, column-major.
    pub grid: PixelGrid,
}

/// Decodes an image file into a pixel grid.
pub fn load_grid(path: &Path) -> RenderResult<PixelGrid> {
    let rgba = image::open(path)
        .map_err(|source| RenderError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelGrid::from_rgba(width, height, rgba.as_raw())?)
}

/// Parses one command-line input and decodes its image.
pub fn load_input(arg: &str) -> RenderResult<LoadedImage> {
    let InputSpec { path, settings } = InputSpec::parse_arg(arg)?;
    let grid = load_grid(&path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(LoadedImage {
        name,
        path,
        settings,
        grid,
    })
}

/// Loads every input in order, stopping at the first failure.
pub fn load_inputs(args: &[String]) -> RenderResult<Vec<LoadedImage>> {
    args.iter().map(|arg| load_input(arg)).collect()
}
