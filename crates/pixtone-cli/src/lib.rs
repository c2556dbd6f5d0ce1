//! pixtone CLI library.
//!
//! This crate provides the command-line front end of pixtone: parsing the
//! render options, loading input images, wiring the output sinks, and
//! presenting progress and results to a person or as JSON.

pub mod error;
pub mod input;
pub mod options;
pub mod progress;
pub mod render;

pub use error::{RenderError, RenderResult};
pub use options::{OutputFormat, OutputTarget, RenderArgs};
