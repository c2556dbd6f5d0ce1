//! Pixtone Configuration Library
//!
//! This crate provides the configuration types shared by the pixtone synthesis
//! backend and command-line interface: the render configuration (output format
//! and timing), per-image settings, and exact unit parsing.
//!
//! # Example
//!
//! ```
//! use pixtone_spec::{ImageSettings, RenderConfig, Timing, Millis};
//!
//! let config = RenderConfig {
//!     timing: Timing::FullDuration("2.5 s".parse::<Millis>().unwrap()),
//!     ..RenderConfig::default()
//! };
//! assert!(config.validate().is_ok());
//!
//! let settings = ImageSettings::parse("gain=0.5,min=110,max=1760 Hz").unwrap();
//! assert_eq!(settings.min.to_f64(), 110.0);
//! ```
//!
//! # Modules
//!
//! - [`config`]: Sample format, timing, and render configuration
//! - [`settings`]: Per-image gain and frequency range, input arguments
//! - [`units`]: Exact rationals with SI-prefixed units
//! - [`error`]: Configuration and unit errors

pub mod config;
pub mod error;
pub mod settings;
pub mod units;

pub use config::{RenderConfig, SampleWidth, Timing};
pub use error::{ConfigError, ConfigResult, UnitError};
pub use settings::{ImageSettings, InputSpec};
pub use units::{Hertz, Millis, Rational};
