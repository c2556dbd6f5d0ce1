//! CLI argument definitions for the pixtone command-line interface.
//!
//! The `#[derive(Parser)]` type lives here, keeping `main.rs` focused on
//! dispatch. Durations stay as text until the render resolves them so a bad
//! value is reported like any other configuration error.

use std::path::PathBuf;

use clap::Parser;
use pixtone_cli::{OutputFormat, RenderArgs};

/// pixtone - Image to sound synthesizer
#[derive(Parser, Debug)]
#[command(name = "pixtone")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Input images, each PATH or PATH/KEY=VALUE,... with keys gain, min, max
    /// (e.g. photo.png/gain=1/2,min=100Hz,max=5kHz)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<String>,

    /// Output file ("-" writes raw PCM to stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Do not write an output file
    #[arg(short = 'O', long, conflicts_with = "output_file")]
    pub no_output_file: bool,

    /// Output container (default: from the file extension, .raw/.pcm are raw)
    #[arg(short = 'f', long, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Overwrite an existing output file
    #[arg(short = 'y', long)]
    pub overwrite: bool,

    /// Play the sound after generating it
    #[arg(short = 'p', long)]
    pub play: bool,

    /// Play the sound while generating it (implies --play)
    #[arg(short = 'P', long)]
    pub play_at_once: bool,

    /// Duration of one pixel column (default unit ms) [default: 10 ms]
    #[arg(short = 'd', long, value_name = "DUR")]
    pub pixel_duration: Option<String>,

    /// Duration of the whole sound (default unit ms); overrides --pixel-duration
    #[arg(short = 'D', long, value_name = "DUR")]
    pub full_duration: Option<String>,

    /// Number of output channels [default: 1]
    #[arg(short = 'c', long, value_name = "N")]
    pub channels: Option<u16>,

    /// Bits per sample: 8, 16, 24, or 32 [default: 16]
    #[arg(short = 'w', long, value_name = "BITS")]
    pub sample_width: Option<u16>,

    /// Samples per second [default: 44100]
    #[arg(short = 'r', long, value_name = "HZ")]
    pub framerate: Option<u32>,

    /// Head start given to synthesis with --play-at-once [default: 200 ms]
    #[arg(long, value_name = "DUR")]
    pub latency: Option<String>,

    /// JSON render configuration; flags override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print nothing but errors
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Do not draw a progress bar
    #[arg(short = 'G', long)]
    pub no_progressbar: bool,

    /// Output machine-readable JSON (no colored output)
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Converts the parsed flags into render arguments.
    pub fn into_args(self) -> RenderArgs {
        RenderArgs {
            inputs: self.inputs,
            output_file: self.output_file,
            no_output_file: self.no_output_file,
            output_format: self.output_format,
            overwrite: self.overwrite,
            play: self.play,
            play_at_once: self.play_at_once,
            pixel_duration: self.pixel_duration,
            full_duration: self.full_duration,
            channels: self.channels,
            sample_width: self.sample_width,
            framerate: self.framerate,
            latency: self.latency,
            config: self.config,
            quiet: self.quiet,
            no_progressbar: self.no_progressbar,
            json: self.json,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_parses_single_input_with_defaults() {
        let cli = Cli::try_parse_from(["pixtone", "photo.png"]).unwrap();
        let args = cli.into_args();
        assert_eq!(
            args,
            RenderArgs {
                inputs: vec!["photo.png".to_string()],
                ..RenderArgs::default()
            }
        );
    }

    #[test]
    fn test_cli_parses_short_flags() {
        let cli = Cli::try_parse_from([
            "pixtone",
            "-o",
            "tone.raw",
            "-y",
            "-P",
            "-d",
            "1/3 s",
            "-c",
            "2",
            "-w",
            "24",
            "-r",
            "22050",
            "-q",
            "-G",
            "a.png/gain=1/2",
            "b.png",
        ])
        .unwrap();
        let args = cli.into_args();
        assert_eq!(args.inputs, vec!["a.png/gain=1/2", "b.png"]);
        assert_eq!(args.output_file, Some(PathBuf::from("tone.raw")));
        assert!(args.overwrite);
        assert!(args.play_at_once);
        assert!(!args.play);
        assert_eq!(args.pixel_duration.as_deref(), Some("1/3 s"));
        assert_eq!(args.channels, Some(2));
        assert_eq!(args.sample_width, Some(24));
        assert_eq!(args.framerate, Some(22_050));
        assert!(args.quiet);
        assert!(args.no_progressbar);
    }

    #[test]
    fn test_cli_parses_long_flags() {
        let cli = Cli::try_parse_from([
            "pixtone",
            "--no-output-file",
            "--play",
            "--full-duration",
            "2s",
            "--latency",
            "50",
            "--config",
            "render.json",
            "--json",
            "--output-format",
            "raw",
            "img.png",
        ])
        .unwrap();
        let args = cli.into_args();
        assert!(args.no_output_file);
        assert!(args.play);
        assert_eq!(args.full_duration.as_deref(), Some("2s"));
        assert_eq!(args.latency.as_deref(), Some("50"));
        assert_eq!(args.config, Some(PathBuf::from("render.json")));
        assert!(args.json);
        assert_eq!(args.output_format, Some(OutputFormat::Raw));
    }

    #[test]
    fn test_cli_requires_an_input() {
        let err = Cli::try_parse_from(["pixtone", "-y"]).unwrap_err();
        assert!(err.to_string().contains("<INPUT>"));
    }

    #[test]
    fn test_cli_rejects_output_with_no_output() {
        assert!(Cli::try_parse_from(["pixtone", "-O", "-o", "x.wav", "a.png"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["pixtone", "-f", "mp3", "a.png"]).is_err());
    }

    #[test]
    fn test_cli_accepts_dash_output() {
        let cli = Cli::try_parse_from(["pixtone", "-o", "-", "a.png"]).unwrap();
        assert_eq!(cli.output_file, Some(PathBuf::from("-")));
    }
}
