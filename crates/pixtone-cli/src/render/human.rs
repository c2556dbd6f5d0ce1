//! Human-readable (colored) output for the render command.
//!
//! Everything goes to stderr so that raw PCM can be piped from stdout.

use std::process::ExitCode;

use colored::Colorize;
use pixtone_backend_audio::{AudioOutput, CancelToken, PlaybackMode, SynthError};

use super::{render, RenderOutcome};
use crate::error::RenderError;
use crate::options::RenderArgs;
use crate::progress::TerminalReporter;

/// Runs a render with status lines and a progress bar.
pub fn run_human(
    args: &RenderArgs,
    audio: Option<Box<dyn AudioOutput>>,
    cancel: &CancelToken,
) -> ExitCode {
    let mut reporter = TerminalReporter::new(args.show_notices(), args.show_progress());
    match render(args, audio, &mut reporter, cancel) {
        Ok(outcome) => {
            if args.show_notices() {
                print_outcome(&outcome);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn print_outcome(outcome: &RenderOutcome) {
    let summary = &outcome.summary;

    match &outcome.output {
        Some(target) => eprintln!(
            "{} {} ({})",
            "Output:".cyan().bold(),
            target.describe(),
            target.format()
        ),
        None => eprintln!("{} {}", "Output:".cyan().bold(), "none".dimmed()),
    }
    if let Some(mode) = outcome.playback {
        let when = match mode {
            PlaybackMode::WhileGenerating { latency } => {
                format!("while generating, {} latency", latency.approx())
            }
            PlaybackMode::AfterGenerating => "after generating".to_string(),
        };
        eprintln!("{} {}", "Played:".cyan().bold(), when);
    }
    eprintln!(
        "{} {} ({:.1}% of full scale)",
        "Peak:".cyan().bold(),
        summary.peak,
        summary.peak_ratio() * 100.0
    );
    if summary.clipped_samples > 0 {
        eprintln!(
            "  {} {} sample(s) clipped",
            "!".yellow(),
            summary.clipped_samples.to_string().yellow()
        );
    }
    eprintln!("{} {}", "PCM hash:".dimmed(), &summary.pcm_hash[..16]);
    eprintln!(
        "\n{} {} sample(s), {} channel(s)",
        "SUCCESS".green().bold(),
        summary.samples_written,
        summary.channels
    );
}

fn print_error(err: &RenderError) {
    match err {
        RenderError::Synth(SynthError::Cancelled { samples_written }) => {
            eprintln!(
                "\n{} after {} sample(s)",
                "CANCELLED".yellow().bold(),
                samples_written
            );
        }
        RenderError::Synth(SynthError::Sinks(failures)) => {
            eprintln!("\n{}", "OUTPUT FAILED".red().bold());
            for failure in failures {
                eprintln!("  {} {}", "x".red(), failure);
            }
        }
        _ => eprintln!("{}: {}", "error".red().bold(), err),
    }
}
