//! pixtone - turn images into sound
//!
//! Each image column becomes a slice of time and each row a sine partial;
//! the result is written as a WAVE or raw PCM file, played, or both.

mod cli_args;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use pixtone_backend_audio::CancelToken;
use pixtone_cli::render;

use cli_args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || on_interrupt.cancel()) {
        eprintln!(
            "{} cannot handle Ctrl-C; an interrupted run will not finalize its output: {}",
            "warning:".yellow().bold(),
            err
        );
    }

    match render::run(&cli.into_args(), &cancel) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            ExitCode::from(1)
        }
    }
}
