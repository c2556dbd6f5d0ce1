//! The render command
//!
//! Loads the input images, builds the engine, wires up the requested sinks,
//! and runs synthesis once.

mod human;
mod json;

#[cfg(test)]
mod tests;

use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use pixtone_backend_audio::{
    AudioOutput, BufferSink, CancelToken, EngineBuilder, FileSink, PlaybackMode, PlaybackSink,
    RawFileSink, RawSink, Reporter, RunSummary, Sink, SinkError, SynthesisEngine,
};
use pixtone_spec::RenderConfig;

use crate::error::{RenderError, RenderResult};
use crate::input::{load_inputs, LoadedImage};
use crate::options::{OutputFormat, OutputTarget, RenderArgs};

pub use human::run_human;
pub use json::{run_json, JsonError, RenderReport};

/// How often a finished render checks for Ctrl-C while playback runs out.
const PLAYBACK_POLL: Duration = Duration::from_millis(50);

/// What a successful render produced.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Where the samples went, if anywhere.
    pub output: Option<OutputTarget>,
    /// Playback mode, if the run was played.
    pub playback: Option<PlaybackMode>,
    /// Engine statistics.
    pub summary: RunSummary,
}

/// The system audio device, when this build has one.
pub fn device_output() -> Option<Box<dyn AudioOutput>> {
    #[cfg(feature = "playback")]
    {
        Some(Box::new(pixtone_backend_audio::CpalOutput::new()))
    }
    #[cfg(not(feature = "playback"))]
    {
        None
    }
}

/// Runs the render command, printing for humans or as JSON.
///
/// # Returns
/// Exit code: 0 success, 1 configuration or input error, 2 synthesis or sink
/// error, 130 cancelled
pub fn run(args: &RenderArgs, cancel: &CancelToken) -> Result<ExitCode> {
    let audio = device_output();
    if args.json {
        run_json(args, audio, cancel)
    } else {
        Ok(run_human(args, audio, cancel))
    }
}

/// Performs one render.
///
/// `audio` is the device used when playback is requested; `None` makes a
/// playback request fail with [`RenderError::PlaybackUnavailable`].
pub fn render(
    args: &RenderArgs,
    audio: Option<Box<dyn AudioOutput>>,
    reporter: &mut dyn Reporter,
    cancel: &CancelToken,
) -> RenderResult<RenderOutcome> {
    if args.inputs.is_empty() {
        return Err(RenderError::NoInputs);
    }
    let config = args.render_config()?;
    let target = args.output_target();
    check_target(target.as_ref(), args)?;

    let playback = args.playback_mode(config.playback_latency);
    let audio = match (playback, audio) {
        (Some(mode), Some(output)) => Some((mode, output)),
        (Some(_), None) => return Err(RenderError::PlaybackUnavailable),
        (None, _) => None,
    };

    let images = load_inputs(&args.inputs)?;
    let engine = build_engine(&config, images)?;

    // A device that fails to start must leave the target untouched.
    let mut player = match audio {
        Some((mode, output)) => Some(
            PlaybackSink::new(output, mode, &config, engine.timeline()).map_err(|source| {
                RenderError::SinkOpen {
                    what: "audio output".to_string(),
                    source,
                }
            })?,
        ),
        None => None,
    };
    let mut file = match open_output(target.as_ref(), &config) {
        Ok(file) => file,
        Err(err) => {
            if let Some(player) = player.as_mut() {
                player.output_mut().stop();
            }
            return Err(err);
        }
    };
    let mut buffer = (file.is_none() && player.is_none()).then(BufferSink::new);

    let mut sinks: Vec<&mut dyn Sink> = Vec::new();
    if let Some(file) = file.as_deref_mut() {
        sinks.push(file);
    }
    if let Some(player) = player.as_mut() {
        sinks.push(player);
    }
    if let Some(buffer) = buffer.as_mut() {
        sinks.push(buffer);
    }

    let result = engine.run(&mut sinks, reporter, cancel);
    drop(sinks);

    if let Some(player) = player.as_mut() {
        if result.is_ok() {
            wait_for_playback(player, cancel);
        }
        player.output_mut().stop();
    }

    Ok(RenderOutcome {
        output: target,
        playback,
        summary: result?,
    })
}

fn check_target(target: Option<&OutputTarget>, args: &RenderArgs) -> RenderResult<()> {
    match target {
        Some(OutputTarget::Stdout) => {
            if args.json {
                return Err(RenderError::StdoutConflict);
            }
            if args.output_format == Some(OutputFormat::Wav) {
                return Err(RenderError::WavToStdout);
            }
        }
        Some(OutputTarget::File { path, .. }) => {
            if path.exists() && !args.overwrite {
                return Err(RenderError::OutputExists { path: path.clone() });
            }
        }
        None => {}
    }
    Ok(())
}

fn build_engine(
    config: &RenderConfig,
    images: Vec<LoadedImage>,
) -> RenderResult<SynthesisEngine> {
    let mut builder = EngineBuilder::new(config.clone());
    for image in images {
        builder.add_source(image.name, image.grid, image.settings);
    }
    Ok(builder.build()?)
}

fn open_output(
    target: Option<&OutputTarget>,
    config: &RenderConfig,
) -> RenderResult<Option<Box<dyn Sink>>> {
    let open_error = |what: String, source: SinkError| RenderError::SinkOpen { what, source };
    let sink: Box<dyn Sink> = match target {
        None => return Ok(None),
        Some(OutputTarget::Stdout) => Box::new(RawSink::new(
            "stdout",
            BufWriter::new(io::stdout()),
            config.sample_width,
        )),
        Some(OutputTarget::File { path, format }) => match format {
            OutputFormat::Wav => Box::new(
                FileSink::create(path, config)
                    .map_err(|e| open_error(path.display().to_string(), e))?,
            ),
            OutputFormat::Raw => Box::new(
                RawFileSink::create(path, config.sample_width)
                    .map_err(|e| open_error(path.display().to_string(), e))?,
            ),
        },
    };
    Ok(Some(sink))
}

/// Sleeps until the device has played everything, or until cancelled.
fn wait_for_playback<O: AudioOutput>(player: &PlaybackSink<O>, cancel: &CancelToken) {
    while !cancel.is_cancelled() {
        let remaining = player.residual_wait(Instant::now());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(PLAYBACK_POLL));
    }
}
