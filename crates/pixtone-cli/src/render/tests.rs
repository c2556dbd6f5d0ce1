//! Tests for the render command.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};
use pixtone_backend_audio::{PlaybackFormat, SilentReporter, SinkError, SinkResult, SynthError};
use pixtone_spec::{ConfigError, Millis};
use pretty_assertions::assert_eq;
use ringbuf::HeapCons;

use super::*;
use crate::options::OutputFormat;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let level = ((x + y) * 40 % 256) as u8;
        Rgba([level, level / 2, 255 - level, 255])
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn args_for(image: &Path, output: &Path) -> RenderArgs {
    RenderArgs {
        inputs: vec![image.display().to_string()],
        output_file: Some(output.to_path_buf()),
        framerate: Some(8000),
        pixel_duration: Some("5".to_string()),
        ..RenderArgs::default()
    }
}

fn render_silent(args: &RenderArgs) -> RenderResult<RenderOutcome> {
    render(args, None, &mut SilentReporter, &CancelToken::new())
}

#[derive(Default)]
struct Calls {
    formats: Vec<PlaybackFormat>,
    stops: usize,
}

struct RecordingOutput {
    calls: Arc<Mutex<Calls>>,
    consumer: Option<HeapCons<f32>>,
}

impl AudioOutput for RecordingOutput {
    fn play(&mut self, consumer: HeapCons<f32>, format: PlaybackFormat) -> SinkResult<()> {
        self.consumer = Some(consumer);
        self.calls.lock().unwrap().formats.push(format);
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().stops += 1;
    }
}

struct MissingDevice;

impl AudioOutput for MissingDevice {
    fn play(&mut self, _consumer: HeapCons<f32>, _format: PlaybackFormat) -> SinkResult<()> {
        Err(SinkError::playback("no audio output device available"))
    }

    fn stop(&mut self) {}
}

fn recording() -> (Box<dyn AudioOutput>, Arc<Mutex<Calls>>) {
    let calls = Arc::new(Mutex::new(Calls::default()));
    let output = RecordingOutput {
        calls: Arc::clone(&calls),
        consumer: None,
    };
    (Box::new(output), calls)
}

// ============================================================================
// File Output Tests
// ============================================================================

#[test]
fn test_render_writes_wav() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 4, 6);
    let output = dir.path().join("ramp.wav");

    let outcome = render_silent(&args_for(&image, &output)).unwrap();
    assert_eq!(
        outcome.output,
        Some(OutputTarget::File {
            path: output.clone(),
            format: OutputFormat::Wav,
        })
    );
    assert_eq!(outcome.summary.samples_written, 4 * 40);

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().sample_rate, 8000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.duration(), 160);
}

#[test]
fn test_render_writes_raw_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 3, 2);
    let output = dir.path().join("ramp.pcm");

    let args = RenderArgs {
        channels: Some(2),
        sample_width: Some(24),
        ..args_for(&image, &output)
    };
    let outcome = render_silent(&args).unwrap();
    assert_eq!(outcome.output.unwrap().format(), OutputFormat::Raw);

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(bytes.len(), 3 * 40 * 2 * 3);
}

#[test]
fn test_render_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let output = dir.path().join("taken.wav");
    std::fs::write(&output, b"keep me").unwrap();

    let err = render_silent(&args_for(&image, &output)).unwrap_err();
    assert!(matches!(err, RenderError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");

    let args = RenderArgs {
        overwrite: true,
        ..args_for(&image, &output)
    };
    render_silent(&args).unwrap();
    assert!(hound::WavReader::open(&output).is_ok());
}

#[test]
fn test_render_without_output_uses_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 3);
    let args = RenderArgs {
        no_output_file: true,
        ..args_for(&image, &dir.path().join("unused.wav"))
    };

    let outcome = render_silent(&args).unwrap();
    assert_eq!(outcome.output, None);
    assert_eq!(outcome.summary.samples_written, 80);
    assert!(!dir.path().join("unused.wav").exists());
}

#[test]
fn test_mixing_two_images_uses_the_wider_one() {
    let dir = tempfile::tempdir().unwrap();
    let narrow = write_png(dir.path(), "narrow.png", 2, 4);
    let wide = write_png(dir.path(), "wide.png", 5, 2);
    let args = RenderArgs {
        inputs: vec![
            format!("{}/gain=1/2", narrow.display()),
            format!("{}/gain=1/2,min=100,max=400", wide.display()),
        ],
        no_output_file: true,
        ..args_for(&narrow, &dir.path().join("unused.wav"))
    };

    let outcome = render_silent(&args).unwrap();
    assert_eq!(outcome.summary.sources, 2);
    assert_eq!(outcome.summary.samples_written, 5 * 40);
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_config_errors_happen_before_output_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let output = dir.path().join("never.wav");
    let args = RenderArgs {
        sample_width: Some(7),
        ..args_for(&image, &output)
    };

    let err = render_silent(&args).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Config(ConfigError::InvalidSampleWidth { bits: 7 })
    ));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_and_no_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.wav");
    let missing = dir.path().join("missing.png");

    let err = render_silent(&args_for(&missing, &output)).unwrap_err();
    assert_eq!(err.code(), "CONFIG_010");
    assert!(!output.exists());

    let args = RenderArgs {
        inputs: Vec::new(),
        ..args_for(&missing, &output)
    };
    assert!(matches!(render_silent(&args), Err(RenderError::NoInputs)));
}

#[test]
fn test_stdout_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let stdout = PathBuf::from("-");

    let wav = RenderArgs {
        output_format: Some(OutputFormat::Wav),
        ..args_for(&image, &stdout)
    };
    assert!(matches!(render_silent(&wav), Err(RenderError::WavToStdout)));

    let json = RenderArgs {
        json: true,
        ..args_for(&image, &stdout)
    };
    assert!(matches!(
        render_silent(&json),
        Err(RenderError::StdoutConflict)
    ));
}

#[test]
fn test_cancelled_render_exits_130() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 3, 3);
    let output = dir.path().join("partial.wav");

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = render(&args_for(&image, &output), None, &mut SilentReporter, &cancel).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.exit_code(), 130);

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.duration(), 0);
}

// ============================================================================
// Playback Tests
// ============================================================================

#[test]
fn test_playback_requires_a_device() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let args = RenderArgs {
        play: true,
        no_output_file: true,
        ..args_for(&image, &dir.path().join("unused.wav"))
    };

    let err = render_silent(&args).unwrap_err();
    assert!(matches!(err, RenderError::PlaybackUnavailable));
}

#[test]
fn test_play_after_generating() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let args = RenderArgs {
        play: true,
        no_output_file: true,
        channels: Some(2),
        ..args_for(&image, &dir.path().join("unused.wav"))
    };
    let (output, calls) = recording();

    let outcome = render(&args, Some(output), &mut SilentReporter, &CancelToken::new()).unwrap();
    assert_eq!(outcome.playback, Some(PlaybackMode::AfterGenerating));
    assert_eq!(outcome.output, None);

    let calls = calls.lock().unwrap();
    assert_eq!(
        calls.formats,
        vec![PlaybackFormat {
            sample_rate: 8000,
            channels: 2,
        }]
    );
    assert_eq!(calls.stops, 1);
}

#[test]
fn test_play_at_once_alongside_file() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let output = dir.path().join("both.wav");
    let args = RenderArgs {
        play_at_once: true,
        latency: Some("10".to_string()),
        ..args_for(&image, &output)
    };
    let (device, calls) = recording();

    let outcome = render(&args, Some(device), &mut SilentReporter, &CancelToken::new()).unwrap();
    assert_eq!(
        outcome.playback,
        Some(PlaybackMode::WhileGenerating {
            latency: Millis::from_integer(10)
        })
    );
    assert_eq!(calls.lock().unwrap().formats.len(), 1);
    assert_eq!(calls.lock().unwrap().stops, 1);
    assert_eq!(hound::WavReader::open(&output).unwrap().duration(), 80);
}

#[test]
fn test_failed_device_start_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let output = dir.path().join("left.wav");
    let args = RenderArgs {
        play_at_once: true,
        ..args_for(&image, &output)
    };

    let err = render(
        &args,
        Some(Box::new(MissingDevice)),
        &mut SilentReporter,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::SinkOpen { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());

    // The next attempt is not blocked by a leftover file.
    render_silent(&args_for(&image, &output)).unwrap();
    assert_eq!(hound::WavReader::open(&output).unwrap().duration(), 80);
}

#[test]
fn test_failed_device_start_keeps_file_being_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let output = dir.path().join("old.raw");
    std::fs::write(&output, b"previous take").unwrap();
    let args = RenderArgs {
        play_at_once: true,
        overwrite: true,
        ..args_for(&image, &output)
    };

    let err = render(
        &args,
        Some(Box::new(MissingDevice)),
        &mut SilentReporter,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::SinkOpen { .. }));
    assert_eq!(std::fs::read(&output).unwrap(), b"previous take");
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_success() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path(), "ramp.png", 2, 2);
    let output = dir.path().join("report.wav");

    let outcome = render_silent(&args_for(&image, &output)).unwrap();
    let report = RenderReport::success(outcome);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["exit_code"], 0);
    assert_eq!(value["format"], "wav");
    assert_eq!(value["summary"]["samples_written"], 80);
    assert_eq!(value["summary"]["sample_rate"], 8000);
    assert!(value.get("errors").is_none());
}

#[test]
fn test_json_report_lists_sink_failures() {
    use pixtone_backend_audio::SinkFailure;

    let err = RenderError::Synth(SynthError::Sinks(vec![
        SinkFailure {
            sink: "file".to_string(),
            error: SinkError::playback("disk full"),
        },
        SinkFailure {
            sink: "playback".to_string(),
            error: SinkError::playback("device lost"),
        },
    ]));
    let report = RenderReport::failure(&err);

    assert!(!report.success);
    assert_eq!(report.exit_code, 2);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[1].sink.as_deref(), Some("playback"));
    assert!(report.errors[0].message.contains("disk full"));
    assert_eq!(report.errors[0].code, "SYNTH_007");
}

#[test]
fn test_json_report_config_failure() {
    let err = RenderError::Config(ConfigError::InvalidChannels { channels: 0 });
    let report = RenderReport::failure(&err);
    assert_eq!(report.exit_code, 1);
    assert_eq!(
        report.errors,
        vec![JsonError::new(
            "CONFIG_001",
            "invalid channel count: 0 (must be at least 1)"
        )]
    );
}
