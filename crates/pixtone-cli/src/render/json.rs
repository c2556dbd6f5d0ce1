//! JSON output mode for the render command.

use std::process::ExitCode;

use anyhow::Result;
use pixtone_backend_audio::{AudioOutput, CancelToken, RunSummary, SilentReporter, SynthError};
use serde::Serialize;

use super::{render, RenderOutcome};
use crate::error::RenderError;
use crate::options::RenderArgs;

/// Machine-readable result of a render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    /// Whether every sample was produced and every sink succeeded.
    pub success: bool,
    /// Process exit code.
    pub exit_code: u8,
    /// Output path, `<stdout>`, or absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Output container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Whether the run was played.
    pub played: bool,
    /// Engine statistics on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    /// Errors on failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

/// One error in a [`RenderReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonError {
    /// Stable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Failing sink, for sink errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
}

impl JsonError {
    /// Creates an error without a sink.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            sink: None,
        }
    }
}

impl RenderReport {
    /// Report for a successful render.
    pub fn success(outcome: RenderOutcome) -> Self {
        Self {
            success: true,
            exit_code: 0,
            output: outcome.output.as_ref().map(|target| target.describe()),
            format: outcome.output.as_ref().map(|target| target.format().to_string()),
            played: outcome.playback.is_some(),
            summary: Some(outcome.summary),
            errors: Vec::new(),
        }
    }

    /// Report for a failed render; sink failures are listed one per sink.
    pub fn failure(err: &RenderError) -> Self {
        let errors = match err {
            RenderError::Synth(SynthError::Sinks(failures)) => failures
                .iter()
                .map(|failure| JsonError {
                    code: err.code().to_string(),
                    message: failure.error.to_string(),
                    sink: Some(failure.sink.clone()),
                })
                .collect(),
            _ => vec![JsonError::new(err.code(), err.to_string())],
        };
        Self {
            success: false,
            exit_code: err.exit_code(),
            output: None,
            format: None,
            played: false,
            summary: None,
            errors,
        }
    }
}

/// Runs a render and prints a [`RenderReport`] to stdout.
pub fn run_json(
    args: &RenderArgs,
    audio: Option<Box<dyn AudioOutput>>,
    cancel: &CancelToken,
) -> Result<ExitCode> {
    let report = match render(args, audio, &mut SilentReporter, cancel) {
        Ok(outcome) => RenderReport::success(outcome),
        Err(err) => RenderReport::failure(&err),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::from(report.exit_code))
}
