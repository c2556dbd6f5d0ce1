//! Progress events and the reporting interface injected into a run.

/// Roughly how many progress updates a run emits, whatever its length.
pub const DEFAULT_PROGRESS_GRANULARITY: u64 = 300;

/// Progress of a synthesis run, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The run is about to produce `total_samples` samples.
    Start {
        /// Samples the run will produce if not cancelled.
        total_samples: u64,
    },
    /// `position` samples have been produced.
    Advance {
        /// Samples produced so far.
        position: u64,
    },
    /// The run stopped after `position` samples.
    Finish {
        /// Samples produced in total.
        position: u64,
    },
}

/// Receives progress and informational notices from the engine.
pub trait Reporter {
    /// Called at start, periodically during the run, and at the end.
    fn on_progress(&mut self, event: ProgressEvent);

    /// Called with human-readable details about the run.
    fn on_notice(&mut self, _message: &str) {}
}

/// A reporter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

/// Samples between two `Advance` events.
pub fn progress_step(total_samples: u64, granularity: u64) -> u64 {
    (total_samples / granularity.max(1)).max(1)
}
