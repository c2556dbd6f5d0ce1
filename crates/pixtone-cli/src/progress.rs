//! Terminal reporter: colored notices and a progress bar on stderr.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pixtone_backend_audio::{ProgressEvent, Reporter};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} samples {msg}";

/// Renders engine progress for a person watching the terminal.
pub struct TerminalReporter {
    notices: bool,
    progress: bool,
    bar: Option<ProgressBar>,
}

impl TerminalReporter {
    /// Creates a reporter; `notices` prints status lines, `progress` draws
    /// the bar.
    pub fn new(notices: bool, progress: bool) -> Self {
        Self {
            notices,
            progress,
            bar: None,
        }
    }

    fn start_bar(&mut self, total_samples: u64) {
        let bar = ProgressBar::with_draw_target(Some(total_samples), ProgressDrawTarget::stderr());
        let style =
            ProgressStyle::with_template(BAR_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }
}

impl Reporter for TerminalReporter {
    fn on_progress(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Start { total_samples } => {
                if self.progress {
                    self.start_bar(total_samples);
                }
            }
            ProgressEvent::Advance { position } => {
                if let Some(bar) = &self.bar {
                    bar.set_position(position);
                }
            }
            ProgressEvent::Finish { position } => {
                if let Some(bar) = self.bar.take() {
                    bar.set_position(position);
                    bar.finish_and_clear();
                }
            }
        }
    }

    fn on_notice(&mut self, message: &str) {
        if !self.notices {
            return;
        }
        let line = format_notice(message);
        match &self.bar {
            Some(bar) => bar.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }
}

/// Colors the `Label:` prefix of a notice.
pub fn format_notice(message: &str) -> String {
    match message.split_once(": ") {
        Some((label, rest)) => format!("{} {}", format!("{label}:").cyan().bold(), rest),
        None => message.dimmed().to_string(),
    }
}
