//! The synthesis engine.
//!
//! An [`EngineBuilder`] collects the render configuration and the images to
//! mix. [`EngineBuilder::build`] validates everything, resolves the timeline,
//! and binds each image to its wave tables, yielding a [`SynthesisEngine`]
//! that is ready to run. [`SynthesisEngine::run`] then produces every sample in
//! order, forwarding each frame to all sinks.
//!
//! # Example
//!
//! ```
//! use pixtone_backend_audio::{
//!     BufferSink, CancelToken, EngineBuilder, Pixel, PixelGrid, SilentReporter, Sink,
//! };
//! use pixtone_spec::{ImageSettings, RenderConfig};
//!
//! let grid = PixelGrid::filled(4, 8, Pixel::WHITE).unwrap();
//! let engine = EngineBuilder::new(RenderConfig::default())
//!     .source("white", grid, ImageSettings::default())
//!     .build()
//!     .unwrap();
//!
//! let mut buffer = BufferSink::new();
//! let summary = engine
//!     .run(&mut [&mut buffer as &mut dyn Sink], &mut SilentReporter, &CancelToken::new())
//!     .unwrap();
//! assert_eq!(summary.samples_written, 4 * 441);
//! assert_eq!(buffer.samples().len(), 4 * 441);
//! ```

use std::time::Instant;

use pixtone_spec::{ImageSettings, RenderConfig, SampleWidth};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::error::{SinkError, SinkFailure, SynthError, SynthResult};
use crate::pcm::{quantize, PcmHasher};
use crate::pixels::PixelGrid;
use crate::progress::{progress_step, ProgressEvent, Reporter, DEFAULT_PROGRESS_GRANULARITY};
use crate::sink::Sink;
use crate::source::MixSource;
use crate::timeline::{Timeline, TimelineReport};
use crate::wavetable::WaveTableCache;


#[derive(Debug, Clone)]
struct SourceInput {
    name: String,
    grid: PixelGrid,
    settings: ImageSettings,
}

/// Collects configuration and sources for a run.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    config: RenderConfig,
    inputs: Vec<SourceInput>,
    granularity: u64,
}

impl EngineBuilder {
    /// Starts a builder for `config`.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            inputs: Vec::new(),
            granularity: DEFAULT_PROGRESS_GRANULARITY,
        }
    }

    /// Adds an image to the mix.
    pub fn source(mut self, name: impl Into<String>, grid: PixelGrid, settings: ImageSettings) -> Self {
        self.add_source(name, grid, settings);
        self
    }

    /// Adds an image to the mix.
    pub fn add_source(&mut self, name: impl Into<String>, grid: PixelGrid, settings: ImageSettings) {
        self.inputs.push(SourceInput {
            name: name.into(),
            grid,
            settings,
        });
    }

    /// Sets roughly how many progress updates a run emits.
    pub fn progress_granularity(mut self, granularity: u64) -> Self {
        self.granularity = granularity;
        self
    }

    /// Validates the configuration and builds a ready engine.
    ///
    /// # Errors
    /// * [`SynthError::Config`] for an invalid configuration or image settings
    /// * [`SynthError::EmptyTimeline`] if there are no columns or no samples
    /// * [`SynthError::InvalidFrequency`] if a row maps to a non-positive frequency
    pub fn build(self) -> SynthResult<SynthesisEngine> {
        self.config.validate()?;
        for input in &self.inputs {
            input.settings.validate()?;
        }

        let columns = self
            .inputs
            .iter()
            .map(|input| input.grid.columns() as u64)
            .max()
            .unwrap_or(0);
        let timeline = Timeline::resolve(self.config.timing, self.config.sample_rate, columns)?;

        let mut cache = WaveTableCache::new(self.config.sample_rate);
        let sources = self
            .inputs
            .into_iter()
            .map(|input| {
                MixSource::new(
                    input.name,
                    input.grid,
                    input.settings,
                    timeline.one_column_samples,
                    &mut cache,
                )
            })
            .collect::<SynthResult<Vec<_>>>()?;

        Ok(SynthesisEngine {
            config: self.config,
            timeline,
            sources,
            wave_tables: cache.len(),
            progress_step: progress_step(timeline.total_samples, self.granularity),
        })
    }
}

/// A configured engine, ready to run once.
#[derive(Debug)]
pub struct SynthesisEngine {
    config: RenderConfig,
    timeline: Timeline,
    sources: Vec<MixSource>,
    wave_tables: usize,
    progress_step: u64,
}

impl SynthesisEngine {
    /// The resolved timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The validated configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The bound sources, in registration order.
    pub fn sources(&self) -> &[MixSource] {
        &self.sources
    }

    /// Number of distinct wave tables shared by the sources.
    pub fn wave_table_count(&self) -> usize {
        self.wave_tables
    }

    /// Samples between two progress updates.
    pub fn progress_step(&self) -> u64 {
        self.progress_step
    }

    /// Produces every sample and forwards it to `sinks`.
    ///
    /// Sources are summed as unbounded values, scaled to the sample width,
    /// then rounded and clipped. Each frame repeats the sample on every
    /// channel. A sink that fails stops receiving frames while the others
    /// continue. Every sink is finished before this returns.
    ///
    /// # Errors
    /// * [`SynthError::Sinks`] if any sink failed, even when also cancelled
    /// * [`SynthError::Cancelled`] if `cancel` was triggered before the end
    pub fn run(
        mut self,
        sinks: &mut [&mut dyn Sink],
        reporter: &mut dyn Reporter,
        cancel: &CancelToken,
    ) -> SynthResult<RunSummary> {
        let width = self.config.sample_width;
        let channels = usize::from(self.config.channels);
        let total = self.timeline.total_samples;
        let scale = f64::from(width.max_sample());

        self.report_plan(reporter);
        reporter.on_progress(ProgressEvent::Start {
            total_samples: total,
        });

        let started = Instant::now();
        let mut frame = vec![0i32; channels];
        let mut failures: Vec<Option<SinkError>> = sinks.iter().map(|_| None).collect();
        let mut stats = SampleStats::default();
        let mut hasher = PcmHasher::new();
        let mut written = 0u64;

        for index in 0..total {
            if cancel.is_cancelled() {
                break;
            }

            let mixed: f64 = self
                .sources
                .iter_mut()
                .map(|source| source.sample_at(index))
                .sum();
            let (sample, clipped) = quantize(mixed * scale, width);
            stats.record(sample, clipped);

            frame.fill(sample);
            hasher.update(&frame, width);
            for (sink, failure) in sinks.iter_mut().zip(failures.iter_mut()) {
                if failure.is_none() {
                    if let Err(err) = sink.write_frame(&frame) {
                        *failure = Some(err);
                    }
                }
            }

            written += 1;
            if written % self.progress_step == 0 && written < total {
                reporter.on_progress(ProgressEvent::Advance { position: written });
            }
        }

        for (sink, failure) in sinks.iter_mut().zip(failures.iter_mut()) {
            if let Err(err) = sink.finish() {
                if failure.is_none() {
                    *failure = Some(err);
                }
            }
        }

        reporter.on_progress(ProgressEvent::Finish { position: written });
        let elapsed = started.elapsed().as_secs_f64();
        reporter.on_notice(&format!(
            "Generated {written} sample(s) in {elapsed:.2} s"
        ));

        let failures: Vec<SinkFailure> = sinks
            .iter()
            .zip(failures)
            .filter_map(|(sink, failure)| {
                failure.map(|error| SinkFailure {
                    sink: sink.name().to_string(),
                    error,
                })
            })
            .collect();
        if !failures.is_empty() {
            return Err(SynthError::Sinks(failures));
        }
        if written < total {
            return Err(SynthError::Cancelled {
                samples_written: written,
            });
        }

        Ok(RunSummary {
            channels: self.config.channels,
            sample_width: width.bits(),
            sample_rate: self.config.sample_rate,
            sources: self.sources.len(),
            wave_tables: self.wave_tables,
            timeline: self.timeline.report(),
            samples_written: written,
            peak: stats.peak,
            clipped_samples: stats.clipped,
            pcm_hash: hasher.finalize(),
            elapsed_seconds: elapsed,
        })
    }

    fn report_plan(&self, reporter: &mut dyn Reporter) {
        let t = &self.timeline;
        for source in &self.sources {
            reporter.on_notice(&format!(
                "Image {}: {}x{} px, {}",
                source.name(),
                source.columns(),
                source.rows(),
                source.settings()
            ));
        }
        reporter.on_notice(&format!(
            "Format: {} channel(s), {}, {} Hz",
            self.config.channels, self.config.sample_width, self.config.sample_rate
        ));
        reporter.on_notice(&format!(
            "Requested: pixel duration {}, full duration {}",
            t.requested_pixel.approx(),
            t.requested_full.approx()
        ));
        reporter.on_notice(&format!(
            "Samples: {} per column, {} total",
            t.one_column_samples, t.total_samples
        ));
        reporter.on_notice(&format!(
            "Actual: pixel duration {}, full duration {}",
            t.pixel_duration.approx(),
            t.full_duration.approx()
        ));
    }
}

#[derive(Debug, Default)]
struct SampleStats {
    peak: u32,
    clipped: u64,
}

impl SampleStats {
    fn record(&mut self, sample: i32, clipped: bool) {
        self.peak = self.peak.max(sample.unsigned_abs());
        if clipped {
            self.clipped += 1;
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Interleaved channels per frame.
    pub channels: u16,
    /// Bits per sample.
    pub sample_width: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Number of mixed images.
    pub sources: usize,
    /// Distinct wave tables built.
    pub wave_tables: usize,
    /// Sample counts and durations.
    #[serde(flatten)]
    pub timeline: TimelineReport,
    /// Frames forwarded to the sinks.
    pub samples_written: u64,
    /// Largest absolute sample value.
    pub peak: u32,
    /// Samples that had to be clipped.
    pub clipped_samples: u64,
    /// BLAKE3 hash of the little-endian PCM stream.
    pub pcm_hash: String,
    /// Wall-clock synthesis time.
    pub elapsed_seconds: f64,
}

impl RunSummary {
    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Samples the run was resolved to produce.
    pub fn total_samples(&self) -> u64 {
        self.timeline.total_samples
    }

    /// Peak as a fraction of full scale.
    pub fn peak_ratio(&self) -> f64 {
        let width = SampleWidth::from_bits(self.sample_width).unwrap_or_default();
        f64::from(self.peak) / width.max_amplitude() as f64
    }
}
