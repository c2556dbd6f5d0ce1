use std::thread;
use std::time::{Duration, Instant};

use pixtone_spec::{Millis, Rational, RenderConfig};
use ringbuf::traits::{Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use super::Sink;
use crate::error::{SinkError, SinkResult};
use crate::timeline::Timeline;

/// Stream format handed to an [`AudioOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFormat {
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved channels per frame.
    pub channels: u16,
}

/// A device that drains interleaved `f32` samples from a ring buffer.
pub trait AudioOutput {
    /// Starts pulling samples from `consumer`.
    fn play(&mut self, consumer: HeapCons<f32>, format: PlaybackFormat) -> SinkResult<()>;

    /// Stops playback and releases the device.
    fn stop(&mut self);
}

impl<O: AudioOutput + ?Sized> AudioOutput for Box<O> {
    fn play(&mut self, consumer: HeapCons<f32>, format: PlaybackFormat) -> SinkResult<()> {
        (**self).play(consumer, format)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// When playback starts relative to synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Start immediately, `latency` of silence ahead of the first sample.
    WhileGenerating {
        /// Head start given to synthesis.
        latency: Millis,
    },
    /// Start once every sample has been produced.
    AfterGenerating,
}

/// Feeds an [`AudioOutput`] through a lock-free ring buffer.
///
/// The buffer holds the whole run plus the latency padding, so synthesis never
/// waits for the device.
pub struct PlaybackSink<O: AudioOutput> {
    output: O,
    mode: PlaybackMode,
    format: PlaybackFormat,
    producer: HeapProd<f32>,
    consumer: Option<HeapCons<f32>>,
    scale: f32,
    scratch: Vec<f32>,
    full_duration: Duration,
    latency: Duration,
    started: Option<Instant>,
    finished: bool,
}

impl<O: AudioOutput> PlaybackSink<O> {
    /// Creates the sink; in [`PlaybackMode::WhileGenerating`] the output
    /// starts right away.
    pub fn new(
        output: O,
        mode: PlaybackMode,
        config: &RenderConfig,
        timeline: &Timeline,
    ) -> SinkResult<Self> {
        config.validate()?;
        let channels = usize::from(config.channels);
        let format = PlaybackFormat {
            sample_rate: config.sample_rate,
            channels: config.channels,
        };

        let (latency_frames, latency) = match mode {
            PlaybackMode::WhileGenerating { latency } => (
                frames_in(latency, config.sample_rate),
                millis_to_duration(latency),
            ),
            PlaybackMode::AfterGenerating => (0, Duration::ZERO),
        };
        let total_frames = usize::try_from(timeline.total_samples)
            .map_err(|_| SinkError::playback("run is too long to buffer for playback"))?;
        let capacity = (total_frames + latency_frames).max(1) * channels;
        let (mut producer, consumer) = HeapRb::<f32>::new(capacity).split();

        if latency_frames > 0 {
            producer.push_iter(std::iter::repeat(0.0).take(latency_frames * channels));
        }

        let mut sink = Self {
            output,
            mode,
            format,
            producer,
            consumer: Some(consumer),
            scale: config.sample_width.max_amplitude() as f32,
            scratch: Vec::with_capacity(channels),
            full_duration: millis_to_duration(timeline.full_duration),
            latency,
            started: None,
            finished: false,
        };
        if matches!(mode, PlaybackMode::WhileGenerating { .. }) {
            sink.start()?;
        }
        Ok(sink)
    }

    fn start(&mut self) -> SinkResult<()> {
        if let Some(consumer) = self.consumer.take() {
            self.output.play(consumer, self.format)?;
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    /// Time the device still needs at `now`: full duration plus latency
    /// minus time already played, never negative.
    pub fn residual_wait(&self, now: Instant) -> Duration {
        match self.started {
            Some(start) => (self.full_duration + self.latency)
                .saturating_sub(now.saturating_duration_since(start)),
            None => Duration::ZERO,
        }
    }

    /// Waits for the device to play out the buffer, then stops it.
    pub fn drain(&mut self) {
        if self.started.is_some() {
            thread::sleep(self.residual_wait(Instant::now()));
        }
        self.output.stop();
    }

    /// The playback mode.
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Samples waiting in the ring buffer.
    pub fn buffered(&self) -> usize {
        self.producer.occupied_len()
    }

    /// True once the output has been started.
    pub fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    /// The audio output.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The audio output, mutably.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

impl<O: AudioOutput> Sink for PlaybackSink<O> {
    fn name(&self) -> &str {
        "playback"
    }

    fn write_frame(&mut self, frame: &[i32]) -> SinkResult<()> {
        self.scratch.clear();
        self.scratch
            .extend(frame.iter().map(|&sample| sample as f32 / self.scale));
        let pushed = self.producer.push_slice(&self.scratch);
        if pushed < self.scratch.len() {
            return Err(SinkError::playback("playback buffer overflow"));
        }
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.start()
    }
}

impl<O: AudioOutput> std::fmt::Debug for PlaybackSink<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSink")
            .field("mode", &self.mode)
            .field("format", &self.format)
            .field("buffered", &self.buffered())
            .field("playing", &self.is_playing())
            .finish()
    }
}

fn frames_in(duration: Millis, sample_rate: u32) -> usize {
    let frames = duration.value() * Rational::from_integer(i128::from(sample_rate))
        / Rational::from_integer(1000);
    usize::try_from(frames.floor().to_integer()).unwrap_or(0)
}

fn millis_to_duration(duration: Millis) -> Duration {
    Duration::from_secs_f64((duration.to_f64() / 1000.0).max(0.0))
}
