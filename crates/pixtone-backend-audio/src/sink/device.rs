use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::playback::{AudioOutput, PlaybackFormat};
use crate::error::{SinkError, SinkResult};

/// Plays through the default output device of the default host.
#[derive(Default)]
pub struct CpalOutput {
    stream: Option<cpal::Stream>,
}

impl CpalOutput {
    /// Creates an output; the device is opened on [`AudioOutput::play`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for CpalOutput {
    fn play(&mut self, mut consumer: HeapCons<f32>, format: PlaybackFormat) -> SinkResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SinkError::playback("no audio output device available"))?;

        let config = cpal::StreamConfig {
            channels: format.channels,
            sample_rate: cpal::SampleRate(format.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err| eprintln!("audio stream error: {err}");
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let read = consumer.pop_slice(data);
                    data[read..].fill(0.0);
                },
                err_fn,
                None,
            )
            .map_err(|e| SinkError::playback(e.to_string()))?;
        stream
            .play()
            .map_err(|e| SinkError::playback(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        self.stream = None;
    }
}
