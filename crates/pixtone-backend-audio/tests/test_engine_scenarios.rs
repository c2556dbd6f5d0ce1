//! End-to-end synthesis scenarios against an in-memory buffer.

use std::f64::consts::TAU;

use pixtone_backend_audio::{
    BufferSink, CancelToken, EngineBuilder, Pixel, PixelGrid, RunSummary, SilentReporter, Sink,
    SynthesisEngine,
};
use pixtone_spec::{Hertz, ImageSettings, Millis, Rational, RenderConfig, SampleWidth, Timing};
use pretty_assertions::assert_eq;

fn render(engine: SynthesisEngine) -> (RunSummary, Vec<i32>) {
    let mut buffer = BufferSink::new();
    let summary = engine
        .run(
            &mut [&mut buffer as &mut dyn Sink],
            &mut SilentReporter,
            &CancelToken::new(),
        )
        .expect("run should succeed");
    (summary, buffer.into_samples())
}

fn settings(gain: Rational, min: i128, max: i128) -> ImageSettings {
    ImageSettings {
        gain,
        min: Hertz::from_integer(min),
        max: Hertz::from_integer(max),
    }
}

fn pattern() -> PixelGrid {
    PixelGrid::from_columns(vec![
        vec![
            Pixel::new(255, 255),
            Pixel::new(10, 255),
            Pixel::new(200, 80),
            Pixel::new(0, 0),
        ],
        vec![
            Pixel::new(90, 255),
            Pixel::new(255, 255),
            Pixel::new(30, 30),
            Pixel::new(128, 255),
        ],
        vec![
            Pixel::new(0, 255),
            Pixel::new(64, 128),
            Pixel::new(255, 255),
            Pixel::new(255, 200),
        ],
    ])
    .unwrap()
}

#[test]
fn test_single_pixel_440hz_scenario() {
    let config = RenderConfig {
        channels: 1,
        sample_width: SampleWidth::Bits16,
        sample_rate: 8000,
        timing: Timing::PixelDuration(Millis::from_integer(1000)),
        ..RenderConfig::default()
    };
    let grid = PixelGrid::filled(1, 1, Pixel::WHITE).unwrap();
    let engine = EngineBuilder::new(config)
        .source("a4", grid, settings(Rational::from_integer(1), 440, 440))
        .build()
        .unwrap();
    let (summary, samples) = render(engine);

    assert_eq!(samples.len(), 8000);
    assert_eq!(summary.total_samples(), 8000);
    assert!(summary.peak <= 32767);
    assert_eq!(summary.clipped_samples, 0);

    for (n, &sample) in samples.iter().enumerate() {
        let expected = 32767.0 * (TAU * 440.0 * n as f64 / 8000.0).sin();
        assert!(
            (f64::from(sample) - expected).abs() <= 1.0,
            "sample {n}: {sample} vs {expected}"
        );
    }

    // 440 full cycles in one second cross zero upwards 440 times.
    let rising = samples
        .windows(2)
        .filter(|w| w[0] < 0 && w[1] >= 0)
        .count();
    assert!((439..=441).contains(&rising), "{rising} rising crossings");
}

#[test]
fn test_two_half_gain_sources_equal_one_full_gain_source() {
    let config = RenderConfig {
        sample_rate: 11_025,
        timing: Timing::PixelDuration(Millis::from_integer(20)),
        ..RenderConfig::default()
    };

    let single = EngineBuilder::new(config.clone())
        .source("full", pattern(), settings(Rational::from_integer(1), 300, 1500))
        .build()
        .unwrap();
    let half = settings(Rational::new(1, 2), 300, 1500);
    let double = EngineBuilder::new(config)
        .source("left", pattern(), half)
        .source("right", pattern(), half)
        .build()
        .unwrap();

    let (_, expected) = render(single);
    let (_, mixed) = render(double);
    assert_eq!(mixed.len(), expected.len());
    assert_eq!(mixed, expected);
}

#[test]
fn test_overflowing_mix_clips_instead_of_wrapping() {
    let config = RenderConfig {
        sample_rate: 8000,
        timing: Timing::PixelDuration(Millis::from_integer(250)),
        ..RenderConfig::default()
    };
    let grid = PixelGrid::filled(1, 1, Pixel::WHITE).unwrap();
    let tone = settings(Rational::from_integer(1), 500, 500);

    let (_, alone) = render(
        EngineBuilder::new(config.clone())
            .source("a", grid.clone(), tone)
            .build()
            .unwrap(),
    );
    let (summary, mixed) = render(
        EngineBuilder::new(config)
            .source("a", grid.clone(), tone)
            .source("b", grid, tone)
            .build()
            .unwrap(),
    );

    assert_eq!(alone.iter().max(), Some(&32767));
    assert_eq!(mixed.iter().max(), Some(&32767));
    assert_eq!(mixed.iter().min(), Some(&-32768));
    assert!(summary.clipped_samples > 0);

    for (single, double) in alone.iter().zip(&mixed) {
        assert_eq!(single.signum(), double.signum());
        assert!(double.abs() >= single.abs());
    }
}

#[test]
fn test_shorter_source_falls_silent() {
    let config = RenderConfig {
        sample_rate: 8000,
        timing: Timing::PixelDuration(Millis::from_integer(10)),
        ..RenderConfig::default()
    };
    let short = PixelGrid::filled(2, 3, Pixel::WHITE).unwrap();
    let long_black = PixelGrid::filled(5, 3, Pixel::BLACK).unwrap();

    let engine = EngineBuilder::new(config)
        .source("short", short, ImageSettings::default())
        .source("long", long_black, ImageSettings::default())
        .build()
        .unwrap();
    let (summary, samples) = render(engine);

    assert_eq!(summary.total_samples(), 400);
    assert!(samples[..160].iter().any(|&s| s != 0));
    assert!(samples[160..].iter().all(|&s| s == 0));
}

#[test]
fn test_pixel_and_full_duration_render_identically() {
    let base = RenderConfig {
        sample_rate: 22_050,
        ..RenderConfig::default()
    };
    let by_pixel = RenderConfig {
        timing: Timing::PixelDuration(Millis::from_integer(15)),
        ..base.clone()
    };
    let by_full = RenderConfig {
        timing: Timing::FullDuration(Millis::from_integer(45)),
        ..base
    };

    let (a, samples_a) = render(
        EngineBuilder::new(by_pixel)
            .source("p", pattern(), ImageSettings::default())
            .build()
            .unwrap(),
    );
    let (b, samples_b) = render(
        EngineBuilder::new(by_full)
            .source("p", pattern(), ImageSettings::default())
            .build()
            .unwrap(),
    );

    assert_eq!(a.timeline, b.timeline);
    assert_eq!(a.pcm_hash, b.pcm_hash);
    assert_eq!(samples_a, samples_b);
}

#[test]
fn test_every_width_stays_in_range() {
    for width in [
        SampleWidth::Bits8,
        SampleWidth::Bits16,
        SampleWidth::Bits24,
        SampleWidth::Bits32,
    ] {
        let config = RenderConfig {
            sample_width: width,
            sample_rate: 8000,
            timing: Timing::PixelDuration(Millis::from_integer(50)),
            ..RenderConfig::default()
        };
        let grid = PixelGrid::filled(2, 1, Pixel::WHITE).unwrap();
        let tone = settings(Rational::from_integer(1), 1000, 1000);
        let (summary, samples) = render(
            EngineBuilder::new(config)
                .source("a", grid.clone(), tone)
                .source("b", grid.clone(), tone)
                .source("c", grid, tone)
                .build()
                .unwrap(),
        );

        assert_eq!(samples.iter().max(), Some(&width.max_sample()));
        assert_eq!(samples.iter().min(), Some(&width.min_sample()));
        assert_eq!(u64::from(summary.peak), width.max_amplitude() as u64);
    }
}
