use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use audiodiag::dsp::spectral::Spectrogram;
use audiodiag::render::{ArtifactRenderer, DisabledRenderer, RenderError};
use audiodiag::{
    AnalysisConfig, Artifact, BitDepth, DiagnoseError, Diagnoser, PitchEstimate, Signal,
};
use image::RgbImage;

fn sine(freq: f32, sample_rate: u32, secs: f32) -> Signal {
    let n = (sample_rate as f32 * secs) as usize;
    let samples = (0..n)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect();
    Signal::new(samples, sample_rate, BitDepth::Bits(16))
}

/// Deterministic uniform noise in [-0.5, 0.5].
fn white_noise(sample_rate: u32, secs: f32) -> Signal {
    let n = (sample_rate as f32 * secs) as usize;
    let samples = (0..n)
        .map(|i| {
            let mut hasher = DefaultHasher::new();
            i.hash(&mut hasher);
            (hasher.finish() as f64 / u64::MAX as f64 - 0.5) as f32
        })
        .collect();
    Signal::new(samples, sample_rate, BitDepth::Bits(24))
}

fn diagnoser() -> Diagnoser {
    Diagnoser::new(AnalysisConfig::default()).unwrap()
}

/// Fails every call, as an embedding without an image backend would.
struct BrokenRenderer;

impl ArtifactRenderer for BrokenRenderer {
    fn render_waveform(&self, _signal: &Signal) -> Result<RgbImage, RenderError> {
        Err(RenderError::Unavailable("no backend".into()))
    }

    fn render_spectrogram(&self, _spectrogram: &Spectrogram) -> Result<RgbImage, RenderError> {
        Err(RenderError::Unavailable("no backend".into()))
    }
}

#[test]
fn empty_signal_is_invalid_input() {
    for rate in [8000, 44100] {
        let err = diagnoser()
            .diagnose(&Signal::new(Vec::new(), rate, BitDepth::Unknown))
            .unwrap_err();
        assert!(matches!(err, DiagnoseError::InvalidInput { .. }));
        assert!(err.to_string().contains("no samples"));
    }
}

#[test]
fn zero_sample_rate_is_invalid_input() {
    let err = diagnoser()
        .diagnose(&Signal::new(vec![0.1; 100], 0, BitDepth::Unknown))
        .unwrap_err();
    assert!(matches!(err, DiagnoseError::InvalidInput { .. }));
}

#[test]
fn pure_tones_report_their_pitch() {
    for (freq, rate) in [(50.0f32, 16000u32), (120.0, 44100), (233.0, 22050), (300.0, 48000)] {
        let report = diagnoser().diagnose(&sine(freq, rate, 1.0)).unwrap();
        let hz = report.metrics.average_pitch.hz().expect("tone should have a pitch");
        assert!(
            (hz - freq).abs() / freq < 0.02,
            "{freq} Hz at {rate} Hz estimated as {hz}"
        );
    }
}

#[test]
fn high_sample_rate_tones_report_their_pitch() {
    for rate in [96000u32, 176400, 192000] {
        for freq in [50.0f32, 97.0, 300.0] {
            let report = diagnoser().diagnose(&sine(freq, rate, 1.0)).unwrap();
            let hz = report.metrics.average_pitch.hz().expect("tone should have a pitch");
            assert!(
                (hz - freq).abs() / freq < 0.02,
                "{freq} Hz at {rate} Hz estimated as {hz}"
            );
        }
    }
}

#[test]
fn all_zero_signal() {
    let report = diagnoser()
        .diagnose(&Signal::new(vec![0.0; 44100], 44100, BitDepth::Bits(16)))
        .unwrap();
    let m = &report.metrics;
    assert_eq!(m.silence_percent, 100.0);
    assert_eq!(m.average_rms, 0.0);
    assert_eq!(m.clipping_percent, 0.0);
    assert_eq!(m.average_pitch, PitchEstimate::Undefined);
}

#[test]
fn full_scale_signal_is_fully_clipped() {
    let report = diagnoser()
        .diagnose(&Signal::new(vec![1.0; 22050], 22050, BitDepth::Bits(16)))
        .unwrap();
    assert_eq!(report.metrics.clipping_percent, 100.0);
}

#[test]
fn white_noise_fills_every_band() {
    let report = diagnoser().diagnose(&white_noise(44100, 2.0)).unwrap();
    let bands = report.metrics.bands;
    assert!(bands.low > 0.0 && bands.mid > 0.0 && bands.high > 0.0);

    // flat spectrum: mean magnitude per bin is about the same in each band
    for (a, b) in [(bands.low, bands.mid), (bands.mid, bands.high), (bands.low, bands.high)] {
        let ratio = a / b;
        assert!((0.5..2.0).contains(&ratio), "band ratio {ratio} for {bands:?}");
    }
}

#[test]
fn band_energies_are_non_negative() {
    for signal in [sine(440.0, 8000, 0.5), white_noise(16000, 0.5), sine(90.0, 44100, 0.1)] {
        let bands = diagnoser().diagnose(&signal).unwrap().metrics.bands;
        assert!(bands.low >= 0.0 && bands.mid >= 0.0 && bands.high >= 0.0);
    }
}

#[test]
fn very_short_clip_degrades_gracefully() {
    let report = diagnoser()
        .diagnose(&Signal::new(vec![0.3, -0.3, 0.3], 8000, BitDepth::Unknown))
        .unwrap();
    assert_eq!(report.metrics.average_pitch, PitchEstimate::Undefined);
    assert!(report.metrics.silence_percent <= 100.0);
    assert_eq!(report.waveform_series.len(), 3);
}

#[test]
fn repeated_runs_are_identical() {
    let signal = white_noise(22050, 1.0);
    let d = diagnoser();
    let first = d.diagnose(&signal).unwrap();
    let second = d.diagnose(&signal).unwrap();
    assert_eq!(first, second);
    assert!(first.waveform.image().is_some());
}

#[test]
fn renderer_failure_leaves_metrics_untouched() {
    let signal = sine(180.0, 22050, 1.5);
    let rendered = diagnoser().diagnose(&signal).unwrap();
    let broken = diagnoser()
        .with_renderer(Box::new(BrokenRenderer))
        .diagnose(&signal)
        .unwrap();
    let disabled = diagnoser()
        .with_renderer(Box::new(DisabledRenderer))
        .diagnose(&signal)
        .unwrap();

    assert_eq!(rendered.metrics, broken.metrics);
    assert_eq!(rendered.metrics, disabled.metrics);
    assert_eq!(broken.missing_artifacts(), vec!["waveform", "spectrogram"]);
    assert!(matches!(&broken.spectrogram, Artifact::Missing { reason } if reason.contains("no backend")));
}

#[test]
fn persisted_report_points_at_png_files() {
    let dir = tempfile::tempdir().unwrap();
    let report = diagnoser()
        .diagnose(&sine(200.0, 16000, 1.0))
        .unwrap()
        .persist_artifacts(dir.path(), "voice")
        .unwrap();

    for (artifact, name) in [
        (&report.waveform, "voice_waveform.png"),
        (&report.spectrogram, "voice_spectrogram.png"),
    ] {
        let path = dir.path().join(name);
        assert_eq!(artifact, &Artifact::Saved { path: path.clone() });
        let image = image::open(&path).unwrap();
        assert!(image.width() > 0 && image.height() > 0);
    }

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["waveform"]["status"], "saved");
    assert_eq!(json["average_pitch"]["status"], "detected");
}
