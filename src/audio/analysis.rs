use crate::config::AnalysisConfig;
use crate::dsp::bands::aggregate_bands;
use crate::dsp::clipping::clipping_percent;
use crate::dsp::energy::analyze_energy;
use crate::dsp::pitch::track_pitch;
use crate::dsp::spectral::stft;
use crate::error::DiagnoseError;
use crate::render::series::waveform_series;
use crate::render::{ArtifactRenderer, RasterRenderer, RenderError};
use crate::report::{Artifact, DiagnosticReport};

use super::features::Metrics;
use super::signal::Signal;

/// Runs the full diagnostic pipeline over decoded clips.
pub struct Diagnoser {
    config: AnalysisConfig,
    renderer: Box<dyn ArtifactRenderer>,
}

impl Diagnoser {
    pub fn new(config: AnalysisConfig) -> Result<Self, DiagnoseError> {
        config.validate()?;
        Ok(Self {
            config,
            renderer: Box::new(RasterRenderer::default()),
        })
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ArtifactRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn diagnose(&self, signal: &Signal) -> Result<DiagnosticReport, DiagnoseError> {
        signal.validate()?;

        let cfg = &self.config;
        let samples = signal.samples();
        let sr = signal.sample_rate();

        log::info!("Pass 1: Energy, clipping, pitch, spectra...");
        let ((energy, clipping), (pitch, spectrogram)) = rayon::join(
            || {
                rayon::join(
                    || analyze_energy(samples, cfg.rms_framing, cfg.silence_threshold),
                    || clipping_percent(samples, cfg.clipping_threshold),
                )
            },
            || {
                rayon::join(
                    || track_pitch(samples, sr, &cfg.pitch),
                    || stft(samples, sr, cfg.spectral_framing),
                )
            },
        );

        log::info!("Pass 2: Band aggregation...");
        let bands = aggregate_bands(&spectrogram, &cfg.bands);

        let average_pitch = pitch.average();
        if !average_pitch.is_defined() {
            log::warn!(
                "No frame gave a confident pitch in {}-{} Hz",
                cfg.pitch.fmin,
                cfg.pitch.fmax
            );
        }

        let metrics = Metrics {
            duration_secs: signal.duration_secs(),
            sample_rate: sr,
            bit_depth: signal.bit_depth(),
            average_rms: energy.average_rms,
            average_pitch,
            silence_percent: energy.silence_percent,
            clipping_percent: clipping,
            bands,
        };

        log::info!("Pass 3: Artifacts...");
        let (waveform, spectrogram_image) = rayon::join(
            || self.renderer.render_waveform(signal),
            || self.renderer.render_spectrogram(&spectrogram),
        );
        let waveform = into_artifact("waveform", waveform);
        let spectrogram = into_artifact("spectrogram", spectrogram_image);
        let waveform_series = waveform_series(samples, sr, cfg.series_max_points);

        log::info!(
            "Summary: {:.2}s, rms={:.4}, pitch={}, silence={:.1}%, clipping={:.2}%",
            metrics.duration_secs,
            metrics.average_rms,
            metrics
                .average_pitch
                .hz()
                .map_or_else(|| "undefined".to_string(), |hz| format!("{hz:.1} Hz")),
            metrics.silence_percent,
            metrics.clipping_percent
        );

        Ok(DiagnosticReport {
            metrics,
            waveform,
            spectrogram,
            waveform_series,
        })
    }
}

fn into_artifact(name: &str, result: Result<image::RgbImage, RenderError>) -> Artifact {
    match result {
        Ok(image) => Artifact::rendered(image),
        Err(err) => {
            log::warn!("No {} image: {}", name, err);
            Artifact::Missing {
                reason: err.to_string(),
            }
        }
    }
}
