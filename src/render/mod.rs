//! Image artifacts for a diagnosed clip.
//!
//! Rendering is optional: the orchestrator turns any [`RenderError`] into a
//! missing-artifact marker and keeps the metrics.

pub mod series;
pub mod spectrogram;
pub mod text;
pub mod waveform;

use image::RgbImage;
use thiserror::Error;

use crate::audio::signal::Signal;
use crate::config::RenderConfig;
use crate::dsp::spectral::Spectrogram;
use text::TextOverlay;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering unavailable: {0}")]
    Unavailable(String),
    #[error("nothing to render: {0}")]
    Empty(&'static str),
    #[error("invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("font could not be loaded: {0}")]
    Font(String),
}

pub trait ArtifactRenderer: Send + Sync {
    fn render_waveform(&self, signal: &Signal) -> Result<RgbImage, RenderError>;
    fn render_spectrogram(&self, spectrogram: &Spectrogram) -> Result<RgbImage, RenderError>;
}

/// Draws artifacts straight into in-memory RGB buffers.
pub struct RasterRenderer {
    config: RenderConfig,
    captions: Option<TextOverlay>,
}

impl RasterRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let captions = config.font.as_deref().and_then(|path| {
            match TextOverlay::from_file(path, config.font_size) {
                Ok(overlay) => Some(overlay),
                Err(err) => {
                    log::warn!("Rendering without captions: {}", err);
                    None
                }
            }
        });
        Self { config, captions }
    }
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl ArtifactRenderer for RasterRenderer {
    fn render_waveform(&self, signal: &Signal) -> Result<RgbImage, RenderError> {
        waveform::draw_waveform(
            signal.samples(),
            signal.sample_rate(),
            self.config.waveform_width,
            self.config.waveform_height,
            self.captions.as_ref(),
        )
    }

    fn render_spectrogram(&self, spectrogram: &Spectrogram) -> Result<RgbImage, RenderError> {
        spectrogram::draw_spectrogram(
            spectrogram,
            self.config.spectrogram_width,
            self.config.spectrogram_height,
            self.config.db_range,
            self.captions.as_ref(),
        )
    }
}

/// Stands in when rendering is switched off; every artifact comes back missing.
pub struct DisabledRenderer;

impl ArtifactRenderer for DisabledRenderer {
    fn render_waveform(&self, _signal: &Signal) -> Result<RgbImage, RenderError> {
        Err(RenderError::Unavailable("rendering disabled".into()))
    }

    fn render_spectrogram(&self, _spectrogram: &Spectrogram) -> Result<RgbImage, RenderError> {
        Err(RenderError::Unavailable("rendering disabled".into()))
    }
}

/// Pick the renderer a [`RenderConfig`] asks for.
pub fn renderer_for(config: &RenderConfig) -> Box<dyn ArtifactRenderer> {
    if config.enabled {
        Box::new(RasterRenderer::new(config.clone()))
    } else {
        Box::new(DisabledRenderer)
    }
}
