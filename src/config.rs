use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dsp::bands::BandLayout;
use crate::dsp::framing::Framing;
use crate::dsp::pitch::PitchConfig;
use crate::error::DiagnoseError;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Thresholds and framings for one analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Frames with RMS strictly below this count as silent.
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f32,
    /// Samples at or above this magnitude count as clipped.
    #[serde(default = "default_clipping_threshold")]
    pub clipping_threshold: f32,
    #[serde(default)]
    pub rms_framing: Framing,
    #[serde(default)]
    pub spectral_framing: Framing,
    #[serde(default)]
    pub pitch: PitchConfig,
    #[serde(default)]
    pub bands: BandLayout,
    /// Upper bound on interactive waveform points; 0 keeps every sample.
    #[serde(default = "default_series_max_points")]
    pub series_max_points: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_waveform_width")]
    pub waveform_width: u32,
    #[serde(default = "default_waveform_height")]
    pub waveform_height: u32,
    #[serde(default = "default_spectrogram_width")]
    pub spectrogram_width: u32,
    #[serde(default = "default_spectrogram_height")]
    pub spectrogram_height: u32,
    /// Decibels below the clip's peak mapped to the darkest colour.
    #[serde(default = "default_db_range")]
    pub db_range: f32,
    /// TTF/OTF font used for image captions. Captions are skipped without one.
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            silence_threshold: default_silence_threshold(),
            clipping_threshold: default_clipping_threshold(),
            rms_framing: Framing::default(),
            spectral_framing: Framing::default(),
            pitch: PitchConfig::default(),
            bands: BandLayout::default(),
            series_max_points: default_series_max_points(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            waveform_width: default_waveform_width(),
            waveform_height: default_waveform_height(),
            spectrogram_width: default_spectrogram_width(),
            spectrogram_height: default_spectrogram_height(),
            db_range: default_db_range(),
            font: None,
            font_size: default_font_size(),
        }
    }
}

fn default_silence_threshold() -> f32 { 0.02 }
fn default_clipping_threshold() -> f32 { 0.98 }
fn default_series_max_points() -> usize { 5000 }
fn default_enabled() -> bool { true }
fn default_waveform_width() -> u32 { 1200 }
fn default_waveform_height() -> u32 { 300 }
fn default_spectrogram_width() -> u32 { 1200 }
fn default_spectrogram_height() -> u32 { 400 }
fn default_db_range() -> f32 { 80.0 }
fn default_font_size() -> f32 { 16.0 }

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), DiagnoseError> {
        for (name, value) in [
            ("silence_threshold", self.silence_threshold),
            ("clipping_threshold", self.clipping_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(DiagnoseError::invalid_config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        self.rms_framing.validate("rms_framing")?;
        self.spectral_framing.validate("spectral_framing")?;
        self.pitch.framing.validate("pitch.framing")?;

        if !(self.pitch.fmin > 0.0 && self.pitch.fmin < self.pitch.fmax) {
            return Err(DiagnoseError::invalid_config(format!(
                "pitch range [{}, {}] Hz is empty",
                self.pitch.fmin, self.pitch.fmax
            )));
        }
        if !(self.pitch.threshold > 0.0 && self.pitch.threshold <= 1.0) {
            return Err(DiagnoseError::invalid_config(format!(
                "pitch.threshold must be in (0, 1], got {}",
                self.pitch.threshold
            )));
        }

        self.bands.validate()
    }
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Config {} is not valid TOML: {}", path.display(), err);
            None
        }
    }
}
