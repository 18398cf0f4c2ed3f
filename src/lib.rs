//! Diagnostic reports for recorded audio clips.
//!
//! A decoded [`Signal`] goes in; a [`DiagnosticReport`] comes out with
//! loudness, silence and clipping ratios, average pitch, low/mid/high band
//! balance, a waveform image, a log-frequency spectrogram image and a
//! down-sampled waveform series.
//!
//! ```text
//! Signal ─┬─ Framer ─┬─ Energy (RMS, silence %)
//!         │          └─ Pitch (YIN)
//!         ├─ Clipping %
//!         ├─ STFT ─┬─ Band energy
//!         │        └─ Spectrogram image
//!         └─ Waveform image + series
//! ```

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod render;
pub mod report;
pub mod table;

pub use audio::analysis::Diagnoser;
pub use audio::decode::decode_audio;
pub use audio::features::Metrics;
pub use audio::signal::{BitDepth, Signal};
pub use config::{AnalysisConfig, RenderConfig};
pub use dsp::bands::BandEnergy;
pub use dsp::pitch::PitchEstimate;
pub use error::DiagnoseError;
pub use report::{Artifact, DiagnosticReport};
