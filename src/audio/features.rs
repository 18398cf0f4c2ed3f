use serde::Serialize;

use super::signal::BitDepth;
use crate::dsp::bands::BandEnergy;
use crate::dsp::pitch::PitchEstimate;

/// Numeric clip-level metrics. Values are unscaled and unrounded; display
/// formatting happens in [`crate::table`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub duration_secs: f32,
    pub sample_rate: u32,
    pub bit_depth: BitDepth,
    /// Mean of per-frame RMS on the normalized amplitude scale.
    pub average_rms: f32,
    pub average_pitch: PitchEstimate,
    pub silence_percent: f32,
    pub clipping_percent: f32,
    pub bands: BandEnergy,
}
