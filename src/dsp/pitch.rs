//! YIN fundamental-frequency estimation.
//!
//! Each frame's difference function is computed through an FFT
//! cross-correlation, normalized by its cumulative mean, and searched for the
//! first dip below the confidence threshold inside the configured lag range.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use super::framing::Framing;

const FLAT_DIFFERENCE: f32 = 1e-3;

/// Search bounds and framing for pitch tracking.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PitchConfig {
    #[serde(default = "default_pitch_framing")]
    pub framing: Framing,
    #[serde(default = "default_fmin")]
    pub fmin: f32,
    #[serde(default = "default_fmax")]
    pub fmax: f32,
    /// Upper bound on the normalized difference for a lag to count as periodic.
    #[serde(default = "default_yin_threshold")]
    pub threshold: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            framing: default_pitch_framing(),
            fmin: default_fmin(),
            fmax: default_fmax(),
            threshold: default_yin_threshold(),
        }
    }
}

fn default_pitch_framing() -> Framing { Framing::default() }
fn default_fmin() -> f32 { 50.0 }
fn default_fmax() -> f32 { 300.0 }
fn default_yin_threshold() -> f32 { 0.1 }

impl PitchConfig {
    /// Framing used at `sample_rate`. The configured frame is kept while it
    /// holds two periods of `fmin`; otherwise it grows to the next power of two
    /// that does, and the hop grows by the same factor.
    pub fn framing_at(&self, sample_rate: u32) -> Framing {
        let tau_max = (sample_rate as f32 / self.fmin).ceil() as usize;
        let needed = 2 * tau_max;
        let configured = self.framing;
        if configured.frame_length >= needed {
            return configured;
        }

        let frame_length = needed.next_power_of_two();
        let hop_length = (configured.hop_length * frame_length)
            .div_ceil(configured.frame_length)
            .max(1);
        Framing::new(frame_length, hop_length)
    }
}

/// Clip-level pitch. `Undefined` when no frame produced a confident estimate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PitchEstimate {
    Detected { hz: f32 },
    Undefined,
}

impl PitchEstimate {
    pub fn hz(&self) -> Option<f32> {
        match *self {
            PitchEstimate::Detected { hz } => Some(hz),
            PitchEstimate::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, PitchEstimate::Detected { .. })
    }
}

impl From<Option<f32>> for PitchEstimate {
    fn from(value: Option<f32>) -> Self {
        value.map_or(PitchEstimate::Undefined, |hz| PitchEstimate::Detected { hz })
    }
}

/// Per-frame estimates in frame order; `None` marks frames without a confident pitch.
#[derive(Clone, Debug, PartialEq)]
pub struct PitchTrack {
    pub estimates: Vec<Option<f32>>,
}

impl PitchTrack {
    pub fn voiced_frames(&self) -> usize {
        self.estimates.iter().flatten().count()
    }

    pub fn average(&self) -> PitchEstimate {
        let voiced: Vec<f32> = self.estimates.iter().flatten().copied().collect();
        if voiced.is_empty() {
            return PitchEstimate::Undefined;
        }
        let mean = voiced.iter().map(|&hz| hz as f64).sum::<f64>() / voiced.len() as f64;
        PitchEstimate::Detected { hz: mean as f32 }
    }
}

pub struct YinEstimator {
    sample_rate: f32,
    frame_length: usize,
    tau_min: usize,
    tau_max: usize,
    threshold: f32,
    fft_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl YinEstimator {
    /// Returns `None` when the frame is too short to hold the longest period
    /// of the search range at this sample rate.
    pub fn new(sample_rate: u32, config: &PitchConfig) -> Option<Self> {
        let sr = sample_rate as f32;
        let frame_length = config.framing.frame_length;
        let tau_min = ((sr / config.fmax).floor() as usize).max(2);
        let tau_max = (sr / config.fmin).ceil() as usize;

        if tau_min >= tau_max || tau_max + 2 > frame_length {
            return None;
        }

        let fft_size = frame_length.next_power_of_two();
        let mut planner = FftPlanner::<f32>::new();

        Some(Self {
            sample_rate: sr,
            frame_length,
            tau_min,
            tau_max,
            threshold: config.threshold,
            fft_size,
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
        })
    }

    pub fn estimate(&self, frame: &[f32]) -> Option<f32> {
        if frame.len() != self.frame_length {
            return None;
        }
        let diff = self.difference(frame);

        // a flat difference function means no AC content (silence or DC offset)
        let window = self.frame_length - self.tau_max;
        let head_energy: f32 = frame[..window].iter().map(|s| s * s).sum();
        if diff.iter().copied().fold(0.0f32, f32::max) <= FLAT_DIFFERENCE * head_energy {
            return None;
        }

        let cmnd = self.cumulative_mean_normalized(&diff);

        let mut tau = self.tau_min;
        while tau <= self.tau_max {
            if cmnd[tau] < self.threshold {
                while tau < self.tau_max && cmnd[tau + 1] < cmnd[tau] {
                    tau += 1;
                }
                return Some(self.sample_rate / refine_lag(&cmnd, tau));
            }
            tau += 1;
        }
        None
    }

    /// d(tau) = sum_j (x[j] - x[j + tau])^2 over a window of `frame_length - tau_max`.
    fn difference(&self, frame: &[f32]) -> Vec<f32> {
        let window = self.frame_length - self.tau_max;
        let zero = Complex::new(0.0f32, 0.0);

        let mut full: Vec<Complex<f32>> = frame
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .chain(std::iter::repeat(zero))
            .take(self.fft_size)
            .collect();
        let mut head: Vec<Complex<f32>> = frame[..window]
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .chain(std::iter::repeat(zero))
            .take(self.fft_size)
            .collect();

        self.forward.process(&mut full);
        self.forward.process(&mut head);
        for (a, b) in full.iter_mut().zip(head.iter()) {
            *a *= b.conj();
        }
        self.inverse.process(&mut full);
        let scale = 1.0 / self.fft_size as f32;

        let mut energy = Vec::with_capacity(frame.len() + 1);
        energy.push(0.0f32);
        for &s in frame {
            let last = energy[energy.len() - 1];
            energy.push(last + s * s);
        }
        let head_energy = energy[window];

        (0..=self.tau_max)
            .map(|tau| {
                let shifted_energy = energy[tau + window] - energy[tau];
                let cross = full[tau].re * scale;
                (head_energy + shifted_energy - 2.0 * cross).max(0.0)
            })
            .collect()
    }

    fn cumulative_mean_normalized(&self, diff: &[f32]) -> Vec<f32> {
        let mut cmnd = vec![1.0f32; diff.len()];
        let mut running = 0.0f32;
        for tau in 1..diff.len() {
            running += diff[tau];
            if running > 0.0 {
                cmnd[tau] = diff[tau] * tau as f32 / running;
            }
        }
        cmnd
    }
}

/// Parabolic interpolation around a local minimum.
fn refine_lag(cmnd: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmnd.len() {
        return tau as f32;
    }
    let (a, b, c) = (cmnd[tau - 1], cmnd[tau], cmnd[tau + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < 1e-12 {
        return tau as f32;
    }
    let offset = (0.5 * (a - c) / denom).clamp(-1.0, 1.0);
    tau as f32 + offset
}

pub fn track_pitch(samples: &[f32], sample_rate: u32, config: &PitchConfig) -> PitchTrack {
    let framing = config.framing_at(sample_rate);
    if framing != config.framing {
        log::debug!(
            "Pitch frame widened to {}/{} for {} Hz audio",
            framing.frame_length,
            framing.hop_length,
            sample_rate
        );
    }
    let config = PitchConfig { framing, ..*config };

    let Some(estimator) = YinEstimator::new(sample_rate, &config) else {
        log::warn!(
            "No usable lag range for {}-{} Hz at {} Hz, skipping pitch",
            config.fmin,
            config.fmax,
            sample_rate
        );
        return PitchTrack { estimates: Vec::new() };
    };

    let frames = framing.frames(samples);
    // zero padding fakes periodicity, so a padded tail only votes when it is the whole clip
    let has_full_frame = frames.iter().any(|f| !f.is_padded());

    let estimates: Vec<Option<f32>> = frames
        .par_iter()
        .map(|frame| {
            if has_full_frame && frame.is_padded() {
                None
            } else {
                estimator.estimate(&frame.to_padded())
            }
        })
        .collect();

    let track = PitchTrack { estimates };
    log::debug!(
        "Pitch: {}/{} frames voiced",
        track.voiced_frames(),
        track.estimates.len()
    );
    track
}
