use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::framing::Framing;

/// Bin-centre frequencies shared by every frame of one transform.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyAxis {
    frequencies: Vec<f32>,
    bin_width: f32,
}

impl FrequencyAxis {
    /// Bins `0..=fft_size / 2`, bin `k` centred on `k * sample_rate / fft_size`.
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        let bin_width = if fft_size == 0 {
            0.0
        } else {
            sample_rate as f32 / fft_size as f32
        };
        let bins = if fft_size == 0 { 0 } else { fft_size / 2 + 1 };
        Self {
            frequencies: (0..bins).map(|k| k as f32 * bin_width).collect(),
            bin_width,
        }
    }

    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    pub fn bin_width(&self) -> f32 {
        self.bin_width
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn max_frequency(&self) -> f32 {
        self.frequencies.last().copied().unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpectralFrame {
    pub start: usize,
    pub magnitudes: Vec<f32>,
}

/// Short-time magnitude spectra of a whole clip.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrogram {
    pub frames: Vec<SpectralFrame>,
    pub axis: FrequencyAxis,
    pub sample_rate: u32,
    pub framing: Framing,
}

impl Spectrogram {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn peak_magnitude(&self) -> f32 {
        self.frames
            .iter()
            .flat_map(|f| f.magnitudes.iter().copied())
            .fold(0.0f32, f32::max)
    }

    /// Start time of a frame in seconds.
    pub fn frame_time(&self, index: usize) -> f32 {
        self.frames
            .get(index)
            .map_or(0.0, |f| f.start as f32 / self.sample_rate as f32)
    }
}

pub fn stft(samples: &[f32], sample_rate: u32, framing: Framing) -> Spectrogram {
    let fft_size = framing.frame_length;
    let axis = FrequencyAxis::new(sample_rate, fft_size);
    let hann = hann_window(fft_size);

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);
    let bins = axis.len();

    let frames: Vec<SpectralFrame> = framing
        .frames(samples)
        .par_iter()
        .map(|frame| {
            let mut buffer: Vec<Complex<f32>> = frame
                .samples()
                .zip(hann.iter())
                .map(|(s, w)| Complex::new(s * w, 0.0))
                .collect();
            fft.process(&mut buffer);

            SpectralFrame {
                start: frame.start,
                magnitudes: buffer[..bins].iter().map(|c| c.norm()).collect(),
            }
        })
        .collect();

    log::debug!(
        "STFT: {} frames x {} bins ({:.2} Hz/bin)",
        frames.len(),
        bins,
        axis.bin_width()
    );

    Spectrogram {
        frames,
        axis,
        sample_rate,
        framing,
    }
}

pub fn hann_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
