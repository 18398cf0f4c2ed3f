use serde::{Deserialize, Serialize};

use super::spectral::Spectrogram;
use crate::error::DiagnoseError;

/// Half-open frequency range `[low_hz, high_hz)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandRange {
    pub low_hz: f32,
    pub high_hz: f32,
}

impl BandRange {
    pub const fn new(low_hz: f32, high_hz: f32) -> Self {
        Self { low_hz, high_hz }
    }

    pub fn contains(&self, freq: f32) -> bool {
        freq >= self.low_hz && freq < self.high_hz
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandLayout {
    #[serde(default = "default_low")]
    pub low: BandRange,
    #[serde(default = "default_mid")]
    pub mid: BandRange,
    #[serde(default = "default_high")]
    pub high: BandRange,
}

impl Default for BandLayout {
    fn default() -> Self {
        Self {
            low: default_low(),
            mid: default_mid(),
            high: default_high(),
        }
    }
}

fn default_low() -> BandRange { BandRange::new(20.0, 250.0) }
fn default_mid() -> BandRange { BandRange::new(250.0, 4000.0) }
fn default_high() -> BandRange { BandRange::new(4000.0, 16000.0) }

impl BandLayout {
    pub fn validate(&self) -> Result<(), DiagnoseError> {
        for (name, band) in [("low", self.low), ("mid", self.mid), ("high", self.high)] {
            if !(band.low_hz >= 0.0 && band.low_hz < band.high_hz) {
                return Err(DiagnoseError::InvalidConfig {
                    reason: format!(
                        "{name} band [{}, {}) Hz is empty or negative",
                        band.low_hz, band.high_hz
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Mean spectral magnitude in each band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BandEnergy {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

pub fn aggregate_bands(spectrogram: &Spectrogram, layout: &BandLayout) -> BandEnergy {
    let band_mean = |band: &BandRange| -> f32 {
        let bins: Vec<usize> = spectrogram
            .axis
            .frequencies()
            .iter()
            .enumerate()
            .filter(|&(_, &f)| band.contains(f))
            .map(|(k, _)| k)
            .collect();

        let count = bins.len() * spectrogram.frames.len();
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = spectrogram
            .frames
            .iter()
            .flat_map(|frame| bins.iter().map(move |&k| frame.magnitudes[k] as f64))
            .sum();
        (sum / count as f64) as f32
    };

    let energy = BandEnergy {
        low: band_mean(&layout.low),
        mid: band_mean(&layout.mid),
        high: band_mean(&layout.high),
    };

    log::debug!(
        "Bands: low={:.4}, mid={:.4}, high={:.4}",
        energy.low,
        energy.mid,
        energy.high
    );

    energy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::framing::Framing;
    use crate::dsp::spectral::stft;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_ranges_are_half_open() {
        let band = BandRange::new(250.0, 4000.0);
        assert!(band.contains(250.0));
        assert!(band.contains(3999.9));
        assert!(!band.contains(4000.0));
        assert!(!band.contains(249.9));
    }

    #[test]
    fn test_sine_lands_in_its_band() {
        let sample_rate = 44100;
        let layout = BandLayout::default();

        let low = aggregate_bands(&stft(&sine(100.0, sample_rate, 44100), sample_rate, Framing::new(2048, 512)), &layout);
        assert!(low.low > low.mid * 10.0);
        assert!(low.low > low.high * 10.0);

        let mid = aggregate_bands(&stft(&sine(1000.0, sample_rate, 44100), sample_rate, Framing::new(2048, 512)), &layout);
        assert!(mid.mid > mid.low);
        assert!(mid.mid > mid.high);

        let high = aggregate_bands(&stft(&sine(8000.0, sample_rate, 44100), sample_rate, Framing::new(2048, 512)), &layout);
        assert!(high.high > high.low);
        assert!(high.high > high.mid);
    }

    #[test]
    fn test_uncovered_band_is_zero() {
        // Nyquist at 3 kHz leaves the high band without bins
        let sample_rate = 6000;
        let spec = stft(&sine(440.0, sample_rate, 6000), sample_rate, Framing::new(512, 128));
        let energy = aggregate_bands(&spec, &BandLayout::default());
        assert_eq!(energy.high, 0.0);
        assert!(energy.mid > 0.0);
    }

    #[test]
    fn test_no_frames_gives_zero_energy() {
        let spec = stft(&[], 44100, Framing::new(2048, 512));
        assert_eq!(aggregate_bands(&spec, &BandLayout::default()), BandEnergy::default());
    }

    #[test]
    fn test_validate_layout() {
        assert!(BandLayout::default().validate().is_ok());
        let layout = BandLayout {
            mid: BandRange::new(4000.0, 250.0),
            ..Default::default()
        };
        assert!(layout.validate().is_err());
    }
}
