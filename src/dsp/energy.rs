use rayon::prelude::*;

use super::framing::{Frame, Framing};

/// Per-frame RMS and the clip-level figures derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyStats {
    pub series: Vec<f32>,
    pub average_rms: f32,
    pub silence_percent: f32,
}

impl EnergyStats {
    /// True when the framing produced no frames at all.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

pub fn frame_rms(frame: &Frame) -> f32 {
    if frame.length == 0 {
        return 0.0;
    }
    // padding contributes zeros to the sum but still counts toward the mean
    let sum_sq: f32 = frame.data.iter().map(|s| s * s).sum();
    (sum_sq / frame.length as f32).sqrt()
}

pub fn analyze_energy(samples: &[f32], framing: Framing, silence_threshold: f32) -> EnergyStats {
    let series: Vec<f32> = framing
        .frames(samples)
        .par_iter()
        .map(frame_rms)
        .collect();

    if series.is_empty() {
        log::warn!("RMS framing produced no frames, treating clip as silent");
        return EnergyStats {
            series,
            average_rms: 0.0,
            silence_percent: 100.0,
        };
    }

    let total = series.len() as f32;
    let average_rms = series.iter().sum::<f32>() / total;
    let silent = series.iter().filter(|&&rms| rms < silence_threshold).count();
    let silence_percent = silent as f32 / total * 100.0;

    log::debug!(
        "Energy: {} frames, avg_rms={:.6}, silent={} ({:.1}%)",
        series.len(),
        average_rms,
        silent,
        silence_percent
    );

    EnergyStats {
        series,
        average_rms,
        silence_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAMING: Framing = Framing::new(256, 64);

    #[test]
    fn test_constant_signal_rms() {
        let samples = vec![0.5f32; 1024];
        let stats = analyze_energy(&samples, Framing::new(256, 256), 0.02);
        assert_eq!(stats.series.len(), 4);
        assert!((stats.average_rms - 0.5).abs() < 1e-6);
        assert_eq!(stats.silence_percent, 0.0);
    }

    #[test]
    fn test_zeros_are_fully_silent() {
        let stats = analyze_energy(&vec![0.0f32; 4096], FRAMING, 0.02);
        assert_eq!(stats.average_rms, 0.0);
        assert_eq!(stats.silence_percent, 100.0);
    }

    #[test]
    fn test_empty_signal_counts_as_silence() {
        let stats = analyze_energy(&[], FRAMING, 0.02);
        assert!(stats.is_empty());
        assert_eq!(stats.average_rms, 0.0);
        assert_eq!(stats.silence_percent, 100.0);
    }

    #[test]
    fn test_half_silent_clip() {
        let mut samples = vec![0.0f32; 4096];
        samples.extend(std::iter::repeat(0.3).take(4096));
        let stats = analyze_energy(&samples, Framing::new(512, 512), 0.02);
        assert_eq!(stats.series.len(), 16);
        assert_eq!(stats.silence_percent, 50.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        // a frame sitting exactly on the threshold is not silent
        let stats = analyze_energy(&vec![0.5f32; 512], Framing::new(512, 512), 0.5);
        assert_eq!(stats.silence_percent, 0.0);
    }
}
