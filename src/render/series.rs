use serde::Serialize;

/// (time in seconds, amplitude) pairs for client-side waveform display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WaveformSeries {
    /// Distance in samples between consecutive points.
    pub stride: usize,
    pub points: Vec<(f32, f32)>,
}

impl WaveformSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Decimate by a fixed stride so the series holds at most `max_points` points.
pub fn waveform_series(samples: &[f32], sample_rate: u32, max_points: usize) -> WaveformSeries {
    let stride = if max_points == 0 || samples.len() <= max_points {
        1
    } else {
        samples.len().div_ceil(max_points)
    };
    let rate = sample_rate.max(1) as f32;

    let points = samples
        .iter()
        .enumerate()
        .step_by(stride)
        .map(|(i, &s)| (i as f32 / rate, s))
        .collect();

    WaveformSeries { stride, points }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_clip_keeps_every_sample() {
        let series = waveform_series(&[0.0, 0.5, -0.5, 1.0], 4, 10);
        assert_eq!(series.stride, 1);
        assert_eq!(
            series.points,
            vec![(0.0, 0.0), (0.25, 0.5), (0.5, -0.5), (0.75, 1.0)]
        );
    }

    #[test]
    fn test_long_clip_is_decimated() {
        let samples: Vec<f32> = (0..10_001).map(|i| i as f32 / 10_001.0).collect();
        let series = waveform_series(&samples, 1000, 1000);
        assert_eq!(series.stride, 11);
        assert!(series.len() <= 1000);
        assert_eq!(series.points[1].0, 0.011);
    }

    #[test]
    fn test_zero_limit_keeps_everything() {
        let samples = vec![0.1f32; 50_000];
        assert_eq!(waveform_series(&samples, 8000, 0).len(), 50_000);
    }
}
