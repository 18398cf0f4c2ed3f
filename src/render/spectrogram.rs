use image::{Rgb, RgbImage};

use super::text::TextOverlay;
use super::RenderError;
use crate::dsp::spectral::Spectrogram;

const CAPTION: [u8; 3] = [235, 235, 240];
const MIN_MAGNITUDE: f32 = 1e-10;

/// Magnitude in dB relative to `reference`, clamped to `[-db_range, 0]`.
pub fn relative_db(magnitude: f32, reference: f32, db_range: f32) -> f32 {
    let ratio = magnitude.max(MIN_MAGNITUDE) / reference.max(MIN_MAGNITUDE);
    (20.0 * ratio.log10()).clamp(-db_range, 0.0)
}

/// Bin index for each image row, top row = highest frequency, log-spaced
/// from the first non-DC bin up to Nyquist.
fn row_bins(spectrogram: &Spectrogram, height: u32) -> Vec<usize> {
    let axis = &spectrogram.axis;
    let last_bin = axis.len() - 1;
    let f_min = axis.bin_width();
    let f_max = axis.max_frequency();
    let span = (f_max / f_min).ln();

    (0..height)
        .map(|y| {
            let frac = if height > 1 {
                (height - 1 - y) as f32 / (height - 1) as f32
            } else {
                0.0
            };
            let freq = f_min * (span * frac).exp();
            ((freq / axis.bin_width()).round() as usize).clamp(1, last_bin)
        })
        .collect()
}

/// Heat map of log magnitude: time runs left to right, log frequency bottom to top.
pub fn draw_spectrogram(
    spectrogram: &Spectrogram,
    width: u32,
    height: u32,
    db_range: f32,
    captions: Option<&TextOverlay>,
) -> Result<RgbImage, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidSize { width, height });
    }
    if spectrogram.is_empty() {
        return Err(RenderError::Empty("spectrogram has no frames"));
    }
    if spectrogram.axis.len() < 3 {
        return Err(RenderError::Empty("transform too small for a log-frequency axis"));
    }

    let gradient = colorgrad::viridis();
    let reference = spectrogram.peak_magnitude();
    let db_range = db_range.max(1.0);
    let rows = row_bins(spectrogram, height);
    let n_frames = spectrogram.frames.len();

    let mut image = RgbImage::new(width, height);
    for x in 0..width {
        let frame = &spectrogram.frames[(x as usize * n_frames / width as usize).min(n_frames - 1)];
        for (y, &bin) in rows.iter().enumerate() {
            let t = if reference <= MIN_MAGNITUDE {
                0.0
            } else {
                (relative_db(frame.magnitudes[bin], reference, db_range) + db_range) / db_range
            };
            let [r, g, b, _] = gradient.at(t as f64).to_rgba8();
            image.put_pixel(x, y as u32, Rgb([r, g, b]));
        }
    }

    if let Some(overlay) = captions {
        let top = format!("{:.0} Hz", spectrogram.axis.max_frequency());
        let bottom = format!("{:.0} Hz", spectrogram.axis.bin_width());
        overlay.composite(&mut image, "Spectrogram (log frequency)", 8, 4, CAPTION);
        let right = width.saturating_sub(overlay.measure_width(&top) + 8);
        overlay.composite(&mut image, &top, right, 4, CAPTION);
        let bottom_y = height.saturating_sub(overlay.line_height() + 4);
        overlay.composite(&mut image, &bottom, right, bottom_y, CAPTION);
    }

    Ok(image)
}
