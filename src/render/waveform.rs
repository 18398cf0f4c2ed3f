use image::{Rgb, RgbImage};

use super::text::TextOverlay;
use super::RenderError;

const BACKGROUND: Rgb<u8> = Rgb([250, 250, 252]);
const AXIS: Rgb<u8> = Rgb([200, 200, 208]);
const TRACE: Rgb<u8> = Rgb([45, 105, 200]);
const CAPTION: [u8; 3] = [40, 40, 48];

/// Draw a min/max envelope per pixel column, amplitude -1..1 bottom to top.
pub fn draw_waveform(
    samples: &[f32],
    sample_rate: u32,
    width: u32,
    height: u32,
    captions: Option<&TextOverlay>,
) -> Result<RgbImage, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidSize { width, height });
    }
    if samples.is_empty() {
        return Err(RenderError::Empty("waveform has no samples"));
    }

    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let to_row = |amplitude: f32| -> u32 {
        let normalized = (1.0 - amplitude.clamp(-1.0, 1.0)) * 0.5;
        ((normalized * (height - 1) as f32).round() as u32).min(height - 1)
    };

    let centre = to_row(0.0);
    for x in 0..width {
        image.put_pixel(x, centre, AXIS);
    }

    let n = samples.len();
    for x in 0..width {
        let start = x as usize * n / width as usize;
        let end = ((x as usize + 1) * n / width as usize).max(start + 1).min(n);
        if start >= n {
            break;
        }
        let (lo, hi) = samples[start..end]
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));

        // larger amplitude maps to a smaller row index
        for y in to_row(hi)..=to_row(lo) {
            image.put_pixel(x, y, TRACE);
        }
    }

    if let Some(overlay) = captions {
        let duration = n as f32 / sample_rate.max(1) as f32;
        overlay.composite(&mut image, &format!("Waveform  {duration:.2}s"), 8, 4, CAPTION);
    }

    Ok(image)
}
