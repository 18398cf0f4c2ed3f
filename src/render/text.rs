use fontdue::{Font, FontSettings};
use image::{Rgb, RgbImage};
use std::path::Path;

use super::RenderError;

pub struct TextOverlay {
    font: Font,
    font_size: f32,
}

impl TextOverlay {
    pub fn from_file(path: &Path, font_size: f32) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self { font, font_size })
    }

    /// Blend text onto an RGB image with its top-left corner at (x, y).
    pub fn composite(&self, image: &mut RgbImage, text: &str, x: u32, y: u32, color: [u8; 3]) {
        let (width, height) = image.dimensions();
        let mut cursor_x = x as i32;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.font_size);
            let glyph_y = y as i32 + self.font_size as i32 - metrics.height as i32 - metrics.ymin;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = bitmap[gy * metrics.width + gx];
                    if alpha == 0 {
                        continue;
                    }

                    let px = cursor_x + metrics.xmin + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        continue;
                    }

                    let a = alpha as f32 / 255.0;
                    let inv_a = 1.0 - a;
                    let pixel = image.get_pixel_mut(px as u32, py as u32);
                    let Rgb(current) = *pixel;
                    *pixel = Rgb([
                        (color[0] as f32 * a + current[0] as f32 * inv_a) as u8,
                        (color[1] as f32 * a + current[1] as f32 * inv_a) as u8,
                        (color[2] as f32 * a + current[2] as f32 * inv_a) as u8,
                    ]);
                }
            }

            cursor_x += metrics.advance_width as i32;
        }
    }

    pub fn measure_width(&self, text: &str) -> u32 {
        let width: f32 = text
            .chars()
            .map(|ch| self.font.metrics(ch, self.font_size).advance_width)
            .sum();
        width.ceil() as u32
    }

    pub fn line_height(&self) -> u32 {
        self.font_size.ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_is_an_error() {
        let result = TextOverlay::from_file(Path::new("/nonexistent/font.ttf"), 12.0);
        assert!(matches!(result, Err(RenderError::Font(_))));
    }

    #[test]
    fn test_garbage_font_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(TextOverlay::from_file(&path, 12.0), Err(RenderError::Font(_))));
    }
}
