//! A 24-bit RGB raster for one map tile.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::RenderError;
use crate::color::Rgb;

/// A tile raster stored as row-major RGB triples (no alpha).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data. Length = `width * height * 3`.
    pub pixels: Vec<u8>,
}

impl TileImage {
    /// Create a new black image with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Set a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let idx = self.offset(x, y);
        self.pixels[idx..idx + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }

    /// Get a pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        let idx = self.offset(x, y);
        Rgb::new(self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
    }

    /// Paint a filled `w × h` rectangle at `(x, y)`, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + w as i64).min(self.width as i64);
        let y1 = (y as i64 + h as i64).min(self.height as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set_pixel(px as u32, py as u32, color);
            }
        }
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encodes the raster as an 8-bit RGB PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            &self.pixels,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_is_black() {
        let image = TileImage::new(64, 32);
        assert_eq!(image.dimensions(), (64, 32));
        assert_eq!(image.pixels.len(), 64 * 32 * 3);
        assert!(image.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_pixel_layout() {
        let mut image = TileImage::new(10, 10);
        image.set_pixel(3, 5, Rgb::new(255, 128, 64));
        let idx = (5 * 10 + 3) * 3;
        assert_eq!(&image.pixels[idx..idx + 3], &[255, 128, 64]);
        assert_eq!(image.get_pixel(3, 5), Rgb::new(255, 128, 64));
    }

    #[test]
    fn test_fill_rect_clips_to_canvas() {
        let mut image = TileImage::new(4, 4);
        let red = Rgb::new(255, 0, 0);
        image.fill_rect(-1, 3, 2, 2, red);
        assert_eq!(image.get_pixel(0, 3), red);
        assert_eq!(image.get_pixel(1, 3), Rgb::BLACK);

        image.fill_rect(3, -5, 10, 10, red);
        assert_eq!(image.get_pixel(3, 0), red);
        assert_eq!(image.get_pixel(3, 4 - 1), red);

        // Entirely outside: no-op, no panic.
        image.fill_rect(100, 100, 2, 2, red);
        image.fill_rect(-10, -10, 2, 2, red);
    }

    #[test]
    fn test_png_decodes_to_same_pixels() {
        let mut image = TileImage::new(3, 2);
        image.set_pixel(0, 0, Rgb::new(1, 2, 3));
        image.set_pixel(2, 1, Rgb::new(200, 100, 50));

        let bytes = image.encode_png().unwrap();
        assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        let rgb = decoded.to_rgb8();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(0, 0).0, [1, 2, 3]);
        assert_eq!(rgb.get_pixel(2, 1).0, [200, 100, 50]);
    }
}
