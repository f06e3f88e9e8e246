//! Texture data in CPU-friendly form before GPU upload.
//! Decodes PNG/JPEG bytes into tightly packed RGBA8.

use anyhow::Context;

use crate::color::Color;

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 4,
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        }
    }

    /// Texture of the given size filled with one color.
    pub fn solid(width: u32, height: u32, px: [u8; 4]) -> Self {
        let count = (width as usize) * (height as usize);
        Self::new_rgba8(width, height, px.repeat(count))
    }

    /// Decode an encoded image (PNG or JPEG) into RGBA8.
    pub fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        let img = image::load_from_memory(bytes).context("Failed to decode image bytes")?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::debug!("Decoded texture {}x{} ({} bytes)", width, height, data.len());

        Ok(Self::new_rgba8(width, height, data))
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size =
            (self.width as usize) * (self.height as usize) * self.bytes_per_pixel() as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Read one pixel. Panics when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        let i = self.offset(x, y);
        let px = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
        Color::from_rgba8(px)
    }

    /// Write one pixel. Panics when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&color.to_rgba8());
    }

    /// New texture of the same size with `f` applied to every pixel.
    ///
    /// Walks the packed buffer directly instead of going through
    /// [`get_pixel`](Self::get_pixel)/[`set_pixel`](Self::set_pixel).
    pub fn map_pixels(&self, f: impl Fn(Color) -> Color) -> TextureData {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let src = Color::from_rgba8([px[0], px[1], px[2], px[3]]);
            out.extend_from_slice(&f(src).to_rgba8());
        }
        Self::new_rgba8(self.width, self.height, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, data: Vec<u8>) -> Vec<u8> {
        let img = image::RgbaImage::from_raw(width, height, data).expect("buffer size");
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png)
            .expect("encode png");
        bytes.into_inner()
    }

    #[test]
    fn decodes_png_bytes() {
        let src = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 10, 20, 30, 40,
        ];
        let tex = TextureData::decode(&encode_png(2, 2, src.clone())).expect("decode");
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.data, src);
        assert!(tex.is_valid());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = TextureData::decode(b"definitely not an image").unwrap_err();
        assert!(err.to_string().contains("decode"));
    }

    #[test]
    fn pixel_accessors_address_row_major() {
        let mut tex = TextureData::solid(3, 2, [0, 0, 0, 255]);
        tex.set_pixel(2, 1, Color::WHITE);
        assert_eq!(&tex.data[20..24], &[255, 255, 255, 255]);
        assert_eq!(tex.get_pixel(2, 1), Color::WHITE);
        assert_eq!(tex.get_pixel(0, 0), Color::BLACK);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_pixel_panics() {
        TextureData::solid(2, 2, [0; 4]).get_pixel(2, 0);
    }

    #[test]
    fn map_pixels_keeps_dimensions() {
        let tex = TextureData::solid(4, 3, [10, 20, 30, 40]);
        let out = tex.map_pixels(|c| Color::new(c.a, c.b, c.g, c.r));
        assert_eq!((out.width, out.height), (4, 3));
        assert!(out.data.chunks_exact(4).all(|px| px == [40, 30, 20, 10]));
    }
}
