//! glTF-to-viewer channel remaps.
//!
//! glTF stores metalness in blue and roughness in green; the viewer's
//! material expects metalness in red and glossiness (1 - roughness) in
//! alpha. Normal maps keep X in alpha so the shader can rebuild the vector
//! from (a, g).

use crate::color::Color;
use crate::texture::TextureData;

/// `(r, g, b, a) -> (0.5, 0.5, b, r)`
#[inline]
pub fn normal_map_pixel(src: Color) -> Color {
    Color::new(0.5, 0.5, src.b, src.r)
}

/// `(r, g, b, a) -> (b, 0, 0, 1 - g)`
#[inline]
pub fn metallic_gloss_pixel(src: Color) -> Color {
    Color::new(src.b, 0.0, 0.0, 1.0 - src.g)
}

pub fn convert_normal_map(src: &TextureData) -> TextureData {
    src.map_pixels(normal_map_pixel)
}

pub fn convert_metallic_roughness(src: &TextureData) -> TextureData {
    src.map_pixels(metallic_gloss_pixel)
}
