//! Material model the texture loader writes into and the renderer reads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::color::Color;
use crate::texture::TextureData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    BaseColor,
    Emission,
    Occlusion,
    MetallicGloss,
    Normal,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::BaseColor,
        TextureSlot::Emission,
        TextureSlot::Occlusion,
        TextureSlot::MetallicGloss,
        TextureSlot::Normal,
    ];

    /// Slots holding color (sRGB) rather than data.
    pub fn is_color(self) -> bool {
        matches!(self, TextureSlot::BaseColor | TextureSlot::Emission)
    }

    /// Pixel used when nothing has been assigned.
    pub fn fallback_rgba8(self) -> [u8; 4] {
        match self {
            TextureSlot::BaseColor | TextureSlot::Occlusion | TextureSlot::MetallicGloss => {
                [255, 255, 255, 255]
            }
            TextureSlot::Emission => [0, 0, 0, 255],
            // Flat normal in the (a, g) packing.
            TextureSlot::Normal => [128, 128, 255, 128],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorParam {
    Emission,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatParam {
    Metallic,
    Glossiness,
    BumpScale,
}

impl FloatParam {
    fn default_value(self) -> f32 {
        match self {
            FloatParam::Metallic => 0.0,
            FloatParam::Glossiness => 0.5,
            FloatParam::BumpScale => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialFeature {
    Emission,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlobalIllumination {
    #[default]
    None,
    RealtimeEmissive,
}

/// Named texture slots, parameters and feature flags of one renderable.
///
/// Every mutation bumps [`revision`](Self::revision) so consumers can tell
/// when to re-upload.
#[derive(Clone, Debug, Default)]
pub struct Material {
    textures: HashMap<TextureSlot, Arc<TextureData>>,
    colors: HashMap<ColorParam, Color>,
    floats: HashMap<FloatParam, f32>,
    features: HashSet<MaterialFeature>,
    gi: GlobalIllumination,
    revision: u64,
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_texture(&mut self, slot: TextureSlot, texture: TextureData) {
        self.textures.insert(slot, Arc::new(texture));
        self.touch();
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<TextureData>> {
        self.textures.get(&slot)
    }

    pub fn set_color(&mut self, param: ColorParam, color: Color) {
        self.colors.insert(param, color);
        self.touch();
    }

    pub fn color(&self, param: ColorParam) -> Color {
        self.colors.get(&param).copied().unwrap_or(Color::BLACK)
    }

    pub fn set_float(&mut self, param: FloatParam, value: f32) {
        self.floats.insert(param, value);
        self.touch();
    }

    pub fn float(&self, param: FloatParam) -> f32 {
        self.floats
            .get(&param)
            .copied()
            .unwrap_or_else(|| param.default_value())
    }

    pub fn enable_feature(&mut self, feature: MaterialFeature) {
        if self.features.insert(feature) {
            self.touch();
        }
    }

    pub fn is_enabled(&self, feature: MaterialFeature) -> bool {
        self.features.contains(&feature)
    }

    pub fn set_global_illumination(&mut self, gi: GlobalIllumination) {
        self.gi = gi;
        self.touch();
    }

    pub fn global_illumination(&self) -> GlobalIllumination {
        self.gi
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
