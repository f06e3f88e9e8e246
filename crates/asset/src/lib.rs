//! Asset side of the viewer: CPU textures, PBR channel remaps, the material
//! model, and the asynchronous texture loader that fills it.

pub mod color;
pub mod fetch;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod remap;
pub mod texture;

pub use color::Color;
pub use loader::{MapKind, TextureLoader, TextureSources};
pub use material::{Material, TextureSlot};
pub use texture::TextureData;
