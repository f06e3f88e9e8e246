//! Startup texture loading: one independent task per map, results applied to
//! the material on the caller's thread.
//!
//! Tasks are unordered and uncoordinated. A failed map is logged and its
//! slot left untouched; the others carry on. There is no timeout, so a
//! request that never answers simply never lands.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::color::Color;
use crate::fetch::TextureFetcher;
use crate::material::{
    ColorParam, FloatParam, GlobalIllumination, Material, MaterialFeature, TextureSlot,
};
use crate::remap;
use crate::texture::TextureData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapKind {
    BaseColor,
    Emission,
    Occlusion,
    MetallicRoughness,
    Normal,
}

impl MapKind {
    pub fn slot(self) -> TextureSlot {
        match self {
            MapKind::BaseColor => TextureSlot::BaseColor,
            MapKind::Emission => TextureSlot::Emission,
            MapKind::Occlusion => TextureSlot::Occlusion,
            MapKind::MetallicRoughness => TextureSlot::MetallicGloss,
            MapKind::Normal => TextureSlot::Normal,
        }
    }

    /// Channel conversion from the glTF layout, where one is needed.
    pub fn convert(self, decoded: TextureData) -> TextureData {
        match self {
            MapKind::MetallicRoughness => remap::convert_metallic_roughness(&decoded),
            MapKind::Normal => remap::convert_normal_map(&decoded),
            MapKind::BaseColor | MapKind::Emission | MapKind::Occlusion => decoded,
        }
    }

    /// Write a converted map into `material`, along with the parameters that
    /// go with it.
    pub fn apply(self, material: &mut Material, texture: TextureData) {
        match self {
            MapKind::BaseColor | MapKind::Occlusion => {}
            MapKind::Emission => {
                material.enable_feature(MaterialFeature::Emission);
                material.set_global_illumination(GlobalIllumination::RealtimeEmissive);
                material.set_color(ColorParam::Emission, Color::WHITE);
            }
            MapKind::MetallicRoughness => {
                material.set_float(FloatParam::Metallic, 1.0);
                material.set_float(FloatParam::Glossiness, 1.0);
            }
            MapKind::Normal => material.set_float(FloatParam::BumpScale, 1.0),
        }
        material.set_texture(self.slot(), texture);
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapKind::BaseColor => "base color",
            MapKind::Emission => "emission",
            MapKind::Occlusion => "occlusion",
            MapKind::MetallicRoughness => "metallic-roughness",
            MapKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Where each of the five maps comes from. Absent entries are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextureSources {
    pub base_map: Option<String>,
    pub emission_map: Option<String>,
    pub occlusion_map: Option<String>,
    pub metallic_roughness_map: Option<String>,
    pub normal_map: Option<String>,
}

impl TextureSources {
    /// Read a JSON document such as
    /// `{"base_map": "https://.../base.png", "normal_map": "maps/n.png"}`.
    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read texture sources {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse texture sources {}", path.display()))
    }

    /// Fill every entry set in `other` over this one.
    pub fn overlay(&mut self, other: TextureSources) {
        let TextureSources {
            base_map,
            emission_map,
            occlusion_map,
            metallic_roughness_map,
            normal_map,
        } = other;
        self.base_map = base_map.or(self.base_map.take());
        self.emission_map = emission_map.or(self.emission_map.take());
        self.occlusion_map = occlusion_map.or(self.occlusion_map.take());
        self.metallic_roughness_map = metallic_roughness_map.or(self.metallic_roughness_map.take());
        self.normal_map = normal_map.or(self.normal_map.take());
    }

    pub fn entries(&self) -> [(MapKind, Option<&str>); 5] {
        [
            (MapKind::BaseColor, self.base_map.as_deref()),
            (MapKind::Emission, self.emission_map.as_deref()),
            (MapKind::Occlusion, self.occlusion_map.as_deref()),
            (MapKind::MetallicRoughness, self.metallic_roughness_map.as_deref()),
            (MapKind::Normal, self.normal_map.as_deref()),
        ]
    }
}

/// A map that was fetched, decoded and converted, waiting to be applied.
#[derive(Debug)]
pub struct LoadedMap {
    pub kind: MapKind,
    pub url: String,
    pub texture: TextureData,
}

pub struct TextureLoader {
    rx: mpsc::UnboundedReceiver<LoadedMap>,
    tasks: Vec<JoinHandle<()>>,
}

impl TextureLoader {
    /// Start one task per configured map on `runtime`.
    pub fn spawn<F: TextureFetcher>(
        runtime: &Handle,
        fetcher: Arc<F>,
        sources: &TextureSources,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut tasks = Vec::new();

        for (kind, url) in sources.entries() {
            let Some(url) = url else {
                log::debug!("No {kind} map configured; slot stays unset");
                continue;
            };
            let url = url.to_string();
            let fetcher = Arc::clone(&fetcher);
            let tx = tx.clone();
            tasks.push(runtime.spawn(async move {
                if let Some(map) = load_map(fetcher.as_ref(), kind, url).await {
                    // Receiver gone means nobody wants the result any more.
                    let _ = tx.send(map);
                }
            }));
        }

        log::info!("Loading {} texture map(s)", tasks.len());
        Self { rx, tasks }
    }

    /// Apply every map that has arrived so far without waiting.
    /// Returns how many were applied.
    pub fn apply_pending(&mut self, material: &mut Material) -> usize {
        let mut applied = 0;
        while let Ok(map) = self.rx.try_recv() {
            apply_loaded(material, map);
            applied += 1;
        }
        applied
    }

    /// Wait for every task and apply whatever succeeded.
    pub async fn apply_all(mut self, material: &mut Material) -> usize {
        let mut applied = 0;
        while let Some(map) = self.rx.recv().await {
            apply_loaded(material, map);
            applied += 1;
        }
        applied
    }

    /// Tasks still in flight.
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }
}

fn apply_loaded(material: &mut Material, map: LoadedMap) {
    log::info!(
        "Applied {} map {}x{} from {}",
        map.kind,
        map.texture.width,
        map.texture.height,
        map.url
    );
    map.kind.apply(material, map.texture);
}

async fn load_map<F: TextureFetcher>(fetcher: &F, kind: MapKind, url: String) -> Option<LoadedMap> {
    let bytes = match fetcher.fetch(&url).await {
        Ok(bytes) => bytes,
        Err(err) => {
            log::error!("Failed to fetch {kind} map: {err}");
            return None;
        }
    };

    let prepared = tokio::task::spawn_blocking(move || {
        TextureData::decode(&bytes).map(|decoded| kind.convert(decoded))
    })
    .await;

    match prepared {
        Ok(Ok(texture)) => Some(LoadedMap { kind, url, texture }),
        Ok(Err(err)) => {
            log::error!("Failed to decode {kind} map from {url}: {err:#}");
            None
        }
        Err(err) => {
            log::error!("Decoding {kind} map from {url} did not complete: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use crate::fetch::FetchError;

    /// In-memory fetcher: known URLs return their bytes, the rest 404.
    #[derive(Default)]
    struct MapFetcher {
        files: HashMap<String, Vec<u8>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
            self.files.insert(url.to_string(), bytes);
            self
        }
    }

    impl TextureFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.files.get(url).cloned().ok_or_else(|| FetchError::Protocol {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn png(px: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(px));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).expect("encode");
        out.into_inner()
    }

    fn all_sources() -> TextureSources {
        TextureSources {
            base_map: Some("mem://base".into()),
            emission_map: Some("mem://emission".into()),
            occlusion_map: Some("mem://occlusion".into()),
            metallic_roughness_map: Some("mem://mr".into()),
            normal_map: Some("mem://normal".into()),
        }
    }

    fn full_fetcher() -> MapFetcher {
        MapFetcher::default()
            .with("mem://base", png([200, 100, 50, 255]))
            .with("mem://emission", png([10, 20, 30, 255]))
            .with("mem://occlusion", png([0, 180, 0, 255]))
            .with("mem://mr", png([0, 64, 255, 255]))
            .with("mem://normal", png([40, 60, 250, 255]))
    }

    async fn load(fetcher: MapFetcher, sources: &TextureSources) -> (Material, usize) {
        let loader = TextureLoader::spawn(&Handle::current(), Arc::new(fetcher), sources);
        let mut material = Material::new();
        let applied = loader.apply_all(&mut material).await;
        (material, applied)
    }

    #[tokio::test]
    async fn all_five_maps_land_in_their_slots() {
        let (m, applied) = load(full_fetcher(), &all_sources()).await;
        assert_eq!(applied, 5);
        for slot in TextureSlot::ALL {
            assert!(m.texture(slot).is_some(), "{slot:?} missing");
        }
        let base = m.texture(TextureSlot::BaseColor).expect("base");
        assert_eq!(&base.data[..4], &[200, 100, 50, 255]);
    }

    #[tokio::test]
    async fn emission_turns_on_feature_and_white_tint() {
        let (m, _) = load(full_fetcher(), &all_sources()).await;
        assert!(m.is_enabled(MaterialFeature::Emission));
        assert_eq!(m.global_illumination(), GlobalIllumination::RealtimeEmissive);
        assert_eq!(m.color(ColorParam::Emission), Color::WHITE);
    }

    #[tokio::test]
    async fn normal_and_metallic_maps_are_remapped() {
        let (m, _) = load(full_fetcher(), &all_sources()).await;

        let normal = m.texture(TextureSlot::Normal).expect("normal");
        assert_eq!(&normal.data[..4], &[128, 128, 250, 40]);
        assert_eq!(m.float(FloatParam::BumpScale), 1.0);

        let mg = m.texture(TextureSlot::MetallicGloss).expect("metallic");
        assert_eq!(&mg.data[..4], &[255, 0, 0, 191]);
        assert_eq!(m.float(FloatParam::Metallic), 1.0);
        assert_eq!(m.float(FloatParam::Glossiness), 1.0);
    }

    #[tokio::test]
    async fn one_failed_fetch_leaves_the_other_four() {
        let mut sources = all_sources();
        sources.occlusion_map = Some("mem://missing".into());
        let (m, applied) = load(full_fetcher(), &sources).await;

        assert_eq!(applied, 4);
        assert!(m.texture(TextureSlot::Occlusion).is_none());
        for slot in [
            TextureSlot::BaseColor,
            TextureSlot::Emission,
            TextureSlot::MetallicGloss,
            TextureSlot::Normal,
        ] {
            assert!(m.texture(slot).is_some(), "{slot:?} missing");
        }
    }

    #[tokio::test]
    async fn undecodable_bytes_leave_slot_unset() {
        let fetcher = full_fetcher().with("mem://normal", b"not a png".to_vec());
        let (m, applied) = load(fetcher, &all_sources()).await;
        assert_eq!(applied, 4);
        assert!(m.texture(TextureSlot::Normal).is_none());
        assert_eq!(m.float(FloatParam::BumpScale), 1.0, "default untouched");
    }

    #[tokio::test]
    async fn absent_sources_spawn_nothing() {
        let sources = TextureSources {
            base_map: Some("mem://base".into()),
            ..Default::default()
        };
        let loader = TextureLoader::spawn(&Handle::current(), Arc::new(full_fetcher()), &sources);
        assert!(loader.pending() <= 1);
        let mut m = Material::new();
        assert_eq!(loader.apply_all(&mut m).await, 1);
        assert!(m.texture(TextureSlot::Emission).is_none());
    }

    #[tokio::test]
    async fn apply_pending_drains_without_blocking() {
        let mut loader =
            TextureLoader::spawn(&Handle::current(), Arc::new(full_fetcher()), &all_sources());
        let mut m = Material::new();
        let mut applied = 0;
        while applied < 5 {
            applied += loader.apply_pending(&mut m);
            tokio::task::yield_now().await;
        }
        assert_eq!(loader.pending(), 0);
        assert_eq!(loader.apply_pending(&mut m), 0);
    }

    #[test]
    fn sources_parse_from_json_and_overlay() {
        let mut from_file: TextureSources =
            serde_json::from_str(r#"{"base_map": "a.png", "normal_map": "n.png"}"#)
                .expect("parse");
        from_file.overlay(TextureSources {
            normal_map: Some("override.png".into()),
            ..Default::default()
        });
        assert_eq!(from_file.base_map.as_deref(), Some("a.png"));
        assert_eq!(from_file.normal_map.as_deref(), Some("override.png"));
        assert!(from_file.emission_map.is_none());
    }

    #[test]
    fn unknown_json_keys_are_rejected() {
        let parsed = serde_json::from_str::<TextureSources>(r#"{"albedo": "a.png"}"#);
        assert!(parsed.is_err());
    }
}
