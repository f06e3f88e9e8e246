//! Entry point for the Vitrine viewer.
//! Logging, CLI flags and texture source configuration.

use anyhow::{Context, Result};
use asset::TextureSources;
use corelib::bottom_bar::Direction;
use platform::ViewerConfig;

fn parse_backend(val: &str) -> wgpu::Backends {
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

fn parse_switch(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

fn parse_size(val: &str) -> Option<(u32, u32)> {
    let (w, h) = val.split_once('x').or_else(|| val.split_once('X'))?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Build the viewer configuration from `--flag=value` arguments.
fn parse_args<I>(args: I) -> Result<ViewerConfig>
where
    I: IntoIterator<Item = String>,
{
    let mut config = ViewerConfig::default();
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;
    let mut textures_file: Option<String> = None;
    let mut flags = TextureSources::default();

    for arg in args {
        if let Some(v) = arg.strip_prefix("--gpu-backend=") {
            config.backends = parse_backend(v);
        } else if arg == "--show-fps" {
            config.show_fps = true;
        } else if let Some(v) = arg.strip_prefix("--show-fps=") {
            config.show_fps = parse_switch(v);
        } else if let Some(v) = arg.strip_prefix("--size=") {
            match parse_size(v) {
                Some((w, h)) => {
                    width = Some(w);
                    height = Some(h);
                }
                None => log::warn!("Ignoring malformed --size '{}'", v),
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            width = v.parse().ok().or(width);
        } else if let Some(v) = arg.strip_prefix("--height=") {
            height = v.parse().ok().or(height);
        } else if let Some(v) = arg.strip_prefix("--textures=") {
            textures_file = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--base-map=") {
            flags.base_map = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--emission-map=") {
            flags.emission_map = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--occlusion-map=") {
            flags.occlusion_map = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--metallic-roughness-map=") {
            flags.metallic_roughness_map = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--normal-map=") {
            flags.normal_map = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--turn-speed=") {
            config.turn_speed_deg = v
                .parse::<f32>()
                .with_context(|| format!("Invalid --turn-speed '{v}'"))?
                .max(0.0);
        } else if let Some(v) = arg.strip_prefix("--select=") {
            config.select = Some(v.parse::<Direction>()?);
        } else {
            log::debug!("Ignoring argument '{}'", arg);
        }
    }

    if let Some(path) = textures_file {
        config.textures = TextureSources::load_json(&path)?;
    }
    config.textures.overlay(flags);

    config.width = width.unwrap_or(config.width).max(1);
    config.height = height.unwrap_or(config.height).max(1);
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = parse_args(std::env::args().skip(1))?;
    log::info!(
        "Starting Vitrine. Backend: {:?}, show_fps={}, window_size={}x{}, turn_speed={}°/s",
        config.backends,
        config.show_fps,
        config.width,
        config.height,
        config.turn_speed_deg
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let config = parse_args(Vec::new()).unwrap();
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(!config.show_fps);
        assert_eq!(config.select, None);
        assert_eq!(config.textures, TextureSources::default());
    }

    #[test]
    fn size_and_explicit_dimensions() {
        let config = parse_args(args(&["--size=800x600"])).unwrap();
        assert_eq!((config.width, config.height), (800, 600));

        let config = parse_args(args(&["--size=800x600", "--height=0"])).unwrap();
        assert_eq!((config.width, config.height), (800, 1));
    }

    #[test]
    fn switches_and_backend() {
        let config = parse_args(args(&["--show-fps", "--gpu-backend=vk"])).unwrap();
        assert!(config.show_fps);
        assert_eq!(config.backends, wgpu::Backends::VULKAN);

        let config = parse_args(args(&["--show-fps=off"])).unwrap();
        assert!(!config.show_fps);
    }

    #[test]
    fn map_flags_fill_sources() {
        let config = parse_args(args(&[
            "--base-map=https://example.test/base.png",
            "--normal-map=/tmp/normal.png",
        ]))
        .unwrap();
        assert_eq!(
            config.textures.base_map.as_deref(),
            Some("https://example.test/base.png")
        );
        assert_eq!(config.textures.normal_map.as_deref(), Some("/tmp/normal.png"));
        assert_eq!(config.textures.emission_map, None);
    }

    #[test]
    fn select_and_speed() {
        let config = parse_args(args(&["--select=Left", "--turn-speed=90"])).unwrap();
        assert_eq!(config.select, Some(Direction::Left));
        assert_eq!(config.turn_speed_deg, 90.0);

        assert!(parse_args(args(&["--select=up"])).is_err());
        assert!(parse_args(args(&["--turn-speed=fast"])).is_err());
    }

    #[test]
    fn missing_textures_file_is_an_error() {
        let err = parse_args(args(&["--textures=/nonexistent/vitrine.json"])).unwrap_err();
        assert!(format!("{err:#}").contains("vitrine.json"));
    }
}
