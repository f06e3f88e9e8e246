//! GPU mirror of [`asset::Material`]: one texture per slot, a parameter UBO and
//! the bind group tying them together.

use std::num::NonZeroU64;
use std::sync::Arc;

use asset::TextureData;
use asset::material::{ColorParam, FloatParam, Material, MaterialFeature, TextureSlot};
use bytemuck::{Pod, Zeroable};
use wgpu::util::{DeviceExt, TextureDataOrder};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    Buffer, BufferBindingType, BufferUsages, Device, Extent3d, Queue, Sampler,
    SamplerBindingType, ShaderStages, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDimension,
};

/// Material UBO (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MaterialUniform {
    emission_color: [f32; 4],
    metallic: f32,
    glossiness: f32,
    bump_scale: f32,
    emission_enabled: f32,
}

impl MaterialUniform {
    fn from_material(m: &Material) -> Self {
        Self {
            emission_color: m.color(ColorParam::Emission).to_array(),
            metallic: m.float(FloatParam::Metallic),
            glossiness: m.float(FloatParam::Glossiness),
            bump_scale: m.float(FloatParam::BumpScale),
            emission_enabled: if m.is_enabled(MaterialFeature::Emission) {
                1.0
            } else {
                0.0
            },
        }
    }
}

/// Binding index of each slot's texture; 0 and 1 are the UBO and sampler.
fn slot_binding(slot: TextureSlot) -> u32 {
    match slot {
        TextureSlot::BaseColor => 2,
        TextureSlot::Emission => 3,
        TextureSlot::Occlusion => 4,
        TextureSlot::MetallicGloss => 5,
        TextureSlot::Normal => 6,
    }
}

pub struct GpuMaterial {
    layout: BindGroupLayout,
    bind_group: BindGroup,
    params_buf: Buffer,
    sampler: Sampler,
    views: [TextureView; 5],
    /// CPU textures currently uploaded, to skip unchanged slots.
    uploaded: [Option<Arc<TextureData>>; 5],
    revision: Option<u64>,
}

impl GpuMaterial {
    pub fn new(device: &Device, queue: &Queue) -> Self {
        let mut entries = vec![
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<MaterialUniform>() as u64),
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ];
        entries.extend(TextureSlot::ALL.map(|slot| BindGroupLayoutEntry {
            binding: slot_binding(slot),
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }));
        let layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Material BGL"),
            entries: &entries,
        });

        let params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material UBO"),
            contents: bytemuck::bytes_of(&MaterialUniform::from_material(&Material::new())),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let views = TextureSlot::ALL.map(|slot| {
            let fallback = TextureData::solid(1, 1, slot.fallback_rgba8());
            upload(device, queue, slot, &fallback)
        });
        let bind_group = create_bind_group(device, &layout, &params_buf, &sampler, &views);

        Self {
            layout,
            bind_group,
            params_buf,
            sampler,
            views,
            uploaded: Default::default(),
            revision: None,
        }
    }

    #[inline]
    pub fn layout(&self) -> &BindGroupLayout {
        &self.layout
    }

    #[inline]
    pub fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }

    /// Upload whatever changed since the last sync.
    pub fn sync(&mut self, device: &Device, queue: &Queue, material: &Material) {
        if self.revision == Some(material.revision()) {
            return;
        }

        let mut rebind = false;
        for (i, slot) in TextureSlot::ALL.into_iter().enumerate() {
            let current = material.texture(slot);
            let unchanged = match (current, &self.uploaded[i]) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                continue;
            }
            let max_dim = device.limits().max_texture_dimension_2d;
            self.views[i] = match current {
                Some(tex) if fits_limits(tex, max_dim) => upload(device, queue, slot, tex),
                Some(tex) => {
                    log::error!(
                        "{:?} texture is {}x{}, outside the device limit of {}; keeping fallback",
                        slot,
                        tex.width,
                        tex.height,
                        max_dim
                    );
                    upload(device, queue, slot, &TextureData::solid(1, 1, slot.fallback_rgba8()))
                }
                None => upload(device, queue, slot, &TextureData::solid(1, 1, slot.fallback_rgba8())),
            };
            // Rejected textures are recorded too so they are not retried every frame.
            self.uploaded[i] = current.cloned();
            rebind = true;
            log::debug!("Uploaded {:?} texture", slot);
        }

        if rebind {
            self.bind_group =
                create_bind_group(device, &self.layout, &self.params_buf, &self.sampler, &self.views);
        }
        queue.write_buffer(
            &self.params_buf,
            0,
            bytemuck::bytes_of(&MaterialUniform::from_material(material)),
        );
        self.revision = Some(material.revision());
    }
}

/// Non-empty and no side larger than `max_dim`.
fn fits_limits(tex: &TextureData, max_dim: u32) -> bool {
    tex.width > 0 && tex.height > 0 && tex.width <= max_dim && tex.height <= max_dim
}

fn upload(device: &Device, queue: &Queue, slot: TextureSlot, tex: &TextureData) -> TextureView {
    let format = if slot.is_color() {
        TextureFormat::Rgba8UnormSrgb
    } else {
        TextureFormat::Rgba8Unorm
    };
    let texture = device.create_texture_with_data(
        queue,
        &TextureDescriptor {
            label: Some("Material Texture"),
            size: Extent3d {
                width: tex.width.max(1),
                height: tex.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        &tex.data,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_bind_group(
    device: &Device,
    layout: &BindGroupLayout,
    params: &Buffer,
    sampler: &Sampler,
    views: &[TextureView; 5],
) -> BindGroup {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: 0,
            resource: params.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::Sampler(sampler),
        },
    ];
    for (slot, view) in TextureSlot::ALL.into_iter().zip(views.iter()) {
        entries.push(wgpu::BindGroupEntry {
            binding: slot_binding(slot),
            resource: wgpu::BindingResource::TextureView(view),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Material BG"),
        layout,
        entries: &entries,
    })
}
