use super::helpers::create_rgba_texture;
use fnv::FnvHashMap;
use hero_core::scene::{ResourceId, TextureMap};

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Base color maps resident on the GPU, plus a white 1×1 stand-in bound for
/// untextured materials.
pub struct TextureCache {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    textures: FnvHashMap<ResourceId, GpuTexture>,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = upload(device, queue, &layout, &sampler, 1, 1, &[255; 4]);
        Self {
            layout,
            sampler,
            white,
            textures: FnvHashMap::default(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn ensure(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, map: &TextureMap) {
        if !self.textures.contains_key(&map.id) {
            let gpu = upload(
                device,
                queue,
                &self.layout,
                &self.sampler,
                map.width,
                map.height,
                &map.rgba,
            );
            log::debug!("[gpu] texture {} {}x{}", map.id.raw(), map.width, map.height);
            self.textures.insert(map.id, gpu);
        }
    }

    /// Bind group for `id`, or the white stand-in.
    pub fn bind_group(&self, id: Option<ResourceId>) -> &wgpu::BindGroup {
        id.and_then(|id| self.textures.get(&id))
            .map_or(&self.white.bind_group, |t| &t.bind_group)
    }

    /// Returns whether `id` was resident.
    pub fn release(&mut self, id: ResourceId) -> bool {
        match self.textures.remove(&id) {
            Some(gpu) => {
                gpu.texture.destroy();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for (_, gpu) in self.textures.drain() {
            gpu.texture.destroy();
        }
        self.white.texture.destroy();
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuTexture {
    let (texture, view) = create_rgba_texture(device, queue, "base_color", width, height, rgba);
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("material_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    GpuTexture { texture, bind_group }
}
