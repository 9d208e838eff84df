use crate::constants::*;
use glam::Vec3;
use hero_core::assets::EnvironmentMap;
use hero_core::color::Rgb;
use hero_core::config::Background;
use hero_core::constants::POINT_SIZE;
use hero_core::error::{HeroError, Result};
use hero_core::objects::HeroScene;
use hero_core::renderer::{SceneRenderer, Viewport};
use hero_core::scene::{ResourceId, ResourceSink};
use web_sys as web;

mod helpers;
mod mesh;
mod points;
mod textures;

use mesh::{MeshCache, MeshVertex};
use points::PointBuffer;
use textures::TextureCache;

pub static MESH_WGSL: &str = include_str!("../../shaders/mesh.wgsl");
pub static POINTS_WGSL: &str = include_str!("../../shaders/points.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    ambient: [f32; 4],
    key_dir: [f32; 4],
    key_color: [f32; 4],
    rim_dir: [f32; 4],
    rim_color: [f32; 4],
    viewport: [f32; 4],
    env: [f32; 4],
}

/// Per-draw slot in the dynamic uniform buffer. The point cloud reuses the
/// layout with `emissive.x` as its sprite half size.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    params: [f32; 4],
}

struct Draw {
    geometry: ResourceId,
    texture: Option<ResourceId>,
    slot: u32,
}

/// WebGPU renderer for one hero canvas.
pub struct WebRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pixel_ratio: f64,
    clear_color: wgpu::Color,

    globals_buffer: wgpu::Buffer,
    globals_layout: wgpu::BindGroupLayout,
    globals_bind_group: wgpu::BindGroup,
    env_sampler: wgpu::Sampler,
    env_texture: wgpu::Texture,
    env_id: Option<ResourceId>,

    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_slots: u64,

    mesh_opaque: wgpu::RenderPipeline,
    mesh_blend: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,

    meshes: MeshCache,
    textures: TextureCache,
    points: PointBuffer,
    disposed: bool,
}

impl WebRenderer {
    pub async fn new(
        canvas: &web::HtmlCanvasElement,
        background: &Background,
        point_count: usize,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = if background.is_transparent()
            && caps
                .alpha_modes
                .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = helpers::create_depth_view(&device, width, height);

        // Group 0: globals + environment map
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("env_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let (env_texture, env_view) =
            helpers::create_rgba_texture(&device, &queue, "env_default", 1, 1, &[0, 0, 0, 255]);
        let globals_bind_group = globals_bind_group(
            &device,
            &globals_layout,
            &globals_buffer,
            &env_view,
            &env_sampler,
        );

        // Group 1: per-draw dynamic uniforms
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ObjectUniform>() as u64
                    ),
                },
                count: None,
            }],
        });
        let (object_buffer, object_bind_group) =
            object_resources(&device, &object_layout, INITIAL_OBJECT_SLOTS);

        // Group 2: base color map (meshes only)
        let textures = TextureCache::new(&device, &queue);

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout, textures.layout()],
            push_constant_ranges: &[],
        });
        let points_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("points_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_WGSL.into()),
        });
        let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(POINTS_WGSL.into()),
        });
        let mesh_buffers = [MeshVertex::layout()];
        let mesh_opaque = helpers::make_pipeline(
            &device,
            helpers::PipelineSpec {
                label: "mesh_opaque",
                layout: &mesh_layout,
                shader: &mesh_shader,
                vs_entry: "vs_mesh",
                fs_entry: "fs_mesh",
                buffers: &mesh_buffers,
                color_format: format,
                depth_write: true,
                cull_mode: None,
            },
        );
        let mesh_blend = helpers::make_pipeline(
            &device,
            helpers::PipelineSpec {
                label: "mesh_blend",
                layout: &mesh_layout,
                shader: &mesh_shader,
                vs_entry: "vs_mesh",
                fs_entry: "fs_mesh",
                buffers: &mesh_buffers,
                color_format: format,
                depth_write: false,
                cull_mode: None,
            },
        );
        let point_buffers = [PointBuffer::layout()];
        let points_pipeline = helpers::make_pipeline(
            &device,
            helpers::PipelineSpec {
                label: "points",
                layout: &points_layout,
                shader: &points_shader,
                vs_entry: "vs_points",
                fs_entry: "fs_points",
                buffers: &point_buffers,
                color_format: format,
                depth_write: false,
                cull_mode: None,
            },
        );
        let points = PointBuffer::new(&device, point_count);
        let [r, g, b, a] = background.clear_rgba();
        log::info!("[gpu] surface {}x{} {:?}", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            pixel_ratio: 1.0,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            },
            globals_buffer,
            globals_layout,
            globals_bind_group,
            env_sampler,
            env_texture,
            env_id: None,
            object_layout,
            object_buffer,
            object_bind_group,
            object_slots: INITIAL_OBJECT_SLOTS,
            mesh_opaque,
            mesh_blend,
            points_pipeline,
            meshes: MeshCache::default(),
            textures,
            points,
            disposed: false,
        })
    }

    fn ensure_object_slots(&mut self, needed: u64) {
        if needed <= self.object_slots {
            return;
        }
        let slots = needed.next_power_of_two();
        self.object_buffer.destroy();
        let (buffer, bind_group) = object_resources(&self.device, &self.object_layout, slots);
        self.object_buffer = buffer;
        self.object_bind_group = bind_group;
        self.object_slots = slots;
    }

    fn write_globals(&self, scene: &HeroScene) {
        let camera = &scene.camera;
        let ambient = Rgb::from_hex(AMBIENT_COLOR).scale(AMBIENT_INTENSITY);
        let key = Rgb::WHITE.scale(KEY_LIGHT_INTENSITY);
        let rim = Rgb::from_hex(RIM_LIGHT_COLOR).scale(RIM_LIGHT_INTENSITY);
        let env_strength = if self.env_id.is_some() { ENV_STRENGTH } else { 0.0 };
        let globals = Globals {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
            ambient: rgb4(ambient, 1.0),
            key_dir: Vec3::from(KEY_LIGHT_POSITION).normalize().extend(0.0).to_array(),
            key_color: rgb4(key, 1.0),
            rim_dir: Vec3::from(RIM_LIGHT_POSITION).normalize().extend(0.0).to_array(),
            rim_color: rgb4(rim, 1.0),
            viewport: [
                self.config.width as f32,
                self.config.height as f32,
                self.pixel_ratio as f32,
                0.0,
            ],
            env: [env_strength, 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    fn reset_environment(&mut self) {
        self.env_texture.destroy();
        let (texture, view) =
            helpers::create_rgba_texture(&self.device, &self.queue, "env_default", 1, 1, &[0, 0, 0, 255]);
        self.replace_environment(texture, view, None);
    }

    fn replace_environment(
        &mut self,
        texture: wgpu::Texture,
        view: wgpu::TextureView,
        id: Option<ResourceId>,
    ) {
        self.globals_bind_group = globals_bind_group(
            &self.device,
            &self.globals_layout,
            &self.globals_buffer,
            &view,
            &self.env_sampler,
        );
        self.env_texture = texture;
        self.env_id = id;
    }
}

impl ResourceSink for WebRenderer {
    fn release_geometry(&mut self, id: ResourceId) {
        self.meshes.release(id);
    }

    fn release_material(&mut self, id: ResourceId) {
        // Material parameters live in per-draw uniform slots.
        log::trace!("[gpu] material {} released", id.raw());
    }

    fn release_texture(&mut self, id: ResourceId) {
        if self.disposed {
            return;
        }
        if self.env_id == Some(id) {
            self.reset_environment();
        } else if !self.textures.release(id) {
            log::trace!("[gpu] texture {} was never uploaded", id.raw());
        }
    }
}

impl SceneRenderer for WebRenderer {
    fn resize(&mut self, viewport: Viewport) {
        if self.disposed || viewport.width == 0 || viewport.height == 0 {
            return;
        }
        self.pixel_ratio = viewport.pixel_ratio;
        if viewport.width != self.config.width || viewport.height != self.config.height {
            self.config.width = viewport.width;
            self.config.height = viewport.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = helpers::create_depth_view(&self.device, viewport.width, viewport.height);
        }
    }

    fn set_environment(&mut self, environment: &EnvironmentMap) {
        if self.disposed || environment.width == 0 || environment.height == 0 {
            return;
        }
        let (texture, view) = helpers::create_rgba_texture(
            &self.device,
            &self.queue,
            "env_map",
            environment.width,
            environment.height,
            &environment.rgba,
        );
        self.env_texture.destroy();
        self.replace_environment(texture, view, Some(environment.id));
        log::info!("[gpu] environment {}x{}", environment.width, environment.height);
    }

    fn render(&mut self, scene: &HeroScene) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        let items = scene.draw_list();
        for item in &items {
            self.meshes.ensure(&self.device, item.geometry);
            if let Some(map) = item.material.map.as_ref() {
                self.textures.ensure(&self.device, &self.queue, map);
            }
        }

        // Opaque first, then translucent shells in draw-list order.
        let mut uniforms = Vec::with_capacity(items.len() + 1);
        let mut opaque = Vec::new();
        let mut blended = Vec::new();
        for item in &items {
            let slot = uniforms.len() as u32;
            let m = item.material;
            uniforms.push(ObjectUniform {
                model: item.model.to_cols_array_2d(),
                color: rgb4(m.color, m.opacity),
                emissive: rgb4(m.emissive, m.roughness),
                params: [m.metalness, 0.0, 0.0, 0.0],
            });
            let draw = Draw {
                geometry: item.geometry.id,
                texture: m.map.as_ref().map(|map| map.id),
                slot,
            };
            if m.opacity >= 0.999 {
                opaque.push(draw);
            } else {
                blended.push(draw);
            }
        }
        let cloud = &scene.cloud;
        let cloud_slot = if cloud.visible && cloud.opacity > 0.001 {
            let slot = uniforms.len() as u32;
            uniforms.push(ObjectUniform {
                model: cloud.model().to_cols_array_2d(),
                color: rgb4(cloud.color, cloud.opacity),
                emissive: [POINT_SIZE * 0.5, 0.0, 0.0, 0.0],
                params: [0.0; 4],
            });
            Some(slot)
        } else {
            None
        };

        self.ensure_object_slots(uniforms.len() as u64);
        let mut bytes = vec![0u8; uniforms.len() * OBJECT_UNIFORM_STRIDE as usize];
        for (i, u) in uniforms.iter().enumerate() {
            let start = i * OBJECT_UNIFORM_STRIDE as usize;
            let src = bytemuck::bytes_of(u);
            bytes[start..start + src.len()].copy_from_slice(src);
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.object_buffer, 0, &bytes);
        }
        self.write_globals(scene);
        let point_instances = match cloud_slot {
            Some(_) => self.points.upload(&self.device, &self.queue, &scene.particles),
            None => 0,
        };

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(HeroError::Render(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hero_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("hero_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (pipeline, draws) in [(&self.mesh_opaque, &opaque), (&self.mesh_blend, &blended)] {
                if draws.is_empty() {
                    continue;
                }
                rpass.set_pipeline(pipeline);
                for draw in draws {
                    let Some(mesh) = self.meshes.get(draw.geometry) else {
                        continue;
                    };
                    let offset = draw.slot * OBJECT_UNIFORM_STRIDE as u32;
                    rpass.set_bind_group(1, &self.object_bind_group, &[offset]);
                    rpass.set_bind_group(2, self.textures.bind_group(draw.texture), &[]);
                    rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                    rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
            if let (Some(slot), true) = (cloud_slot, point_instances > 0) {
                rpass.set_pipeline(&self.points_pipeline);
                rpass.set_bind_group(1, &self.object_bind_group, &[slot * OBJECT_UNIFORM_STRIDE as u32]);
                rpass.set_vertex_buffer(0, self.points.buffer().slice(..));
                rpass.draw(0..6, 0..point_instances);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.meshes.clear();
        self.textures.clear();
        self.points.destroy();
        self.object_buffer.destroy();
        self.globals_buffer.destroy();
        self.env_texture.destroy();
        self.env_id = None;
        log::info!("[gpu] renderer disposed");
    }
}

fn rgb4(c: Rgb, w: f32) -> [f32; 4] {
    let [r, g, b] = c.to_array();
    [r, g, b, w]
}

fn globals_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    env_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("globals_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(env_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn object_resources(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    slots: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("object_uniforms"),
        size: slots.max(1) * OBJECT_UNIFORM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}
