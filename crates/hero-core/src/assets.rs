//! Asset fetching and decoding.
//!
//! Models are binary glTF files with their buffers embedded in the BIN
//! chunk. Base color textures are decoded when their image lives in a buffer
//! view; other maps are ignored. The environment map is a Radiance HDR image, tone-mapped to 8-bit
//! RGBA so every backend can upload it without float-texture support.

use crate::color::Rgb;
use crate::error::{HeroError, Result};
use crate::scene::{Geometry, Material, Node, ResourceId, TextureMap};
use futures::future::LocalBoxFuture;
use glam::{Quat, Vec2, Vec3};

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Printer,
    Scanner,
    Part,
    Environment,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Printer,
        AssetKind::Scanner,
        AssetKind::Part,
        AssetKind::Environment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Printer => "printer",
            AssetKind::Scanner => "scanner",
            AssetKind::Part => "part",
            AssetKind::Environment => "env",
        }
    }
}

/// Resolves URLs to bytes. Implemented over `fetch` in the browser.
pub trait AssetLoader {
    fn load_bytes(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>>>;

    /// Abort every request still in flight. Pending futures resolve with an
    /// error.
    fn shutdown(&self);
}

/// Tone-mapped equirectangular environment image.
#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    pub id: ResourceId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub enum LoadedAsset {
    Model(Node),
    Environment(EnvironmentMap),
}

/// Fetch and decode a single asset.
pub async fn load_asset(loader: &dyn AssetLoader, kind: AssetKind, url: &str) -> Result<LoadedAsset> {
    let bytes = loader.load_bytes(url).await?;
    log::debug!("[assets] {} fetched ({} bytes)", kind.name(), bytes.len());
    match kind {
        AssetKind::Environment => decode_environment(&bytes).map(LoadedAsset::Environment),
        _ => decode_model(&bytes, kind.name()).map(LoadedAsset::Model),
    }
}

/// Decode a `.glb` into a scene graph rooted at a group named `name`.
pub fn decode_model(bytes: &[u8], name: &str) -> Result<Node> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    if let Some(ext) = gltf.extensions_required().find(|e| *e == DRACO_EXTENSION) {
        return Err(HeroError::UnsupportedExtension(ext.to_owned()));
    }

    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffers.push(blob.to_vec()),
                None => return Err(HeroError::ExternalBuffer(buffer.index())),
            },
            gltf::buffer::Source::Uri(_) => return Err(HeroError::ExternalBuffer(buffer.index())),
        }
    }

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or(HeroError::EmptyScene)?;
    let mut root = Node::group(name);
    for node in scene.nodes() {
        root.children.push(convert_node(&node, &buffers));
    }
    if root.mesh_count() == 0 {
        log::warn!("[assets] {name}: scene has no triangle meshes");
    }
    Ok(root)
}

fn convert_node(node: &gltf::Node, buffers: &[Vec<u8>]) -> Node {
    let mut out = Node::group(node.name().unwrap_or("node"));
    let (translation, rotation, scale) = node.transform().decomposed();
    out.transform.position = Vec3::from(translation);
    out.transform.rotation = Quat::from_array(rotation);
    out.transform.scale = Vec3::from(scale);

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let material = primitive.material();
            let uv_set = material
                .pbr_metallic_roughness()
                .base_color_texture()
                .map_or(0, |info| info.tex_coord());
            let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<Vec3> = positions.map(Vec3::from).collect();
            let normals: Vec<Vec3> = reader
                .read_normals()
                .map(|n| n.map(Vec3::from).collect())
                .unwrap_or_default();
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|i| i.into_u32().collect())
                .unwrap_or_default();
            let uvs: Vec<Vec2> = reader
                .read_tex_coords(uv_set)
                .map(|t| t.into_f32().map(Vec2::from).collect())
                .unwrap_or_default();
            let geometry = Geometry::new(positions, normals, indices).with_uvs(uvs);
            out.children.push(Node::mesh(
                mesh.name().unwrap_or("mesh"),
                geometry,
                convert_material(&material, buffers),
            ));
        }
    }

    for child in node.children() {
        out.children.push(convert_node(&child, buffers));
    }
    out
}

fn convert_material(material: &gltf::Material, buffers: &[Vec<u8>]) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let [er, eg, eb] = material.emissive_factor();
    let mut out = Material::standard(Rgb::new(r, g, b), pbr.roughness_factor(), pbr.metallic_factor())
        .with_emissive(Rgb::new(er, eg, eb));
    if let Some(info) = pbr.base_color_texture() {
        match decode_texture(&info.texture(), buffers) {
            Ok(map) => out.map = Some(map),
            Err(e) => log::warn!("[assets] base color texture skipped: {e}"),
        }
    }
    out
}

fn decode_texture(texture: &gltf::Texture, buffers: &[Vec<u8>]) -> Result<TextureMap> {
    let source = texture.source();
    let bytes = match source.source() {
        gltf::image::Source::View { view, .. } => buffers
            .get(view.buffer().index())
            .and_then(|buffer| buffer.get(view.offset()..view.offset() + view.length())),
        gltf::image::Source::Uri { .. } => None,
    }
    .ok_or(HeroError::ImageData(source.index()))?;
    let rgba = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    TextureMap::new(width, height, rgba.into_raw()).ok_or(HeroError::ImageData(source.index()))
}

/// Decode a Radiance HDR image and Reinhard tone-map it to sRGB-ish RGBA8.
pub fn decode_environment(bytes: &[u8]) -> Result<EnvironmentMap> {
    let hdr = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)?.into_rgb32f();
    let (width, height) = hdr.dimensions();
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for pixel in hdr.pixels() {
        for c in pixel.0 {
            rgba.push(tone_map(c));
        }
        rgba.push(u8::MAX);
    }
    Ok(EnvironmentMap {
        id: ResourceId::next(),
        width,
        height,
        rgba,
    })
}

fn tone_map(linear: f32) -> u8 {
    let c = if linear.is_finite() { linear.max(0.0) } else { 0.0 };
    let mapped = (c / (1.0 + c)).powf(1.0 / 2.2);
    (mapped * 255.0).round().clamp(0.0, 255.0) as u8
}
