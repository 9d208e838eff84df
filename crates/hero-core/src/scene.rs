//! Minimal scene graph owned by one hero instance.
//!
//! Nodes are either groups or meshes. Traversal is uniform through the
//! [`Disposable`] and [`Tintable`] capabilities, so loaded models and
//! procedural placeholders are handled the same way.

use crate::color::Rgb;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a GPU-backed resource (geometry, material or texture).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Receives release notifications when scene resources are disposed.
pub trait ResourceSink {
    fn release_geometry(&mut self, id: ResourceId);
    fn release_material(&mut self, id: ResourceId);
    fn release_texture(&mut self, id: ResourceId);
}

pub trait Disposable {
    fn dispose(&mut self, sink: &mut dyn ResourceSink);
}

pub trait Tintable {
    fn set_opacity(&mut self, opacity: f32);
    fn tint_toward(&mut self, color: Rgb, amount: f32);
}

/// Decoded RGBA8 image, tightly packed rows.
#[derive(Clone, Debug)]
pub struct TextureMap {
    pub id: ResourceId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureMap {
    /// `None` for empty images or a pixel buffer that does not match the size.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        if expected == 0 || rgba.len() != expected {
            return None;
        }
        Some(Self {
            id: ResourceId::next(),
            width,
            height,
            rgba,
        })
    }
}

/// Axis-aligned bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut it = points.into_iter().filter(|p| p.is_finite());
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn transformed(&self, m: Mat4) -> Aabb {
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });
        // Transforming a finite box with a finite matrix always yields a point.
        Aabb::from_points(corners.map(|c| m.transform_point3(c))).unwrap_or(*self)
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[derive(Clone, Debug)]
pub struct Geometry {
    pub id: ResourceId,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Empty, or one coordinate per vertex.
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Build a geometry, generating sequential indices and smooth normals when
    /// they are missing or inconsistent.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let indices = if indices.is_empty() {
            (0..positions.len() as u32).collect()
        } else {
            indices
        };
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            smooth_normals(&positions, &indices)
        };
        Self {
            id: ResourceId::next(),
            positions,
            normals,
            uvs: Vec::new(),
            indices,
        }
    }

    /// Attach texture coordinates; a set of the wrong length is dropped.
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        if uvs.len() == self.positions.len() {
            self.uvs = uvs;
        }
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }
}

impl Disposable for Geometry {
    fn dispose(&mut self, sink: &mut dyn ResourceSink) {
        sink.release_geometry(self.id);
    }
}

fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[derive(Clone, Debug)]
pub struct Material {
    pub id: ResourceId,
    pub color: Rgb,
    pub emissive: Rgb,
    pub opacity: f32,
    pub transparent: bool,
    pub roughness: f32,
    pub metalness: f32,
    /// Base color map, multiplied with `color`.
    pub map: Option<TextureMap>,
}

impl Material {
    pub fn standard(color: Rgb, roughness: f32, metalness: f32) -> Self {
        Self {
            id: ResourceId::next(),
            color,
            emissive: Rgb::BLACK,
            opacity: 1.0,
            transparent: true,
            roughness,
            metalness,
            map: None,
        }
    }

    pub fn with_emissive(mut self, emissive: Rgb) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

impl Disposable for Material {
    fn dispose(&mut self, sink: &mut dyn ResourceSink) {
        if let Some(map) = self.map.take() {
            sink.release_texture(map.id);
        }
        sink.release_material(self.id);
    }
}

impl Tintable for Material {
    fn set_opacity(&mut self, opacity: f32) {
        self.transparent = true;
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    fn tint_toward(&mut self, color: Rgb, amount: f32) {
        self.color = self.color.lerp(color, amount);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rotation from XYZ Euler angles (radians).
    pub fn set_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    pub fn euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: Geometry,
        materials: SmallVec<[Material; 1]>,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            kind: NodeKind::Mesh {
                geometry,
                materials: SmallVec::from_elem(material, 1),
            },
            children: Vec::new(),
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first visit with each node's matrix relative to `parent`.
    pub fn visit(&self, parent: Mat4, f: &mut dyn FnMut(&Node, Mat4)) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// Opacity of the first material found, if any.
    pub fn opacity(&self) -> Option<f32> {
        let mut found = None;
        self.visit(Mat4::IDENTITY, &mut |node, _| {
            if found.is_none() {
                if let NodeKind::Mesh { materials, .. } = &node.kind {
                    found = materials.first().map(|m| m.opacity);
                }
            }
        });
        found
    }

    /// Bounds in the parent's space (own transform included). `None` when the
    /// subtree has no vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut acc: Option<Aabb> = None;
        self.visit(Mat4::IDENTITY, &mut |node, m| {
            if let NodeKind::Mesh { geometry, .. } = &node.kind {
                if let Some(b) = geometry.bounds() {
                    let b = b.transformed(m);
                    acc = Some(acc.map_or(b, |a| a.union(b)));
                }
            }
        });
        acc
    }

    /// Vertical shift that puts the lowest point on y = 0. Zero for empty or
    /// non-finite bounds.
    pub fn ground_offset(&self) -> f32 {
        match self.bounds() {
            Some(b) if b.min.y.is_finite() => -b.min.y,
            _ => 0.0,
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut n = 0;
        self.visit(Mat4::IDENTITY, &mut |node, _| {
            if matches!(node.kind, NodeKind::Mesh { .. }) {
                n += 1;
            }
        });
        n
    }
}

impl Disposable for Node {
    fn dispose(&mut self, sink: &mut dyn ResourceSink) {
        self.visit_mut(&mut |node| {
            if let NodeKind::Mesh {
                geometry,
                materials,
            } = &mut node.kind
            {
                geometry.dispose(sink);
                for m in materials.iter_mut() {
                    m.dispose(sink);
                }
            }
        });
    }
}

impl Tintable for Node {
    fn set_opacity(&mut self, opacity: f32) {
        self.visit_mut(&mut |node| {
            if let NodeKind::Mesh { materials, .. } = &mut node.kind {
                for m in materials.iter_mut() {
                    m.set_opacity(opacity);
                }
            }
        });
    }

    fn tint_toward(&mut self, color: Rgb, amount: f32) {
        self.visit_mut(&mut |node| {
            if let NodeKind::Mesh { materials, .. } = &mut node.kind {
                for m in materials.iter_mut() {
                    m.tint_toward(color, amount);
                }
            }
        });
    }
}
