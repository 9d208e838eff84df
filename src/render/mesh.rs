use super::helpers::create_buffer_with;
use fnv::FnvHashMap;
use hero_core::scene::{Geometry, ResourceId};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct GpuMesh {
    pub vertices: wgpu::Buffer,
    pub indices: wgpu::Buffer,
    pub index_count: u32,
}

/// GPU copies of scene geometries, uploaded on first draw.
#[derive(Default)]
pub struct MeshCache {
    meshes: FnvHashMap<ResourceId, GpuMesh>,
}

impl MeshCache {
    /// Upload `geometry` unless it is already resident. Empty geometry is
    /// never uploaded.
    pub fn ensure(&mut self, device: &wgpu::Device, geometry: &Geometry) {
        if geometry.indices.is_empty() || geometry.positions.is_empty() {
            return;
        }
        self.meshes
            .entry(geometry.id)
            .or_insert_with(|| upload(device, geometry));
    }

    pub fn get(&self, id: ResourceId) -> Option<&GpuMesh> {
        self.meshes.get(&id)
    }

    pub fn release(&mut self, id: ResourceId) {
        if let Some(mesh) = self.meshes.remove(&id) {
            mesh.vertices.destroy();
            mesh.indices.destroy();
        }
    }

    pub fn clear(&mut self) {
        for (_, mesh) in self.meshes.drain() {
            mesh.vertices.destroy();
            mesh.indices.destroy();
        }
    }
}

fn upload(device: &wgpu::Device, geometry: &Geometry) -> GpuMesh {
    let vertices: Vec<MeshVertex> = geometry
        .positions
        .iter()
        .zip(&geometry.normals)
        .enumerate()
        .map(|(i, (p, n))| MeshVertex {
            position: p.to_array(),
            normal: n.to_array(),
            uv: geometry.uvs.get(i).map_or([0.0; 2], |uv| uv.to_array()),
        })
        .collect();
    let vertex_count = vertices.len() as u32;
    // Out-of-range indices would fail validation for the whole pass.
    let indices: Vec<u32> = geometry
        .indices
        .iter()
        .map(|&i| if i < vertex_count { i } else { 0 })
        .collect();
    GpuMesh {
        vertices: create_buffer_with(
            device,
            "mesh_vertices",
            bytemuck::cast_slice(&vertices),
            wgpu::BufferUsages::VERTEX,
        ),
        indices: create_buffer_with(
            device,
            "mesh_indices",
            bytemuck::cast_slice(&indices),
            wgpu::BufferUsages::INDEX,
        ),
        index_count: indices.len() as u32,
    }
}
