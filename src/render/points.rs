use hero_core::particles::ParticleState;

const POINT_STRIDE: u64 = 12; // vec3<f32>

/// Instance buffer mirroring the live particle positions.
pub struct PointBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl PointBuffer {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: POINT_STRIDE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    pub fn new(device: &wgpu::Device, points: usize) -> Self {
        let capacity = points.max(1) as u64;
        Self {
            buffer: create(device, capacity),
            capacity,
        }
    }

    /// Upload the live buffer and return how many instances to draw.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, particles: &ParticleState) -> u32 {
        let points = particles.point_count() as u64;
        if points > self.capacity {
            self.buffer.destroy();
            self.buffer = create(device, points);
            self.capacity = points;
        }
        queue.write_buffer(&self.buffer, 0, particles.current_bytes());
        particles.visible_count().min(particles.point_count()) as u32
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

fn create(device: &wgpu::Device, points: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("point_instances"),
        size: points * POINT_STRIDE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
