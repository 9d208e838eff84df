//! Point cloud buffers for the scan/reassemble effect.
//!
//! Three buffers of `point_count * 3` floats: surface samples of the part
//! (`source`), scattered positions inside the cube (`cube_targets`) and the
//! live `current` buffer that the renderer uploads.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What the `current` buffer holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleMode {
    /// `current` equals `source`.
    Surface,
    /// Part-way between `source` and `cube_targets`.
    Blending,
    /// Converged onto `cube_targets`.
    Cube,
}

#[derive(Debug)]
pub struct ParticleState {
    point_count: usize,
    source: Vec<f32>,
    cube_targets: Vec<f32>,
    current: Vec<f32>,
    visible_count: usize,
    mode: ParticleMode,
    rng: StdRng,
}

impl ParticleState {
    /// Scatter the initial cloud inside the cube until the first populate.
    pub fn new(point_count: usize, cube_size: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut current = Vec::with_capacity(point_count * 3);
        for _ in 0..point_count {
            let v = random_in_cube(&mut rng, cube_size * 0.6);
            current.extend_from_slice(&[v.x, v.y + 0.3, v.z]);
        }
        Self {
            point_count,
            source: vec![0.0; point_count * 3],
            cube_targets: vec![0.0; point_count * 3],
            current,
            visible_count: 0,
            mode: ParticleMode::Surface,
            rng,
        }
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn source(&self) -> &[f32] {
        &self.source
    }

    pub fn cube_targets(&self) -> &[f32] {
        &self.cube_targets
    }

    pub fn current(&self) -> &[f32] {
        &self.current
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn mode(&self) -> ParticleMode {
        self.mode
    }

    /// Refill `source` from surface samples (cycled when there are fewer
    /// samples than points) and draw fresh cube targets.
    pub fn populate(&mut self, samples: &[Vec3], cube_size: f32) {
        let fallback = [Vec3::new(0.0, 0.4, 0.0)];
        let samples = if samples.is_empty() {
            &fallback[..]
        } else {
            samples
        };
        for i in 0..self.point_count {
            let s = samples[i % samples.len()];
            self.source[i * 3..i * 3 + 3].copy_from_slice(&s.to_array());
            let cube = random_in_cube(&mut self.rng, cube_size * 0.48);
            self.cube_targets[i * 3..i * 3 + 3].copy_from_slice(&[
                cube.x,
                cube.y + cube_size * 0.5,
                cube.z,
            ]);
        }
        self.reset_to_source();
    }

    /// Restore `current` to the surface samples and hide every point.
    pub fn reset_to_source(&mut self) {
        self.current.copy_from_slice(&self.source);
        self.visible_count = 0;
        self.mode = ParticleMode::Surface;
    }

    pub fn set_visible_count(&mut self, count: usize) {
        self.visible_count = count.min(self.point_count);
    }

    /// Interpolate every point from its surface sample toward its cube
    /// target. `eased >= 0.99` counts as converged.
    pub fn blend_to_cube(&mut self, eased: f32) {
        let t = eased.clamp(0.0, 1.0);
        for ((cur, src), dst) in self
            .current
            .iter_mut()
            .zip(&self.source)
            .zip(&self.cube_targets)
        {
            *cur = src + (dst - src) * t;
        }
        self.mode = if t >= 0.99 {
            ParticleMode::Cube
        } else if t > 0.0 {
            ParticleMode::Blending
        } else {
            ParticleMode::Surface
        };
    }

    /// The live buffer as raw bytes for upload.
    pub fn current_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.current)
    }
}

fn random_in_cube(rng: &mut StdRng, size: f32) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * size,
        (rng.gen::<f32>() - 0.5) * size,
        (rng.gen::<f32>() - 0.5) * size,
    )
}
