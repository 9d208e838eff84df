//! Procedural primitives used by the placeholder objects.

use crate::scene::Geometry;
use glam::Vec3;
use std::f32::consts::TAU;

pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let half = Vec3::new(hx, hy, hz);
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            positions.push((n + u * su + v * sv) * half);
            normals.push(n);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Geometry::new(positions, normals, indices)
}

/// Thin quad in the XY plane facing +Z.
pub fn plane_geometry(width: f32, height: f32) -> Geometry {
    let (hx, hy) = (width / 2.0, height / 2.0);
    let positions = vec![
        Vec3::new(-hx, -hy, 0.0),
        Vec3::new(hx, -hy, 0.0),
        Vec3::new(hx, hy, 0.0),
        Vec3::new(-hx, hy, 0.0),
    ];
    Geometry::new(positions, vec![Vec3::Z; 4], vec![0, 1, 2, 0, 2, 3])
}

pub fn cylinder_geometry(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> Geometry {
    let segs = radial_segments.max(3);
    let half = height / 2.0;
    let slope = if height > 0.0 {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    // side: row 0 at the top, row 1 at the bottom
    for (radius, y) in [(radius_top, half), (radius_bottom, -half)] {
        for x in 0..=segs {
            let theta = x as f32 / segs as f32 * TAU;
            let (s, c) = theta.sin_cos();
            positions.push(Vec3::new(radius * s, y, radius * c));
            normals.push(Vec3::new(s, slope, c).normalize());
        }
    }
    let stride = segs + 1;
    for x in 0..segs {
        let a = x;
        let b = stride + x;
        let c = stride + x + 1;
        let d = x + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    // caps
    for (radius, y, n) in [(radius_top, half, Vec3::Y), (radius_bottom, -half, Vec3::NEG_Y)] {
        if radius <= 0.0 {
            continue;
        }
        let center = positions.len() as u32;
        positions.push(Vec3::new(0.0, y, 0.0));
        normals.push(n);
        for x in 0..=segs {
            let theta = x as f32 / segs as f32 * TAU;
            let (s, c) = theta.sin_cos();
            positions.push(Vec3::new(radius * s, y, radius * c));
            normals.push(n);
        }
        for x in 0..segs {
            let i = center + 1 + x;
            if n.y > 0.0 {
                indices.extend_from_slice(&[i, i + 1, center]);
            } else {
                indices.extend_from_slice(&[i + 1, i, center]);
            }
        }
    }
    Geometry::new(positions, normals, indices)
}

/// Torus in the XY plane; `arc` limits the sweep for partial rings.
pub fn torus_geometry(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    arc: f32,
) -> Geometry {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * arc;
            let v = j as f32 / radial as f32 * TAU;
            let ring = radius + tube * v.cos();
            let vertex = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            positions.push(vertex);
            normals.push((vertex - center).normalize_or_zero());
        }
    }
    let indices = grid_indices(radial, tubular);
    Geometry::new(positions, normals, indices)
}

/// (p, q) torus knot, defaults to the classic trefoil (2, 3).
pub fn torus_knot_geometry(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
) -> Geometry {
    const P: f32 = 2.0;
    const Q: f32 = 3.0;
    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);
    let curve = |u: f32| {
        let quo = Q / P * u;
        let cs = quo.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * u.sin() * 0.5,
            radius * quo.sin() * 0.5,
        )
    };
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * P * TAU;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);
        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n);
        let n = b.cross(t).normalize_or_zero();
        let b = b.normalize_or_zero();
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let vertex = p1 + n * cx + b * cy;
            positions.push(vertex);
            normals.push((vertex - p1).normalize_or_zero());
        }
    }
    // rows are along the tube here, so swap the grid orientation
    let mut indices = Vec::new();
    let stride = radial + 1;
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = stride * (j - 1) + (i - 1);
            let b = stride * j + (i - 1);
            let c = stride * j + i;
            let d = stride * (j - 1) + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    Geometry::new(positions, normals, indices)
}

fn grid_indices(rows: u32, cols: u32) -> Vec<u32> {
    let stride = cols + 1;
    let mut indices = Vec::with_capacity((rows * cols * 6) as usize);
    for j in 1..=rows {
        for i in 1..=cols {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    indices
}
