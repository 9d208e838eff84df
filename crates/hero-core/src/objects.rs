//! The fixed set of named scene entities plus camera and particles.

use crate::color::Rgb;
use crate::config::{AnimationConfig, Background};
use crate::constants::*;
use crate::particles::ParticleState;
use crate::placeholders;
use crate::scene::{Disposable, Geometry, Material, Node, NodeKind, ResourceSink, Tintable};
use glam::{Mat4, Vec3};

#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::from(CAMERA_BASE_EYE),
            target: Vec3::from(CAMERA_TARGET),
            fov_y_deg: CAMERA_FOV_DEG,
            aspect: 1.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl Camera {
    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect.max(1e-3),
            self.near,
            self.far,
        );
        proj * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }
}

/// Render-facing state of the particle cloud (buffers live in
/// [`ParticleState`]).
#[derive(Clone, Debug)]
pub struct PointCloud {
    pub visible: bool,
    pub opacity: f32,
    pub color: Rgb,
    pub rotation_y: f32,
    pub position_y: f32,
}

impl PointCloud {
    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, self.position_y, 0.0))
            * Mat4::from_rotation_y(self.rotation_y)
    }
}

/// One mesh to draw this frame.
pub struct DrawItem<'a> {
    pub geometry: &'a Geometry,
    pub material: &'a Material,
    pub model: Mat4,
}

pub struct HeroScene {
    pub cube: Node,
    pub printer: Node,
    pub scanner: Node,
    /// Group whose single child is the current part.
    pub part_container: Node,
    pub beam: Node,
    pub print_head: Node,
    pub cloud: PointCloud,
    pub particles: ParticleState,
    pub camera: Camera,
    pub background: Background,
    pub accent: Rgb,
    pub cube_size: f32,
    pub part_height: f32,
}

impl HeroScene {
    pub fn new(config: &AnimationConfig, seed: u64) -> Self {
        let accent = config.accent;
        let mut part_container = Node::group("PartContainer");
        part_container.visible = false;
        let mut scene = Self {
            cube: placeholders::build_cube(accent),
            printer: placeholders::build_printer(accent),
            scanner: placeholders::build_scanner(accent),
            part_container,
            beam: placeholders::build_beam(accent),
            print_head: placeholders::build_print_head(accent),
            cloud: PointCloud {
                visible: false,
                opacity: 0.0,
                color: placeholders::point_color(accent),
                rotation_y: 0.0,
                position_y: 0.0,
            },
            particles: ParticleState::new(POINT_COUNT, config.cube_size, seed),
            camera: Camera::default(),
            background: config.background,
            accent,
            cube_size: config.cube_size,
            part_height: MIN_PART_HEIGHT,
        };
        scene
            .cube
            .transform
            .set_uniform_scale(config.cube_size);
        scene.install_part(placeholders::build_part(accent), &mut NoopSink);
        scene
    }

    pub fn part(&self) -> Option<&Node> {
        self.part_container.children.first()
    }

    /// Replace the printer, keeping the current opacity and visibility.
    pub fn install_printer(&mut self, incoming: Node, sink: &mut dyn ResourceSink) {
        swap_preserving_opacity(&mut self.printer, incoming, self.accent, sink);
    }

    pub fn install_scanner(&mut self, incoming: Node, sink: &mut dyn ResourceSink) {
        swap_preserving_opacity(&mut self.scanner, incoming, self.accent, sink);
    }

    /// Replace the part: dispose the old one, ground the new one, tint it and
    /// resample the particle buffers from its surface.
    pub fn install_part(&mut self, mut incoming: Node, sink: &mut dyn ResourceSink) {
        let opacity = self.part().and_then(Node::opacity).unwrap_or(1.0);
        for mut old in self.part_container.children.drain(..) {
            old.dispose(sink);
        }
        incoming.transform.position.y += incoming.ground_offset() + PART_GROUND_LIFT;
        incoming.tint_toward(self.accent, ACCENT_TINT_AMOUNT);
        incoming.set_opacity(opacity);
        self.part_height = incoming
            .bounds()
            .map(|b| b.height())
            .filter(|h| h.is_finite())
            .unwrap_or(0.0)
            .max(MIN_PART_HEIGHT);
        let samples = surface_samples(&incoming, POINT_COUNT / 2);
        self.part_container.children.push(incoming);
        self.particles.populate(&samples, self.cube_size);
    }

    /// Meshes that would be visible this frame, in draw order.
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        let mut items = Vec::new();
        for root in self.roots() {
            collect_visible(root, Mat4::IDENTITY, &mut items);
        }
        items
    }

    fn roots(&self) -> [&Node; 6] {
        [
            &self.cube,
            &self.printer,
            &self.scanner,
            &self.part_container,
            &self.beam,
            &self.print_head,
        ]
    }

    pub fn dispose_all(&mut self, sink: &mut dyn ResourceSink) {
        self.cube.dispose(sink);
        self.printer.dispose(sink);
        self.scanner.dispose(sink);
        self.part_container.dispose(sink);
        self.beam.dispose(sink);
        self.print_head.dispose(sink);
        self.part_container.children.clear();
    }
}

fn swap_preserving_opacity(
    slot: &mut Node,
    mut incoming: Node,
    accent: Rgb,
    sink: &mut dyn ResourceSink,
) {
    incoming.tint_toward(accent, ACCENT_TINT_AMOUNT);
    incoming.set_opacity(slot.opacity().unwrap_or(0.0));
    incoming.visible = slot.visible;
    slot.dispose(sink);
    *slot = incoming;
}

fn collect_visible<'a>(node: &'a Node, parent: Mat4, out: &mut Vec<DrawItem<'a>>) {
    if !node.visible {
        return;
    }
    let model = parent * node.transform.matrix();
    if let NodeKind::Mesh {
        geometry,
        materials,
    } = &node.kind
    {
        for material in materials.iter().filter(|m| m.opacity > 0.001) {
            out.push(DrawItem {
                geometry,
                material,
                model,
            });
        }
    }
    for child in &node.children {
        collect_visible(child, model, out);
    }
}

/// Up to `max` vertex samples spread over every mesh of `node`, in the
/// node's parent space.
pub fn surface_samples(node: &Node, max: usize) -> Vec<Vec3> {
    let mut samples = Vec::new();
    if max == 0 {
        return samples;
    }
    node.visit(Mat4::IDENTITY, &mut |child, world| {
        if samples.len() >= max {
            return;
        }
        if let NodeKind::Mesh { geometry, .. } = &child.kind {
            let count = geometry.vertex_count();
            if count == 0 {
                return;
            }
            let step = count.div_ceil(max).max(1);
            for p in geometry.positions.iter().step_by(step) {
                let w = world.transform_point3(*p);
                if w.is_finite() {
                    samples.push(w);
                }
                if samples.len() >= max {
                    break;
                }
            }
        }
    });
    samples
}

/// Sink for resources that were never handed to a renderer.
pub struct NoopSink;

impl ResourceSink for NoopSink {
    fn release_geometry(&mut self, _id: crate::scene::ResourceId) {}
    fn release_material(&mut self, _id: crate::scene::ResourceId) {}
    fn release_texture(&mut self, _id: crate::scene::ResourceId) {}
}
