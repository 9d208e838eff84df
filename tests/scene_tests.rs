// Scene graph, particle buffers and per-phase state application.

mod support;

use glam::{Mat4, Vec3};
use hero_core::applier::{apply_phase, apply_static_frame, Motion};
use hero_core::assets::decode_model;
use hero_core::constants::{CUBE_SIZE_MIN, POINT_COUNT};
use hero_core::geometry::box_geometry;
use hero_core::objects::{surface_samples, NoopSink};
use hero_core::scene::{Geometry, Material, Node, NodeKind};
use hero_core::{
    AnimationConfig, Disposable, HeroScene, ParticleMode, ParticleState, Phase, PhaseSample, Rgb,
    Tintable,
};
use rand::{Rng, SeedableRng};
use support::{RecordingRenderer, RenderLog};

fn scene() -> HeroScene {
    HeroScene::new(&AnimationConfig::default(), 7)
}

fn sample(phase: Phase, progress: f32) -> PhaseSample {
    PhaseSample { phase, progress }
}

fn boxed(name: &str) -> Node {
    Node::mesh(
        name,
        box_geometry(1.0, 2.0, 1.0),
        Material::standard(Rgb::WHITE, 0.5, 0.1),
    )
}

fn geometry_ids(node: &Node) -> Vec<hero_core::ResourceId> {
    let mut ids = Vec::new();
    node.visit(glam::Mat4::IDENTITY, &mut |n, _| {
        if let hero_core::scene::NodeKind::Mesh { geometry, .. } = &n.kind {
            ids.push(geometry.id);
        }
    });
    ids
}

#[test]
fn placeholders_are_installed_on_construction() {
    let scene = scene();
    assert!(scene.cube.mesh_count() > 0);
    assert!(scene.printer.mesh_count() >= 5);
    assert!(scene.scanner.mesh_count() >= 4);
    assert_eq!(scene.part_container.children.len(), 1);
    assert_eq!(scene.printer.opacity(), Some(0.0));
    assert_eq!(scene.particles.point_count(), POINT_COUNT);
}

#[test]
fn placeholder_part_rests_on_the_ground() {
    let scene = scene();
    let bounds = scene.part().and_then(Node::bounds).map(|b| (b.min.y, b.height()));
    let (min_y, height) = bounds.unwrap_or((f32::NAN, f32::NAN));
    assert!((min_y - 0.02).abs() < 1e-3, "min y {min_y}");
    assert!((scene.part_height - height).abs() < 1e-4);
}

#[test]
fn swapped_asset_inherits_opacity_and_releases_old_resources() {
    let mut scene = scene();
    scene.printer.set_opacity(0.4);
    scene.printer.visible = true;
    let old_ids = geometry_ids(&scene.printer);

    let (mut renderer, log) = RecordingRenderer::new();
    scene.install_printer(boxed("printer"), &mut renderer);

    assert_eq!(scene.printer.name, "printer");
    assert_eq!(scene.printer.opacity(), Some(0.4));
    assert!(scene.printer.visible);
    let log = log.borrow();
    assert_eq!(log.geometries, old_ids);
    assert_eq!(log.materials.len(), old_ids.len());
}

#[test]
fn swapped_asset_is_tinted_toward_accent() {
    let mut scene = scene();
    scene.install_scanner(boxed("scanner"), &mut NoopSink);
    let mut color = None;
    scene.scanner.visit(glam::Mat4::IDENTITY, &mut |n, _| {
        if let hero_core::scene::NodeKind::Mesh { materials, .. } = &n.kind {
            color = materials.first().map(|m| m.color);
        }
    });
    let expected = Rgb::WHITE.lerp(scene.accent, 0.6);
    assert_eq!(color, Some(expected));
}

#[test]
fn installing_a_part_resamples_particles() {
    let mut scene = scene();
    let before = scene.particles.source().to_vec();
    let (mut renderer, log) = RecordingRenderer::new();
    let old_ids = scene.part().map(geometry_ids).unwrap_or_default();

    scene.install_part(boxed("part"), &mut renderer);

    assert_eq!(log.borrow().geometries, old_ids);
    assert_eq!(scene.part_container.children.len(), 1);
    assert_ne!(scene.particles.source(), &before[..]);
    assert_eq!(scene.particles.mode(), ParticleMode::Surface);
    assert!((scene.part_height - 2.0).abs() < 1e-4);
    // Box is grounded: every sample sits at or above the lift.
    for p in scene.particles.source().chunks(3) {
        assert!(p[1] >= 0.02 - 1e-4);
    }
}

#[test]
fn decoded_glb_installs_as_part() {
    let node = decode_model(&support::triangle_glb(), "part").expect("glb decodes");
    assert_eq!(node.name, "part");
    assert_eq!(node.mesh_count(), 1);
    let mut scene = scene();
    scene.install_part(node, &mut NoopSink);
    let samples = surface_samples(&scene.part_container, 100);
    assert_eq!(samples.len(), 3);
}

#[test]
fn dispose_all_releases_every_placeholder() {
    let mut scene = scene();
    let expected: usize = [
        &scene.cube,
        &scene.printer,
        &scene.scanner,
        &scene.part_container,
        &scene.beam,
        &scene.print_head,
    ]
    .iter()
    .map(|n| n.mesh_count())
    .sum();

    let (mut renderer, log) = RecordingRenderer::new();
    scene.dispose_all(&mut renderer);
    let log: std::cell::Ref<RenderLog> = log.borrow();
    assert_eq!(log.geometries.len(), expected);
    assert_eq!(log.materials.len(), expected);
    assert!(scene.part_container.children.is_empty());
}

fn first_mesh(node: &Node) -> Option<(Geometry, Material)> {
    let mut found = None;
    node.visit(Mat4::IDENTITY, &mut |n, _| {
        if found.is_some() {
            return;
        }
        if let NodeKind::Mesh { geometry, materials } = &n.kind {
            found = materials.first().map(|m| (geometry.clone(), m.clone()));
        }
    });
    found
}

#[test]
fn base_color_texture_is_decoded_with_uvs() {
    let glb = support::textured_triangle_glb(&support::solid_png([255, 0, 0, 255]));
    let node = decode_model(&glb, "part").expect("glb decodes");
    let (geometry, material) = first_mesh(&node).expect("mesh present");
    assert_eq!(geometry.uvs.len(), geometry.vertex_count());
    let map = material.map.expect("base color map");
    assert_eq!((map.width, map.height), (2, 2));
    assert_eq!(map.rgba.len(), 16);
    assert_eq!(&map.rgba[..4], &[255, 0, 0, 255]);
}

#[test]
fn undecodable_texture_keeps_the_model() {
    let glb = support::textured_triangle_glb(b"not an image");
    let node = decode_model(&glb, "part").expect("glb decodes");
    let (geometry, material) = first_mesh(&node).expect("mesh present");
    assert!(material.map.is_none());
    assert_eq!(geometry.uvs.len(), 3);
}

#[test]
fn node_dispose_releases_texture_maps() {
    let glb = support::textured_triangle_glb(&support::solid_png([0, 0, 255, 255]));
    let mut node = decode_model(&glb, "printer").expect("glb decodes");
    let map_id = first_mesh(&node)
        .and_then(|(_, m)| m.map)
        .map(|map| map.id)
        .expect("base color map");

    let (mut renderer, log) = RecordingRenderer::new();
    node.dispose(&mut renderer);
    node.dispose(&mut renderer);
    assert_eq!(log.borrow().textures, vec![map_id]);
    assert_eq!(log.borrow().geometries.len(), 2);
}

#[test]
fn untextured_model_releases_no_textures() {
    let mut node = decode_model(&support::triangle_glb(), "printer").expect("glb decodes");
    let (mut renderer, log) = RecordingRenderer::new();
    node.dispose(&mut renderer);
    assert!(log.borrow().textures.is_empty());
    assert_eq!(log.borrow().geometries.len(), 1);
}

#[test]
fn particle_buffers_keep_their_lengths() {
    let mut particles = ParticleState::new(200, 1.0, 3);
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    for _ in 0..500 {
        match rng.gen_range(0..4) {
            0 => particles.set_visible_count(rng.gen_range(0..1000)),
            1 => particles.blend_to_cube(rng.gen_range(-0.5..1.5)),
            2 => particles.reset_to_source(),
            _ => {
                let n = rng.gen_range(0..50);
                let samples: Vec<Vec3> = (0..n).map(|i| Vec3::splat(i as f32)).collect();
                particles.populate(&samples, 1.0);
            }
        }
        assert!(particles.visible_count() <= particles.point_count());
        assert_eq!(particles.source().len(), 600);
        assert_eq!(particles.cube_targets().len(), 600);
        assert_eq!(particles.current().len(), 600);
    }
}

#[test]
fn particle_mode_transitions() {
    let mut particles = ParticleState::new(10, 1.0, 1);
    particles.populate(&[Vec3::new(0.0, 0.5, 0.0)], 1.0);
    assert_eq!(particles.mode(), ParticleMode::Surface);
    assert_eq!(particles.current(), particles.source());

    particles.blend_to_cube(0.5);
    assert_eq!(particles.mode(), ParticleMode::Blending);

    particles.blend_to_cube(1.0);
    assert_eq!(particles.mode(), ParticleMode::Cube);
    for (cur, dst) in particles.current().iter().zip(particles.cube_targets()) {
        assert!((cur - dst).abs() < 1e-5);
    }

    particles.reset_to_source();
    assert_eq!(particles.mode(), ParticleMode::Surface);
    assert_eq!(particles.current(), particles.source());
    assert_eq!(particles.visible_count(), 0);
}

#[test]
fn cube_targets_stay_inside_the_cube() {
    let mut particles = ParticleState::new(500, 1.0, 9);
    particles.populate(&[Vec3::ZERO], 1.0);
    for p in particles.cube_targets().chunks(3) {
        assert!(p[0].abs() <= 0.24 + 1e-6);
        assert!(p[2].abs() <= 0.24 + 1e-6);
        assert!((0.26 - 1e-6..=0.74 + 1e-6).contains(&p[1]));
    }
}

#[test]
fn scanning_reveals_points_and_resets_blended_cloud() {
    let mut scene = scene();
    apply_phase(&mut scene, sample(Phase::ToCube, 0.5), Motion::default());
    assert_ne!(scene.particles.mode(), ParticleMode::Surface);

    // Skipping back into scanning must never show half-blended points.
    apply_phase(&mut scene, sample(Phase::Scanning, 0.5), Motion::default());
    assert_eq!(scene.particles.mode(), ParticleMode::Surface);
    assert_eq!(scene.particles.current(), scene.particles.source());
    assert_eq!(scene.particles.visible_count(), POINT_COUNT / 2);
    assert!(scene.cloud.visible);
}

#[test]
fn to_cube_shows_every_point_and_converges() {
    let mut scene = scene();
    apply_phase(&mut scene, sample(Phase::ToCube, 1.0), Motion::default());
    assert_eq!(scene.particles.visible_count(), POINT_COUNT);
    assert_eq!(scene.particles.mode(), ParticleMode::Cube);
    assert_eq!(scene.cube.opacity(), Some(1.0));
    assert!(!scene.part_container.visible);
}

#[test]
fn idle_and_pause_hide_the_cloud() {
    let mut scene = scene();
    apply_phase(&mut scene, sample(Phase::Scanning, 1.0), Motion::default());
    for phase in [Phase::Idle, Phase::ToPrinter, Phase::Printing, Phase::ToScanner, Phase::LoopPause] {
        apply_phase(&mut scene, sample(phase, 0.3), Motion::default());
        assert!(!scene.cloud.visible, "{}", phase.name());
        assert_eq!(scene.particles.visible_count(), 0, "{}", phase.name());
    }
}

#[test]
fn printing_grows_the_part_and_shows_the_head() {
    let mut scene = scene();
    apply_phase(&mut scene, sample(Phase::Printing, 0.0), Motion::default());
    let early = scene.part_container.transform.scale.y;
    apply_phase(&mut scene, sample(Phase::Printing, 1.0), Motion::default());
    assert!(early < scene.part_container.transform.scale.y);
    assert!(scene.print_head.visible);
    assert_eq!(scene.printer.opacity(), Some(1.0));
    assert!(!scene.cube.visible);
}

#[test]
fn phase_entry_does_not_depend_on_history() {
    let motion = Motion {
        cycle_time: 9.0,
        elapsed: 9.0,
    };
    let mut fresh = scene();
    apply_phase(&mut fresh, sample(Phase::ToScanner, 0.4), motion);

    let mut visited = scene();
    for phase in Phase::ALL {
        apply_phase(&mut visited, sample(phase, 0.9), motion);
    }
    apply_phase(&mut visited, sample(Phase::ToScanner, 0.4), motion);

    assert_eq!(fresh.camera.eye, visited.camera.eye);
    assert_eq!(fresh.printer.opacity(), visited.printer.opacity());
    assert_eq!(fresh.scanner.opacity(), visited.scanner.opacity());
    assert_eq!(fresh.cube.visible, visited.cube.visible);
    assert_eq!(fresh.part_container.transform, visited.part_container.transform);
    assert_eq!(fresh.cloud.visible, visited.cloud.visible);
}

#[test]
fn every_phase_produces_finite_state() {
    let config = AnimationConfig::from_json(r#"{"cubeSize":0,"durations":{"idle":0}}"#);
    let mut scene = HeroScene::new(&config, 1);
    scene.camera.set_viewport(0, 0);
    for phase in Phase::ALL {
        for progress in [0.0, 0.25, 0.5, 0.999, 1.0, -2.0, 7.0] {
            apply_phase(
                &mut scene,
                sample(phase, progress),
                Motion {
                    cycle_time: 1e6,
                    elapsed: 1e6,
                },
            );
            assert!(scene.camera.view_proj().is_finite());
            for item in scene.draw_list() {
                assert!(item.model.is_finite(), "{} {progress}", phase.name());
                assert!((0.0..=1.0).contains(&item.material.opacity));
            }
            assert!(scene.cloud.model().is_finite());
        }
    }
}

#[test]
fn static_frame_is_the_rest_pose() {
    let mut scene = scene();
    apply_static_frame(&mut scene);
    assert_eq!(scene.cube.opacity(), Some(1.0));
    assert!(scene.cube.visible);
    let euler = scene.cube.transform.euler();
    assert!((euler.x - std::f32::consts::FRAC_PI_6).abs() < 1e-4);
    assert!((euler.y - std::f32::consts::FRAC_PI_4).abs() < 1e-4);
    assert!(!scene.cloud.visible);
}

#[test]
fn small_cube_size_scales_the_cube() {
    let config = AnimationConfig::from_json(r#"{"cubeSize":0.2}"#);
    let mut scene = HeroScene::new(&config, 1);
    apply_static_frame(&mut scene);
    assert!((scene.cube.transform.scale.x - CUBE_SIZE_MIN).abs() < 1e-6);
}
