//! Scene state for one instant of the loop.
//!
//! Every phase writes the full visible state of every entity, so the picture
//! is a function of `(phase, progress, elapsed)` and the particle buffers.
//! Jumping into any phase (phase skip, a resumed tab) never shows leftovers
//! of the phase that ran before it.

use crate::constants::*;
use crate::easing::{ease_in_out_cubic, lerp, smooth_step};
use crate::objects::HeroScene;
use crate::particles::ParticleMode;
use crate::scene::Tintable;
use crate::timeline::{Phase, PhaseSample};
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

/// Continuous time inputs for the elapsed-driven motion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    /// Position inside the current cycle, seconds.
    pub cycle_time: f64,
    /// Monotonic animation time, seconds.
    pub elapsed: f64,
}

pub fn apply_phase(scene: &mut HeroScene, sample: PhaseSample, motion: Motion) {
    let p = sample.progress.clamp(0.0, 1.0);
    match sample.phase {
        Phase::Idle => apply_idle(scene, motion.cycle_time as f32),
        Phase::ToPrinter => apply_to_printer(scene, p),
        Phase::Printing => apply_printing(scene, p, motion.elapsed as f32),
        Phase::ToScanner => apply_to_scanner(scene, p),
        Phase::Scanning => apply_scanning(scene, p, motion.elapsed as f32),
        Phase::ToCube => apply_to_cube(scene, p, motion.elapsed as f32),
        Phase::LoopPause => apply_loop_pause(scene),
    }
}

/// Reduced-motion still: the idle layout with the cube at its rest pose.
pub fn apply_static_frame(scene: &mut HeroScene) {
    apply_idle(scene, 0.0);
    set_cube_rest_pose(scene);
}

fn apply_idle(scene: &mut HeroScene, time: f32) {
    let t = time + IDLE_TIME_OFFSET;
    let size = scene.cube_size;
    let cube = &mut scene.cube;
    cube.visible = true;
    cube.set_opacity(1.0);
    cube.transform
        .set_uniform_scale(size * (1.0 + (t * 1.2).sin() * 0.02));
    cube.transform.set_euler(
        (t * 0.7).sin() * 0.25 + 0.3,
        t * 0.25,
        (t * 0.5).cos() * 0.1,
    );

    scene.printer.set_opacity(0.0);
    scene.scanner.set_opacity(0.0);
    hide_part(scene);
    hide_cloud(scene);
    scene.beam.set_opacity(0.0);
    scene.print_head.visible = false;
    set_camera(scene, CAMERA_BASE_EYE.into());
}

fn apply_to_printer(scene: &mut HeroScene, progress: f32) {
    let eased = ease_in_out_cubic(progress);
    let size = scene.cube_size;
    scene.cube.visible = true;
    scene
        .cube
        .transform
        .set_uniform_scale(size * lerp(1.0, 0.8, eased));
    scene.cube.set_opacity(lerp(1.0, 0.0, eased));

    scene.printer.visible = true;
    scene.printer.set_opacity(eased);
    scene.scanner.set_opacity(0.0);

    show_part(scene, 0.001 + eased * 0.2);
    scene.print_head.visible = eased > 0.1;
    hide_cloud(scene);
    scene.beam.set_opacity(0.0);
    set_camera(scene, CAMERA_BASE_EYE.into());
}

fn apply_printing(scene: &mut HeroScene, progress: f32, elapsed: f32) {
    let eased = ease_in_out_cubic(progress);
    scene.printer.visible = true;
    scene.printer.set_opacity(1.0);
    scene.scanner.set_opacity(0.0);
    scene.cube.set_opacity(0.0);
    scene.cube.visible = false;

    let growth = eased.max(0.02);
    show_part(scene, growth);

    // Lissajous wander above the growing part.
    let nt = elapsed * 0.7;
    let (radius, speed) = (0.45, 0.9);
    let head = &mut scene.print_head;
    head.visible = true;
    head.transform.position = Vec3::new(
        (nt * speed).sin() * radius * 0.6,
        0.5 + growth * scene.part_height + nt.sin() * 0.05,
        (nt * speed * 1.2).cos() * radius * 0.6,
    );

    hide_cloud(scene);
    scene.beam.set_opacity(0.0);
    set_camera(scene, CAMERA_BASE_EYE.into());
}

fn apply_to_scanner(scene: &mut HeroScene, progress: f32) {
    let eased = ease_in_out_cubic(progress);
    scene.printer.set_opacity(1.0 - eased);
    scene.scanner.visible = true;
    scene.scanner.set_opacity(eased);
    show_part(scene, 1.0);
    scene.cube.set_opacity(0.0);
    scene.cube.visible = false;
    scene.print_head.visible = false;
    hide_cloud(scene);
    scene.beam.set_opacity(0.0);

    let base: Vec3 = CAMERA_BASE_EYE.into();
    set_camera(scene, base.lerp(CAMERA_SCAN_EYE.into(), eased));
}

fn apply_scanning(scene: &mut HeroScene, progress: f32, elapsed: f32) {
    let eased = ease_in_out_cubic(progress);
    scene.printer.set_opacity(0.0);
    scene.scanner.visible = true;
    scene.scanner.set_opacity(1.0);
    scene.cube.set_opacity(0.0);
    scene.cube.visible = false;
    scene.print_head.visible = false;
    show_part(scene, 1.0);

    if scene.particles.mode() != ParticleMode::Surface {
        scene.particles.reset_to_source();
    }
    let point_count = scene.particles.point_count();
    scene
        .particles
        .set_visible_count((point_count as f32 * eased).floor() as usize);
    scene.cloud.visible = true;
    scene.cloud.opacity = lerp(0.15, 0.95, eased);

    let beam_height = scene.part_height + 0.6;
    scene.beam.set_opacity((eased * 1.2).min(1.0));
    scene.beam.transform.scale.y = beam_height;
    scene.beam.transform.position.y = eased * beam_height - beam_height * 0.5 + 0.3;

    let turn = FRAC_PI_2 * eased + smooth_step(0.7, 1.0, eased) * FRAC_PI_2;
    scene.part_container.transform.set_euler(0.0, turn, 0.0);
    scene.cloud.rotation_y = turn;
    scene.cloud.position_y = (elapsed * 1.5).sin() * 0.04 * 0.5;

    set_camera(scene, CAMERA_SCAN_EYE.into());
}

fn apply_to_cube(scene: &mut HeroScene, progress: f32, elapsed: f32) {
    let eased = ease_in_out_cubic(progress);
    scene.printer.set_opacity(0.0);
    scene.scanner.set_opacity(1.0 - eased);
    scene.print_head.visible = false;

    scene.particles.blend_to_cube(eased);
    let point_count = scene.particles.point_count();
    scene.particles.set_visible_count(point_count);
    scene.cloud.visible = true;
    scene.cloud.opacity = lerp(0.9, 0.1, eased);

    let size = scene.cube_size;
    let cube = &mut scene.cube;
    cube.visible = true;
    cube.set_opacity((eased * 1.1).min(1.0));
    cube.transform.set_uniform_scale(size * lerp(0.85, 1.0, eased));
    cube.transform.set_euler(FRAC_PI_6, elapsed * 0.6, 0.0);

    scene.part_container.transform.scale = Vec3::ONE;
    scene.part_container.transform.position.y = 0.0;
    scene.part_container.set_opacity(1.0 - eased);
    scene.part_container.visible = eased < 0.95;
    scene.beam.set_opacity((0.3 - eased).max(0.0));

    let scan: Vec3 = CAMERA_SCAN_EYE.into();
    set_camera(scene, scan.lerp(CAMERA_BASE_EYE.into(), eased));
}

fn apply_loop_pause(scene: &mut HeroScene) {
    set_cube_rest_pose(scene);
    scene.printer.set_opacity(0.0);
    scene.scanner.set_opacity(0.0);
    hide_part(scene);
    hide_cloud(scene);
    scene.beam.set_opacity(0.0);
    scene.print_head.visible = false;
    set_camera(scene, CAMERA_BASE_EYE.into());
}

fn set_cube_rest_pose(scene: &mut HeroScene) {
    let size = scene.cube_size;
    let cube = &mut scene.cube;
    cube.visible = true;
    cube.set_opacity(1.0);
    cube.transform.set_uniform_scale(size);
    cube.transform.set_euler(FRAC_PI_6, FRAC_PI_4, 0.0);
}

/// Show the unrotated part at full opacity with the given vertical growth.
fn show_part(scene: &mut HeroScene, y_scale: f32) {
    let container = &mut scene.part_container;
    container.visible = true;
    container.set_opacity(1.0);
    container.transform.scale = Vec3::new(1.0, y_scale, 1.0);
    container.transform.position.y = 0.0;
    container.transform.set_euler(0.0, 0.0, 0.0);
}

fn hide_part(scene: &mut HeroScene) {
    let container = &mut scene.part_container;
    container.visible = false;
    container.transform.set_euler(0.0, 0.0, 0.0);
}

fn hide_cloud(scene: &mut HeroScene) {
    scene.cloud.visible = false;
    scene.cloud.opacity = 0.0;
    scene.particles.set_visible_count(0);
}

fn set_camera(scene: &mut HeroScene, eye: Vec3) {
    scene.camera.eye = eye;
    scene.camera.target = CAMERA_TARGET.into();
}
