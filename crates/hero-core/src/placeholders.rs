//! Procedural stand-ins shown until (or instead of) the loaded models.

use crate::color::Rgb;
use crate::geometry::{
    box_geometry, cylinder_geometry, plane_geometry, torus_geometry, torus_knot_geometry,
};
use crate::scene::{Material, Node, Tintable};
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};

pub fn build_cube(accent: Rgb) -> Node {
    Node::mesh(
        "HeroCube",
        box_geometry(1.0, 1.0, 1.0),
        Material::standard(accent, 0.35, 0.1),
    )
}

pub fn build_printer(accent: Rgb) -> Node {
    let mat = || Material::standard(accent, 0.35, 0.1);
    let mut printer = Node::group("PrinterPlaceholder")
        .with_child(
            Node::mesh("base", box_geometry(1.6, 0.1, 1.2), mat()).at(Vec3::new(0.0, 0.05, 0.0)),
        )
        .with_child(
            Node::mesh("frame", box_geometry(1.5, 1.4, 0.1), mat())
                .at(Vec3::new(0.0, 0.85, -0.55)),
        )
        .with_child(
            Node::mesh("gantry_left", box_geometry(0.1, 1.4, 1.2), mat())
                .at(Vec3::new(-0.75, 0.85, 0.0)),
        )
        .with_child(
            Node::mesh("gantry_right", box_geometry(0.1, 1.4, 1.2), mat())
                .at(Vec3::new(0.75, 0.85, 0.0)),
        )
        .with_child(
            Node::mesh("top_bar", box_geometry(1.5, 0.1, 1.2), mat())
                .at(Vec3::new(0.0, 1.55, 0.0)),
        );
    printer.set_opacity(0.0);
    printer
}

pub fn build_scanner(accent: Rgb) -> Node {
    let color = accent.offset_hsl(0.02, -0.1, 0.05);
    let mat = || Material::standard(color, 0.3, 0.15);
    let mut arch = Node::mesh(
        "arch",
        torus_geometry(0.9, 0.08, 12, 48, PI * 1.1),
        mat(),
    )
    .at(Vec3::new(0.0, 1.4, 0.0));
    arch.transform.set_euler(0.0, 0.0, FRAC_PI_2);
    let mut scanner = Node::group("ScannerPlaceholder")
        .with_child(
            Node::mesh("base", cylinder_geometry(0.5, 0.6, 0.15, 24), mat())
                .at(Vec3::new(0.0, 0.075, 0.0)),
        )
        .with_child(
            Node::mesh("pillar", box_geometry(0.18, 1.6, 0.18), mat())
                .at(Vec3::new(-0.4, 0.95, 0.0)),
        )
        .with_child(arch)
        .with_child(
            Node::mesh("body", box_geometry(1.2, 0.35, 0.8), mat()).at(Vec3::new(0.2, 1.6, 0.0)),
        );
    scanner.set_opacity(0.0);
    scanner
}

/// Trefoil knot lying on its side. Grounding happens when it is installed.
pub fn build_part(accent: Rgb) -> Node {
    let mut part = Node::mesh(
        "PartPlaceholder",
        torus_knot_geometry(0.28, 0.09, 128, 16),
        Material::standard(accent.offset_hsl(0.0, -0.08, 0.12), 0.3, 0.15),
    );
    part.transform.set_euler(FRAC_PI_2, 0.0, 0.0);
    part
}

pub fn build_beam(accent: Rgb) -> Node {
    let material = Material::standard(accent.scale(1.3), 0.2, 0.0)
        .with_emissive(accent.scale(0.25))
        .with_opacity(0.0);
    let mut beam = Node::mesh("ScanBeam", plane_geometry(0.02, 1.6), material)
        .at(Vec3::new(0.55, 0.8, 0.0));
    beam.transform.set_euler(0.0, FRAC_PI_2, 0.0);
    beam
}

pub fn build_print_head(accent: Rgb) -> Node {
    Node::mesh(
        "PrintHead",
        box_geometry(0.2, 0.1, 0.2),
        Material::standard(accent.offset_hsl(0.0, -0.1, -0.1), 0.25, 0.35),
    )
    .at(Vec3::new(0.0, 1.1, 0.0))
}

pub fn point_color(accent: Rgb) -> Rgb {
    accent.offset_hsl(0.05, -0.1, 0.1)
}
