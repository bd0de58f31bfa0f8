//! Hit testing: which committed entity is under the pointer.
//!
//! Used by hosts that have no scene graph of their own (the CLI replay, tests).
//! Entities are tested topmost first, following the host's layer order:
//! textboxes, symbols, shapes, rectangles, walls, each newest first.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HIT_SLOP_PX;
use crate::entity::{EntityId, Rectangle, Shape, ShapeGeometry, ShapeKind, Symbol, Textbox, Wall};
use crate::geom::{Point, distance_to_segment, rotated_box_contains, triangle_contains};
use crate::input::PointerTarget;
use crate::scene::Scene;

/// Topmost entity containing `pt`, if any.
#[must_use]
pub fn hit_test(scene: &Scene, pt: Point) -> Option<EntityId> {
    let textboxes = scene.textboxes().iter().rev().find(|t| textbox_contains(t, pt)).map(|t| &t.id);
    let symbols = || scene.symbols().iter().rev().find(|s| symbol_contains(s, pt)).map(|s| &s.id);
    let shapes = || scene.shapes().iter().rev().find(|s| shape_contains(s, pt)).map(|s| &s.id);
    let objects = || scene.objects().iter().rev().find(|r| rectangle_contains(r, pt)).map(|r| &r.id);
    let walls = || scene.walls().iter().rev().find(|w| wall_contains(w, pt)).map(|w| &w.id);

    textboxes.or_else(symbols).or_else(shapes).or_else(objects).or_else(walls).cloned()
}

/// Resolve a pointer position into a router target.
#[must_use]
pub fn target_at(scene: &Scene, pt: Point) -> PointerTarget {
    hit_test(scene, pt).map_or(PointerTarget::Background, PointerTarget::Entity)
}

fn wall_contains(w: &Wall, pt: Point) -> bool {
    rotated_box_contains(pt, w.node_origin(), w.length, w.thickness, w.rotation)
}

fn rectangle_contains(r: &Rectangle, pt: Point) -> bool {
    rotated_box_contains(pt, Point::new(r.x, r.y), r.width, r.height, r.rotation)
}

fn symbol_contains(s: &Symbol, pt: Point) -> bool {
    rotated_box_contains(pt, Point::new(s.x, s.y), s.width, s.height, s.rotation)
}

fn textbox_contains(t: &Textbox, pt: Point) -> bool {
    rotated_box_contains(pt, Point::new(t.x, t.y), t.width, t.height, t.rotation)
}

fn shape_contains(s: &Shape, pt: Point) -> bool {
    let origin = Point::new(s.x, s.y);
    match (s.kind(), s.geometry) {
        (ShapeKind::Arrow, ShapeGeometry::Vector { points }) => {
            let tip = Point::new(points[2], points[3]).to_stage(origin, s.rotation);
            distance_to_segment(pt, origin, tip) <= HIT_SLOP_PX
        }
        (ShapeKind::Circle, _) => {
            let (center, radius) = s.circle();
            pt.distance_to(center) <= radius
        }
        (ShapeKind::Triangle, _) => {
            let [a, b, c] = s.triangle_points();
            triangle_contains(pt.to_local(origin, s.rotation), a, b, c)
        }
        _ => rotated_box_contains(pt, origin, s.width(), s.height(), s.rotation),
    }
}
