#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::WALL_THICKNESS_PX;
use crate::entity::{ShapeGeometry, ShapeKind, SymbolKind};
use crate::input::{Key, Modifiers, PointerTarget, Tool};
use crate::scene::Scene;

// =============================================================
// Helpers
// =============================================================

fn id(s: &str) -> EntityId {
    EntityId::from(s)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn ctrl(k: &str) -> (Key, Modifiers) {
    (Key(k.to_string()), Modifiers { ctrl: true, ..Modifiers::default() })
}

/// A session holding one of every kind, ids named after their kind.
fn core_with_everything() -> EngineCore {
    let scene = Scene::from_parts(
        vec![Rectangle { id: id("room"), x: 0.0, y: 0.0, width: 140.0, height: 70.0, rotation: 0.0 }],
        vec![Wall::from_drag(id("wall"), pt(100.0, 100.0), pt(240.0, 100.0))],
        vec![
            Shape::from_drag(id("rect"), ShapeKind::Rect, pt(0.0, 0.0), pt(20.0, 10.0)),
            Shape::from_drag(id("circle"), ShapeKind::Circle, pt(0.0, 0.0), pt(40.0, 20.0)),
            Shape::from_drag(id("arrow"), ShapeKind::Arrow, pt(0.0, 0.0), pt(10.0, 20.0)),
        ],
        vec![Symbol::centered(id("door"), SymbolKind::Door, pt(100.0, 100.0))],
        vec![Textbox::placed(id("note"), pt(300.0, 300.0))],
    );
    let mut core = EngineCore::new();
    core.hydrate(scene);
    core
}

fn transform(x: f64, y: f64, scale_x: f64, scale_y: f64, rotation: f64) -> NodeTransform {
    NodeTransform { x, y, scale_x, scale_y, rotation }
}

// =============================================================
// Select
// =============================================================

#[test]
fn select_unknown_id_is_noop() {
    let mut core = core_with_everything();
    assert!(core.select(&id("ghost")).is_empty());
    assert!(core.selection().is_none());
}

#[test]
fn select_reports_change_once() {
    let mut core = core_with_everything();
    let actions = core.select(&id("wall"));
    assert!(actions.contains(&Action::SelectionChanged(Some(id("wall")))));
    assert!(core.select(&id("wall")).is_empty());
}

#[test]
fn selecting_elsewhere_ends_text_edit() {
    let mut core = core_with_everything();
    core.begin_text_edit(&id("note"));
    let actions = core.select(&id("door"));
    assert!(actions.contains(&Action::TextEditEnded(id("note"))));
    assert!(core.editing_textbox().is_none());
    assert_eq!(core.selection(), Some(&id("door")));
}

// =============================================================
// Drag end
// =============================================================

#[test]
fn drag_end_moves_and_commits() {
    let mut core = core_with_everything();
    core.drag_end(&id("door"), pt(10.0, 20.0));
    let door = core.scene().get::<Symbol>(&id("door")).unwrap();
    assert_eq!((door.x, door.y), (10.0, 20.0));
    assert_eq!(core.history().len(), 2);
}

#[test]
fn wall_drag_maps_node_to_centerline() {
    let mut core = core_with_everything();
    core.drag_end(&id("wall"), pt(50.0, 50.0));
    let wall = core.scene().get::<Wall>(&id("wall")).unwrap();
    assert_eq!(wall.x, 50.0);
    assert_eq!(wall.y, 50.0 + WALL_THICKNESS_PX / 2.0);
}

#[test]
fn circle_drag_maps_center_to_corner() {
    let mut core = core_with_everything();
    core.drag_end(&id("circle"), pt(100.0, 100.0));
    let circle = core.scene().get::<Shape>(&id("circle")).unwrap();
    assert_eq!((circle.x, circle.y), (80.0, 90.0));
}

#[test]
fn edited_textbox_is_not_draggable() {
    let mut core = core_with_everything();
    core.begin_text_edit(&id("note"));
    assert!(core.drag_end(&id("note"), pt(0.0, 0.0)).is_empty());
    assert_eq!(core.scene().get::<Textbox>(&id("note")).unwrap().x, 300.0);
}

#[test]
fn drag_undo_restores_position() {
    let mut core = core_with_everything();
    core.drag_end(&id("room"), pt(70.0, 70.0));
    core.undo();
    assert_eq!(core.scene().get::<Rectangle>(&id("room")).unwrap().x, 0.0);
}

// =============================================================
// Transform end
// =============================================================

#[test]
fn rectangle_transform_absorbs_scale() {
    let mut core = core_with_everything();
    core.transform_end(&id("room"), &transform(5.0, 6.0, 2.0, -0.5, 30.0));
    let room = core.scene().get::<Rectangle>(&id("room")).unwrap();
    assert_eq!((room.x, room.y, room.width, room.height, room.rotation), (5.0, 6.0, 280.0, 35.0, 30.0));
    assert_eq!(core.history().len(), 2);
}

#[test]
fn wall_transform_changes_length_only() {
    let mut core = core_with_everything();
    core.transform_end(&id("wall"), &transform(100.0, 100.0, 0.5, 4.0, 90.0));
    let wall = core.scene().get::<Wall>(&id("wall")).unwrap();
    assert_eq!(wall.length, 70.0);
    assert_eq!(wall.thickness, WALL_THICKNESS_PX);
    assert_eq!(wall.rotation, 90.0);
}

#[test]
fn wall_transform_preview_updates_readout() {
    let mut core = core_with_everything();
    core.transform_preview(&id("wall"), -1.5);
    assert_eq!(core.wall_readout(), Some(210.0));
    core.transform_end(&id("wall"), &transform(100.0, 100.0, 1.5, 1.0, 0.0));
    assert_eq!(core.wall_readout(), None);
}

#[test]
fn transform_preview_ignores_non_walls() {
    let mut core = core_with_everything();
    assert!(core.transform_preview(&id("door"), 2.0).is_empty());
    assert_eq!(core.wall_readout(), None);
}

#[test]
fn only_walls_have_their_box_locked() {
    let core = core_with_everything();
    let old = Bounds { x: 0.0, y: 0.0, width: 100.0, height: 10.0 };
    let new = Bounds { x: 5.0, y: 3.0, width: 150.0, height: 30.0 };
    assert_eq!(core.constrain_box(&id("wall"), old, new), Bounds { x: 5.0, y: 0.0, width: 150.0, height: 10.0 });
    assert_eq!(core.constrain_box(&id("rect"), old, new), new);
    assert_eq!(core.constrain_box(&id("missing"), old, new), new);
}

#[test]
fn arrow_transform_scales_vector() {
    let mut core = core_with_everything();
    core.transform_end(&id("arrow"), &transform(1.0, 1.0, 3.0, 0.5, 0.0));
    let arrow = core.scene().get::<Shape>(&id("arrow")).unwrap();
    assert_eq!(arrow.geometry, ShapeGeometry::Vector { points: [0.0, 0.0, 30.0, 10.0] });
}

#[test]
fn textbox_transform_changes_width_only() {
    let mut core = core_with_everything();
    core.transform_end(&id("note"), &transform(300.0, 300.0, 0.5, 2.0, 0.0));
    let note = core.scene().get::<Textbox>(&id("note")).unwrap();
    assert_eq!((note.width, note.height), (100.0, 40.0));
}

// =============================================================
// Flip
// =============================================================

#[test]
fn flip_toggles_selected_symbol() {
    let mut core = core_with_everything();
    core.select(&id("door"));
    core.flip(FlipAxis::Vertical);
    let door = core.scene().get::<Symbol>(&id("door")).unwrap();
    assert!(door.flip_y);
    assert!(!door.flip_x);
    assert_eq!((door.x, door.y), (75.0, 75.0));
    assert_eq!(core.history().len(), 2);
}

#[test]
fn flip_ignores_non_symbols() {
    let mut core = core_with_everything();
    core.select(&id("wall"));
    assert!(core.flip(FlipAxis::Horizontal).is_empty());
    assert_eq!(core.history().len(), 1);
}

// =============================================================
// Copy / paste
// =============================================================

#[test]
fn paste_offsets_a_copied_wall() {
    let mut core = core_with_everything();
    core.select(&id("wall"));
    core.copy();
    core.paste();

    let walls = core.scene().walls();
    assert_eq!(walls.len(), 2);
    let (source, pasted) = (&walls[0], &walls[1]);
    assert_eq!((source.x, source.y), (100.0, 100.0));
    assert_eq!((pasted.x, pasted.y), (130.0, 130.0));
    assert_ne!(pasted.id, source.id);
    assert_eq!(pasted.length, source.length);
    assert_eq!(core.selection(), Some(&pasted.id));
    assert_eq!(core.history().len(), 2);
}

#[test]
fn paste_fills_every_slot_in_one_commit() {
    let mut core = core_with_everything();
    core.select(&id("wall"));
    core.copy();
    core.select(&id("rect"));
    core.copy();
    core.select(&id("door"));
    core.copy();
    core.paste();

    assert_eq!(core.scene().walls().len(), 2);
    assert_eq!(core.scene().shapes().len(), 4);
    assert_eq!(core.scene().symbols().len(), 2);
    assert_eq!(core.selection(), Some(&core.scene().symbols()[1].id));
    assert_eq!(core.history().len(), 2);

    core.undo();
    assert_eq!(core.scene().len(), 7);
}

#[test]
fn rectangles_and_textboxes_are_not_copyable() {
    let mut core = core_with_everything();
    core.select(&id("room"));
    core.copy();
    core.select(&id("note"));
    core.copy();
    assert!(core.paste().is_empty());
    assert_eq!(core.history().len(), 1);
}

#[test]
fn keyboard_copy_paste() {
    let mut core = core_with_everything();
    core.select(&id("circle"));
    let (c, m) = ctrl("c");
    core.key_down(&c, m, false);
    let (v, m) = ctrl("V");
    core.key_down(&v, m, false);
    let pasted = &core.scene().shapes()[3];
    assert_eq!(pasted.kind(), ShapeKind::Circle);
    assert_eq!((pasted.x, pasted.y), (30.0, 30.0));
}

// =============================================================
// Delete / clear
// =============================================================

#[test]
fn delete_removes_any_kind() {
    for target in ["room", "wall", "rect", "door", "note"] {
        let mut core = core_with_everything();
        core.select(&id(target));
        core.delete_selected();
        assert!(!core.scene().contains(&id(target)), "{target} survived delete");
        assert!(core.selection().is_none());
        assert_eq!(core.history().len(), 2);
    }
}

#[test]
fn delete_key_ends_text_edit() {
    let mut core = core_with_everything();
    core.begin_text_edit(&id("note"));
    let actions = core.key_down(&Key("Delete".into()), Modifiers::default(), false);
    assert!(actions.contains(&Action::TextEditEnded(id("note"))));
    assert!(core.editing_textbox().is_none());
    assert!(!core.scene().contains(&id("note")));
}

#[test]
fn delete_without_selection_is_noop() {
    let mut core = core_with_everything();
    assert!(core.delete_selected().is_empty());
}

#[test]
fn clear_canvas_is_undoable() {
    let mut core = core_with_everything();
    core.select(&id("door"));
    core.clear_canvas();
    assert!(core.scene().is_empty());
    assert!(core.selection().is_none());
    core.undo();
    assert_eq!(core.scene().len(), 7);
}

// =============================================================
// Textbox editing
// =============================================================

#[test]
fn text_edit_commits_once_on_end() {
    let mut core = core_with_everything();
    core.pointer_down(pt(310.0, 310.0), PointerTarget::Entity(id("note")));
    assert_eq!(core.editing_textbox(), Some(&id("note")));

    let actions = core.set_text("Kitchen".into());
    assert!(actions.contains(&Action::SceneChanged));
    core.set_text("Kitchen 2".into());
    assert_eq!(core.history().len(), 1);

    core.end_text_edit();
    assert_eq!(core.history().len(), 2);
    assert_eq!(core.scene().get::<Textbox>(&id("note")).unwrap().text, "Kitchen 2");
}

#[test]
fn unchanged_text_edit_does_not_commit() {
    let mut core = core_with_everything();
    core.begin_text_edit(&id("note"));
    let actions = core.end_text_edit();
    assert_eq!(actions, vec![Action::TextEditEnded(id("note"))]);
    assert_eq!(core.history().len(), 1);
}

#[test]
fn set_text_without_edit_is_noop() {
    let mut core = core_with_everything();
    assert!(core.set_text("x".into()).is_empty());
}

#[test]
fn tool_switch_commits_pending_text() {
    let mut core = core_with_everything();
    core.begin_text_edit(&id("note"));
    core.set_text("Hall".into());
    core.set_tool(Tool::Wall);
    assert!(core.editing_textbox().is_none());
    assert_eq!(core.history().len(), 2);
}

#[test]
fn begin_text_edit_rejects_other_kinds() {
    let mut core = core_with_everything();
    assert!(core.begin_text_edit(&id("door")).is_empty());
    assert!(core.editing_textbox().is_none());
}

// =============================================================
// Wall panel
// =============================================================

#[test]
fn wall_panel_reports_feet_and_degrees() {
    let core = core_with_everything();
    assert_eq!(core.wall_panel(&id("wall")), Some(WallPanel { length_ft: 10.0, angle_deg: 0.0 }));
    assert_eq!(core.wall_panel(&id("door")), None);
}

#[test]
fn wall_panel_edits_live_then_commits_on_blur() {
    let mut core = core_with_everything();
    core.select(&id("wall"));
    core.set_wall_length_ft("12.5");
    core.set_wall_angle_deg("-45");
    let wall = core.scene().get::<Wall>(&id("wall")).unwrap();
    assert_eq!(wall.length, 175.0);
    assert_eq!(wall.rotation, -45.0);
    assert_eq!(core.history().len(), 1);

    core.end_wall_panel_edit();
    assert_eq!(core.history().len(), 2);
}

#[test]
fn wall_panel_ignores_bad_input() {
    let mut core = core_with_everything();
    core.select(&id("wall"));
    for raw in ["", "abc", "0", "-3", "NaN"] {
        assert!(core.set_wall_length_ft(raw).is_empty(), "length {raw:?} was accepted");
    }
    assert!(core.set_wall_angle_deg("north").is_empty());
    assert_eq!(core.scene().get::<Wall>(&id("wall")).unwrap().length, 140.0);
    assert!(core.end_wall_panel_edit().is_empty());
}

#[test]
fn wall_panel_requires_a_selected_wall() {
    let mut core = core_with_everything();
    core.select(&id("door"));
    assert!(core.set_wall_length_ft("3").is_empty());
}
