//! Selection and transform controller.
//!
//! Operations on committed entities: select, finish a drag or transform,
//! flip, copy/paste/delete, textbox editing, the wall properties panel, and
//! clearing the canvas. All of them are methods on [`EngineCore`] so they
//! share its read-only guard and history commit.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use tracing::debug;

use crate::consts::PASTE_OFFSET_PX;
use crate::engine::{Action, EngineCore};
use crate::entity::{
    Entity, EntityId, EntityKind, FlipAxis, NodeTransform, Rectangle, Shape, Symbol, Textbox, Wall, lock_wall_box,
};
use crate::geom::{Bounds, Point};
use crate::scene::SceneEntity;
use crate::units::{feet_to_px, px_to_feet};

/// Copied entities waiting to be pasted. One independent slot per copyable kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    pub wall: Option<Wall>,
    pub shape: Option<Shape>,
    pub symbol: Option<Symbol>,
}

impl Clipboard {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wall.is_none() && self.shape.is_none() && self.symbol.is_none()
    }
}

/// Values shown in the wall properties panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPanel {
    pub length_ft: f64,
    pub angle_deg: f64,
}

impl EngineCore {
    // --- Selection ---

    /// Select `id`. No-op while drawing or when the id is unknown.
    pub fn select(&mut self, id: &EntityId) -> Vec<Action> {
        if self.ui.tool.is_drawing() || !self.scene.contains(id) {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.ui.editing_textbox.as_ref().is_some_and(|editing| editing != id) {
            actions.extend(self.end_text_edit());
        }
        self.set_selection(Some(id.clone()), &mut actions);
        actions
    }

    /// Clear the selection, ending any text edit.
    pub fn deselect(&mut self) -> Vec<Action> {
        let mut actions = self.end_text_edit();
        self.set_selection(None, &mut actions);
        actions
    }

    // --- Drag / transform ---

    /// A node drag finished with the node at `node`. Commits.
    pub fn drag_end(&mut self, id: &EntityId, node: Point) -> Vec<Action> {
        if !self.can_manipulate(id) || self.ui.editing_textbox.as_ref() == Some(id) {
            return Vec::new();
        }
        self.update_any(
            id,
            |e| e.drag_to(node),
            |e| e.drag_to(node),
            |e| e.drag_to(node),
            |e| e.drag_to(node),
            |e| e.drag_to(node),
        );
        debug!(%id, x = node.x, y = node.y, "drag committed");
        self.commit()
    }

    /// A resize/rotate finished. Scale is folded into absolute sizes. Commits.
    pub fn transform_end(&mut self, id: &EntityId, t: &NodeTransform) -> Vec<Action> {
        if !self.can_manipulate(id) {
            return Vec::new();
        }
        self.update_any(
            id,
            |e| e.transform_to(t),
            |e| e.transform_to(t),
            |e| e.transform_to(t),
            |e| e.transform_to(t),
            |e| e.transform_to(t),
        );
        self.ui.wall_readout = None;
        debug!(%id, scale_x = t.scale_x, scale_y = t.scale_y, rotation = t.rotation, "transform committed");
        self.commit()
    }

    /// A wall is being resized; show its prospective length.
    pub fn transform_preview(&mut self, id: &EntityId, scale_x: f64) -> Vec<Action> {
        if !self.can_manipulate(id) {
            return Vec::new();
        }
        let Some(wall) = self.scene.get::<Wall>(id) else {
            return Vec::new();
        };
        self.ui.wall_readout = Some(wall.length * scale_x.abs());
        vec![Action::RenderNeeded]
    }

    /// Constrain the live transformer box for `id`. Walls keep their
    /// vertical extent; everything else takes `new` unchanged.
    #[must_use]
    pub fn constrain_box(&self, id: &EntityId, old: Bounds, new: Bounds) -> Bounds {
        if self.scene.kind_of(id) == Some(EntityKind::Wall) { lock_wall_box(old, new) } else { new }
    }

    fn can_manipulate(&self, id: &EntityId) -> bool {
        !self.read_only && !self.ui.tool.is_drawing() && self.scene.contains(id)
    }

    fn update_any(
        &mut self,
        id: &EntityId,
        wall: impl FnOnce(&mut Wall),
        shape: impl FnOnce(&mut Shape),
        symbol: impl FnOnce(&mut Symbol),
        textbox: impl FnOnce(&mut Textbox),
        rectangle: impl FnOnce(&mut Rectangle),
    ) {
        match self.scene.kind_of(id) {
            Some(EntityKind::Wall) => self.scene.update(id, wall),
            Some(EntityKind::Shape) => self.scene.update(id, shape),
            Some(EntityKind::Symbol) => self.scene.update(id, symbol),
            Some(EntityKind::Textbox) => self.scene.update(id, textbox),
            Some(EntityKind::Rectangle) => self.scene.update(id, rectangle),
            None => false,
        };
    }

    // --- Flip ---

    /// Toggle a flip flag on the selected symbol. Commits.
    pub fn flip(&mut self, axis: FlipAxis) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        if !self.scene.update::<Symbol>(&id, |s| s.flip(axis)) {
            return Vec::new();
        }
        self.commit()
    }

    // --- Clipboard ---

    /// Copy the selected wall, shape, or symbol into its clipboard slot.
    pub fn copy(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.as_ref() else {
            return Vec::new();
        };
        match self.scene.kind_of(id) {
            Some(EntityKind::Wall) => self.clipboard.wall = self.scene.get::<Wall>(id).cloned(),
            Some(EntityKind::Shape) => self.clipboard.shape = self.scene.get::<Shape>(id).cloned(),
            Some(EntityKind::Symbol) => self.clipboard.symbol = self.scene.get::<Symbol>(id).cloned(),
            _ => return Vec::new(),
        }
        debug!(%id, "copied to clipboard");
        Vec::new()
    }

    /// Paste one offset clone per filled clipboard slot and select the last
    /// one. Commits once.
    pub fn paste(&mut self) -> Vec<Action> {
        if self.read_only || self.clipboard.is_empty() {
            return Vec::new();
        }
        let mut actions = self.end_text_edit();
        let clipboard = self.clipboard.clone();
        let mut last = None;
        if let Some(wall) = clipboard.wall {
            last = Some(self.paste_one(wall));
        }
        if let Some(shape) = clipboard.shape {
            last = Some(self.paste_one(shape));
        }
        if let Some(symbol) = clipboard.symbol {
            last = Some(self.paste_one(symbol));
        }
        self.set_selection(last, &mut actions);
        actions.extend(self.commit());
        actions
    }

    fn paste_one<E: SceneEntity>(&mut self, mut entity: E) -> EntityId {
        let id = EntityId::generate();
        let at = entity.position();
        entity.set_id(id.clone());
        entity.set_position(Point::new(at.x + PASTE_OFFSET_PX, at.y + PASTE_OFFSET_PX));
        self.scene.insert(entity);
        id
    }

    // --- Delete / clear ---

    /// Remove the selected entity, whatever its kind. Commits.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        self.drop_text_edit(&mut actions);
        let removed = self.scene.remove(&id);
        self.set_selection(None, &mut actions);
        if removed.is_some() {
            debug!(%id, kind = ?removed, "deleted");
            actions.extend(self.commit());
        }
        actions
    }

    /// Empty all five collections. Undoable.
    pub fn clear_canvas(&mut self) -> Vec<Action> {
        if self.read_only || self.scene.is_empty() {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        self.drop_text_edit(&mut actions);
        self.set_selection(None, &mut actions);
        self.scene.clear();
        actions.extend(self.commit());
        actions
    }

    // --- Textbox editing ---

    /// Select a textbox and open its editor. Ends any other edit first.
    pub fn begin_text_edit(&mut self, id: &EntityId) -> Vec<Action> {
        if self.read_only || self.ui.tool.is_drawing() || self.scene.kind_of(id) != Some(EntityKind::Textbox) {
            return Vec::new();
        }
        if self.ui.editing_textbox.as_ref() == Some(id) {
            return Vec::new();
        }
        let mut actions = self.end_text_edit();
        self.set_selection(Some(id.clone()), &mut actions);
        self.ui.editing_textbox = Some(id.clone());
        actions.push(Action::TextEditStarted(id.clone()));
        actions
    }

    /// Replace the edited textbox's text. Live; does not commit.
    pub fn set_text(&mut self, text: String) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        let Some(id) = self.ui.editing_textbox.clone() else {
            return Vec::new();
        };
        if !self.scene.update::<Textbox>(&id, |t| t.text = text) {
            return Vec::new();
        }
        vec![Action::SceneChanged, Action::RenderNeeded]
    }

    /// Close the text editor, committing the edit if it changed anything.
    pub fn end_text_edit(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.editing_textbox.take() else {
            return Vec::new();
        };
        let mut actions = vec![Action::TextEditEnded(id)];
        actions.extend(self.commit_if_changed());
        actions
    }

    // --- Wall panel ---

    /// Length (feet) and angle (degrees) of wall `id`.
    #[must_use]
    pub fn wall_panel(&self, id: &EntityId) -> Option<WallPanel> {
        let wall = self.scene.get::<Wall>(id)?;
        Some(WallPanel { length_ft: px_to_feet(wall.length), angle_deg: wall.rotation })
    }

    /// Raw length text from the panel. Positive values resize the selected
    /// wall live; anything else is ignored.
    pub fn set_wall_length_ft(&mut self, raw: &str) -> Vec<Action> {
        let Ok(feet) = raw.trim().parse::<f64>() else {
            return Vec::new();
        };
        if !(feet > 0.0 && feet.is_finite()) {
            return Vec::new();
        }
        self.update_selected_wall(|w| w.length = feet_to_px(feet))
    }

    /// Raw angle text from the panel. Any number rotates the selected wall live.
    pub fn set_wall_angle_deg(&mut self, raw: &str) -> Vec<Action> {
        let Ok(degrees) = raw.trim().parse::<f64>() else {
            return Vec::new();
        };
        if !degrees.is_finite() {
            return Vec::new();
        }
        self.update_selected_wall(|w| w.rotation = degrees)
    }

    /// The panel lost focus. Commits if the wall changed.
    pub fn end_wall_panel_edit(&mut self) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        self.commit_if_changed()
    }

    fn update_selected_wall(&mut self, f: impl FnOnce(&mut Wall)) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        let Some(id) = self.ui.selected_id.clone() else {
            return Vec::new();
        };
        if !self.scene.update::<Wall>(&id, f) {
            return Vec::new();
        }
        vec![Action::SceneChanged, Action::RenderNeeded]
    }
}
