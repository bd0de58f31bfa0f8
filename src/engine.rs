//! The editing engine: one editor session's scene, history, tool, and gesture.
//!
//! `EngineCore` is the single owner of all mutable editor state. Hosts feed it
//! pointer, keyboard, and panel input and get back a list of [`Action`]s to
//! act on (re-render, persist, move focus). Every mutating operation checks the
//! read-only flag itself and commits to history itself, so no host can forget
//! either. Selection, transform, clipboard, and text/wall editing operations
//! live in [`crate::selection`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::consts::WALL_THICKNESS_PX;
use crate::entity::{EntityId, EntityKind, NodeTransform, Symbol, SymbolKind, Textbox};
use crate::geom::Point;
use crate::hit;
use crate::history::History;
use crate::input::{EditorEvent, GesturePreview, InputState, Key, Modifiers, PointerTarget, Tool, UiState};
use crate::keymap::{self, Shortcut};
use crate::scene::Scene;
use crate::selection::Clipboard;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Scene, selection, or gesture changed; redraw.
    RenderNeeded,
    /// Scene content changed; schedule a save.
    SceneChanged,
    /// A history entry was added or the cursor moved.
    HistoryChanged { can_undo: bool, can_redo: bool },
    SelectionChanged(Option<EntityId>),
    ToolChanged(Tool),
    /// Show the text editor over this textbox.
    TextEditStarted(EntityId),
    /// Hide the text editor.
    TextEditEnded(EntityId),
    SetCursor(String),
}

/// Core engine state. Holds no host handles, so it is fully testable.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub(crate) scene: Scene,
    pub(crate) history: History,
    pub(crate) ui: UiState,
    pub(crate) input: InputState,
    pub(crate) clipboard: Clipboard,
    pub(crate) read_only: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(&EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty, editable session sized by `config`.
    #[must_use]
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            scene: Scene::new(),
            history: History::new(config.history_capacity),
            ui: UiState::default(),
            input: InputState::Idle,
            clipboard: Clipboard::default(),
            read_only: false,
        }
    }

    // --- Data inputs ---

    /// Replace the scene with one loaded from the store. History restarts
    /// with this scene as its only entry; nothing is committed or saved.
    pub fn hydrate(&mut self, scene: Scene) -> Vec<Action> {
        info!(entities = scene.len(), "hydrating scene");
        self.input = InputState::Idle;
        self.ui.wall_readout = None;
        self.ui.selected_id = None;
        let mut actions = Vec::new();
        self.drop_text_edit(&mut actions);
        self.history.reset(scene.clone());
        self.scene = scene;
        actions.extend([Action::SelectionChanged(None), self.history_state(), Action::RenderNeeded]);
        actions
    }

    /// Replace the scene wholesale with an imported one, as a single undoable step.
    pub fn import_scene(&mut self, scene: Scene) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        info!(entities = scene.len(), "importing scene");
        let mut actions = self.cancel_gesture();
        self.drop_text_edit(&mut actions);
        self.set_selection(None, &mut actions);
        self.scene = scene;
        actions.extend(self.commit());
        actions
    }

    /// Suppress every mutation (shared, view-only sessions). Turning it on
    /// drops any open gesture or text edit without committing.
    pub fn set_read_only(&mut self, read_only: bool) -> Vec<Action> {
        self.read_only = read_only;
        if !read_only {
            return Vec::new();
        }
        let mut actions = self.cancel_gesture();
        self.drop_text_edit(&mut actions);
        actions
    }

    // --- Tool / gesture ---

    /// Set the active tool. Abandons any open gesture and ends text editing.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = self.end_text_edit();
        actions.extend(self.cancel_gesture());
        actions.extend(self.switch_tool(tool));
        actions
    }

    /// Discard the open draw gesture, if any. Nothing is committed.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.input);
        if gesture.is_idle() {
            return Vec::new();
        }
        debug!(?gesture, "cancelled draw gesture");
        self.ui.wall_readout = None;
        vec![Action::RenderNeeded]
    }

    pub(crate) fn switch_tool(&mut self, tool: Tool) -> Vec<Action> {
        if self.ui.tool == tool {
            return Vec::new();
        }
        self.ui.tool = tool;
        let cursor = if tool.is_drawing() { "crosshair" } else { "default" };
        vec![Action::ToolChanged(tool), Action::SetCursor(cursor.to_string())]
    }

    // --- Pointer ---

    /// Pointer pressed at `pos` (stage pixels) over `target`.
    pub fn pointer_down(&mut self, pos: Point, target: PointerTarget) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        match self.ui.tool {
            Tool::Textbox => self.place_textbox(pos),
            Tool::Symbol(kind) => self.place_symbol(kind, pos),
            Tool::Shape(kind) => {
                let mut actions = self.cancel_gesture();
                self.input = InputState::DrawingShape { id: EntityId::generate(), kind, anchor: pos, current: pos };
                actions.push(Action::RenderNeeded);
                actions
            }
            Tool::Wall => {
                let mut actions = self.cancel_gesture();
                self.input = InputState::DrawingWall {
                    id: EntityId::generate(),
                    anchor: pos,
                    current: pos,
                    thickness: WALL_THICKNESS_PX,
                };
                self.ui.wall_readout = Some(0.0);
                actions.push(Action::RenderNeeded);
                actions
            }
            Tool::Select => match target {
                PointerTarget::Background => self.deselect(),
                PointerTarget::Entity(id) if self.scene.kind_of(&id) == Some(EntityKind::Textbox) => {
                    self.begin_text_edit(&id)
                }
                PointerTarget::Entity(id) => self.select(&id),
            },
        }
    }

    /// Pointer moved to `pos`. Only an open gesture reacts.
    pub fn pointer_move(&mut self, pos: Point) -> Vec<Action> {
        if self.read_only || self.input.is_idle() {
            return Vec::new();
        }
        self.input.track(pos);
        if let InputState::DrawingWall { anchor, .. } = &self.input {
            self.ui.wall_readout = Some(anchor.distance_to(pos));
        }
        vec![Action::RenderNeeded]
    }

    /// Pointer released. Commits the open gesture, if any.
    pub fn pointer_up(&mut self) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        let Some(preview) = std::mem::take(&mut self.input).preview() else {
            return Vec::new();
        };
        match preview {
            GesturePreview::Shape(shape) => {
                debug!(id = %shape.id, kind = ?shape.kind(), "shape drawn");
                self.scene.insert(shape);
            }
            GesturePreview::Wall(wall) => {
                debug!(id = %wall.id, length = wall.length, rotation = wall.rotation, "wall drawn");
                self.scene.insert(wall);
                self.ui.wall_readout = None;
            }
        }
        let mut actions = self.switch_tool(Tool::Select);
        actions.extend(self.commit());
        actions
    }

    fn place_textbox(&mut self, pos: Point) -> Vec<Action> {
        let textbox = Textbox::placed(EntityId::generate(), pos);
        let id = textbox.id.clone();
        self.scene.insert(textbox);
        let mut actions = Vec::new();
        self.set_selection(Some(id.clone()), &mut actions);
        self.ui.editing_textbox = Some(id.clone());
        actions.push(Action::TextEditStarted(id));
        actions.extend(self.switch_tool(Tool::Select));
        actions.extend(self.commit());
        actions
    }

    fn place_symbol(&mut self, kind: SymbolKind, pos: Point) -> Vec<Action> {
        let symbol = Symbol::centered(EntityId::generate(), kind, pos);
        let id = symbol.id.clone();
        self.scene.insert(symbol);
        let mut actions = Vec::new();
        self.set_selection(Some(id), &mut actions);
        actions.extend(self.switch_tool(Tool::Select));
        actions.extend(self.commit());
        actions
    }

    // --- Keyboard ---

    /// Key pressed. `text_focus` is true while a text input has focus.
    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers, text_focus: bool) -> Vec<Action> {
        match keymap::resolve(key, modifiers, text_focus) {
            Some(Shortcut::Undo) => self.undo(),
            Some(Shortcut::Redo) => self.redo(),
            Some(Shortcut::Delete) => self.delete_selected(),
            Some(Shortcut::Copy) => self.copy(),
            Some(Shortcut::Paste) => self.paste(),
            Some(Shortcut::Cancel) => self.cancel_gesture(),
            None => Vec::new(),
        }
    }

    // --- History ---

    /// Step back one history entry. When it moves, any open gesture or text
    /// edit is dropped and the selection cleared.
    pub fn undo(&mut self) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        match self.history.undo() {
            Some(scene) => self.restore(scene),
            None => Vec::new(),
        }
    }

    /// Step forward one history entry. When it moves, any open gesture or text
    /// edit is dropped and the selection cleared.
    pub fn redo(&mut self) -> Vec<Action> {
        if self.read_only {
            return Vec::new();
        }
        match self.history.redo() {
            Some(scene) => self.restore(scene),
            None => Vec::new(),
        }
    }

    fn restore(&mut self, scene: Scene) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.drop_text_edit(&mut actions);
        self.scene = scene;
        self.set_selection(None, &mut actions);
        actions.extend([Action::SceneChanged, self.history_state(), Action::RenderNeeded]);
        actions
    }

    /// Snapshot the live scene as a new history entry.
    pub(crate) fn commit(&mut self) -> Vec<Action> {
        self.history.commit(self.scene.clone());
        vec![Action::SceneChanged, self.history_state(), Action::RenderNeeded]
    }

    /// Commit only if the live scene differs from the current history entry.
    pub(crate) fn commit_if_changed(&mut self) -> Vec<Action> {
        if self.scene == *self.history.current() {
            return Vec::new();
        }
        self.commit()
    }

    fn history_state(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }

    /// Close the text editor without committing.
    pub(crate) fn drop_text_edit(&mut self, actions: &mut Vec<Action>) {
        if let Some(id) = self.ui.editing_textbox.take() {
            actions.push(Action::TextEditEnded(id));
        }
    }

    pub(crate) fn set_selection(&mut self, id: Option<EntityId>, actions: &mut Vec<Action>) {
        if self.ui.selected_id == id {
            return;
        }
        self.ui.selected_id = id.clone();
        actions.push(Action::SelectionChanged(id));
        actions.push(Action::RenderNeeded);
    }

    // --- Events ---

    /// Apply one serialized host event.
    pub fn dispatch(&mut self, event: EditorEvent) -> Vec<Action> {
        match event {
            EditorEvent::Tool { tool } => self.set_tool(tool),
            EditorEvent::Down { x, y, target } => {
                let pos = Point::new(x, y);
                let target = target.map_or_else(|| hit::target_at(&self.scene, pos), PointerTarget::Entity);
                self.pointer_down(pos, target)
            }
            EditorEvent::Move { x, y } => self.pointer_move(Point::new(x, y)),
            EditorEvent::Up => self.pointer_up(),
            EditorEvent::Key { key, ctrl, meta, shift, text_focus } => {
                let modifiers = Modifiers { shift, ctrl, alt: false, meta };
                self.key_down(&Key(key), modifiers, text_focus)
            }
            EditorEvent::Select { id } => self.select(&id),
            EditorEvent::DragEnd { id, x, y } => self.drag_end(&id, Point::new(x, y)),
            EditorEvent::TransformPreview { id, scale_x } => self.transform_preview(&id, scale_x),
            EditorEvent::TransformEnd { id, x, y, scale_x, scale_y, rotation } => {
                self.transform_end(&id, &NodeTransform { x, y, scale_x, scale_y, rotation })
            }
            EditorEvent::Flip { axis } => self.flip(axis),
            EditorEvent::BeginTextEdit { id } => self.begin_text_edit(&id),
            EditorEvent::SetText { text } => self.set_text(text),
            EditorEvent::EndTextEdit => self.end_text_edit(),
            EditorEvent::WallLength { value } => self.set_wall_length_ft(&value),
            EditorEvent::WallAngle { value } => self.set_wall_angle_deg(&value),
            EditorEvent::EndWallEdit => self.end_wall_panel_edit(),
            EditorEvent::Undo => self.undo(),
            EditorEvent::Redo => self.redo(),
            EditorEvent::Copy => self.copy(),
            EditorEvent::Paste => self.paste(),
            EditorEvent::Delete => self.delete_selected(),
            EditorEvent::Clear => self.clear_canvas(),
            EditorEvent::Cancel => self.cancel_gesture(),
        }
    }

    // --- Queries ---

    /// The live scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    /// The currently selected entity, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&EntityId> {
        self.ui.selected_id.as_ref()
    }

    /// The textbox in its editing sub-state, if any.
    #[must_use]
    pub fn editing_textbox(&self) -> Option<&EntityId> {
        self.ui.editing_textbox.as_ref()
    }

    /// Live wall length in pixels while a wall is drawn or resized.
    #[must_use]
    pub fn wall_readout(&self) -> Option<f64> {
        self.ui.wall_readout
    }

    /// The open draw gesture.
    #[must_use]
    pub fn gesture(&self) -> &InputState {
        &self.input
    }

    /// What the open gesture would commit, for rendering.
    #[must_use]
    pub fn gesture_preview(&self) -> Option<GesturePreview> {
        self.input.preview()
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.read_only && self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.read_only && self.history.can_redo()
    }
}
