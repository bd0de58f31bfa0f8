//! Input model: tools, modifier keys, the gesture state machine, and host events.
//!
//! `Tool` is the interaction mode the user picked from the palette.
//! `InputState` is the draw gesture being tracked between pointer-down and
//! pointer-up; it carries everything needed to preview the entity while the
//! pointer moves and to build the final record on release. `EditorEvent` is the
//! serializable form of every input a host can feed the engine.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, FlipAxis, Shape, ShapeKind, SymbolKind, UnknownKind, Wall};
use crate::geom::Point;

/// Which tool is currently active.
///
/// Prints and parses as `select`, `wall`, `shape:<type>`, `symbol:<type>`,
/// or `textbox`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Drag out a wall from its start point.
    Wall,
    /// Drag out a free shape.
    Shape(ShapeKind),
    /// Click to place a symbol.
    Symbol(SymbolKind),
    /// Click to place a textbox.
    Textbox,
}

impl Tool {
    /// Any tool other than `Select`. Existing entities are inert while drawing.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        self != Self::Select
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => f.write_str("select"),
            Self::Wall => f.write_str("wall"),
            Self::Shape(kind) => write!(f, "shape:{}", kind.as_str()),
            Self::Symbol(kind) => write!(f, "symbol:{}", kind.as_str()),
            Self::Textbox => f.write_str("textbox"),
        }
    }
}

/// A tool string that names no tool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseToolError {
    #[error("unknown tool: {0}")]
    Unknown(String),
    #[error(transparent)]
    Kind(#[from] UnknownKind),
}

impl FromStr for Tool {
    type Err = ParseToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None => match s {
                "select" => Ok(Self::Select),
                "wall" => Ok(Self::Wall),
                "textbox" => Ok(Self::Textbox),
                _ => Err(ParseToolError::Unknown(s.to_string())),
            },
            Some(("shape", kind)) => Ok(Self::Shape(kind.parse()?)),
            Some(("symbol", kind)) => Ok(Self::Symbol(kind.parse()?)),
            Some(_) => Err(ParseToolError::Unknown(s.to_string())),
        }
    }
}

impl TryFrom<String> for Tool {
    type Error = ParseToolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tool> for String {
    fn from(tool: Tool) -> Self {
        tool.to_string()
    }
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas.
    Background,
    /// A committed entity.
    Entity(EntityId),
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The id of the currently selected entity, if any.
    pub selected_id: Option<EntityId>,
    /// The textbox whose text is being edited, if any.
    pub editing_textbox: Option<EntityId>,
    /// Live wall length in pixels while a wall is drawn or resized.
    pub wall_readout: Option<f64>,
}

/// The entity an open gesture would commit, for the host to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum GesturePreview {
    Shape(Shape),
    Wall(Wall),
}

/// Internal state for the draw gesture state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is dragging out a new shape.
    DrawingShape {
        /// Id the shape will be committed under.
        id: EntityId,
        /// Shape type, fixed when the gesture opened.
        kind: ShapeKind,
        /// Pointer-down position.
        anchor: Point,
        /// Latest pointer position; the far corner (or arrow tip).
        current: Point,
    },
    /// The user is dragging out a new wall.
    DrawingWall {
        /// Id the wall will be committed under.
        id: EntityId,
        /// Start point of the wall.
        anchor: Point,
        /// Latest pointer position; the far endpoint.
        current: Point,
        /// Thickness captured when the gesture opened.
        thickness: f64,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The record this gesture would produce if released now.
    #[must_use]
    pub fn preview(&self) -> Option<GesturePreview> {
        match self {
            Self::Idle => None,
            Self::DrawingShape { id, kind, anchor, current } => {
                Some(GesturePreview::Shape(Shape::from_drag(id.clone(), *kind, *anchor, *current)))
            }
            Self::DrawingWall { id, anchor, current, thickness } => {
                let mut wall = Wall::from_drag(id.clone(), *anchor, *current);
                wall.thickness = *thickness;
                Some(GesturePreview::Wall(wall))
            }
        }
    }

    /// Move the gesture's far corner / endpoint. No-op when idle.
    pub fn track(&mut self, pos: Point) {
        match self {
            Self::Idle => {}
            Self::DrawingShape { current, .. } | Self::DrawingWall { current, .. } => *current = pos,
        }
    }
}

/// Every input a host can feed the engine, in serializable form.
///
/// Encoded as JSON objects tagged by `"event"`, e.g.
/// `{"event":"down","x":10,"y":20}` or `{"event":"tool","tool":"shape:rect"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Pick a tool from the palette.
    Tool { tool: Tool },
    /// Pointer down. Without an explicit `target` the engine hit-tests.
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<EntityId>,
    },
    /// Pointer move.
    Move { x: f64, y: f64 },
    /// Pointer up.
    Up,
    /// Key press.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
        #[serde(default)]
        shift: bool,
        /// Focus is inside a text input; shortcuts are suppressed.
        #[serde(default)]
        text_focus: bool,
    },
    /// Select an entity by id.
    Select { id: EntityId },
    /// A node drag finished at `(x, y)`.
    DragEnd { id: EntityId, x: f64, y: f64 },
    /// A wall resize is in progress at horizontal scale `scale_x`.
    TransformPreview { id: EntityId, scale_x: f64 },
    /// A resize/rotate finished.
    TransformEnd {
        id: EntityId,
        x: f64,
        y: f64,
        scale_x: f64,
        scale_y: f64,
        rotation: f64,
    },
    /// Flip the selected symbol.
    Flip { axis: FlipAxis },
    /// Enter textbox editing.
    BeginTextEdit { id: EntityId },
    /// Replace the edited textbox's text.
    SetText { text: String },
    /// Leave textbox editing.
    EndTextEdit,
    /// Raw text typed into the wall panel's length field (feet).
    WallLength { value: String },
    /// Raw text typed into the wall panel's angle field (degrees).
    WallAngle { value: String },
    /// The wall panel lost focus.
    EndWallEdit,
    Undo,
    Redo,
    Copy,
    Paste,
    Delete,
    /// Empty the whole canvas.
    Clear,
    /// Abandon the open gesture.
    Cancel,
}
