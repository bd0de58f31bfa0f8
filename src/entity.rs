//! Drawable entity records: rectangles, walls, shapes, symbols, and textboxes.
//!
//! These are the types stored in the scene's five collections and written to
//! `.ArchiTech` files. Field names match the file format (`fontSize`, `flipX`,
//! `type`, ...). Each record also knows how to absorb a finished drag or
//! transform reported by the rendering host, since the mapping from an
//! on-canvas node to stored fields differs per kind (walls are drawn offset by
//! half their thickness, circles are positioned by their center).

#[cfg(test)]
#[path = "entity_test.rs"]
mod entity_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{SYMBOL_SIZE, TEXTBOX_DEFAULT_FONT_SIZE, TEXTBOX_DEFAULT_HEIGHT, TEXTBOX_DEFAULT_TEXT, TEXTBOX_DEFAULT_WIDTH, WALL_THICKNESS_PX};
use crate::geom::{Bounds, Point};
use crate::units::px_to_feet_inches;

// =============================================================================
// IDS AND KINDS
// =============================================================================

/// Unique identifier of an entity. Imported ids are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Mint a fresh, unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A shape or symbol type name that is not in the palette.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} type: {value}")]
pub struct UnknownKind {
    pub what: &'static str,
    pub value: String,
}

/// Which scene collection an entity belongs to.
///
/// Declaration order is lookup precedence: when two collections claim the
/// same id, the earlier kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Wall,
    Shape,
    Symbol,
    Textbox,
    Rectangle,
}

impl EntityKind {
    /// All kinds in precedence order.
    pub const PRECEDENCE: [EntityKind; 5] = [Self::Wall, Self::Shape, Self::Symbol, Self::Textbox, Self::Rectangle];
}

/// Final placement of a rendered node after a drag or transformer gesture.
///
/// `scale_x` / `scale_y` are the transformer's scale at release; they are folded
/// into absolute sizes and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

/// Behaviour shared by every record in the scene.
pub trait Entity: Clone + fmt::Debug {
    /// The collection this record lives in.
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Stored anchor position.
    fn position(&self) -> Point;

    fn set_position(&mut self, p: Point);

    /// Absorb the node position reported at the end of a drag.
    fn drag_to(&mut self, node: Point) {
        self.set_position(node);
    }

    /// Absorb the node geometry reported at the end of a resize/rotate.
    fn transform_to(&mut self, t: &NodeTransform);
}

// =============================================================================
// RECTANGLE
// =============================================================================

/// Axis-aligned room rectangle (the `objects` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Rectangle {
    /// Width and height labels in feet/inches.
    #[must_use]
    pub fn dimension_labels(&self) -> (String, String) {
        (px_to_feet_inches(self.width), px_to_feet_inches(self.height))
    }
}

impl Entity for Rectangle {
    const KIND: EntityKind = EntityKind::Rectangle;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    fn transform_to(&mut self, t: &NodeTransform) {
        self.x = t.x;
        self.y = t.y;
        self.width *= t.scale_x.abs();
        self.height *= t.scale_y.abs();
        self.rotation = t.rotation;
    }
}

// =============================================================================
// WALL
// =============================================================================

fn default_wall_thickness() -> f64 {
    WALL_THICKNESS_PX
}

/// A wall segment anchored at its start point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: EntityId,
    /// Start point x.
    pub x: f64,
    /// Start point y (the wall's centerline, not the rendered rect's top edge).
    pub y: f64,
    pub length: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_wall_thickness")]
    pub thickness: f64,
}

impl Wall {
    /// Build the wall spanning `start` → `end` with the standard thickness.
    #[must_use]
    pub fn from_drag(id: EntityId, start: Point, end: Point) -> Self {
        Self {
            id,
            x: start.x,
            y: start.y,
            length: start.distance_to(end),
            rotation: start.angle_to_deg(end),
            thickness: WALL_THICKNESS_PX,
        }
    }

    /// Top-left corner of the rendered rect, which is centered on the centerline.
    #[must_use]
    pub fn node_origin(&self) -> Point {
        Point::new(self.x, self.y - self.thickness / 2.0)
    }

    #[must_use]
    pub fn length_label(&self) -> String {
        px_to_feet_inches(self.length)
    }
}

/// Constrain a wall's live transformer box: only the horizontal extent may
/// change, so `y` and `height` stay those of `old`.
#[must_use]
pub fn lock_wall_box(old: Bounds, new: Bounds) -> Bounds {
    Bounds { y: old.y, height: old.height, ..new }
}

impl Entity for Wall {
    const KIND: EntityKind = EntityKind::Wall;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    fn drag_to(&mut self, node: Point) {
        self.x = node.x;
        self.y = node.y + self.thickness / 2.0;
    }

    fn transform_to(&mut self, t: &NodeTransform) {
        self.drag_to(Point::new(t.x, t.y));
        self.length *= t.scale_x.abs();
        self.rotation = t.rotation;
    }
}

// =============================================================================
// SHAPE
// =============================================================================

/// Free-drawn shape type. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
    Triangle,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [Self::Rect, Self::Circle, Self::Triangle, Self::Arrow];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Arrow => "arrow",
        }
    }
}

impl FromStr for ShapeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind { what: "shape", value: s.to_string() })
    }
}

/// Per-type geometry. Arrows store a relative vector; everything else a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeGeometry {
    /// `[0, 0, dx, dy]` relative to the shape's anchor.
    Vector { points: [f64; 4] },
    Box { width: f64, height: f64 },
}

/// A free-drawn rect, circle, triangle, or arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: EntityId,
    #[serde(rename = "type")]
    kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
    #[serde(default)]
    pub rotation: f64,
}

impl Shape {
    /// Finalize a draw gesture from `anchor` (pointer-down) to `release` (pointer-up).
    ///
    /// Box shapes are normalized so the drag direction does not matter; arrows
    /// stay anchored at the pointer-down position.
    #[must_use]
    pub fn from_drag(id: EntityId, kind: ShapeKind, anchor: Point, release: Point) -> Self {
        if kind == ShapeKind::Arrow {
            return Self {
                id,
                kind,
                x: anchor.x,
                y: anchor.y,
                geometry: ShapeGeometry::Vector { points: [0.0, 0.0, release.x - anchor.x, release.y - anchor.y] },
                rotation: 0.0,
            };
        }
        let b = Bounds::from_corners(anchor, release);
        Self {
            id,
            kind,
            x: b.x,
            y: b.y,
            geometry: ShapeGeometry::Box { width: b.width, height: b.height },
            rotation: 0.0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Bounding width; for arrows the horizontal extent of the vector.
    #[must_use]
    pub fn width(&self) -> f64 {
        match self.geometry {
            ShapeGeometry::Box { width, .. } => width,
            ShapeGeometry::Vector { points } => points[2].abs(),
        }
    }

    /// Bounding height; for arrows the vertical extent of the vector.
    #[must_use]
    pub fn height(&self) -> f64 {
        match self.geometry {
            ShapeGeometry::Box { height, .. } => height,
            ShapeGeometry::Vector { points } => points[3].abs(),
        }
    }

    /// Circle center and radius, for circles rendered inside their box.
    #[must_use]
    pub fn circle(&self) -> (Point, f64) {
        let (w, h) = (self.width(), self.height());
        (Point::new(self.x + w / 2.0, self.y + h / 2.0), w.min(h) / 2.0)
    }

    /// Triangle vertices relative to `(x, y)`: apex top-center, base along the bottom.
    #[must_use]
    pub fn triangle_points(&self) -> [Point; 3] {
        let (w, h) = (self.width(), self.height());
        [Point::new(w / 2.0, 0.0), Point::new(0.0, h), Point::new(w, h)]
    }
}

impl Entity for Shape {
    const KIND: EntityKind = EntityKind::Shape;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    fn drag_to(&mut self, node: Point) {
        if self.kind == ShapeKind::Circle {
            // Circle nodes sit at the center of the stored box.
            self.x = node.x - self.width() / 2.0;
            self.y = node.y - self.height() / 2.0;
        } else {
            self.set_position(node);
        }
    }

    fn transform_to(&mut self, t: &NodeTransform) {
        match &mut self.geometry {
            ShapeGeometry::Box { width, height } => {
                *width *= t.scale_x.abs();
                *height *= t.scale_y.abs();
            }
            ShapeGeometry::Vector { points } => {
                points[2] *= t.scale_x;
                points[3] *= t.scale_y;
            }
        }
        self.drag_to(Point::new(t.x, t.y));
        self.rotation = t.rotation;
    }
}

// =============================================================================
// SYMBOL
// =============================================================================

/// Floor-plan icon type. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Door,
    DoubleDoor,
    SlidingDoor,
    Window,
    Stairs,
    Bed,
    Sofa,
    Dining,
    Stove,
    Sink,
    Wc,
    Bathtub,
    Ac,
    Tv,
    Shaft,
    Compass,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 16] = [
        Self::Door,
        Self::DoubleDoor,
        Self::SlidingDoor,
        Self::Window,
        Self::Stairs,
        Self::Bed,
        Self::Sofa,
        Self::Dining,
        Self::Stove,
        Self::Sink,
        Self::Wc,
        Self::Bathtub,
        Self::Ac,
        Self::Tv,
        Self::Shaft,
        Self::Compass,
    ];

    /// Wire / tool name, e.g. `doubleDoor`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Door => "door",
            Self::DoubleDoor => "doubleDoor",
            Self::SlidingDoor => "slidingDoor",
            Self::Window => "window",
            Self::Stairs => "stairs",
            Self::Bed => "bed",
            Self::Sofa => "sofa",
            Self::Dining => "dining",
            Self::Stove => "stove",
            Self::Sink => "sink",
            Self::Wc => "wc",
            Self::Bathtub => "bathtub",
            Self::Ac => "ac",
            Self::Tv => "tv",
            Self::Shaft => "shaft",
            Self::Compass => "compass",
        }
    }

    /// Human-readable palette name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Door => "Door",
            Self::DoubleDoor => "Double Door",
            Self::SlidingDoor => "Sliding Door",
            Self::Window => "Window",
            Self::Stairs => "Stairs",
            Self::Bed => "Bed",
            Self::Sofa => "Sofa",
            Self::Dining => "Dining Table",
            Self::Stove => "Stove",
            Self::Sink => "Sink",
            Self::Wc => "WC",
            Self::Bathtub => "Bathtub",
            Self::Ac => "AC Unit",
            Self::Tv => "TV",
            Self::Shaft => "Shaft",
            Self::Compass => "Compass",
        }
    }
}

impl FromStr for SymbolKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind { what: "symbol", value: s.to_string() })
    }
}

/// Which flip flag to toggle on a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// A placed icon (door, window, furniture, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub id: EntityId,
    #[serde(rename = "type")]
    kind: SymbolKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
}

impl Symbol {
    /// A default-sized symbol centered on `at`.
    #[must_use]
    pub fn centered(id: EntityId, kind: SymbolKind, at: Point) -> Self {
        Self {
            id,
            kind,
            x: at.x - SYMBOL_SIZE / 2.0,
            y: at.y - SYMBOL_SIZE / 2.0,
            width: SYMBOL_SIZE,
            height: SYMBOL_SIZE,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Toggle one flip flag. Position and size are untouched.
    pub fn flip(&mut self, axis: FlipAxis) {
        match axis {
            FlipAxis::Horizontal => self.flip_x = !self.flip_x,
            FlipAxis::Vertical => self.flip_y = !self.flip_y,
        }
    }
}

impl Entity for Symbol {
    const KIND: EntityKind = EntityKind::Symbol;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    fn transform_to(&mut self, t: &NodeTransform) {
        self.x = t.x;
        self.y = t.y;
        self.width *= t.scale_x.abs();
        self.height *= t.scale_y.abs();
        self.rotation = t.rotation;
    }
}

// =============================================================================
// TEXTBOX
// =============================================================================

/// A free text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Textbox {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// Display only; text wraps to `width` and the host sizes the height.
    pub height: f64,
    pub text: String,
    pub font_size: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Textbox {
    /// A default-sized placeholder textbox with its top-left corner at `at`.
    #[must_use]
    pub fn placed(id: EntityId, at: Point) -> Self {
        Self {
            id,
            x: at.x,
            y: at.y,
            width: TEXTBOX_DEFAULT_WIDTH,
            height: TEXTBOX_DEFAULT_HEIGHT,
            text: TEXTBOX_DEFAULT_TEXT.to_string(),
            font_size: TEXTBOX_DEFAULT_FONT_SIZE,
            rotation: 0.0,
        }
    }
}

impl Entity for Textbox {
    const KIND: EntityKind = EntityKind::Textbox;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    fn transform_to(&mut self, t: &NodeTransform) {
        self.x = t.x;
        self.y = t.y;
        self.width *= t.scale_x.abs();
        self.rotation = t.rotation;
    }
}
