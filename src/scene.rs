//! Scene model: the five entity collections plus a unified id registry.
//!
//! A `Scene` is the unit of undo/redo, import/export, and persistence. Each
//! collection sits behind an `Arc` and is mutated copy-on-write, so cloning a
//! scene for a history snapshot costs five reference-count bumps and an edit
//! copies only the collection it touches. A snapshot can never observe a later
//! edit of the live scene.
//!
//! The registry maps every id to the collection holding it, giving O(1) kind
//! lookup for select/delete/copy and guaranteeing that no id lives in two
//! collections at once.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::entity::{Entity, EntityId, EntityKind, Rectangle, Shape, Symbol, Textbox, Wall};

/// A record that can be stored in one of the scene's collections.
pub trait SceneEntity: Entity {
    #[doc(hidden)]
    fn items(scene: &Scene) -> &Arc<Vec<Self>>;

    #[doc(hidden)]
    fn items_mut(scene: &mut Scene) -> &mut Arc<Vec<Self>>;
}

macro_rules! scene_entity {
    ($ty:ty, $field:ident) => {
        impl SceneEntity for $ty {
            fn items(scene: &Scene) -> &Arc<Vec<Self>> {
                &scene.$field
            }

            fn items_mut(scene: &mut Scene) -> &mut Arc<Vec<Self>> {
                &mut scene.$field
            }
        }
    };
}

scene_entity!(Rectangle, objects);
scene_entity!(Wall, walls);
scene_entity!(Shape, shapes);
scene_entity!(Symbol, symbols);
scene_entity!(Textbox, textboxes);

/// Borrowed view of any entity, tagged by collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Wall(&'a Wall),
    Shape(&'a Shape),
    Symbol(&'a Symbol),
    Textbox(&'a Textbox),
    Rectangle(&'a Rectangle),
}

/// The full floor plan at one point in time.
///
/// Serializes as the five collections in file order; the registry is derived.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    objects: Arc<Vec<Rectangle>>,
    walls: Arc<Vec<Wall>>,
    shapes: Arc<Vec<Shape>>,
    symbols: Arc<Vec<Symbol>>,
    textboxes: Arc<Vec<Textbox>>,
    #[serde(skip)]
    registry: Arc<HashMap<EntityId, EntityKind>>,
}

impl PartialEq for Scene {
    /// Scenes are equal when their collections are; the registry is derived.
    fn eq(&self, other: &Self) -> bool {
        self.objects == other.objects
            && self.walls == other.walls
            && self.shapes == other.shapes
            && self.symbols == other.symbols
            && self.textboxes == other.textboxes
    }
}

impl Scene {
    /// An empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from raw collections, e.g. an imported file.
    ///
    /// Ids are registered in precedence order (walls first, rectangles last).
    /// A record whose id is already taken is dropped and logged.
    #[must_use]
    pub fn from_parts(
        objects: Vec<Rectangle>,
        walls: Vec<Wall>,
        shapes: Vec<Shape>,
        symbols: Vec<Symbol>,
        textboxes: Vec<Textbox>,
    ) -> Self {
        let mut scene = Self::new();
        scene.extend(walls);
        scene.extend(shapes);
        scene.extend(symbols);
        scene.extend(textboxes);
        scene.extend(objects);
        scene
    }

    fn extend<E: SceneEntity>(&mut self, items: Vec<E>) {
        for item in items {
            let id = item.id().clone();
            if !self.insert(item) {
                warn!(%id, kind = ?E::KIND, "dropping entity with duplicate id");
            }
        }
    }

    // --- Collections ---

    #[must_use]
    pub fn objects(&self) -> &[Rectangle] {
        &self.objects
    }

    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[must_use]
    pub fn textboxes(&self) -> &[Textbox] {
        &self.textboxes
    }

    /// All records of one kind, in insertion (z) order.
    #[must_use]
    pub fn all<E: SceneEntity>(&self) -> &[E] {
        E::items(self)
    }

    // --- Registry ---

    /// Which collection holds `id`, if any.
    #[must_use]
    pub fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        self.registry.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.registry.contains_key(id)
    }

    /// Total number of entities across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // --- Lookup ---

    /// Typed lookup within one collection.
    #[must_use]
    pub fn get<E: SceneEntity>(&self, id: &EntityId) -> Option<&E> {
        if self.kind_of(id)? != E::KIND {
            return None;
        }
        E::items(self).iter().find(|e| e.id() == id)
    }

    /// Lookup across all collections.
    #[must_use]
    pub fn get_any(&self, id: &EntityId) -> Option<EntityRef<'_>> {
        Some(match self.kind_of(id)? {
            EntityKind::Wall => EntityRef::Wall(self.get(id)?),
            EntityKind::Shape => EntityRef::Shape(self.get(id)?),
            EntityKind::Symbol => EntityRef::Symbol(self.get(id)?),
            EntityKind::Textbox => EntityRef::Textbox(self.get(id)?),
            EntityKind::Rectangle => EntityRef::Rectangle(self.get(id)?),
        })
    }

    // --- Mutation ---

    /// Append a record to its collection. Returns false (and changes nothing)
    /// when the id is already in use.
    pub fn insert<E: SceneEntity>(&mut self, entity: E) -> bool {
        if self.contains(entity.id()) {
            return false;
        }
        Arc::make_mut(&mut self.registry).insert(entity.id().clone(), E::KIND);
        Arc::make_mut(E::items_mut(self)).push(entity);
        true
    }

    /// Edit one record in place. Returns false when `id` is not an `E`. An id
    /// changed by `f` is put back.
    pub fn update<E: SceneEntity>(&mut self, id: &EntityId, f: impl FnOnce(&mut E)) -> bool {
        if self.kind_of(id) != Some(E::KIND) {
            return false;
        }
        let items = Arc::make_mut(E::items_mut(self));
        let Some(entity) = items.iter_mut().find(|e| e.id() == id) else {
            return false;
        };
        f(entity);
        // Ids are fixed once registered.
        if entity.id() != id {
            entity.set_id(id.clone());
        }
        true
    }

    /// Remove a record from whichever collection holds it.
    pub fn remove(&mut self, id: &EntityId) -> Option<EntityKind> {
        let kind = self.kind_of(id)?;
        match kind {
            EntityKind::Wall => self.remove_from::<Wall>(id),
            EntityKind::Shape => self.remove_from::<Shape>(id),
            EntityKind::Symbol => self.remove_from::<Symbol>(id),
            EntityKind::Textbox => self.remove_from::<Textbox>(id),
            EntityKind::Rectangle => self.remove_from::<Rectangle>(id),
        }
        Arc::make_mut(&mut self.registry).remove(id);
        Some(kind)
    }

    fn remove_from<E: SceneEntity>(&mut self, id: &EntityId) {
        Arc::make_mut(E::items_mut(self)).retain(|e| e.id() != id);
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Whether one collection's storage is shared with `other` (no copy has
    /// been made since one was cloned from the other).
    #[must_use]
    pub fn shares_collection_with(&self, other: &Scene, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Wall => Arc::ptr_eq(&self.walls, &other.walls),
            EntityKind::Shape => Arc::ptr_eq(&self.shapes, &other.shapes),
            EntityKind::Symbol => Arc::ptr_eq(&self.symbols, &other.symbols),
            EntityKind::Textbox => Arc::ptr_eq(&self.textboxes, &other.textboxes),
            EntityKind::Rectangle => Arc::ptr_eq(&self.objects, &other.objects),
        }
    }
}
