//! Floor-plan editing engine.
//!
//! This crate owns everything an ArchiTech editor does between raw input and
//! stored data: the scene of walls, shapes, symbols, textboxes and rectangles,
//! the drawing-tool state machine, selection and transforms, bounded
//! undo/redo, `.ArchiTech` file import/export, and debounced persistence to a
//! project store. Hosts (a canvas UI, the `architech` CLI) feed it events and
//! act on the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: tool, gesture, pointer and keyboard routing |
//! | [`selection`] | Selection, transforms, clipboard, text and wall-panel editing |
//! | [`scene`] | Copy-on-write entity collections with an id registry |
//! | [`entity`] | Entity record types and their geometry |
//! | [`history`] | Bounded undo/redo of scene snapshots |
//! | [`input`] | Tools, modifiers, gesture state, and serialized editor events |
//! | [`keymap`] | Keyboard shortcut resolution |
//! | [`hit`] | Hit-testing against scene entities |
//! | [`geom`] | Points and rotated-box geometry |
//! | [`units`] | Pixel / feet-and-inches conversion |
//! | [`io`] | `.ArchiTech` file import and export |
//! | [`persist`] | Project stores and the autosave task |
//! | [`session`] | Editor sessions bound to a store, with guarded loading |
//! | [`config`] | Environment-driven editor configuration |
//! | [`consts`] | Shared numeric constants (scale, sizes, limits) |

pub mod config;
pub mod consts;
pub mod engine;
pub mod entity;
pub mod geom;
pub mod hit;
pub mod history;
pub mod input;
pub mod io;
pub mod keymap;
pub mod persist;
pub mod scene;
pub mod selection;
pub mod session;
pub mod units;
