//! `.ArchiTech` file import and export.
//!
//! A project file is a JSON object with the five scene collections. Export is
//! pretty-printed; import tolerates missing collections.

#[cfg(test)]
#[path = "io_test.rs"]
mod io_test;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::{Rectangle, Shape, Symbol, Textbox, Wall};
use crate::scene::Scene;

/// Extension used for project files.
pub const FILE_EXTENSION: &str = "ArchiTech";

/// Suggested file name for an export.
pub const EXPORT_FILE_NAME: &str = "my-project.ArchiTech";

/// A project file could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed project file: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk shape of a scene. Every collection may be absent or `null` on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub objects: Vec<Rectangle>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub walls: Vec<Wall>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub shapes: Vec<Shape>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symbols: Vec<Symbol>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub textboxes: Vec<Textbox>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SceneDocument {
    /// Build the scene, registering ids and dropping collisions.
    #[must_use]
    pub fn into_scene(self) -> Scene {
        Scene::from_parts(self.objects, self.walls, self.shapes, self.symbols, self.textboxes)
    }
}

impl From<&Scene> for SceneDocument {
    fn from(scene: &Scene) -> Self {
        Self {
            objects: scene.objects().to_vec(),
            walls: scene.walls().to_vec(),
            shapes: scene.shapes().to_vec(),
            symbols: scene.symbols().to_vec(),
            textboxes: scene.textboxes().to_vec(),
        }
    }
}

/// Whether `path` carries the project file extension. Anything else is read
/// as generic JSON.
#[must_use]
pub fn is_project_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case(FILE_EXTENSION))
}

/// Where an export aimed at `out` lands: inside it under the suggested file
/// name when `out` is a directory, else `out` itself.
#[must_use]
pub fn export_path(out: &Path) -> PathBuf {
    if out.is_dir() { out.join(EXPORT_FILE_NAME) } else { out.to_path_buf() }
}

/// Serialize a scene as a pretty-printed project file (two-space indent).
pub fn export_json(scene: &Scene) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(scene)
}

/// Parse a project file (or any JSON object with the same keys).
pub fn import_json(raw: &str) -> Result<Scene, ImportError> {
    let doc: SceneDocument = serde_json::from_str(raw)?;
    Ok(doc.into_scene())
}
