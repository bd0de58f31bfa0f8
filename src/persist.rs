//! Project storage and debounced autosave.
//!
//! DESIGN
//! ======
//! The editor talks to storage only through the object-safe `ProjectStore`
//! trait. `MemoryStore` backs tests and embedding; `FileStore` keeps one JSON
//! document per project (and per share) under a directory. Shares are frozen
//! copies of a project's scene taken when sharing is enabled.
//!
//! Autosave runs as a spawned task fed by an unbounded channel. Each scheduled
//! scene replaces the pending one and restarts the quiet-period timer, so a
//! burst of edits produces a single write of the newest scene.
//!
//! ERROR HANDLING
//! ==============
//! Store calls return `StoreError`. The autosave task logs failures and keeps
//! running; a failed write is superseded by the next scheduled scene.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::consts::DEFAULT_PROJECT_NAME;
use crate::io::SceneDocument;
use crate::scene::Scene;

// =============================================================================
// IDS AND RECORDS
// =============================================================================

/// Identifier of an owned project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

/// Identifier of a read-only share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored project: its name, scene, and timestamps (epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub name: String,
    #[serde(flatten)]
    pub scene: SceneDocument,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl ProjectRecord {
    /// An empty project created now.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), scene: SceneDocument::default(), created_at: now_ms(), updated_at: None }
    }
}

/// A stored share: only the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedRecord {
    #[serde(flatten)]
    pub scene: SceneDocument,
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    let ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).unwrap_or(i64::MAX)
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("invalid record id: {0:?}")]
    InvalidId(String),
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value project storage addressed by project id or share id.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// Fetch an owned project, or `None` if there is no such project.
    async fn load_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, StoreError>;

    /// Fetch a share, or `None` if there is no such share.
    async fn load_shared(&self, id: &ShareId) -> Result<Option<SharedRecord>, StoreError>;

    /// Overwrite a project's scene and stamp `updatedAt`. Creates the project
    /// under the default name if it does not exist.
    async fn save_project(&self, id: &ProjectId, scene: SceneDocument) -> Result<(), StoreError>;

    /// Create an empty project and return its id.
    async fn create_project(&self, name: &str) -> Result<ProjectId, StoreError>;

    /// Freeze a copy of the project's scene under a new share id.
    async fn enable_sharing(&self, id: &ProjectId) -> Result<ShareId, StoreError>;
}

fn apply_save(existing: Option<ProjectRecord>, scene: SceneDocument) -> ProjectRecord {
    let mut record = existing.unwrap_or_else(|| ProjectRecord::new(DEFAULT_PROJECT_NAME));
    record.scene = scene;
    record.updated_at = Some(now_ms());
    record
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store. Counts writes so callers can observe autosave behaviour.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<ProjectId, ProjectRecord>>,
    shared: RwLock<HashMap<ShareId, SharedRecord>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project record.
    pub async fn insert_project(&self, id: ProjectId, record: ProjectRecord) {
        self.projects.write().await.insert(id, record);
    }

    /// Seed a share record.
    pub async fn insert_shared(&self, id: ShareId, record: SharedRecord) {
        self.shared.write().await.insert(id, record);
    }

    /// Number of completed `save_project` calls.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProjectStore for MemoryStore {
    async fn load_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, StoreError> {
        Ok(self.projects.read().await.get(id).cloned())
    }

    async fn load_shared(&self, id: &ShareId) -> Result<Option<SharedRecord>, StoreError> {
        Ok(self.shared.read().await.get(id).cloned())
    }

    async fn save_project(&self, id: &ProjectId, scene: SceneDocument) -> Result<(), StoreError> {
        let mut projects = self.projects.write().await;
        let record = apply_save(projects.remove(id), scene);
        projects.insert(id.clone(), record);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_project(&self, name: &str) -> Result<ProjectId, StoreError> {
        let id = ProjectId(Uuid::new_v4().to_string());
        self.projects.write().await.insert(id.clone(), ProjectRecord::new(name));
        Ok(id)
    }

    async fn enable_sharing(&self, id: &ProjectId) -> Result<ShareId, StoreError> {
        let scene = match self.projects.read().await.get(id) {
            Some(record) => record.scene.clone(),
            None => return Err(StoreError::NotFound(id.0.clone())),
        };
        let share_id = ShareId(Uuid::new_v4().to_string());
        self.shared.write().await.insert(share_id.clone(), SharedRecord { scene });
        Ok(share_id)
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// One pretty-printed JSON file per record:
/// `<root>/projects/<id>.json` and `<root>/shared/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_path(&self, id: &ProjectId) -> Result<PathBuf, StoreError> {
        record_path(&self.root.join("projects"), &id.0)
    }

    fn shared_path(&self, id: &ShareId) -> Result<PathBuf, StoreError> {
        record_path(&self.root.join("shared"), &id.0)
    }
}

fn record_path(dir: &Path, id: &str) -> Result<PathBuf, StoreError> {
    let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(dir.join(format!("{id}.json")))
}

async fn read_record<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write via a sibling temp file and rename, so readers never see a torn file.
async fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let raw = serde_json::to_string_pretty(record)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, raw).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait::async_trait]
impl ProjectStore for FileStore {
    async fn load_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, StoreError> {
        read_record(&self.project_path(id)?).await
    }

    async fn load_shared(&self, id: &ShareId) -> Result<Option<SharedRecord>, StoreError> {
        read_record(&self.shared_path(id)?).await
    }

    async fn save_project(&self, id: &ProjectId, scene: SceneDocument) -> Result<(), StoreError> {
        let path = self.project_path(id)?;
        let existing = read_record(&path).await?;
        write_record(&path, &apply_save(existing, scene)).await
    }

    async fn create_project(&self, name: &str) -> Result<ProjectId, StoreError> {
        let id = ProjectId(Uuid::new_v4().to_string());
        write_record(&self.project_path(&id)?, &ProjectRecord::new(name)).await?;
        info!(project_id = %id, name, "project created");
        Ok(id)
    }

    async fn enable_sharing(&self, id: &ProjectId) -> Result<ShareId, StoreError> {
        let Some(record) = read_record::<ProjectRecord>(&self.project_path(id)?).await? else {
            return Err(StoreError::NotFound(id.0.clone()));
        };
        let share_id = ShareId(Uuid::new_v4().to_string());
        write_record(&self.shared_path(&share_id)?, &SharedRecord { scene: record.scene }).await?;
        info!(project_id = %id, share_id = %share_id, "sharing enabled");
        Ok(share_id)
    }
}

// =============================================================================
// AUTOSAVE
// =============================================================================

/// Handle to a running autosave task for one project.
#[derive(Debug)]
pub struct Autosaver {
    tx: mpsc::UnboundedSender<Scene>,
    handle: JoinHandle<()>,
}

impl Autosaver {
    /// Spawn the autosave task. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(store: Arc<dyn ProjectStore>, project_id: ProjectId, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        info!(project_id = %project_id, ?debounce, "autosave configured");
        let handle = tokio::spawn(run_autosave(rx, store, project_id, debounce));
        Self { tx, handle }
    }

    /// Queue `scene` as the newest state to save.
    pub fn schedule(&self, scene: Scene) {
        if self.tx.send(scene).is_err() {
            warn!("autosave task stopped; dropping scene");
        }
    }

    /// Flush any pending scene and wait for the task to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            error!(error = %e, "autosave task failed");
        }
    }
}

async fn run_autosave(
    mut rx: mpsc::UnboundedReceiver<Scene>,
    store: Arc<dyn ProjectStore>,
    project_id: ProjectId,
    debounce: Duration,
) {
    let mut pending: Option<Scene> = None;
    loop {
        let Some(scene) = pending.take() else {
            match rx.recv().await {
                Some(scene) => pending = Some(scene),
                None => break,
            }
            continue;
        };
        tokio::select! {
            next = rx.recv() => {
                if let Some(next) = next {
                    pending = Some(next);
                } else {
                    save(store.as_ref(), &project_id, &scene).await;
                    break;
                }
            }
            () = tokio::time::sleep(debounce) => {
                save(store.as_ref(), &project_id, &scene).await;
            }
        }
    }
}

async fn save(store: &dyn ProjectStore, project_id: &ProjectId, scene: &Scene) {
    match store.save_project(project_id, SceneDocument::from(scene)).await {
        Ok(()) => info!(project_id = %project_id, entities = scene.len(), "autosaved"),
        Err(e) => error!(error = %e, project_id = %project_id, "autosave failed"),
    }
}
