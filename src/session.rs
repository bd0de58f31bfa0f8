//! Editor sessions: an engine bound to a project in a store.
//!
//! DESIGN
//! ======
//! A session is addressed by a `SessionKey`. Owned projects load from the
//! store, edit freely, and autosave; shares load read-only and never write;
//! blank sessions start empty, ready at once, and are never persisted.
//!
//! Loads are asynchronous and may race a retarget. Every load is tagged with
//! a `LoadTicket` carrying the session generation at the time it started.
//! Retargeting or closing bumps the generation, and `finish_load` drops any
//! result whose ticket is older than the current generation.
//!
//! ERROR HANDLING
//! ==============
//! A failed or empty load leaves the session `Unavailable` and is logged; the
//! host shows a placeholder. While a session is not `Ready`, input is ignored.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::engine::{Action, EngineCore};
use crate::input::EditorEvent;
use crate::persist::{Autosaver, ProjectId, ProjectStore, ShareId, StoreError};
use crate::scene::Scene;

/// Signed-in user. Only its presence matters to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// What a session is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKey {
    /// A project owned by `user`. No user means no data.
    Owned { project_id: ProjectId, user: Option<UserId> },
    /// A read-only share.
    Shared { share_id: ShareId },
    /// An unsaved scratch canvas.
    Blank,
}

impl SessionKey {
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Shared { .. })
    }

    /// The project autosave writes to, if this session persists at all.
    #[must_use]
    pub fn autosave_target(&self) -> Option<&ProjectId> {
        match self {
            Self::Owned { project_id, user: Some(_) } => Some(project_id),
            _ => None,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owned { project_id, .. } => write!(f, "project:{project_id}"),
            Self::Shared { share_id } => write!(f, "share:{share_id}"),
            Self::Blank => f.write_str("blank"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Nothing to show: missing record, no user, or a failed load.
    Unavailable,
}

/// Tag for an in-flight load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Fetch the scene a key points at. `Ok(None)` means there is nothing to load.
pub async fn load_scene(store: &dyn ProjectStore, key: &SessionKey) -> Result<Option<Scene>, StoreError> {
    match key {
        SessionKey::Owned { user: None, .. } => Ok(None),
        SessionKey::Owned { project_id, user: Some(_) } => {
            Ok(store.load_project(project_id).await?.map(|record| record.scene.into_scene()))
        }
        SessionKey::Shared { share_id } => {
            Ok(store.load_shared(share_id).await?.map(|record| record.scene.into_scene()))
        }
        SessionKey::Blank => Ok(Some(Scene::new())),
    }
}

/// One open editor: the engine, its load state, and its autosave task.
pub struct EditorSession {
    store: Arc<dyn ProjectStore>,
    key: SessionKey,
    config: EditorConfig,
    engine: EngineCore,
    state: LoadState,
    generation: u64,
    autosaver: Option<Autosaver>,
}

impl EditorSession {
    /// A session that has not loaded yet. Blank sessions are ready at once.
    #[must_use]
    pub fn new(store: Arc<dyn ProjectStore>, key: SessionKey, config: &EditorConfig) -> Self {
        let mut engine = EngineCore::with_config(config);
        engine.set_read_only(key.is_read_only());
        let state = if key == SessionKey::Blank { LoadState::Ready } else { LoadState::Loading };
        Self { store, key, config: *config, engine, state, generation: 0, autosaver: None }
    }

    /// Create a session and load it to completion.
    pub async fn open(store: Arc<dyn ProjectStore>, key: SessionKey, config: &EditorConfig) -> Self {
        info!(key = %key, "opening session");
        let mut session = Self::new(store, key, config);
        if session.key != SessionKey::Blank {
            session.reload().await;
        }
        session
    }

    /// Start a load and return its ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        if self.key != SessionKey::Blank {
            self.state = LoadState::Loading;
        }
        LoadTicket { generation: self.generation }
    }

    /// A detached future fetching this session's scene, for hosts that load
    /// on another task and report back through `finish_load`.
    #[must_use]
    pub fn fetch(&self) -> impl Future<Output = Result<Option<Scene>, StoreError>> + Send + 'static {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        async move { load_scene(store.as_ref(), &key).await }
    }

    /// Apply a load result. Results from superseded tickets are discarded.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Option<Scene>, StoreError>) -> Vec<Action> {
        if ticket.generation != self.generation {
            debug!(ticket = ticket.generation, current = self.generation, "discarding stale load");
            return Vec::new();
        }
        match result {
            Ok(Some(scene)) => {
                let actions = self.engine.hydrate(scene);
                self.state = LoadState::Ready;
                if self.autosaver.is_none() {
                    if let Some(project_id) = self.key.autosave_target() {
                        self.autosaver = Some(Autosaver::spawn(
                            Arc::clone(&self.store),
                            project_id.clone(),
                            self.config.autosave_debounce,
                        ));
                    }
                }
                info!(key = %self.key, entities = self.engine.scene().len(), "session ready");
                actions
            }
            Ok(None) => {
                info!(key = %self.key, "nothing to load");
                self.state = LoadState::Unavailable;
                Vec::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "load failed");
                self.state = LoadState::Unavailable;
                Vec::new()
            }
        }
    }

    /// Load the current key inline.
    pub async fn reload(&mut self) -> Vec<Action> {
        let ticket = self.begin_load();
        let result = self.fetch().await;
        self.finish_load(ticket, result)
    }

    /// Point the session at another key. Pending autosave data for the old
    /// project is flushed first. The returned ticket is the only one whose
    /// result will be accepted.
    pub async fn retarget(&mut self, key: SessionKey) -> LoadTicket {
        info!(from = %self.key, to = %key, "retargeting session");
        self.stop_autosave().await;
        self.engine = EngineCore::with_config(&self.config);
        self.engine.set_read_only(key.is_read_only());
        self.key = key;
        let ticket = self.begin_load();
        if self.key == SessionKey::Blank {
            self.state = LoadState::Ready;
        }
        ticket
    }

    /// Flush pending saves and end the session.
    pub async fn close(mut self) {
        self.generation += 1;
        self.stop_autosave().await;
        info!(key = %self.key, "session closed");
    }

    async fn stop_autosave(&mut self) {
        if let Some(saver) = self.autosaver.take() {
            saver.shutdown().await;
        }
    }

    // --- Input ---

    /// Apply one host event.
    pub fn dispatch(&mut self, event: EditorEvent) -> Vec<Action> {
        self.apply(|engine| engine.dispatch(event))
    }

    /// Run any engine operation, scheduling a save when the scene changed.
    /// Ignored unless the session is ready.
    pub fn apply(&mut self, op: impl FnOnce(&mut EngineCore) -> Vec<Action>) -> Vec<Action> {
        if self.state != LoadState::Ready {
            debug!(state = ?self.state, "ignoring input");
            return Vec::new();
        }
        let actions = op(&mut self.engine);
        if actions.contains(&Action::SceneChanged) {
            if let Some(saver) = &self.autosaver {
                saver.schedule(self.engine.scene().clone());
            }
        }
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    #[must_use]
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.engine.is_read_only()
    }

    /// Whether edits are being persisted.
    #[must_use]
    pub fn is_autosaving(&self) -> bool {
        self.autosaver.is_some()
    }
}
