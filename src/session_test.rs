use std::time::Duration;

use super::*;
use crate::entity::{EntityId, Wall};
use crate::geom::Point;
use crate::input::Tool;
use crate::io::SceneDocument;
use crate::persist::{FileStore, MemoryStore, ProjectRecord, SharedRecord};

// =============================================================
// Helpers
// =============================================================

fn config() -> EditorConfig {
    EditorConfig { history_capacity: 50, autosave_debounce: Duration::from_millis(1000) }
}

fn one_wall() -> Scene {
    let mut scene = Scene::new();
    scene.insert(Wall::from_drag(EntityId::from("w1"), Point::new(0.0, 0.0), Point::new(140.0, 0.0)));
    scene
}

fn owned(id: &str) -> SessionKey {
    SessionKey::Owned { project_id: ProjectId(id.into()), user: Some(UserId("u1".into())) }
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let mut record = ProjectRecord::new("Home");
    record.scene = SceneDocument::from(&one_wall());
    store.insert_project(ProjectId("p1".into()), record).await;
    store.insert_shared(ShareId("s1".into()), SharedRecord { scene: SceneDocument::from(&one_wall()) }).await;
    store
}

fn draw_wall(session: &mut EditorSession) {
    session.dispatch(EditorEvent::Tool { tool: Tool::Wall });
    session.dispatch(EditorEvent::Down { x: 0.0, y: 300.0, target: None });
    session.dispatch(EditorEvent::Move { x: 70.0, y: 300.0 });
    session.dispatch(EditorEvent::Up);
}

// =============================================================
// Keys
// =============================================================

#[test]
fn only_shares_are_read_only() {
    assert!(SessionKey::Shared { share_id: ShareId("s".into()) }.is_read_only());
    assert!(!owned("p").is_read_only());
    assert!(!SessionKey::Blank.is_read_only());
}

#[test]
fn only_signed_in_owners_autosave() {
    assert_eq!(owned("p").autosave_target(), Some(&ProjectId("p".into())));
    let anonymous = SessionKey::Owned { project_id: ProjectId("p".into()), user: None };
    assert_eq!(anonymous.autosave_target(), None);
    assert_eq!(SessionKey::Blank.autosave_target(), None);
}

// =============================================================
// Loading
// =============================================================

#[tokio::test(start_paused = true)]
async fn owned_session_hydrates_from_store() {
    let store = seeded_store().await;
    let session = EditorSession::open(store.clone(), owned("p1"), &config()).await;
    assert_eq!(session.state(), LoadState::Ready);
    assert_eq!(session.engine().scene(), &one_wall());
    assert_eq!(session.engine().history().len(), 1);
    assert!(!session.engine().can_undo());
    assert!(session.is_autosaving());
    session.close().await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn blank_session_is_ready_without_loading() {
    let store = Arc::new(MemoryStore::new());
    let session = EditorSession::new(store, SessionKey::Blank, &config());
    assert_eq!(session.state(), LoadState::Ready);
    assert!(session.engine().scene().is_empty());
    assert!(!session.is_autosaving());
}

#[tokio::test]
async fn missing_project_is_unavailable() {
    let store = seeded_store().await;
    let mut session = EditorSession::open(store, owned("nope"), &config()).await;
    assert_eq!(session.state(), LoadState::Unavailable);
    assert!(!session.is_autosaving());
    assert!(session.dispatch(EditorEvent::Clear).is_empty());
}

#[tokio::test]
async fn anonymous_owner_gets_no_data() {
    let store = seeded_store().await;
    let key = SessionKey::Owned { project_id: ProjectId("p1".into()), user: None };
    let session = EditorSession::open(store, key, &config()).await;
    assert_eq!(session.state(), LoadState::Unavailable);
    assert!(session.engine().scene().is_empty());
}

#[tokio::test]
async fn load_error_is_unavailable() {
    let store = Arc::new(FileStore::new(std::env::temp_dir().join("architech-session-unused")));
    let session = EditorSession::open(store, owned("../escape"), &config()).await;
    assert_eq!(session.state(), LoadState::Unavailable);
}

#[tokio::test]
async fn input_ignored_while_loading() {
    let store = seeded_store().await;
    let mut session = EditorSession::new(store, owned("p1"), &config());
    assert_eq!(session.state(), LoadState::Loading);
    draw_wall(&mut session);
    assert!(session.engine().scene().is_empty());
}

#[tokio::test]
async fn stale_ticket_is_ignored() {
    let store = seeded_store().await;
    let mut session = EditorSession::new(store, owned("p1"), &config());
    let first = session.begin_load();
    let second = session.begin_load();

    session.finish_load(second, Ok(Some(one_wall())));
    let late = session.finish_load(first, Ok(Some(Scene::new())));

    assert!(late.is_empty());
    assert_eq!(session.engine().scene(), &one_wall());
    assert_eq!(session.state(), LoadState::Ready);
    session.close().await;
}

#[tokio::test]
async fn retarget_invalidates_outstanding_loads() {
    let store = seeded_store().await;
    let mut session = EditorSession::new(store, owned("p1"), &config());
    let before = session.begin_load();
    let pending = session.fetch();

    let after = session.retarget(SessionKey::Shared { share_id: ShareId("s1".into()) }).await;
    session.finish_load(before, pending.await);
    assert_eq!(session.state(), LoadState::Loading);

    let result = session.fetch().await;
    session.finish_load(after, result);
    assert_eq!(session.state(), LoadState::Ready);
    assert!(session.is_read_only());
    assert!(!session.is_autosaving());
}

#[tokio::test]
async fn retarget_to_blank_starts_empty() {
    let store = seeded_store().await;
    let mut session = EditorSession::open(store, owned("p1"), &config()).await;
    session.retarget(SessionKey::Blank).await;
    assert_eq!(session.state(), LoadState::Ready);
    assert!(session.engine().scene().is_empty());
    assert!(!session.is_autosaving());
}

// =============================================================
// Autosave
// =============================================================

#[tokio::test(start_paused = true)]
async fn edits_autosave_after_quiet_period() {
    let store = seeded_store().await;
    let mut session = EditorSession::open(store.clone(), owned("p1"), &config()).await;

    draw_wall(&mut session);
    assert_eq!(session.engine().scene().walls().len(), 2);
    assert_eq!(store.save_count(), 0);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.save_count(), 1);
    let saved = store.load_project(&ProjectId("p1".into())).await.unwrap().unwrap();
    assert_eq!(saved.scene.walls.len(), 2);
    assert_eq!(saved.name, "Home");

    session.close().await;
    assert_eq!(store.save_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn close_flushes_pending_edits() {
    let store = seeded_store().await;
    let mut session = EditorSession::open(store.clone(), owned("p1"), &config()).await;
    draw_wall(&mut session);
    session.close().await;

    assert_eq!(store.save_count(), 1);
    let saved = store.load_project(&ProjectId("p1".into())).await.unwrap().unwrap();
    assert_eq!(saved.scene.walls.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn shared_session_never_writes() {
    let store = seeded_store().await;
    let key = SessionKey::Shared { share_id: ShareId("s1".into()) };
    let mut session = EditorSession::open(store.clone(), key, &config()).await;
    assert_eq!(session.state(), LoadState::Ready);
    assert!(session.is_read_only());

    draw_wall(&mut session);
    session.dispatch(EditorEvent::Select { id: EntityId::from("w1") });
    session.dispatch(EditorEvent::Delete);
    session.dispatch(EditorEvent::Clear);

    assert_eq!(session.engine().scene(), &one_wall());
    assert_eq!(session.engine().history().len(), 1);
    tokio::time::sleep(Duration::from_millis(5000)).await;
    session.close().await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn blank_session_edits_but_never_writes() {
    let store = Arc::new(MemoryStore::new());
    let mut session = EditorSession::open(store.clone(), SessionKey::Blank, &config()).await;
    draw_wall(&mut session);
    assert_eq!(session.engine().scene().walls().len(), 1);
    tokio::time::sleep(Duration::from_millis(5000)).await;
    session.close().await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn apply_forwards_direct_engine_calls() {
    let store = seeded_store().await;
    let mut session = EditorSession::open(store.clone(), owned("p1"), &config()).await;
    let actions = session.apply(EngineCore::clear_canvas);
    assert!(actions.contains(&Action::SceneChanged));
    session.close().await;
    let saved = store.load_project(&ProjectId("p1".into())).await.unwrap().unwrap();
    assert!(saved.scene.walls.is_empty());
}
