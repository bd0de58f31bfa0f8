//! End-to-end: drive the engine with serialized events, export, re-import.
#![allow(clippy::float_cmp)]

use architech::engine::{Action, EngineCore};
use architech::input::EditorEvent;
use architech::io::{export_json, import_json};

const SCRIPT: &str = r#"
{"event":"tool","tool":"wall"}
{"event":"down","x":0,"y":0}
{"event":"move","x":140,"y":0}
{"event":"up"}
{"event":"tool","tool":"shape:rect"}
{"event":"down","x":300,"y":300}
{"event":"move","x":340,"y":320}
{"event":"up"}
{"event":"tool","tool":"symbol:door"}
{"event":"down","x":200,"y":200}
{"event":"key","key":"c","ctrl":true}
{"event":"key","key":"v","ctrl":true}
{"event":"key","key":"Z","ctrl":true}
"#;

fn run(script: &str) -> EngineCore {
    let mut engine = EngineCore::new();
    for line in script.lines().filter(|l| !l.trim().is_empty()) {
        let event: EditorEvent = serde_json::from_str(line).unwrap();
        engine.dispatch(event);
    }
    engine
}

#[test]
fn scripted_session_builds_expected_scene() {
    let engine = run(SCRIPT);
    let scene = engine.scene();
    assert_eq!(scene.walls().len(), 1);
    assert_eq!(scene.walls()[0].length, 140.0);
    assert_eq!(scene.shapes().len(), 1);
    // Paste was undone.
    assert_eq!(scene.symbols().len(), 1);
    assert!(engine.can_redo());
    assert_eq!(engine.selection(), None);
}

#[test]
fn redo_restores_the_paste() {
    let mut engine = run(SCRIPT);
    let actions = engine.dispatch(serde_json::from_str(r#"{"event":"key","key":"y","meta":true}"#).unwrap());
    assert!(actions.contains(&Action::SceneChanged));
    assert_eq!(engine.scene().symbols().len(), 2);
}

#[test]
fn exported_result_reimports_identically() {
    let engine = run(SCRIPT);
    let json = export_json(engine.scene()).unwrap();
    assert_eq!(&import_json(&json).unwrap(), engine.scene());
}

#[test]
fn read_only_replay_changes_nothing() {
    let mut engine = EngineCore::new();
    engine.set_read_only(true);
    for line in SCRIPT.lines().filter(|l| !l.trim().is_empty()) {
        engine.dispatch(serde_json::from_str(line).unwrap());
    }
    assert!(engine.scene().is_empty());
    assert_eq!(engine.history().len(), 1);
}
