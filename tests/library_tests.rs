//! Script library loading tests

use vnscript::{LibraryError, ScriptLibrary};

fn write(dir: &std::path::Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[tokio::test]
async fn broken_file_does_not_stop_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "greeter.json",
        r#"{"triggers": {"on_npc_interact": "villager"}, "metadata": {"uuid": "g-1"}, "fsm": []}"#,
    );
    write(dir.path(), "broken.json", "{ this is not json");
    write(
        dir.path(),
        "guard.json",
        r#"{"name": "Guard", "triggers": {"on_npc_interact": "iron_golem"}, "fsm": []}"#,
    );
    write(dir.path(), "notes.txt", "not a script");

    let (library, failures) = ScriptLibrary::load_dir(dir.path()).await.unwrap();

    assert_eq!(library.len(), 2);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].file, "broken.json");

    let greeter = library.get("g-1").unwrap();
    assert_eq!(greeter.name, "greeter");
    let found = library.find_by_trigger("on_npc_interact", "iron_golem");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Guard");
    assert_eq!(found[0].metadata["creator"], "unknown");
}

#[tokio::test]
async fn duplicate_uuid_keeps_the_later_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.json", r#"{"metadata": {"uuid": "same"}}"#);
    write(dir.path(), "b.json", r#"{"metadata": {"uuid": "same"}}"#);

    let (library, failures) = ScriptLibrary::load_dir(dir.path()).await.unwrap();

    assert!(failures.is_empty());
    assert_eq!(library.len(), 1);
    assert_eq!(library.get("same").unwrap().name, "b");
}

#[tokio::test]
async fn bundled_scripts_load() {
    let (library, failures) = ScriptLibrary::load_dir("scripts").await.unwrap();
    assert!(failures.is_empty(), "{failures:?}");
    assert_eq!(library.find_by_trigger("on_npc_interact", "villager").len(), 1);
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ScriptLibrary::load_dir(dir.path().join("missing")).await;
    assert!(matches!(result, Err(LibraryError::ReadDir { .. })));
}
