use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tcheck_core::FilterKey;
use tcheck_core::Filters;
use tcheck_core::GroupsStore;
use tcheck_core::group_data::group_data_dir;
use tcheck_core::group_data::load_groups_index;
use tcheck_core::group_data::load_project_group_data;
use tcheck_core::navigation::next_context_id;
use tcheck_core::navigation::previous_context_id;
use tempfile::TempDir;

fn check(group: &str, chapter: u32, verse: u32, quote: &str) -> serde_json::Value {
    json!({
        "contextId": {
            "groupId": group,
            "occurrence": 1,
            "quote": quote,
            "reference": {"bookId": "tit", "chapter": chapter, "verse": verse},
            "tool": "translationWords"
        }
    })
}

fn write_json(path: &Path, value: &serde_json::Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn setup_project() -> (TempDir, GroupsStore) {
    let temp = TempDir::new().unwrap();
    let dir = group_data_dir(temp.path(), "translationWords", "tit");

    let mut bookmarked = check("god", 1, 4, "θεοῦ");
    bookmarked["reminders"] = json!(true);
    write_json(
        &dir.join("apostle.json"),
        &json!([check("apostle", 1, 1, "ἀπόστολος")]),
    );
    write_json(
        &dir.join("god.json"),
        &json!([check("god", 1, 1, "θεοῦ"), bookmarked, {"contextId": 42}]),
    );
    write_json(&dir.join("faith.json"), &json!([]));
    std::fs::write(dir.join("broken.json"), "[{").unwrap();
    std::fs::write(dir.join("README.md"), "not group data").unwrap();

    let index_path = temp.path().join("groupsIndex.json");
    write_json(
        &index_path,
        &json!([
            {"id": "apostle", "name": "apostle, apostleship"},
            {"id": "faith", "name": "faith"},
            {"id": "god", "name": "God"},
        ]),
    );

    let index = load_groups_index(&index_path).expect("groups index");
    let data = load_project_group_data(temp.path(), "translationWords", "tit");
    (temp, GroupsStore::new(index, data))
}

#[test]
fn loads_groups_skipping_bad_files_and_records() {
    let (_temp, store) = setup_project();

    let mut groups: Vec<&String> = store.data().keys().collect();
    groups.sort();
    assert_eq!(groups, vec!["apostle", "faith", "god"]);
    assert_eq!(store.data()["god"].len(), 2);
    assert_eq!(store.index().len(), 3);
}

#[test]
fn missing_group_data_dir_is_empty() {
    let temp = TempDir::new().unwrap();
    assert!(load_project_group_data(temp.path(), "translationNotes", "tit").is_empty());
}

#[test]
fn first_context_and_verse_lookup() {
    let (_temp, store) = setup_project();

    let first = store.first_context_id().expect("first context");
    assert_eq!(first.group_id, "apostle");

    let on_verse = store.group_data_for_verse(&first);
    let mut groups: Vec<&String> = on_verse.keys().collect();
    groups.sort();
    assert_eq!(groups, vec!["apostle", "god"]);
}

#[test]
fn navigates_loaded_project_with_filters() {
    let (_temp, store) = setup_project();
    let first = store.first_context_id().expect("first context");

    let next = next_context_id(&first, store.data(), store.index(), &Filters::new())
        .expect("next context");
    assert_eq!(next.group_id, "god");
    assert_eq!(next.reference.as_ref().map(|r| r.verse), Some(1));

    let bookmarks = Filters::from_keys([FilterKey::Reminders]).unwrap();
    let bookmarked = next_context_id(&first, store.data(), store.index(), &bookmarks)
        .expect("bookmarked context");
    assert_eq!(bookmarked.reference.as_ref().map(|r| r.verse), Some(4));

    assert_eq!(
        previous_context_id(&first, store.data(), store.index(), &Filters::new()),
        None
    );
}

#[test]
fn clear_keeps_index() {
    let (_temp, mut store) = setup_project();
    store.clear();
    assert!(store.data().is_empty());
    assert_eq!(store.index().len(), 3);
    assert_eq!(store.first_context_id(), None);
}
