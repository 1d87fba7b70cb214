use std::sync::Arc;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use tcheck_core::CheckRecord;
use tcheck_core::CheckingSession;
use tcheck_core::CommitScheduler;
use tcheck_core::ContextId;
use tcheck_core::FilterKey;
use tcheck_core::Filters;
use tcheck_core::GroupIndexEntry;
use tcheck_core::GroupsData;
use tcheck_core::GroupsStore;
use tcheck_core::Reference;
use tcheck_core::Selection;
use tcheck_core::auto_commit::auto_save_message;
use tcheck_core::check_data::CheckCategory;
use tcheck_core::check_data::CheckDataLog;
use tcheck_core::check_data::CommentEntry;
use tcheck_core::check_data::SelectionsEntry;
use tcheck_core::check_data::ToggleEntry;
use tcheck_core::context_id::context_id_path;
use tcheck_core::context_id::load_context_id;
use tcheck_core::context_id::save_context_id;
use tcheck_core::gateway::GatewayQuote;
use tcheck_core::session::StateSource;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingScheduler {
    messages: Mutex<Vec<String>>,
}

impl RecordingScheduler {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl CommitScheduler for RecordingScheduler {
    fn schedule(&self, context_id: &ContextId) {
        self.messages.lock().unwrap().push(auto_save_message(context_id));
    }
}

fn context(group: &str, verse: u32) -> ContextId {
    ContextId::new(
        "translationWords",
        group,
        Reference::new("tit", 1, verse),
        group,
        1,
    )
}

fn store() -> GroupsStore {
    let mut finished = CheckRecord::new(context("apostle", 1));
    finished.selections = Some(vec![Selection::new("apostle")]);
    finished.comments = Some("check spelling".to_string());
    GroupsStore::new(
        vec![
            GroupIndexEntry::new("apostle", "apostle"),
            GroupIndexEntry::new("god", "God"),
        ],
        GroupsData::from([
            ("apostle".to_string(), vec![finished, CheckRecord::new(context("apostle", 2))]),
            ("god".to_string(), vec![CheckRecord::new(context("god", 3))]),
        ]),
    )
}

fn session(temp: &TempDir) -> (CheckingSession, Arc<RecordingScheduler>) {
    let scheduler = Arc::new(RecordingScheduler::default());
    let session = CheckingSession::new(
        temp.path(),
        "translationWords",
        "tit",
        store(),
        scheduler.clone(),
    )
    .with_username(Some("translator".to_string()));
    (session, scheduler)
}

#[test]
fn change_seeds_state_from_group_data_and_persists() {
    let temp = TempDir::new().unwrap();
    let (mut session, scheduler) = session(&temp);

    session.change_current_context_id(Some(context("apostle", 1))).unwrap();

    assert_eq!(session.state_source(), StateSource::GroupData);
    assert_eq!(session.state().selections, vec![Selection::new("apostle")]);
    assert_eq!(session.state().comments, "check spelling");
    assert!(!session.state().reminders);
    assert!(context_id_path(temp.path(), "translationWords", "tit").exists());
    assert_eq!(
        scheduler.messages(),
        vec!["Auto saving at translationWords apostle tit 1:1".to_string()]
    );
}

#[test]
fn change_outside_group_data_loads_check_data_log() {
    let temp = TempDir::new().unwrap();
    let (mut session, _scheduler) = session(&temp);
    let elsewhere = context("grace", 9);

    let mut selections = SelectionsEntry {
        context_id: elsewhere.clone(),
        selections: vec![Selection::new("grace")],
        ..SelectionsEntry::default()
    };
    CheckDataLog::new(temp.path(), CheckCategory::Selections)
        .append(&mut selections)
        .unwrap();
    let mut comment = CommentEntry {
        context_id: elsewhere.clone(),
        text: "favor".to_string(),
        ..CommentEntry::default()
    };
    CheckDataLog::new(temp.path(), CheckCategory::Comments)
        .append(&mut comment)
        .unwrap();
    let mut bookmark = ToggleEntry {
        context_id: elsewhere.clone(),
        enabled: true,
        ..ToggleEntry::default()
    };
    CheckDataLog::new(temp.path(), CheckCategory::Reminders)
        .append(&mut bookmark)
        .unwrap();

    session.change_current_context_id(Some(elsewhere)).unwrap();

    assert_eq!(session.state_source(), StateSource::CheckDataLog);
    assert_eq!(session.state().selections, vec![Selection::new("grace")]);
    assert_eq!(session.state().comments, "favor");
    assert!(session.state().reminders);
    assert!(!session.state().invalidated);
}

#[test]
fn load_falls_back_when_saved_group_is_unknown() {
    let temp = TempDir::new().unwrap();
    let (mut session, _scheduler) = session(&temp);
    save_context_id(temp.path(), &context("grace", 9)).unwrap();

    let loaded = session.load_current_context_id().unwrap();

    assert_eq!(loaded, Some(context("apostle", 1)));
    assert_eq!(
        load_context_id(temp.path(), "translationWords", "tit").unwrap(),
        Some(context("apostle", 1))
    );
}

#[test]
fn load_falls_back_when_saved_context_has_no_reference() {
    let temp = TempDir::new().unwrap();
    let (mut session, _scheduler) = session(&temp);
    let path = context_id_path(temp.path(), "translationWords", "tit");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{"groupId":"god","tool":"translationWords","quote":"god","occurrence":1}"#,
    )
    .unwrap();

    let loaded = session.load_current_context_id().unwrap();

    assert_eq!(loaded, Some(context("apostle", 1)));
    assert_eq!(
        load_context_id(temp.path(), "translationWords", "tit").unwrap(),
        Some(context("apostle", 1))
    );
}

#[test]
fn failed_change_keeps_previous_context_and_state() {
    let temp = TempDir::new().unwrap();
    let (mut session, scheduler) = session(&temp);
    session.change_current_context_id(Some(context("apostle", 1))).unwrap();
    let mut unplaced = context("god", 3);
    unplaced.reference = None;

    assert!(session.change_current_context_id(Some(unplaced)).is_err());

    assert_eq!(session.context_id(), Some(&context("apostle", 1)));
    assert_eq!(session.state_source(), StateSource::GroupData);
    assert_eq!(session.state().selections, vec![Selection::new("apostle")]);
    assert_eq!(session.state().comments, "check spelling");
    assert_eq!(scheduler.messages().len(), 1);
}

#[test]
fn load_restores_saved_context() {
    let temp = TempDir::new().unwrap();
    let (mut session, _scheduler) = session(&temp);
    save_context_id(temp.path(), &context("god", 3)).unwrap();

    let loaded = session.load_current_context_id().unwrap();

    assert_eq!(loaded, Some(context("god", 3)));
}

#[test]
fn load_on_empty_project_is_none() {
    let temp = TempDir::new().unwrap();
    let scheduler = Arc::new(RecordingScheduler::default());
    let mut session = CheckingSession::new(
        temp.path(),
        "translationWords",
        "tit",
        GroupsStore::default(),
        scheduler.clone(),
    );

    assert_eq!(session.load_current_context_id().unwrap(), None);
    assert!(session.context_id().is_none());
    assert!(scheduler.messages().is_empty());
}

#[test]
fn next_and_previous_respect_filters_and_boundaries() {
    let temp = TempDir::new().unwrap();
    let (session, scheduler) = session(&temp);
    let mut session =
        session.with_filters(Filters::from_keys([FilterKey::NotFinished]).unwrap());
    session.change_current_context_id(Some(context("apostle", 1))).unwrap();

    assert_eq!(
        session.change_to_next_context_id().unwrap(),
        Some(context("apostle", 2))
    );
    assert_eq!(
        session.change_to_next_context_id().unwrap(),
        Some(context("god", 3))
    );
    assert_eq!(session.change_to_next_context_id().unwrap(), None);
    assert_eq!(session.context_id(), Some(&context("god", 3)));

    assert_eq!(
        session.change_to_previous_context_id().unwrap(),
        Some(context("apostle", 2))
    );
    assert_eq!(session.change_to_previous_context_id().unwrap(), None);
    assert_eq!(scheduler.messages().len(), 4);
}

#[test]
fn user_actions_update_memory_and_log() {
    let temp = TempDir::new().unwrap();
    let (mut session, scheduler) = session(&temp);
    let target = context("apostle", 2);
    session.change_current_context_id(Some(target.clone())).unwrap();

    session
        .change_selections(vec![Selection::new("apostle")], false)
        .unwrap();
    session.add_comment("looks right").unwrap();
    session
        .set_bookmark(
            true,
            GatewayQuote {
                gateway_language_code: Some("en".to_string()),
                gateway_language_quote: Some("apostle".to_string()),
            },
        )
        .unwrap();
    session.set_invalidated(true, GatewayQuote::default()).unwrap();

    let state = session.state();
    assert_eq!(state.selections, vec![Selection::new("apostle")]);
    assert_eq!(state.comments, "looks right");
    assert!(state.reminders && state.invalidated);
    assert!(state.modified_timestamp.is_some());

    let record = session.store().find(&target).unwrap();
    assert_eq!(record.selections, Some(vec![Selection::new("apostle")]));
    assert_eq!(record.comments.as_deref(), Some("looks right"));
    assert_eq!(record.reminders, Some(true));
    assert_eq!(record.invalidated, Some(true));

    let bookmark: ToggleEntry = CheckDataLog::new(temp.path(), CheckCategory::Reminders)
        .latest_for(&target)
        .unwrap();
    assert_eq!(bookmark.username.as_deref(), Some("translator"));
    assert_eq!(bookmark.gateway_language_quote.as_deref(), Some("apostle"));

    assert_eq!(scheduler.messages().len(), 5);
}

#[test]
fn user_actions_need_a_current_context() {
    let temp = TempDir::new().unwrap();
    let (mut session, _scheduler) = session(&temp);
    assert!(session.add_comment("orphan").is_err());
}
