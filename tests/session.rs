//! Tests for importing tasks into a session and diffing against them.
mod common;
use common::MockTransport;
use std::time::Duration;
use tasksmith::prelude::*;
use tasksmith::task::DiffKind;
use tokio_test::block_on;

const BASELINE: &str = r#"{
  "env": "retail",
  "interface_num": 1,
  "task": {
    "user_id": "u-1",
    "instruction": "Book 100 on r-1.",
    "actions": [
      {
        "name": "update_record",
        "arguments": {"record_id": "r-1", "amount": 100.0},
        "output": {"api": "update_record", "balance": 10.0}
      }
    ],
    "edges": []
  }
}"#;

#[test]
fn test_interface_mismatch_aborts_the_import() {
    let mut session = common::session();
    let text = BASELINE.replace(r#""interface_num": 1"#, r#""interface_num": "2""#);
    match session.import_text(&text) {
        Err(ImportError::InterfaceMismatch { document, active }) => {
            assert_eq!(document, "2");
            assert_eq!(active, "1");
        }
        other => panic!("Expected InterfaceMismatch, got {:?}", other),
    }
    assert!(session.store().is_empty());
    assert!(session.baseline().is_none());
}

#[test]
fn test_environment_mismatch_aborts_the_import() {
    let mut session = common::session();
    let text = BASELINE.replace(r#""env": "retail""#, r#""env": "airline""#);
    assert!(matches!(
        session.import_text(&text),
        Err(ImportError::EnvironmentMismatch { .. })
    ));
    assert!(session.store().is_empty());
}

#[test]
fn test_unknown_operations_abort_the_import() {
    let mut session = common::session();
    let text = BASELINE.replace(r#""name": "update_record""#, r#""name": "cancel_order""#);
    assert!(matches!(
        session.import_text(&text),
        Err(ImportError::Task(TaskError::UnknownOperation(_)))
    ));
    assert!(session.store().is_empty());
}

#[test]
fn test_import_fills_raw_inputs() {
    let mut session = common::session();
    let ids = session.import_text(BASELINE).unwrap();
    assert_eq!(ids.len(), 1);

    let action = session.action(ids[0]).unwrap();
    assert_eq!(action.selected_operation(), Some("update_record"));
    assert_eq!(action.raw_input("record_id"), Some("r-1"));
    assert_eq!(action.raw_input("amount"), Some("100.0"));
    assert_eq!(action.raw_input("note"), Some(""));
    assert!(!action.has_executed());
}

#[test]
fn test_imported_outputs_survive_re_export() {
    let text = r#"{"env": "retail", "interface_num": 1, "actions": [{"name": "update_record", "arguments": {"record_id": "r-1", "amount": 100.0}, "output": {"balance": 10.5, "total": 3, "_floatFields": ["total"]}}]}"#;
    let first = tasksmith::task::parse_str(text).unwrap().export();

    let mut session = common::session();
    let ids = session.import_text(&first).unwrap();
    let action = session.action(ids[0]).unwrap();
    assert_eq!(action.last_output(), &serde_json::json!({"balance": 10.5, "total": 3.0}));
    assert!(!action.has_executed());

    let second = session.export().unwrap();
    assert_eq!(second, first);
    assert!(second.contains(r#""balance": 10.5"#));
    assert!(second.contains(r#""total": 3.0"#));
}

#[test]
fn test_diff_requires_baseline_and_executed_actions() {
    let mut session = common::session();
    assert_eq!(session.task_diff().unwrap_err(), TaskError::NoBaseline);

    session.import_text(BASELINE).unwrap();
    assert_eq!(
        session.task_diff().unwrap_err(),
        TaskError::UnexecutedActions { count: 1 }
    );
}

#[test]
fn test_diff_shows_only_changed_arguments() {
    let mut session = common::session();
    let ids = session.import_text(BASELINE).unwrap();
    let dispatcher = Dispatcher::new(MockTransport::new()).with_batch_delay(Duration::ZERO);
    block_on(dispatcher.execute_all(&mut session)).unwrap();

    let unchanged = session.task_diff().unwrap();
    assert!(unchanged.is_identical());

    session.set_raw_input(ids[0], "amount", "250").unwrap();
    block_on(dispatcher.execute(&mut session, ids[0])).unwrap();
    let diff = session.task_diff().unwrap();
    assert_eq!(diff.stats.added, 1);
    assert_eq!(diff.stats.removed, 1);

    let removed: Vec<_> = diff
        .lines
        .iter()
        .filter(|l| l.kind == DiffKind::Removed)
        .collect();
    let added: Vec<_> = diff
        .lines
        .iter()
        .filter(|l| l.kind == DiffKind::Added)
        .collect();
    assert_eq!(removed[0].text.trim(), r#""amount": 100.0"#);
    assert_eq!(added[0].text.trim(), r#""amount": 250.0"#);
}
