//! # Run History Unit Tests / 运行历史单元测试

mod common;

use common::{history_entry, setup_project};
use pipeline_runner::core::history::HistoryLog;
use std::fs;

#[test]
fn test_missing_log_is_empty() {
    let temp = setup_project();
    let log = HistoryLog::new(temp.path().join("history.jsonl"), 5);
    assert!(log.load().unwrap().is_empty());
    assert_eq!(log.next_build_order().unwrap(), 1);
}

#[test]
fn test_append_creates_parent_directories() {
    let temp = setup_project();
    let path = temp.path().join(".pipeline-history").join("history.jsonl");
    let log = HistoryLog::new(&path, 5);

    let retained = log.append(&history_entry(1, 3, 0)).unwrap();
    assert_eq!(retained.len(), 1);
    assert!(path.exists());
    assert_eq!(log.next_build_order().unwrap(), 2);
}

#[test]
fn test_entries_round_trip_in_order() {
    let temp = setup_project();
    let log = HistoryLog::new(temp.path().join("history.jsonl"), 10);
    for order in 1..=3 {
        log.append(&history_entry(order, 2, order as usize - 1)).unwrap();
    }

    let entries = log.load().unwrap();
    let orders: Vec<u64> = entries.iter().map(|e| e.build_order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(entries[2], history_entry(3, 2, 2));
}

#[test]
fn test_compaction_keeps_most_recent() {
    let temp = setup_project();
    let log = HistoryLog::new(temp.path().join("history.jsonl"), 3);
    let mut retained = Vec::new();
    for order in 1..=5 {
        retained = log.append(&history_entry(order, 1, 0)).unwrap();
    }

    let orders: Vec<u64> = retained.iter().map(|e| e.build_order).collect();
    assert_eq!(orders, vec![3, 4, 5]);

    let on_disk = fs::read_to_string(log.path()).unwrap();
    assert_eq!(on_disk.lines().count(), 3);
    assert_eq!(log.next_build_order().unwrap(), 6);
}

#[test]
fn test_zero_limit_keeps_one() {
    let temp = setup_project();
    let log = HistoryLog::new(temp.path().join("history.jsonl"), 0);
    assert_eq!(log.limit(), 1);

    log.append(&history_entry(1, 1, 0)).unwrap();
    let retained = log.append(&history_entry(2, 1, 0)).unwrap();
    assert_eq!(retained.len(), 1);
    assert_eq!(retained[0].build_order, 2);
}

#[test]
fn test_malformed_lines_are_skipped() {
    let temp = setup_project();
    let path = temp.path().join("history.jsonl");
    let log = HistoryLog::new(&path, 10);
    log.append(&history_entry(1, 1, 0)).unwrap();

    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("{ this is not json\n\n");
    fs::write(&path, content).unwrap();
    log.append(&history_entry(2, 1, 0)).unwrap();

    let entries = log.load().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(log.next_build_order().unwrap(), 3);
}
