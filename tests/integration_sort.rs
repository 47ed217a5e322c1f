//! End-to-end tests for the sort orchestrator against real temp directories.

use snapsort::sorter::OutcomeStatus;
use snapsort::{CancelFlag, Config, EventChannel, SortCriterion, SortEvent, Sorter};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source");
    let target = dir.path().join("target");
    fs::create_dir_all(&source).unwrap();
    (dir, source, target)
}

fn name_config(source: &Path, target: &Path) -> Config {
    Config {
        source_dir: source.to_path_buf(),
        target_dir: target.to_path_buf(),
        sort_by: SortCriterion::Name,
        ..Config::default()
    }
}

fn drain(receiver: &snapsort::EventReceiver) -> Vec<SortEvent> {
    let mut events = Vec::new();
    while let Some(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn copy_keeps_the_source_file() {
    let (_dir, source, target) = setup();
    fs::write(source.join("trip.jpg"), b"image bytes").unwrap();

    let sorter = Sorter::new(name_config(&source, &target));
    let (events, receiver) = EventChannel::new();
    let outcomes = sorter.run(&events, &CancelFlag::new()).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, OutcomeStatus::Sorted);
    assert!(source.join("trip.jpg").exists(), "copy must keep the source");
    assert!(target.join("T/trip.jpg").exists());
    assert_eq!(fs::read(target.join("T/trip.jpg")).unwrap(), b"image bytes");

    let events = drain(&receiver);
    assert!(matches!(events.first(), Some(SortEvent::Started { total: 1 })));
    assert!(matches!(events.last(), Some(SortEvent::Completed { .. })));
}

#[test]
fn move_removes_the_source_file() {
    let (_dir, source, target) = setup();
    fs::write(source.join("trip.jpg"), b"image bytes").unwrap();

    let mut config = name_config(&source, &target);
    config.keep_original = false;
    let sorter = Sorter::new(config);
    let outcomes = sorter
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();

    assert_eq!(outcomes[0].status, OutcomeStatus::Sorted);
    assert!(!source.join("trip.jpg").exists(), "move must remove the source");
    assert!(target.join("T/trip.jpg").exists());
}

#[test]
fn dry_run_plans_without_touching_the_filesystem() {
    let (_dir, source, target) = setup();
    fs::write(source.join("trip.jpg"), b"image bytes").unwrap();
    fs::write(source.join("alps.png"), b"more bytes").unwrap();

    let mut config = name_config(&source, &target);
    config.dry_run = true;
    let sorter = Sorter::new(config);
    let outcomes = sorter
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert_eq!(outcome.status, OutcomeStatus::DryRun);
        assert!(outcome.destination.is_some());
    }
    assert!(!target.exists(), "dry run must not create the target tree");
    assert!(source.join("trip.jpg").exists());
    assert!(source.join("alps.png").exists());
}

#[test]
fn dry_run_reports_the_same_destinations_as_a_real_run() {
    let (_dir, source, target) = setup();
    fs::write(source.join("trip.jpg"), b"a").unwrap();

    let mut dry = name_config(&source, &target);
    dry.dry_run = true;
    let dry_outcomes = Sorter::new(dry)
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();

    let real_outcomes = Sorter::new(name_config(&source, &target))
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();

    assert_eq!(dry_outcomes[0].destination, real_outcomes[0].destination);
}

#[test]
fn collision_resolution_is_deterministic() {
    let (_dir, source, target) = setup();
    fs::write(source.join("photo.jpg"), b"new").unwrap();
    fs::create_dir_all(target.join("P")).unwrap();
    fs::write(target.join("P/photo.jpg"), b"existing").unwrap();
    fs::write(target.join("P/photo_1.jpg"), b"existing too").unwrap();

    let sorter = Sorter::new(name_config(&source, &target));
    let outcomes = sorter
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();

    assert_eq!(
        outcomes[0].destination.as_deref(),
        Some(target.join("P/photo_2.jpg").as_path())
    );
    assert!(target.join("P/photo_2.jpg").exists());
    // Pre-existing files are untouched
    assert_eq!(fs::read(target.join("P/photo.jpg")).unwrap(), b"existing");
}

#[test]
fn overwrite_replaces_the_existing_file() {
    let (_dir, source, target) = setup();
    fs::write(source.join("photo.jpg"), b"new").unwrap();
    fs::create_dir_all(target.join("P")).unwrap();
    fs::write(target.join("P/photo.jpg"), b"existing").unwrap();

    let mut config = name_config(&source, &target);
    config.overwrite = true;
    let outcomes = Sorter::new(config)
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();

    assert_eq!(
        outcomes[0].destination.as_deref(),
        Some(target.join("P/photo.jpg").as_path())
    );
    assert_eq!(fs::read(target.join("P/photo.jpg")).unwrap(), b"new");
    assert!(!target.join("P/photo_1.jpg").exists());
}

#[test]
fn a_failed_file_does_not_abort_the_run() {
    let (_dir, source, target) = setup();
    fs::write(source.join("apple.jpg"), b"a").unwrap();
    fs::write(source.join("trip.jpg"), b"t").unwrap();
    // Occupy the "T" bucket with a plain file so creating the
    // destination directory fails for trip.jpg only
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("T"), b"not a directory").unwrap();

    let sorter = Sorter::new(name_config(&source, &target));
    let (events, receiver) = EventChannel::new();
    let outcomes = sorter.run(&events, &CancelFlag::new()).unwrap();

    assert_eq!(outcomes.len(), 2);
    let by_name = |n: &str| {
        outcomes
            .iter()
            .find(|o| o.source.file_name().unwrap() == n)
            .unwrap()
    };
    assert_eq!(by_name("apple.jpg").status, OutcomeStatus::Sorted);
    assert_eq!(by_name("trip.jpg").status, OutcomeStatus::Failed);
    assert!(by_name("trip.jpg").error.is_some());
    assert!(target.join("A/apple.jpg").exists());

    let events = drain(&receiver);
    assert!(events.iter().any(|e| matches!(e, SortEvent::Failed { .. })));
    match events.last() {
        Some(SortEvent::Completed { summary }) => {
            assert_eq!(summary.total, 2);
            assert_eq!(summary.sorted, 1);
            assert_eq!(summary.failed, 1);
        }
        other => panic!("expected Completed, got {:?}", other),
    }
}

#[test]
fn cancellation_stops_at_the_file_boundary() {
    let (_dir, source, target) = setup();
    fs::write(source.join("trip.jpg"), b"t").unwrap();

    let cancel = CancelFlag::new();
    cancel.cancel();

    let sorter = Sorter::new(name_config(&source, &target));
    let (events, receiver) = EventChannel::new();
    let outcomes = sorter.run(&events, &cancel).unwrap();

    assert!(outcomes.is_empty(), "no file may be processed after cancel");
    assert!(!target.join("T").exists());

    let events = drain(&receiver);
    assert!(matches!(events.last(), Some(SortEvent::Cancelled { .. })));
}

#[test]
fn a_second_run_after_completion_succeeds() {
    let (_dir, source, target) = setup();
    fs::write(source.join("trip.jpg"), b"t").unwrap();

    let mut config = name_config(&source, &target);
    config.dry_run = true;
    let sorter = Sorter::new(config);

    sorter
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();
    // The run guard must have been released
    let again = sorter.run(&snapsort::events::null_sender(), &CancelFlag::new());
    assert!(again.is_ok());
}

#[test]
fn rename_synthesizes_date_based_filenames() {
    let (_dir, source, target) = setup();
    fs::write(source.join("holiday.JPG"), b"x").unwrap();

    let mut config = name_config(&source, &target);
    config.rename = true;
    let outcomes = Sorter::new(config)
        .run(&snapsort::events::null_sender(), &CancelFlag::new())
        .unwrap();

    let dest = outcomes[0].destination.as_ref().unwrap();
    let name = dest.file_name().unwrap().to_str().unwrap();
    // <yyyyMMdd_HHmmss> stem with the original extension casing
    assert!(name.ends_with(".JPG"), "extension casing preserved: {name}");
    let stem = name.trim_end_matches(".JPG");
    assert_eq!(stem.len(), 15);
    assert_eq!(stem.as_bytes()[8], b'_');
    assert!(stem[..8].bytes().all(|b| b.is_ascii_digit()));
    assert!(stem[9..].bytes().all(|b| b.is_ascii_digit()));
}

#[test]
fn progress_percent_reaches_one_hundred() {
    let (_dir, source, target) = setup();
    for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
        fs::write(source.join(name), b"x").unwrap();
    }

    let sorter = Sorter::new(name_config(&source, &target));
    let (events, receiver) = EventChannel::new();
    sorter.run(&events, &CancelFlag::new()).unwrap();

    let percents: Vec<u8> = drain(&receiver)
        .into_iter()
        .filter_map(|e| match e {
            SortEvent::Sorted { percent, .. } => Some(percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents, [25, 50, 75, 100]);
}
