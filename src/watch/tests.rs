use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossbeam::channel;
use notify::EventKind;
use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind};
use tempfile::TempDir;

use super::debouncer::{Debouncer, is_content_change};
use super::{Regenerate, WatchedFiles, apply_rewrites, event_loop};
use crate::config::{KeysheetConfig, Rewrite};
use crate::logger::WatchStatus;
use crate::utils::path::normalize_path;

fn make_event(path: &Path, kind: EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: vec![path.to_path_buf()],
        attrs: Default::default(),
    }
}

fn modify_kind() -> EventKind {
    EventKind::Modify(ModifyKind::Data(DataChange::Content))
}

/// Project with `config/toucan.keymap` and `config.yaml`.
fn make_project() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    std::fs::create_dir_all(root.join("config")).unwrap();
    std::fs::write(root.join("config/toucan.keymap"), "/ { keymap {}; };").unwrap();
    std::fs::write(root.join("config.yaml"), "draw_config: {}").unwrap();
    (temp, root)
}

fn watched(root: &Path) -> WatchedFiles {
    WatchedFiles::new([root.join("config/toucan.keymap"), root.join("config.yaml")])
}

// ----------------------------------------------------------------------------
// Debouncer
// ----------------------------------------------------------------------------

#[test]
fn test_first_change_triggers_immediately() {
    let mut debouncer = Debouncer::new(Duration::from_millis(500));
    assert!(debouncer.should_trigger(Instant::now()));
}

#[test]
fn test_changes_within_window_suppressed() {
    let mut debouncer = Debouncer::new(Duration::from_millis(500));
    let start = Instant::now();

    assert!(debouncer.should_trigger(start));
    assert!(!debouncer.should_trigger(start + Duration::from_millis(100)));
    assert!(!debouncer.should_trigger(start + Duration::from_millis(499)));
    assert!(debouncer.should_trigger(start + Duration::from_millis(500)));
    // window restarts from the last trigger, not the last event
    assert!(!debouncer.should_trigger(start + Duration::from_millis(900)));
    assert!(debouncer.should_trigger(start + Duration::from_millis(1000)));
}

#[test]
fn test_zero_window_never_suppresses() {
    let mut debouncer = Debouncer::new(Duration::ZERO);
    let now = Instant::now();
    assert!(debouncer.should_trigger(now));
    assert!(debouncer.should_trigger(now));
}

#[test]
fn test_event_kinds() {
    assert!(is_content_change(&modify_kind()));
    assert!(is_content_change(&EventKind::Create(CreateKind::File)));
    assert!(is_content_change(&EventKind::Modify(ModifyKind::Any)));
    assert!(!is_content_change(&EventKind::Modify(ModifyKind::Metadata(
        MetadataKind::WriteTime
    ))));
    assert!(!is_content_change(&EventKind::Remove(RemoveKind::File)));
    assert!(!is_content_change(&EventKind::Access(AccessKind::Any)));
}

// ----------------------------------------------------------------------------
// Watched files
// ----------------------------------------------------------------------------

#[test]
fn test_matching_watched_files_only() {
    let (_temp, root) = make_project();
    let files = watched(&root);
    let keymap = root.join("config/toucan.keymap");

    assert_eq!(
        files.matching(&make_event(&keymap, modify_kind())),
        Some(keymap.as_path())
    );
    assert!(
        files
            .matching(&make_event(&root.join("config/other.keymap"), modify_kind()))
            .is_none()
    );
    assert!(
        files
            .matching(&make_event(
                &keymap,
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))
            ))
            .is_none()
    );
}

#[test]
fn test_dirs_are_distinct_parents() {
    let (_temp, root) = make_project();
    let files = WatchedFiles::new([
        root.join("config/toucan.keymap"),
        root.join("config/corne.keymap"),
        root.join("config.yaml"),
    ]);
    assert_eq!(files.dirs(), [root.join("config").as_path(), root.as_path()]);
}

// ----------------------------------------------------------------------------
// Event loop
// ----------------------------------------------------------------------------

#[test]
fn test_loop_debounces_burst_of_writes() {
    let (_temp, root) = make_project();
    let files = watched(&root);
    let (tx, rx) = channel::unbounded();

    // editor save: several writes to both files in quick succession
    for path in [
        root.join("config/toucan.keymap"),
        root.join("config/toucan.keymap"),
        root.join("config.yaml"),
    ] {
        tx.send(Ok(make_event(&path, modify_kind()))).unwrap();
    }
    tx.send(Ok(make_event(&root.join("README.md"), modify_kind())))
        .unwrap();
    drop(tx);

    let mut changed = Vec::new();
    let triggers = event_loop(
        &rx,
        &files,
        Debouncer::new(Duration::from_secs(60)),
        || false,
        |path| changed.push(path.to_path_buf()),
    );

    assert_eq!(triggers, 1);
    assert_eq!(changed, [root.join("config/toucan.keymap")]);
}

#[test]
fn test_loop_survives_watcher_errors() {
    let (_temp, root) = make_project();
    let files = watched(&root);
    let (tx, rx) = channel::unbounded();

    tx.send(Err(notify::Error::generic("inotify queue overflow")))
        .unwrap();
    tx.send(Ok(make_event(&root.join("config.yaml"), modify_kind())))
        .unwrap();
    drop(tx);

    let triggers = event_loop(&rx, &files, Debouncer::new(Duration::ZERO), || false, |_| {});
    assert_eq!(triggers, 1);
}

#[test]
fn test_loop_stops_on_shutdown() {
    let (_temp, root) = make_project();
    let files = watched(&root);
    let (tx, rx) = channel::unbounded();
    tx.send(Ok(make_event(&root.join("config.yaml"), modify_kind())))
        .unwrap();

    let checks = Cell::new(0);
    let triggers = event_loop(
        &rx,
        &files,
        Debouncer::new(Duration::ZERO),
        || {
            checks.set(checks.get() + 1);
            checks.get() > 1
        },
        |_| {},
    );

    // sender still alive: only the stop flag ends the loop
    assert_eq!(triggers, 1);
    drop(tx);
}

// ----------------------------------------------------------------------------
// Regeneration
// ----------------------------------------------------------------------------

#[test]
fn test_apply_rewrites() {
    let rewrites = KeysheetConfig::default().watch.rewrite;
    let text = "layout: {zmk_keyboard: toucan}\nlayers:\n  QWERTY: []\n";

    let (rewritten, applied) = apply_rewrites(text, &rewrites);

    assert_eq!(applied, 1);
    assert_eq!(
        rewritten,
        "layout:\n  qmk_keyboard: crkbd/rev1\n  layout_name: LAYOUT_split_3x6_3\nlayers:\n  QWERTY: []\n"
    );
}

#[test]
fn test_apply_rewrites_in_order() {
    let rewrites = [
        Rewrite {
            from: "a".into(),
            to: "b".into(),
        },
        Rewrite {
            from: "b".into(),
            to: "c".into(),
        },
        Rewrite {
            from: "zzz".into(),
            to: "y".into(),
        },
    ];
    assert_eq!(apply_rewrites("ab", &rewrites), ("cc".to_owned(), 2));
}

#[test]
fn test_command_lines() {
    let config = KeysheetConfig {
        root: PathBuf::from("/work/keyboard"),
        ..Default::default()
    };
    let regenerate = Regenerate::from_config(&config);

    assert_eq!(
        regenerate.parse_cmd().command_line(),
        "keymap parse -z config/toucan.keymap -o keymap.yaml"
    );
    assert_eq!(
        regenerate.draw_cmd().command_line(),
        "keymap -c config.yaml draw keymap.yaml -o keymap.svg"
    );
}

#[cfg(unix)]
fn fake_drawer(dir: &Path, script: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-keymap");
    std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

#[cfg(unix)]
fn project_config(root: &Path, program: String) -> KeysheetConfig {
    let mut config = KeysheetConfig {
        root: root.to_path_buf(),
        ..Default::default()
    };
    config.watch.program = program;
    config
}

#[cfg(unix)]
#[test]
fn test_regenerate_runs_all_steps() {
    let (_temp, root) = make_project();
    let tools = TempDir::new().unwrap();
    // parse: $5 is the -o target; draw: $4 is the input, $6 the -o target
    let program = fake_drawer(
        tools.path(),
        r#"case "$1" in
  parse) printf 'layout: {zmk_keyboard: toucan}\nlayers: {}\n' > "$5" ;;
  -c) cat "$4" > "$6" ;;
esac"#,
    );
    let regenerate = Regenerate::from_config(&project_config(&root, program));

    assert!(regenerate.run(&WatchStatus::new()));

    let svg = std::fs::read_to_string(root.join("keymap.svg")).unwrap();
    assert!(svg.contains("qmk_keyboard: crkbd/rev1"));
    assert!(!svg.contains("zmk_keyboard: toucan"));
}

#[cfg(unix)]
#[test]
fn test_failed_step_is_not_fatal() {
    let (_temp, root) = make_project();
    let tools = TempDir::new().unwrap();
    let program = fake_drawer(
        tools.path(),
        r#"echo "toucan.keymap:3: unknown behavior &foo" >&2; exit 1"#,
    );
    let regenerate = Regenerate::from_config(&project_config(&root, program));

    assert!(!regenerate.run(&WatchStatus::new()));
    assert!(!root.join("keymap.svg").exists());
    // the next trigger runs again
    assert!(!regenerate.run(&WatchStatus::new()));
}

#[cfg(unix)]
#[test]
fn test_missing_program_is_not_fatal() {
    let (_temp, root) = make_project();
    let config = project_config(&root, "no-such-keymap-drawer-5e1d".into());
    assert!(!Regenerate::from_config(&config).run(&WatchStatus::new()));
}
