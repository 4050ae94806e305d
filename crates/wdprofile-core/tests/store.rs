use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use wdprofile_core::writer::{stage_replacement, temp_path_for};
use wdprofile_core::{
    OutputMode, OutputNaming, OutputRecord, ScanOutcome, StoreError, StoreOptions, StoreOutcome,
    Transform, find_profile, store,
};

fn output(name: &str, x: i32) -> OutputRecord {
    OutputRecord {
        name: name.to_string(),
        x,
        y: 0,
        mode: OutputMode {
            width: 1920,
            height: 1080,
            refresh_mhz: 60000,
        },
        scale: 1.0,
        transform: Transform::Normal,
    }
}

fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config");
    (dir, path)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read config")
}

#[test]
fn empty_file_gets_one_block() {
    let (_dir, path) = scratch();
    fs::write(&path, "").unwrap();

    let outcome = store(&path, &[output("HDMI-A-1", 0)], &StoreOptions::default()).unwrap();

    assert_eq!(outcome, StoreOutcome::Appended);
    assert_eq!(
        read(&path),
        "profile {\n    output HDMI-A-1 position 0,0 mode 1920x1080@60.0000 scale 1.00 transform normal\n}\n"
    );
}

#[test]
fn missing_file_is_created() {
    let (_dir, path) = scratch();

    let outcome = store(&path, &[output("DP-1", 0)], &StoreOptions::default()).unwrap();

    assert_eq!(outcome, StoreOutcome::Created);
    assert_eq!(read(&path).matches("profile {").count(), 1);
}

#[test]
fn storing_twice_is_idempotent() {
    let (_dir, path) = scratch();
    fs::write(&path, "# managed by hand\n").unwrap();
    let outputs = [output("Dell Inc. DELL U2415 (DP-3)", 0), output("eDP-1", 1920)];

    store(&path, &outputs, &StoreOptions::default()).unwrap();
    let first = read(&path);

    let outcome = store(&path, &outputs, &StoreOptions::default()).unwrap();
    assert!(matches!(outcome, StoreOutcome::Replaced { .. }));
    assert_eq!(read(&path), first);
}

#[test]
fn stored_layout_is_found_again() {
    let (_dir, path) = scratch();
    let outputs = [output("DP-1", 0), output("HDMI-A-1", 1920), output("eDP-1", 3840)];

    for naming in [OutputNaming::Connector, OutputNaming::Description] {
        let opts = StoreOptions {
            naming,
            profile_name: None,
        };
        store(&path, &outputs, &opts).unwrap();

        let found = find_profile(&path, &outputs, naming).unwrap();
        assert!(matches!(found, ScanOutcome::Matched(_)), "{naming:?}: {found:?}");
    }
}

#[test]
fn blocks_match_only_their_exact_set() {
    let (_dir, path) = scratch();
    let a = output("A", 0);
    let b = output("B", 1920);
    let c = output("C", 3840);

    store(&path, &[a.clone(), b.clone()], &StoreOptions::default()).unwrap();

    let naming = OutputNaming::Connector;
    assert_eq!(find_profile(&path, &[a.clone()], naming).unwrap(), ScanOutcome::Unmatched);
    assert_eq!(
        find_profile(&path, &[a.clone(), b.clone(), c.clone()], naming).unwrap(),
        ScanOutcome::Unmatched
    );

    // a superset request gets its own block, which never shadows {A, B}
    store(&path, &[a.clone(), b.clone(), c], &StoreOptions::default()).unwrap();
    match find_profile(&path, &[b, a], naming).unwrap() {
        ScanOutcome::Matched(m) => assert_eq!(m.start, 1),
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn replace_keeps_everything_outside_the_block() {
    let (_dir, path) = scratch();
    let before = "\
# global settings
output eDP-1 scale 2

profile laptop {
    output eDP-1 position 0,0 mode 2880x1800@90.0010 scale 2.00 transform normal
    exec notify-send laptop
}

profile docked {
    output \"X (DP-1)\" position 0,0 mode 1920x1080@60.0000 scale 1.00 transform normal
    output \"Y (HDMI-A-1)\" position 1920,0 mode 1920x1080@60.0000 scale 1.00 transform normal
}

# trailing comment
";
    fs::write(&path, before).unwrap();

    let outcome = store(
        &path,
        &[output("HDMI-A-1", 0), output("DP-1", 1920)],
        &StoreOptions::default(),
    )
    .unwrap();

    assert_eq!(
        outcome,
        StoreOutcome::Replaced {
            start: 9,
            end: 12,
            name: Some("docked".into()),
        }
    );

    let after = read(&path);
    let old: Vec<_> = before.lines().collect();
    let new: Vec<_> = after.lines().collect();
    assert_eq!(old.len(), new.len());
    for (i, (o, n)) in old.iter().zip(&new).enumerate() {
        if i == 9 || i == 10 {
            continue;
        }
        assert_eq!(o, n, "line {} changed", i + 1);
    }
    assert_eq!(
        new[9],
        "    output HDMI-A-1 position 0,0 mode 1920x1080@60.0000 scale 1.00 transform normal"
    );
    assert_eq!(
        new[10],
        "    output DP-1 position 1920,0 mode 1920x1080@60.0000 scale 1.00 transform normal"
    );
}

#[test]
fn quoted_block_matches_either_connection_order() {
    let block = "profile {\n    output \"X (DP-1)\" position 0,0\n    output \"Y (HDMI-A-1)\" position 1920,0\n}\n";

    for order in [["DP-1", "HDMI-A-1"], ["HDMI-A-1", "DP-1"]] {
        let (_dir, path) = scratch();
        fs::write(&path, block).unwrap();

        let outputs = [output(order[0], 0), output(order[1], 1920)];
        let opts = StoreOptions {
            naming: OutputNaming::Description,
            profile_name: None,
        };
        let outcome = store(&path, &outputs, &opts).unwrap();
        assert_eq!(
            outcome,
            StoreOutcome::Replaced {
                start: 1,
                end: 4,
                name: None,
            }
        );

        let text = read(&path);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "profile {");
        assert!(lines[1].starts_with(&format!("    output \"{}\" position 0,0", order[0])));
        assert!(lines[2].starts_with(&format!("    output \"{}\" position 1920,0", order[1])));
        assert_eq!(lines[3], "}");
    }
}

#[test]
fn interrupted_rewrite_leaves_config_intact() {
    let (_dir, path) = scratch();
    let outputs = [output("DP-1", 0)];
    store(&path, &outputs, &StoreOptions::default()).unwrap();
    let original = read(&path);

    let ScanOutcome::Matched(found) = find_profile(&path, &outputs, OutputNaming::Connector).unwrap()
    else {
        panic!("expected a match");
    };

    // temp file fully written, process "dies" before the rename
    let pending = stage_replacement(&path, &found, &["output DP-1 scale 3.00".to_string()]).unwrap();
    std::mem::forget(pending);
    assert!(temp_path_for(&path).exists());
    assert_eq!(read(&path), original);

    // the next run ignores the leftover and still applies cleanly
    let moved = [output("DP-1", 100)];
    store(&path, &moved, &StoreOptions::default()).unwrap();
    assert!(read(&path).contains("position 100,0"));
    assert!(!temp_path_for(&path).exists());
}

#[test]
fn too_many_outputs_writes_nothing() {
    let (_dir, path) = scratch();
    let outputs: Vec<_> = (0..=wdprofile_core::MAX_OUTPUTS)
        .map(|i| output(&format!("DP-{i}"), i as i32 * 1920))
        .collect();

    let err = store(&path, &outputs, &StoreOptions::default()).unwrap_err();

    assert!(matches!(err, StoreError::TooManyOutputs { .. }));
    assert!(!path.exists());
}

#[test]
fn no_outputs_writes_nothing() {
    let (_dir, path) = scratch();

    let err = store(&path, &[], &StoreOptions::default()).unwrap_err();

    assert!(matches!(err, StoreError::NoOutputs));
    assert!(!path.exists());
}

#[test]
fn named_profile_for_new_blocks() {
    let (_dir, path) = scratch();
    let opts = StoreOptions {
        naming: OutputNaming::Connector,
        profile_name: Some("desk".into()),
    };

    store(&path, &[output("DP-1", 0)], &opts).unwrap();
    let outcome = store(&path, &[output("DP-1", 0)], &opts).unwrap();

    assert_eq!(
        outcome,
        StoreOutcome::Replaced {
            start: 1,
            end: 3,
            name: Some("desk".into()),
        }
    );
    assert!(read(&path).starts_with("profile desk {\n"));
}

#[test]
fn awkward_names_are_stored_once_or_refused() {
    let (_dir, path) = scratch();

    store(&path, &[output("#1", 0)], &StoreOptions::default()).unwrap();
    let outcome = store(&path, &[output("#1", 0)], &StoreOptions::default()).unwrap();
    assert!(matches!(outcome, StoreOutcome::Replaced { .. }));
    assert_eq!(read(&path).matches("profile {").count(), 1);

    for name in ["", "a\"b c"] {
        let err = store(&path, &[output(name, 0)], &StoreOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::UnrepresentableOutput { .. }), "{name:?}: {err:?}");
    }
    assert_eq!(read(&path).matches("profile {").count(), 1);
}
