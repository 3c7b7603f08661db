mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{Rig, STORIES_UID, settings};
use jukecontrol::{CollectionId, RfidScanner, ScanOutcome};

fn scanner(rig: &Rig) -> RfidScanner {
    RfidScanner::new(
        Arc::clone(rig.jukebox.coordinator()),
        Arc::clone(rig.jukebox.now_playing()),
        rig.sounds.clone(),
        PathBuf::from("ping.mp3"),
        Duration::from_millis(20),
    )
}

#[test]
fn test_tag_starts_stories_end_to_end() {
    let mut rig = Rig::new(settings());
    rig.start();
    assert!(rig.wait_for_frame("Jukebox", ""));

    rig.tags.send(STORIES_UID.to_vec()).unwrap();

    assert!(rig.wait_for_frame("Stories", "Chapter 1"));
    assert!(rig.jukebox.coordinator().is_playing());
    assert!(rig.backend.is_backend_playing());
    assert_eq!(rig.sounds.count(), 1);

    let commands = rig.backend.commands();
    let switch = commands
        .iter()
        .position(|c| c == "stop")
        .expect("switch group");
    assert_eq!(
        commands[switch..],
        ["stop", "clear", "update", "add tag-01", "play"]
    );

    rig.jukebox.shutdown();
}

#[test]
fn test_sentinel_and_unknown_tags_are_ignored() {
    let rig = Rig::new(settings());
    let scanner = scanner(&rig);

    assert_eq!(scanner.handle_uid(&[0, 0, 0, 0]), ScanOutcome::Sentinel);
    assert_eq!(scanner.handle_uid(&[1, 2]), ScanOutcome::Invalid);
    assert!(matches!(
        scanner.handle_uid(&[1, 2, 3, 4]),
        ScanOutcome::Unmapped(uid) if uid.to_string() == "1,2,3,4"
    ));

    assert!(rig.backend.commands().is_empty());
    assert_eq!(rig.sounds.count(), 0);
}

#[test]
fn test_tag_with_check_byte_is_recognized() {
    let rig = Rig::new(settings());
    let scanner = scanner(&rig);

    let outcome = scanner.handle_uid(&[176, 223, 243, 121, 0x9f]);
    assert_eq!(outcome, ScanOutcome::Switched(CollectionId::from("tag-01")));

    let (line0, line1) = rig.jukebox.display().persistent_lines();
    assert_eq!(line0, "Stories");
    assert_eq!(line1, "Chapter 1");
    assert!(rig.jukebox.display().snapshot().scroll_enabled);
    assert_eq!(
        rig.jukebox.now_playing().last_track_id().as_deref(),
        Some("tag-01/01")
    );
}

#[test]
fn test_scanner_loop_exits_on_stop() {
    let mut rig = Rig::new(settings());
    rig.start();
    assert!(rig.jukebox.worker_names().contains(&"rfid"));

    rig.jukebox.shutdown();
    assert!(rig.jukebox.worker_names().is_empty());

    // the reader went away with its worker
    assert!(rig.tags.send(STORIES_UID.to_vec()).is_err());
}
