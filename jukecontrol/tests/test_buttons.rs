mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{Rig, settings, wait_until};
use jukecontrol::{ButtonCode, CollectionId, DispatchOutcome, HiddenAction, NetworkProbe};
use jukeutils::NetworkSummary;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_volume_up_shows_scaled_percent() {
    let rig = Rig::new(settings());
    let dispatcher = rig.jukebox.dispatcher();
    let t0 = Instant::now();

    assert_eq!(
        dispatcher.on_edge(ButtonCode::VolumeUp, t0),
        DispatchOutcome::Default(ButtonCode::VolumeUp)
    );

    assert_eq!(rig.jukebox.coordinator().query_volume_percent().unwrap(), 62);
    let snapshot = rig.jukebox.display().snapshot();
    assert_eq!(snapshot.line0, "Lauter");
    assert_eq!(snapshot.line1, "Lautstärke: 24%");
    assert!(!snapshot.scroll_enabled);
    assert!(rig.jukebox.display().has_overlay());
}

#[test]
fn test_bounce_is_rejected_per_button() {
    let rig = Rig::new(settings());
    let dispatcher = rig.jukebox.dispatcher();
    let t0 = Instant::now();

    dispatcher.on_edge(ButtonCode::VolumeDown, t0);
    assert_eq!(
        dispatcher.on_edge(ButtonCode::VolumeDown, t0 + ms(100)),
        DispatchOutcome::Debounced
    );
    // another button is not affected
    assert_eq!(
        dispatcher.on_edge(ButtonCode::PlayPause, t0 + ms(100)),
        DispatchOutcome::Default(ButtonCode::PlayPause)
    );
    assert_eq!(
        dispatcher.on_edge(ButtonCode::VolumeDown, t0 + ms(350)),
        DispatchOutcome::Default(ButtonCode::VolumeDown)
    );
    assert_eq!(rig.jukebox.coordinator().query_volume_percent().unwrap(), 56);
}

#[test]
fn test_hidden_sequence_switches_collection_once() {
    let rig = Rig::new(settings());
    let dispatcher = rig.jukebox.dispatcher();
    let t0 = Instant::now();

    dispatcher.on_edge(ButtonCode::Prev, t0);
    dispatcher.on_edge(ButtonCode::PlayPause, t0 + ms(400));
    assert!(rig.jukebox.coordinator().is_playing());

    assert_eq!(
        dispatcher.on_edge(ButtonCode::Next, t0 + ms(800)),
        DispatchOutcome::Hidden(HiddenAction::NextCollection)
    );
    assert_eq!(
        rig.jukebox.coordinator().current_collection(),
        CollectionId::from("tag-02")
    );
    assert!(!rig.jukebox.coordinator().is_playing());
    assert_eq!(rig.sounds.count(), 1);
    assert_eq!(
        rig.jukebox.display().persistent_lines(),
        ("Songs".to_string(), "A song with a rather long title".to_string())
    );

    // the history was cleared: NEXT alone is a plain press again
    assert_eq!(
        dispatcher.on_edge(ButtonCode::Next, t0 + ms(1200)),
        DispatchOutcome::Default(ButtonCode::Next)
    );
    assert_eq!(
        rig.jukebox.coordinator().current_collection(),
        CollectionId::from("tag-02")
    );
}

#[test]
fn test_toggle_display_suppresses_writes() {
    let mut rig = Rig::new(settings());
    rig.start();
    assert!(rig.wait_for_frame("Jukebox", ""));
    let dispatcher = Arc::clone(rig.jukebox.dispatcher());
    let t0 = Instant::now();

    dispatcher.on_edge(ButtonCode::VolumeDown, t0);
    dispatcher.on_edge(ButtonCode::VolumeUp, t0 + ms(10));
    dispatcher.on_edge(ButtonCode::VolumeDown, t0 + ms(400));
    assert_eq!(
        dispatcher.on_edge(ButtonCode::VolumeUp, t0 + ms(410)),
        DispatchOutcome::Hidden(HiddenAction::ToggleDisplay)
    );
    assert!(!rig.jukebox.panel().is_enabled());
    assert_eq!(rig.surface.0.lock().backlight.last(), Some(&false));

    let frames = rig.surface.frame_count();
    rig.jukebox
        .display()
        .show_overlay("Lauter", "Lautstärke: 30%", ms(500));
    std::thread::sleep(ms(150));
    assert_eq!(rig.surface.frame_count(), frames);

    // the same gesture switches it back on and the overlay shows again
    dispatcher.on_edge(ButtonCode::VolumeDown, t0 + ms(1000));
    dispatcher.on_edge(ButtonCode::VolumeUp, t0 + ms(1010));
    dispatcher.on_edge(ButtonCode::VolumeDown, t0 + ms(1400));
    dispatcher.on_edge(ButtonCode::VolumeUp, t0 + ms(1410));
    assert!(rig.jukebox.panel().is_enabled());
    assert!(wait_until(Duration::from_secs(2), || {
        rig.surface.frame_count() > frames
    }));

    rig.jukebox.shutdown();
}

#[test]
fn test_network_info_overlay() {
    let probe: NetworkProbe = Arc::new(|| NetworkSummary {
        host_name: "jukebox".to_string(),
        ip: "192.168.1.20".to_string(),
    });
    let rig = Rig::with_probe(settings(), Some(probe));
    let dispatcher = rig.jukebox.dispatcher();
    let t0 = Instant::now();

    dispatcher.on_edge(ButtonCode::Next, t0);
    dispatcher.on_edge(ButtonCode::Prev, t0 + ms(400));
    dispatcher.on_edge(ButtonCode::Next, t0 + ms(800));
    assert_eq!(
        dispatcher.on_edge(ButtonCode::Prev, t0 + ms(1200)),
        DispatchOutcome::Hidden(HiddenAction::ShowNetworkInfo)
    );

    let snapshot = rig.jukebox.display().snapshot();
    assert_eq!(snapshot.line0, "jukebox");
    assert_eq!(snapshot.line1, "192.168.1.20");
}

#[test]
fn test_buttons_bound_to_configured_pins() {
    let mut rig = Rig::new(settings());
    rig.start();
    assert_eq!(rig.edges.pins(), vec![4, 17, 23, 24, 27]);

    rig.edges.press(4);
    assert!(rig.jukebox.coordinator().is_playing());
    assert!(rig.wait_for_frame("Stories", "Chapter 1"));

    rig.jukebox.shutdown();
    rig.edges.press(4);
    assert!(rig.jukebox.coordinator().is_playing());
}
