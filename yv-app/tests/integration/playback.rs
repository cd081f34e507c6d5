use yv_app::Action;
use yv_net::MemoryHub;

use crate::helpers::*;

#[test]
fn play_runs_to_end_of_stream() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(4, &hub, ScriptedInput::actions([Action::Play]));
    p.run().unwrap();

    assert_eq!(p.view().frame, 4);
    assert!(p.store().luma().iter().all(|&b| b == 3));
    // First frame, then one present per played frame.
    assert_eq!(p.sink().presented.len(), 4);
}

#[test]
fn local_event_stops_playback_and_is_consumed() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let input = ScriptedInput::new([Some(Action::Play), None, Some(Action::ToggleGrid)]);
    let mut p = player(6, &hub, input);
    p.run().unwrap();

    // Frames 2 and 3 played; the grid toggle only stopped playback.
    assert_eq!(p.view().frame, 3);
    assert!(!p.view().grid);
}

#[test]
fn close_during_playback_quits() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let input = ScriptedInput::new([
        Some(Action::Play),
        Some(Action::Close),
        Some(Action::Play),
    ]);
    let mut p = player(6, &hub, input);
    p.run().unwrap();

    assert_eq!(p.view().frame, 2);
}

#[test]
fn playback_is_paced() {
    use std::time::{Duration, Instant};

    use yv_app::{Player, PlayerConfig, Sources};
    use yv_media::testing::synthetic_stream;
    use yv_media::PixelFormat;

    init_test_tracing();
    let hub = MemoryHub::new();
    let d = descriptor(PixelFormat::Iyuv);
    let sources = Sources {
        primary: Box::new(std::io::Cursor::new(synthetic_stream(&d, 4))),
        secondary: None,
    };
    let config = PlayerConfig {
        frame_budget: Duration::from_millis(10),
        follower_poll: Duration::from_millis(1),
    };
    let mut p = Player::new(
        d,
        sources,
        sync(&hub),
        RecordingSink::default(),
        ScriptedInput::actions([Action::Play]),
        Vec::new(),
        config,
    )
    .unwrap();

    let started = Instant::now();
    p.run().unwrap();
    // Three played frames, each at least one budget long.
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(p.view().frame, 4);
}
