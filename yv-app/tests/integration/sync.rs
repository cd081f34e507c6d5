use yv_app::{Action, Flow};
use yv_media::PixelFormat;
use yv_net::{CommandTransport, MemoryHub};
use yv_protocol::{Command, Role};

use crate::helpers::*;

#[test]
fn follower_applies_remote_advance_without_echo() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut origin = sync(&hub);
    origin.switch_to(Role::Originator).unwrap();
    origin.emit(Command::Advance);
    origin.emit(Command::Advance);

    let mut follower = sync(&hub);
    follower.switch_to(Role::Follower).unwrap();
    let mut p = player_with(
        PixelFormat::Iyuv,
        4,
        None,
        follower,
        ScriptedInput::default(),
    );
    p.run().unwrap();

    // Initial frame plus one per remote advance.
    assert_eq!(p.view().frame, 3);
    assert!(p.store().luma().iter().all(|&b| b == 2));
    // Nothing was sent back onto the channel.
    assert_eq!(hub.pending(KEY), 0);
    // Leaving the follower role does not tear down the originator's channel.
    assert_eq!(p.sync().role(), Role::Inactive);
    assert!(hub.exists(KEY));
}

#[test]
fn follower_ignores_unknown_bytes() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut origin = sync(&hub);
    origin.switch_to(Role::Originator).unwrap();
    hub.inject(KEY, b'z').unwrap();
    origin.emit(Command::Advance);

    let mut follower = sync(&hub);
    follower.switch_to(Role::Follower).unwrap();
    let mut p = player_with(
        PixelFormat::Yuy2,
        3,
        None,
        follower,
        ScriptedInput::default(),
    );
    p.run().unwrap();

    assert_eq!(p.view().frame, 2);
}

#[test]
fn originator_mirrors_only_replicated_changes() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut origin = sync(&hub);
    origin.switch_to(Role::Originator).unwrap();
    let mut rx = hub.attach(KEY).unwrap();

    let input = ScriptedInput::actions([
        Action::Command(Command::Advance),
        Action::Command(Command::Retreat),
        // Already at frame 1: nothing changes, nothing is sent.
        Action::Command(Command::Retreat),
        Action::Command(Command::Rewind),
        Action::ToggleGrid,
        Action::ToggleHistogram,
        Action::Command(Command::ZoomIn),
        Action::SetRole(Role::Originator),
        Action::Command(Command::CbOnly),
    ]);
    let mut p = player_with(PixelFormat::Iyuv, 4, None, origin, input);
    p.run().unwrap();

    let expected: Vec<u8> = [
        Command::Advance,
        Command::Retreat,
        Command::ZoomIn,
        Command::CbOnly,
    ]
    .iter()
    .map(|c| c.to_byte())
    .collect();
    assert_eq!(drain(rx.as_mut()), expected);
    // Shutdown destroyed the channel.
    assert!(!hub.exists(KEY));
}

#[test]
fn quit_is_mirrored() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut origin = sync(&hub);
    origin.switch_to(Role::Originator).unwrap();
    let mut rx = hub.attach(KEY).unwrap();

    let mut p = player_with(
        PixelFormat::Iyuv,
        2,
        None,
        origin,
        ScriptedInput::actions([Action::Command(Command::Quit)]),
    );
    p.run().unwrap();

    assert_eq!(drain(rx.as_mut()), vec![Command::Quit.to_byte()]);
}

#[test]
fn failed_role_switch_keeps_previous_role() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(2, &hub, ScriptedInput::default());

    p.apply(Action::SetRole(Role::Follower)).unwrap();
    assert_eq!(p.view().role, Role::Inactive);

    p.apply(Action::SetRole(Role::Originator)).unwrap();
    assert_eq!(p.view().role, Role::Originator);
    assert!(hub.exists(KEY));

    p.apply(Action::SetRole(Role::Follower)).unwrap();
    assert_eq!(p.view().role, Role::Originator);

    p.run().unwrap();
    assert!(!hub.exists(KEY));
    assert_eq!(p.view().role, Role::Inactive);
}

#[test]
fn remote_command_stops_playback_and_is_applied() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut origin = sync(&hub);
    origin.switch_to(Role::Originator).unwrap();

    let mut p = player(5, &hub, ScriptedInput::default());
    p.apply(Action::SetRole(Role::Follower)).unwrap();
    p.apply(Action::Command(Command::Advance)).unwrap();
    assert_eq!(p.view().frame, 1);

    origin.emit(Command::Retreat);
    assert_eq!(p.apply(Action::Play).unwrap(), Flow::Continue);

    // One frame played, then the remote retreat stepped back.
    assert_eq!(p.view().frame, 1);
    assert!(p.store().luma().iter().all(|&b| b == 0));
    assert_eq!(hub.pending(KEY), 0);
}
