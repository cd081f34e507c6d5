use yv_app::{Action, Flow};
use yv_net::MemoryHub;
use yv_protocol::Command;

use crate::helpers::*;

fn step(p: &mut TestPlayer, command: Command) -> Flow {
    p.apply(Action::Command(command)).unwrap()
}

fn luma_is(p: &TestPlayer, value: u8) -> bool {
    p.store().luma().iter().all(|&b| b == value)
}

#[test]
fn retreat_and_rewind_redecode() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(5, &hub, ScriptedInput::default());

    for _ in 0..3 {
        step(&mut p, Command::Advance);
    }
    assert_eq!(p.view().frame, 3);
    assert!(luma_is(&p, 2));

    step(&mut p, Command::Retreat);
    assert_eq!(p.view().frame, 2);
    assert!(luma_is(&p, 1));

    // The next advance continues from the re-read frame.
    step(&mut p, Command::Advance);
    assert_eq!(p.view().frame, 3);
    assert!(luma_is(&p, 2));

    step(&mut p, Command::Rewind);
    assert_eq!(p.view().frame, 1);
    assert!(luma_is(&p, 0));
}

#[test]
fn retreat_and_rewind_stop_at_first_frame() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(3, &hub, ScriptedInput::default());
    step(&mut p, Command::Advance);
    let presented = p.sink().presented.len();

    assert_eq!(step(&mut p, Command::Retreat), Flow::Continue);
    assert_eq!(step(&mut p, Command::Rewind), Flow::Continue);
    assert_eq!(p.view().frame, 1);
    assert_eq!(p.sink().presented.len(), presented);
}

#[test]
fn advance_past_end_keeps_last_frame() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(2, &hub, ScriptedInput::default());

    for _ in 0..4 {
        step(&mut p, Command::Advance);
    }
    assert_eq!(p.view().frame, 2);
    assert!(luma_is(&p, 1));
    assert!(p.store().cb().iter().all(|&b| b == 0x41));

    // Overlays still compose from the intact last frame.
    p.apply(Action::ToggleGrid).unwrap();
    step(&mut p, Command::Retreat);
    assert_eq!(p.view().frame, 1);
    assert!(luma_is(&p, 0));
}

#[test]
fn empty_stream_shows_nothing() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(0, &hub, ScriptedInput::default());
    p.run().unwrap();
    assert_eq!(p.view().frame, 0);
}

#[test]
fn quit_ends_the_loop() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(
        3,
        &hub,
        ScriptedInput::actions([
            Action::Command(Command::Quit),
            Action::Command(Command::Advance),
        ]),
    );
    p.run().unwrap();
    assert_eq!(p.view().frame, 1);
}

#[test]
fn close_ends_the_loop() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(
        3,
        &hub,
        ScriptedInput::actions([Action::Close, Action::Command(Command::Advance)]),
    );
    p.run().unwrap();
    assert_eq!(p.view().frame, 1);
}
