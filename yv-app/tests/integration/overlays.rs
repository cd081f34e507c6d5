use yv_app::{Action, DisplayRect};
use yv_media::{Picture, PixelFormat, PlaneSelection};
use yv_net::MemoryHub;
use yv_protocol::Command;

use crate::helpers::*;

fn planes(p: &TestPlayer) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    match p.picture() {
        Picture::Planar { luma, cb, cr } => (luma.clone(), cb.clone(), cr.clone()),
        Picture::Packed { .. } => panic!("expected a planar picture"),
    }
}

#[test]
fn isolation_flags_are_exclusive() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(2, &hub, ScriptedInput::default());
    p.apply(Action::Command(Command::Advance)).unwrap();
    p.apply(Action::Command(Command::Advance)).unwrap();

    p.apply(Action::Command(Command::LumaOnly)).unwrap();
    assert_eq!(p.view().planes, PlaneSelection::LumaOnly);

    p.apply(Action::Command(Command::CbOnly)).unwrap();
    assert_eq!(p.view().planes, PlaneSelection::CbOnly);
    let (luma, cb, cr) = planes(&p);
    assert!(luma.iter().all(|&b| b == 0x80));
    assert!(cb.iter().all(|&b| b == 0x41));
    assert!(cr.iter().all(|&b| b == 0x80));

    p.apply(Action::Command(Command::AllPlanes)).unwrap();
    assert_eq!(p.view().planes, PlaneSelection::All);
    let (luma, cb, cr) = planes(&p);
    assert!(luma.iter().all(|&b| b == 1));
    assert!(cb.iter().all(|&b| b == 0x41));
    assert!(cr.iter().all(|&b| b == 0xBF));

    // Decoded planes were never touched by the masks.
    assert!(p.store().luma().iter().all(|&b| b == 1));
}

#[test]
fn packed_isolation_masks_interleaved_bytes() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player_with(
        PixelFormat::Uyvy,
        1,
        None,
        sync(&hub),
        ScriptedInput::default(),
    );
    p.apply(Action::Command(Command::Advance)).unwrap();
    p.apply(Action::Command(Command::CrOnly)).unwrap();

    let Picture::Packed { raw } = p.picture() else {
        panic!("expected a packed picture");
    };
    // U Y V Y: only the V bytes keep their value.
    assert_eq!(&raw[..4], &[0x80, 0x80, 0xC0, 0x80]);
}

#[test]
fn grid_toggles_without_redecoding() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(2, &hub, ScriptedInput::default());
    p.apply(Action::Command(Command::Advance)).unwrap();

    p.apply(Action::ToggleGrid).unwrap();
    assert!(p.view().grid);
    let (luma, _, _) = planes(&p);
    assert_eq!(luma[0], 0xF0);

    p.apply(Action::ToggleGrid).unwrap();
    let (luma, _, _) = planes(&p);
    assert!(luma.iter().all(|&b| b == 0));
    assert_eq!(p.view().frame, 1);
}

#[test]
fn zoom_resizes_and_shrinking_clears_grid() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(1, &hub, ScriptedInput::default());
    p.apply(Action::Command(Command::Advance)).unwrap();
    p.apply(Action::ToggleGrid).unwrap();
    p.apply(Action::ToggleMacroblocks).unwrap();

    p.apply(Action::Command(Command::ZoomIn)).unwrap();
    assert_eq!(
        p.sink().resizes.last(),
        Some(&DisplayRect {
            width: 32,
            height: 32
        })
    );
    assert!(p.view().grid);

    p.apply(Action::Command(Command::ZoomOut)).unwrap();
    p.apply(Action::Command(Command::ZoomOut)).unwrap();
    assert_eq!(p.view().zoom, 0);
    assert!(!p.view().grid);
    assert!(!p.view().macroblocks);
    assert_eq!(
        p.sink().resizes.last(),
        Some(&DisplayRect {
            width: 8,
            height: 8
        })
    );

    let (_, rect) = p.sink().presented.last().unwrap();
    assert_eq!(rect.width, 8);
}

#[test]
fn expose_represents_without_decoding() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(3, &hub, ScriptedInput::default());
    p.apply(Action::Command(Command::Advance)).unwrap();
    let before = p.sink().presented.len();

    p.apply(Action::Expose).unwrap();
    assert_eq!(p.sink().presented.len(), before + 1);
    assert_eq!(p.view().frame, 1);
    let (last, _) = p.sink().presented.last().unwrap();
    assert_eq!(last, p.picture());
}

#[test]
fn macroblock_dump_on_click() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(1, &hub, ScriptedInput::default());
    p.apply(Action::Command(Command::Advance)).unwrap();

    // Off by default: clicks print nothing.
    p.apply(Action::Inspect { x: 3, y: 3 }).unwrap();
    assert!(diagnostics(&p).is_empty());

    p.apply(Action::ToggleMacroblocks).unwrap();
    p.apply(Action::Inspect { x: 3, y: 3 }).unwrap();
    let out = diagnostics(&p);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "MB #0");
    assert_eq!(lines[1], "= Y =");
    assert_eq!(lines[2], vec!["00"; 16].join(" "));
    assert!(out.contains("= Cb =\n40 40"));

    // Outside the frame.
    p.apply(Action::Inspect { x: 100, y: 0 }).unwrap();
    assert_eq!(diagnostics(&p), out);
}

#[test]
fn caption_follows_state() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(
        2,
        &hub,
        ScriptedInput::actions([
            Action::ToggleHistogram,
            Action::Command(Command::LumaOnly),
        ]),
    );
    p.run().unwrap();

    let captions = &p.sink().captions;
    assert_eq!(captions[0], " frame 1, size 16x16");
    assert_eq!(captions.last().unwrap(), "HY frame 1, size 16x16");
}
