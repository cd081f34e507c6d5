use yv_app::Action;
use yv_media::testing::{synthetic_frame, synthetic_stream};
use yv_media::{Picture, PixelFormat};
use yv_net::MemoryHub;
use yv_protocol::Command;

use crate::helpers::*;

#[test]
fn identical_streams_report_undefined_psnr() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let d = descriptor(PixelFormat::Iyuv);
    let mut p = player_with(
        PixelFormat::Iyuv,
        3,
        Some(synthetic_stream(&d, 3)),
        sync(&hub),
        ScriptedInput::actions([
            Action::Command(Command::Advance),
            Action::Command(Command::Retreat),
        ]),
    );
    p.run().unwrap();

    assert!(p.view().difference);
    assert_eq!(p.view().frame, 1);
    // First frame, advance and the re-read on retreat.
    assert_eq!(diagnostics(&p), "PSNR: NaN\n".repeat(3));

    let Picture::Planar { luma, cb, cr } = p.picture() else {
        panic!("expected a planar picture");
    };
    assert!(luma.iter().all(|&b| b == 0x80));
    assert!(cb.iter().all(|&b| b == 0x80));
    assert!(cr.iter().all(|&b| b == 0x80));
}

#[test]
fn offset_luma_shows_as_signed_difference() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let d = descriptor(PixelFormat::Iyuv);
    let secondary = synthetic_frame(&d, 5, 0x40, 0xC0);
    let mut p = player_with(
        PixelFormat::Iyuv,
        1,
        Some(secondary),
        sync(&hub),
        ScriptedInput::default(),
    );
    p.run().unwrap();

    assert!(p.store().luma().iter().all(|&b| b == 0x85));
    let out = diagnostics(&p);
    assert!(out.starts_with("PSNR: 34.18"), "{out}");
}

#[test]
fn short_secondary_ends_the_stream() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let d = descriptor(PixelFormat::Iyuv);
    let mut p = player_with(
        PixelFormat::Iyuv,
        3,
        Some(synthetic_stream(&d, 1)),
        sync(&hub),
        ScriptedInput::actions([
            Action::Command(Command::Advance),
            Action::Command(Command::Advance),
        ]),
    );
    p.run().unwrap();

    assert_eq!(p.view().frame, 1);
    assert_eq!(diagnostics(&p).lines().count(), 1);
    assert!(p.store().luma().iter().all(|&b| b == 0x80));
}

#[test]
fn histogram_printed_on_each_refresh() {
    init_test_tracing();
    let hub = MemoryHub::new();
    let mut p = player(2, &hub, ScriptedInput::default());
    p.apply(Action::Command(Command::Advance)).unwrap();
    assert!(diagnostics(&p).is_empty());

    p.apply(Action::ToggleHistogram).unwrap();
    p.apply(Action::Command(Command::Advance)).unwrap();

    let out = diagnostics(&p);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("Y,256,"));
    assert!(lines[1].starts_with("Cb,"));
    assert!(lines[2].starts_with("Cr,"));
    // Second frame: all luma samples are 1.
    assert!(lines[3].starts_with("Y,0,256,"));

    p.apply(Action::ToggleHistogram).unwrap();
    assert_eq!(diagnostics(&p), out);
}
