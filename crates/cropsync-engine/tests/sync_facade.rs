// crates/cropsync-engine/tests/sync_facade.rs
//
// End-to-end behaviour through the public API only.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;

use cropsync_core::helpers::time::{format_clock, format_progress, progress_fraction};
use cropsync_core::media_types::{FrameSize, VideoFrame};
use cropsync_engine::feed::FeedMessage;
use cropsync_engine::{
    feed_channel, AspectRatio, CropCommand, CropError, EngineConfig, MemorySource, PreviewSurface,
    RgbaSurface, SyncFacade,
};

const EPS: f64 = 1e-6;

fn loaded_facade() -> SyncFacade<RgbaSurface> {
    let mut f = SyncFacade::new(EngineConfig::default(), RgbaSurface::new(FrameSize::new(1, 1)));
    f.attach_source(Box::new(MemorySource::loaded(
        VideoFrame::solid(1920, 1080, 0.0, [30, 60, 90, 255]),
        120.0,
    )));
    f.pump_source();
    f
}

#[test]
fn nine_sixteen_on_640x360_then_stop() {
    let mut f = loaded_facade();
    let r = f.start_cropper().expect("cropper starts");

    // Height-bound, centered, exact ratio.
    assert!((r.height - 360.0).abs() < EPS);
    assert!((r.width / r.height - 9.0 / 16.0).abs() < EPS);
    assert!((r.x + r.width / 2.0 - 320.0).abs() < EPS);
    assert_eq!(r.y, 0.0);

    let handle = f.active_render_handle().cloned().expect("live preview running");
    assert_eq!(f.on_display_frame(), 1);
    assert_eq!(f.on_display_frame(), 1);

    assert!(f.stop_cropper());
    assert!(handle.is_cancelled());
    let painted = f.surface().draw_count();
    for _ in 0..5 {
        assert_eq!(f.on_display_frame(), 0);
    }
    assert_eq!(f.surface().draw_count(), painted);
    assert!(!f.snapshot().cropping);
    assert!(!f.snapshot().preview_active);
}

#[test]
fn restarting_preview_leaves_one_painter() {
    let mut f = loaded_facade();
    f.start_cropper().unwrap();
    f.on_display_frame();
    // Toggle rapidly; every stale request must be dropped, not painted.
    f.disable_preview();
    f.enable_preview();
    f.disable_preview();
    f.enable_preview();

    let before = f.surface().draw_count();
    let frames = 10;
    let painted: usize = (0..frames).map(|_| f.on_display_frame()).sum();
    assert_eq!(painted, frames);
    assert_eq!(f.surface().draw_count() - before, frames as u64);
    assert_eq!(f.render_loop().pending_frames(), 1);
}

#[test]
fn drag_moves_region_by_exact_delta() {
    let mut f = SyncFacade::new(EngineConfig::default(), RgbaSurface::new(FrameSize::new(64, 36)));
    f.set_aspect_ratio(4.0 / 3.0).unwrap();
    f.start_cropper().unwrap();

    // Walk the region to (50, 50, 200, 150) through the public pointer API.
    let r = f.crop_region().unwrap();
    assert!(f.pointer_down(r.x + r.width - 3.0, r.y + r.height - 3.0));
    f.pointer_move(r.x + 200.0, r.y + 150.0);
    f.pointer_up();
    let r = f.crop_region().unwrap();
    assert!((r.width - 200.0).abs() < EPS && (r.height - 150.0).abs() < EPS, "{r:?}");
    assert!(f.pointer_down(r.x + 100.0, r.y + 75.0));
    f.pointer_move(50.0 + 100.0, 50.0 + 75.0);
    f.pointer_up();
    let r = f.crop_region().unwrap();
    assert!((r.x - 50.0).abs() < EPS && (r.y - 50.0).abs() < EPS, "{r:?}");

    assert!(f.pointer_down(100.0, 100.0));
    let moved = f.pointer_move(120.0, 130.0).unwrap();
    assert!((moved.x - 70.0).abs() < EPS && (moved.y - 80.0).abs() < EPS);
    assert!((moved.width - 200.0).abs() < EPS && (moved.height - 150.0).abs() < EPS);
}

#[test]
fn huge_drags_never_escape_container() {
    let mut f = loaded_facade();
    f.start_cropper().unwrap();
    let deltas = [(5000.0, 0.0), (-9000.0, 300.0), (1.0, -1e7), (333.3, 777.7)];
    let (mut px, mut py) = (320.0, 180.0);
    assert!(f.pointer_down(px, py));
    for (dx, dy) in deltas {
        px += dx;
        py += dy;
        let r = f.pointer_move(px, py).unwrap();
        assert!(r.satisfies_invariants(f.container(), EPS), "{r:?}");
    }
    assert!(f.pointer_cancel());
}

#[test]
fn rate_three_is_rejected_and_previous_kept() {
    let mut f = loaded_facade();
    assert_eq!(f.set_playback_rate(2.0), Ok(true));
    assert_eq!(f.apply(CropCommand::SetPlaybackRate(3.0)), Err(CropError::InvalidPlaybackRate(3.0)));
    assert_eq!(f.playback_state().playback_rate.value(), 2.0);
}

#[test]
fn time_text_handles_unknown_duration() {
    assert_eq!(format_clock(125.0), "2:05");
    assert_eq!(format_clock(0.0), "0:00");
    assert_eq!(format_progress(0.0, 0.0), "0:00 / 0:00");
    assert_eq!(progress_fraction(10.0, 0.0), 0.0);

    let f = SyncFacade::new(EngineConfig::default(), RgbaSurface::new(FrameSize::new(8, 8)));
    assert_eq!(f.progress_text(), "0:00 / 0:00");
}

#[test]
fn time_subscribers_follow_source_cadence() {
    let mut f = loaded_facade();
    let times = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&times);
    let id = f.on_time_advance(move |s| sink.borrow_mut().push(s.current_time));

    f.seek(65.0);
    // Display frames alone never fire time callbacks.
    f.start_cropper().unwrap();
    f.on_display_frame();
    assert!(times.borrow().is_empty());

    f.pump_source();
    assert_eq!(*times.borrow(), vec![65.0]);
    assert_eq!(f.progress_text(), "1:05 / 2:00");
    assert!(f.unsubscribe_time(id));
    assert!(!f.unsubscribe_time(id));
}

#[test]
fn commands_drive_the_whole_session() {
    let mut f = loaded_facade();
    let cmds = [
        CropCommand::SetAspectPreset(AspectRatio::OneOne),
        CropCommand::StartCropper,
        CropCommand::PointerDown { x: 320.0, y: 180.0 },
        CropCommand::PointerMove { x: 200.0, y: 180.0 },
        CropCommand::PointerLeave,
        CropCommand::Play,
        CropCommand::SetVolume(2.0),
        CropCommand::GenerateStaticPreview,
    ];
    for cmd in cmds {
        f.apply(cmd).unwrap();
    }
    let r = f.crop_region().unwrap();
    assert_eq!((r.x, r.width, r.height), (20.0, 360.0, 360.0));
    assert!(f.playback_state().is_playing);
    assert_eq!(f.playback_state().volume, 1.0);
    let still = f.take_static_preview().unwrap();
    assert_eq!((still.width, still.height), (1080, 1080));

    f.apply(CropCommand::StopCropper).unwrap();
    assert_eq!(f.apply(CropCommand::GenerateStaticPreview), Err(CropError::CropperInactive));
}

#[test]
fn container_relayout_rescales_region() {
    let mut f = loaded_facade();
    f.start_cropper().unwrap();
    f.set_container_size(1280.0, 720.0).unwrap();
    let r = f.crop_region().unwrap();
    assert!((r.height - 720.0).abs() < EPS);
    assert!((r.x - 437.5).abs() < EPS);
    assert!(r.satisfies_invariants(f.container(), EPS));
}

#[test]
fn dropping_facade_cancels_live_preview() {
    let mut f = loaded_facade();
    f.start_cropper().unwrap();
    let handle = f.active_render_handle().cloned().unwrap();
    drop(f);
    assert!(handle.is_cancelled());
}

#[test]
fn feed_source_from_decoder_thread() {
    let (source, producer) = feed_channel(8);
    let decoder = thread::spawn(move || {
        producer.send_metadata(320, 180, 4.0);
        producer.send_frame(VideoFrame::solid(320, 180, 0.0, [1, 1, 1, 255]));
        producer.send(FeedMessage::Time { current: 0.5, duration: 4.0 });
        producer
    });
    let producer = decoder.join().unwrap();

    let mut f = SyncFacade::new(EngineConfig::default(), RgbaSurface::new(FrameSize::new(1, 1)));
    f.attach_source(Box::new(source));
    f.pump_source();
    assert_eq!(f.surface().size(), FrameSize::new(640, 360));
    assert_eq!(f.playback_state().duration, 4.0);
    assert_eq!(f.playback_state().current_time, 0.5);

    f.start_cropper().unwrap();
    assert_eq!(f.on_display_frame(), 1);

    // Transport requests reach the decoder side.
    f.play();
    f.seek(2.0);
    let cmds = producer.drain_commands();
    assert!(cmds.len() >= 2, "{cmds:?}");
}
