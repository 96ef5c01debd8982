use super::*;
use crate::{
    assets::{
        library::{AssetDescriptor, AssetSource, Raster, VideoHandle},
        memory::MemoryVideo,
    },
    foundation::core::Fps,
    playback::source::Limit,
};

fn library_with_video() -> AssetLibrary {
    let fps = Fps::whole(10).unwrap();
    let frames = vec![Raster::solid(2, 2, [0, 0, 0, 255]).unwrap(); 10];
    let mut video = MemoryVideo::new(frames, fps).unwrap();
    video.seek(0.7).unwrap();
    let mut lib = AssetLibrary::new();
    lib.insert(
        'V',
        AssetDescriptor::video(2, 2, 1.0, fps, Box::new(video)).unwrap(),
    );
    lib
}

fn video_time(lib: &AssetLibrary) -> f64 {
    match lib.get('V').unwrap().source() {
        AssetSource::Video { handle, .. } => handle.current_time(),
        AssetSource::ImageSequence { .. } => unreachable!(),
    }
}

#[test]
fn ticks_only_advance_while_playing() {
    let mut lib = AssetLibrary::new();
    let mut c = PlaybackController::new();
    assert_eq!(c.tick(), None);
    c.start(&mut lib);
    assert_eq!(c.tick(), Some(FrameIndex(1)));
    assert_eq!(c.tick(), Some(FrameIndex(2)));
    assert_eq!(c.global_frame(), FrameIndex(2));
}

#[test]
fn stop_keeps_frame_and_start_rewinds() {
    let mut lib = library_with_video();
    let mut c = PlaybackController::new();
    c.start(&mut lib);
    assert_eq!(video_time(&lib), 0.0);
    for _ in 0..5 {
        c.tick();
    }
    c.stop(&mut lib);
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.global_frame(), FrameIndex(5));
    assert_eq!(c.tick(), None);

    assert_eq!(c.toggle(&mut lib), PlaybackState::Playing);
    assert_eq!(c.global_frame(), FrameIndex(0));
    assert_eq!(c.tick(), Some(FrameIndex(1)));
}

#[test]
fn reset_stops_at_frame_zero() {
    let mut lib = library_with_video();
    let mut c = PlaybackController::new();
    c.start(&mut lib);
    c.tick();
    c.tick();
    c.reset(&mut lib);
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.global_frame(), FrameIndex(0));

    c.reset(&mut lib);
    assert_eq!(c.global_frame(), FrameIndex(0));
}

#[test]
fn controller_is_a_frame_source() {
    let mut lib = AssetLibrary::new();
    let mut c = PlaybackController::new();
    c.start(&mut lib);
    let mut limited = Limit::new(&mut c, 3);
    let mut frames = Vec::new();
    while let Some(f) = limited.next_frame() {
        frames.push(f.0);
    }
    assert_eq!(frames, vec![1, 2, 3]);
}
