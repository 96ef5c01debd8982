use super::*;
use crate::assets::{
    library::{AssetDescriptor, Raster},
    memory::MemoryVideo,
};

fn sequence(frames: usize) -> AssetDescriptor {
    AssetDescriptor::image_sequence(vec![Raster::solid(2, 2, [0, 0, 0, 255]).unwrap(); frames])
        .unwrap()
}

fn video(duration_secs: f64, counted_at: u32) -> AssetDescriptor {
    let fps = Fps::whole(counted_at).unwrap();
    let handle = MemoryVideo::new(vec![Raster::solid(2, 2, [0; 4]).unwrap()], fps).unwrap();
    AssetDescriptor::video(2, 2, duration_secs, fps, Box::new(handle)).unwrap()
}

#[test]
fn video_rate_comes_from_stored_frame_count() {
    let mut lib = AssetLibrary::new();
    lib.insert('A', video(2.0, 24));
    let d = detect_frame_rate(&lib).unwrap();
    assert_eq!(d.fps, 24);
    assert_eq!(d.source, FpsSource::Video);
    assert_eq!(d.letter, 'A');
}

#[test]
fn equal_rate_is_reported_without_change() {
    let mut lib = AssetLibrary::new();
    lib.insert('A', video(2.0, 24));
    let mut settings = ProjectSettings {
        fps: Fps::whole(24).unwrap(),
        ..ProjectSettings::default()
    };
    let version = lib.version();
    let report = apply_frame_rate_detection(&mut settings, &mut lib);
    assert_eq!(
        report,
        FpsReport::Unchanged {
            fps: Fps::whole(24).unwrap(),
            source: FpsSource::Video
        }
    );
    assert_eq!(settings.fps, Fps::whole(24).unwrap());
    assert_eq!(lib.version(), version);
    assert_eq!(lib.get('A').unwrap().frame_count(), 48);
}

#[test]
fn changed_rate_recomputes_video_frame_counts() {
    let mut lib = AssetLibrary::new();
    lib.insert('A', video(2.0, 24));
    lib.insert('B', video(0.5, 24));
    let mut settings = ProjectSettings::default();
    assert_eq!(settings.fps, Fps::whole(30).unwrap());

    let report = apply_frame_rate_detection(&mut settings, &mut lib);
    assert_eq!(report.fps(), Fps::whole(24).unwrap());
    assert_eq!(report.to_string(), "Auto-detected: 24 FPS from clips");
    assert_eq!(settings.fps, Fps::whole(24).unwrap());
    assert_eq!(lib.get('A').unwrap().frame_count(), 48);
    assert_eq!(lib.get('B').unwrap().frame_count(), 12);
}

#[test]
fn video_beats_sequences_anywhere_in_the_library() {
    let mut lib = AssetLibrary::new();
    lib.insert('S', sequence(30));
    lib.insert('V', video(1.0, 60));
    let d = detect_frame_rate(&lib).unwrap();
    assert_eq!((d.fps, d.source, d.letter), (60, FpsSource::Video, 'V'));
}

#[test]
fn sequence_heuristics_prefer_24_over_12() {
    let mut lib = AssetLibrary::new();
    lib.insert('A', sequence(12));
    lib.insert('B', sequence(24));
    let d = detect_frame_rate(&lib).unwrap();
    assert_eq!((d.fps, d.letter), (24, 'B'));

    let mut lib = AssetLibrary::new();
    lib.insert('A', sequence(5));
    lib.insert('B', sequence(13));
    let d = detect_frame_rate(&lib).unwrap();
    assert_eq!((d.fps, d.source), (12, FpsSource::SequenceHeuristic));
}

#[test]
fn implausible_video_rate_is_ignored() {
    let mut lib = AssetLibrary::new();
    lib.insert('A', video(1.0, 240));
    lib.insert('B', sequence(3));
    assert_eq!(detect_frame_rate(&lib), None);
}

#[test]
fn nothing_conclusive_keeps_current_rate() {
    let mut lib = AssetLibrary::new();
    lib.insert('A', sequence(1));
    let mut settings = ProjectSettings::default();
    let report = apply_frame_rate_detection(&mut settings, &mut lib);
    assert_eq!(
        report,
        FpsReport::Default {
            fps: Fps::whole(30).unwrap()
        }
    );
    assert_eq!(report.to_string(), "Default: 30 FPS");
}
