use super::*;
use crate::{
    assets::library::{AssetDescriptor, Raster},
    project::settings::TimingMode,
    render::plan::plan_frame,
};

fn library(letters: &str) -> AssetLibrary {
    let mut lib = AssetLibrary::new();
    for c in letters.chars() {
        let frames = vec![Raster::solid(40, 60, [9, 9, 9, 255]).unwrap(); 5];
        lib.insert(c, AssetDescriptor::image_sequence(frames).unwrap());
    }
    lib
}

fn settings(text: &str) -> ProjectSettings {
    ProjectSettings {
        text: text.to_owned(),
        timing_mode: TimingMode::Stagger,
        stagger_frames: 3,
        ..ProjectSettings::default()
    }
}

#[test]
fn cached_plans_match_uncached_plans() {
    let lib = library("CAT");
    let s = settings("CAT\nTAC");
    let mut cache = RenderCache::new();
    for g in 0..40 {
        let cached = cache.plan(&s, &lib, FrameIndex(g)).unwrap();
        let fresh = plan_frame(&s, &lib, FrameIndex(g)).unwrap();
        assert_eq!(cached, fresh);
    }
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.hits(), 39);
}

#[test]
fn text_settings_and_library_changes_invalidate() {
    let mut lib = library("CAT");
    let mut s = settings("CAT");
    let mut cache = RenderCache::new();
    cache.plan(&s, &lib, FrameIndex(0)).unwrap();

    s.text = "TAC".to_owned();
    cache.plan(&s, &lib, FrameIndex(0)).unwrap();
    assert_eq!(cache.misses(), 2);

    s.spacing += 1;
    cache.plan(&s, &lib, FrameIndex(0)).unwrap();
    assert_eq!(cache.misses(), 3);

    lib.insert('S', AssetDescriptor::image_sequence(vec![Raster::solid(1, 1, [0; 4]).unwrap()]).unwrap());
    cache.plan(&s, &lib, FrameIndex(0)).unwrap();
    assert_eq!(cache.misses(), 4);

    cache.plan(&s, &lib, FrameIndex(9)).unwrap();
    assert_eq!(cache.misses(), 4);
    assert_eq!(cache.hits(), 1);
}

#[test]
fn fingerprint_ignores_text_but_tracks_other_settings() {
    let a = settings("ONE");
    let b = settings("TWO");
    assert_eq!(settings_fingerprint(&a), settings_fingerprint(&b));

    let c = ProjectSettings {
        hold_last_frame: false,
        ..a.clone()
    };
    assert_ne!(settings_fingerprint(&a), settings_fingerprint(&c));
}

#[test]
fn errors_are_not_cached() {
    let lib = library("A");
    let s = settings(&"A".repeat(150));
    let mut cache = RenderCache::new();
    assert!(cache.plan(&s, &lib, FrameIndex(0)).is_err());
    assert!(cache.plan(&s, &lib, FrameIndex(0)).is_err());
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.hits(), 0);
}

#[test]
fn empty_text_has_no_timeline() {
    let lib = library("A");
    let mut cache = RenderCache::new();
    assert_eq!(cache.timeline(&settings("zzz"), &lib).unwrap(), None);
    let t = cache.timeline(&settings("AA"), &lib).unwrap().unwrap();
    assert_eq!(t.duration_frames, 5);
    assert_eq!(t.total_frames, 3 + 5);
}

#[test]
fn every_library_mutation_keeps_cached_plans_fresh() {
    use crate::{assets::memory::MemoryVideo, foundation::core::Fps};

    let mut lib = library("AB");
    let fps = Fps::whole(30).unwrap();
    let clip = MemoryVideo::new(vec![Raster::solid(20, 20, [1, 1, 1, 255]).unwrap(); 10], fps)
        .unwrap();
    lib.insert(
        'V',
        AssetDescriptor::video(20, 20, 1.0, fps, Box::new(clip)).unwrap(),
    );
    let s = settings("AVB");
    let mut cache = RenderCache::new();

    let check = |cache: &mut RenderCache, lib: &AssetLibrary| {
        for g in [0u64, 4, 12] {
            let cached = cache.plan(&s, lib, FrameIndex(g)).unwrap();
            assert_eq!(cached, plan_frame(&s, lib, FrameIndex(g)).unwrap());
        }
    };
    check(&mut cache, &lib);

    lib.insert(
        'A',
        AssetDescriptor::image_sequence(vec![Raster::solid(300, 60, [0; 4]).unwrap()]).unwrap(),
    );
    check(&mut cache, &lib);

    lib.recompute_video_frame_counts(Fps::whole(60).unwrap());
    check(&mut cache, &lib);

    lib.handle_mut('V').unwrap().seek(0.25).unwrap();
    for handle in lib.video_handles_mut() {
        handle.pause();
    }
    check(&mut cache, &lib);

    lib.remove('B');
    check(&mut cache, &lib);

    lib.clear();
    assert_eq!(cache.plan(&s, &lib, FrameIndex(0)).unwrap(), RenderOutcome::Empty);
}
