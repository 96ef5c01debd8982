use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use super::*;
use crate::{
    assets::library::{AssetDescriptor, AssetKind, VideoHandle},
    foundation::{
        core::{Fps, FrameIndex, Point},
        error::{AnitypeError, AnitypeResult},
    },
    project::settings::ProjectSettings,
    render::plan::{LetterDraw, plan_frame},
};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Video stub that counts seeks and optionally never has a frame ready.
struct CountingVideo {
    position: f64,
    seeks: Arc<AtomicU64>,
    frame: Option<Raster>,
}

impl VideoHandle for CountingVideo {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, secs: f64) -> AnitypeResult<()> {
        self.seeks.fetch_add(1, Ordering::SeqCst);
        self.position = secs;
        Ok(())
    }

    fn play(&mut self) -> AnitypeResult<()> {
        Err(AnitypeError::evaluation("not playable"))
    }

    fn pause(&mut self) {}

    fn current_frame(&self) -> Option<&Raster> {
        self.frame.as_ref()
    }
}

fn video(frame: Option<Raster>) -> (AssetDescriptor, Arc<AtomicU64>) {
    let seeks = Arc::new(AtomicU64::new(0));
    let handle = CountingVideo {
        position: 0.0,
        seeks: Arc::clone(&seeks),
        frame,
    };
    let asset = AssetDescriptor::video(
        2,
        2,
        1.0,
        Fps::whole(10).unwrap(),
        Box::new(handle),
    )
    .unwrap();
    (asset, seeks)
}

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

#[test]
fn begin_clears_to_background() {
    let mut s = CpuSurface::new([1, 2, 3, 4]);
    s.begin(canvas(3, 2));
    let f = s.frame();
    assert_eq!((f.width, f.height), (3, 2));
    assert_eq!(f.data.len(), 24);
    assert_eq!(f.pixel(2, 1), Some([1, 2, 3, 4]));
    assert_eq!(f.pixel(3, 0), None);
}

#[test]
fn blit_copies_and_clips() {
    let mut s = CpuSurface::default();
    s.begin(canvas(4, 4));
    s.blit(-1, -1, &Raster::solid(2, 2, RED).unwrap());
    s.blit(3, 3, &Raster::solid(5, 5, GREEN).unwrap());
    s.blit(10, 0, &Raster::solid(2, 2, BLUE).unwrap());
    let f = s.frame();
    assert_eq!(f.pixel(0, 0), Some(RED));
    assert_eq!(f.pixel(1, 0), Some([0; 4]));
    assert_eq!(f.pixel(1, 1), Some([0; 4]));
    assert_eq!(f.pixel(3, 3), Some(GREEN));
    assert_eq!(f.pixel(2, 3), Some([0; 4]));
}

#[test]
fn sequence_frames_are_drawn_at_planned_positions() {
    let mut lib = AssetLibrary::new();
    let frames = vec![
        Raster::solid(10, 10, RED).unwrap(),
        Raster::solid(10, 10, GREEN).unwrap(),
    ];
    lib.insert('A', AssetDescriptor::image_sequence(frames).unwrap());
    let settings = ProjectSettings {
        text: "A".into(),
        hold_last_frame: false,
        ..ProjectSettings::default()
    };

    let mut surface = CpuSurface::default();
    for (g, color) in [(0, RED), (1, GREEN), (2, RED)] {
        let out = plan_frame(&settings, &lib, FrameIndex(g)).unwrap();
        let stats = draw_plan(out.plan().unwrap(), &mut lib, &mut surface);
        assert_eq!(stats, DrawStats { drawn: 1, skipped: 0 });
        // 800 wide canvas, 10 px letter centred at x = 395, y = 50.
        assert_eq!(surface.frame().pixel(395, 50), Some(color));
        assert_eq!(surface.frame().pixel(394, 50), Some([0; 4]));
    }
}

#[test]
fn video_is_seeked_only_when_position_changes() {
    let mut lib = AssetLibrary::new();
    let (asset, seeks) = video(Some(Raster::solid(2, 2, BLUE).unwrap()));
    lib.insert('V', asset);
    let settings = ProjectSettings {
        text: "V".into(),
        fps: Fps::whole(10).unwrap(),
        ..ProjectSettings::default()
    };
    let mut surface = CpuSurface::default();

    let mut draw = |g: u64, lib: &mut AssetLibrary| {
        let out = plan_frame(&settings, lib, FrameIndex(g)).unwrap();
        draw_plan(out.plan().unwrap(), lib, &mut surface)
    };
    draw(0, &mut lib);
    assert_eq!(seeks.load(Ordering::SeqCst), 0);
    draw(3, &mut lib);
    draw(3, &mut lib);
    assert_eq!(seeks.load(Ordering::SeqCst), 1);
    assert_eq!(draw(4, &mut lib).drawn, 1);
    assert_eq!(seeks.load(Ordering::SeqCst), 2);
}

#[test]
fn unavailable_letters_are_skipped_without_aborting_the_frame() {
    let mut lib = AssetLibrary::new();
    let (asset, _) = video(None);
    lib.insert('V', asset);
    lib.insert(
        'A',
        AssetDescriptor::image_sequence(vec![Raster::solid(2, 2, RED).unwrap()]).unwrap(),
    );

    let plan = FramePlan {
        frame: FrameIndex(0),
        fps: Fps::whole(10).unwrap(),
        canvas: canvas(20, 20),
        timeline: crate::timing::timeline::Timeline {
            duration_frames: 1,
            total_frames: 1,
            last_global_index: 2,
        },
        draws: vec![
            LetterDraw {
                letter: 'V',
                kind: AssetKind::Video,
                origin: Point::new(0.0, 0.0),
                stagger_offset: 0,
                source_frame: 0,
            },
            LetterDraw {
                letter: 'A',
                kind: AssetKind::ImageSequence,
                origin: Point::new(5.0, 5.0),
                stagger_offset: 0,
                source_frame: 7,
            },
            LetterDraw {
                letter: 'A',
                kind: AssetKind::ImageSequence,
                origin: Point::new(10.4, 10.6),
                stagger_offset: 0,
                source_frame: 0,
            },
        ],
    };
    let mut surface = CpuSurface::default();
    let stats = draw_plan(&plan, &mut lib, &mut surface);
    assert_eq!(stats, DrawStats { drawn: 1, skipped: 2 });
    assert_eq!(surface.frame().pixel(10, 11), Some(RED));
    assert_eq!(surface.frame().pixel(5, 5), Some([0; 4]));
}
