use super::*;

#[test]
fn pre_roll_shows_first_frame() {
    for frame_count in [1, 2, 30] {
        for hold in [false, true] {
            for g in 0..18 {
                assert_eq!(resolve_source_frame(frame_count, FrameIndex(g), 18, 5, hold), 0);
            }
        }
    }
}

#[test]
fn stagger_entrance_boundary() {
    assert_eq!(resolve_source_frame(10, FrameIndex(17), 18, 24, true), 0);
    assert_eq!(resolve_source_frame(10, FrameIndex(18), 18, 24, true), 0);
    assert_eq!(resolve_source_frame(10, FrameIndex(19), 18, 24, true), 1);
}

#[test]
fn hold_freezes_on_last_frame_after_duration() {
    for local in 24..200u64 {
        assert_eq!(resolve_source_frame(10, FrameIndex(local + 6), 6, 24, true), 9);
    }
}

#[test]
fn within_duration_loops_over_frame_count() {
    for local in 0..24u64 {
        let expect = (local % 7) as u32;
        assert_eq!(resolve_source_frame(7, FrameIndex(local), 0, 24, true), expect);
        assert_eq!(resolve_source_frame(7, FrameIndex(local), 0, 24, false), expect);
    }
}

#[test]
fn without_hold_keeps_looping_past_duration() {
    assert_eq!(resolve_source_frame(7, FrameIndex(30), 0, 24, false), 2);
}

#[test]
fn zero_duration_holds_immediately() {
    assert_eq!(resolve_source_frame(4, FrameIndex(0), 0, 0, true), 3);
}

#[test]
fn seek_time_wraps_at_native_duration() {
    let fps = Fps::whole(24).unwrap();
    assert_eq!(video_seek_time(12, fps, 2.0), 0.5);
    assert_eq!(video_seek_time(60, fps, 2.0), 0.5);
    assert_eq!(video_seek_time(3, fps, 0.0), 0.0);
}
