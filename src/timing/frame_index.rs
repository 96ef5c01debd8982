use crate::foundation::core::{Fps, FrameIndex};

/// Source frame to show for a letter at `frame`.
///
/// Before the letter's entrance the first frame is shown. Once `duration_frames` have elapsed
/// and `hold_last_frame` is set, the final frame is frozen; otherwise the clip loops.
pub fn resolve_source_frame(
    frame_count: u32,
    frame: FrameIndex,
    stagger_offset: u64,
    duration_frames: u64,
    hold_last_frame: bool,
) -> u32 {
    let frame_count = frame_count.max(1);
    let local = frame.local_to(stagger_offset);
    if local < 0 {
        return 0;
    }
    let local = local as u64;
    if local >= duration_frames && hold_last_frame {
        return frame_count - 1;
    }
    (local % u64::from(frame_count)) as u32
}

/// Seek position for a video letter showing source frame `index`.
pub fn video_seek_time(index: u32, fps: Fps, duration_secs: f64) -> f64 {
    let t = fps.frames_to_secs(u64::from(index));
    if duration_secs > 0.0 { t % duration_secs } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/frame_index.rs"]
mod tests;
