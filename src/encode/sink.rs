use crate::{
    foundation::{
        core::{Fps, FrameIndex},
        error::AnitypeResult,
    },
    render::surface::FrameRGBA,
};

/// Configuration provided to a [`FrameSink`] at the start of an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub total_frames: u64,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, starting
/// at 0, with no gaps.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> AnitypeResult<()>;
    /// Push one premultiplied frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AnitypeResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> AnitypeResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> AnitypeResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AnitypeResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> AnitypeResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Reject a frame index that does not directly follow `last`.
pub(crate) fn check_next_index(last: Option<FrameIndex>, idx: FrameIndex) -> AnitypeResult<()> {
    let expected = last.map_or(0, |l| l.0 + 1);
    if idx.0 != expected {
        return Err(crate::foundation::error::AnitypeError::encode(format!(
            "frame {} pushed out of order, expected {expected}",
            idx.0
        )));
    }
    Ok(())
}
