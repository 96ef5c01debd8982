use crate::{
    foundation::{core::FrameIndex, error::AnitypeResult},
    render::{pipeline::FrameRenderer, surface::FrameRGBA},
};

/// Producer of global frame numbers for a render loop.
///
/// Real-time playback pulls one frame per host tick; export pulls an exhaustive sweep.
pub trait FrameSource {
    /// Next frame to render, or `None` once the source is exhausted or idle.
    fn next_frame(&mut self) -> Option<FrameIndex>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> Option<FrameIndex> {
        (**self).next_frame()
    }
}

/// Every frame in `[start, end)` in increasing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepSource {
    next: u64,
    end: u64,
}

impl SweepSource {
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            next: start,
            end: end.max(start),
        }
    }

    /// Sweep `[0, total_frames)`.
    pub fn upto(total_frames: u64) -> Self {
        Self::new(0, total_frames)
    }

    pub fn remaining(&self) -> u64 {
        self.end - self.next
    }
}

impl FrameSource for SweepSource {
    fn next_frame(&mut self) -> Option<FrameIndex> {
        if self.next >= self.end {
            return None;
        }
        let f = FrameIndex(self.next);
        self.next += 1;
        Some(f)
    }
}

/// Stop `inner` after at most `limit` frames.
#[derive(Debug)]
pub struct Limit<S> {
    inner: S,
    remaining: u64,
}

impl<S: FrameSource> Limit<S> {
    pub fn new(inner: S, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }
}

impl<S: FrameSource> FrameSource for Limit<S> {
    fn next_frame(&mut self) -> Option<FrameIndex> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next_frame()
    }
}

/// The render loop shared by playback and export.
///
/// Pulls frames from `source` until it is exhausted, renders each one and hands non-empty
/// results to `consume`. Returns the number of frames consumed.
pub fn drive<S, R, F>(source: &mut S, renderer: &mut R, mut consume: F) -> AnitypeResult<u64>
where
    S: FrameSource + ?Sized,
    R: FrameRenderer + ?Sized,
    F: FnMut(FrameIndex, &FrameRGBA) -> AnitypeResult<()>,
{
    let mut consumed = 0u64;
    while let Some(frame) = source.next_frame() {
        if let Some(pixels) = renderer.render_frame(frame)? {
            consume(frame, pixels)?;
            consumed += 1;
        }
    }
    Ok(consumed)
}
