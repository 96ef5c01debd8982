use crate::{
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::{Canvas, Fps},
        error::{AnitypeError, AnitypeResult},
    },
    playback::source::{SweepSource, drive},
    render::pipeline::FrameRenderer,
    timing::timeline::Timeline,
};

/// Totals of a finished export sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExportSummary {
    pub frames: u64,
    pub fps: Fps,
    pub canvas: Canvas,
}

/// Eager export driver: renders every frame of the timeline, in order, straight into a sink.
///
/// Frame numbers come from a [`SweepSource`], never from the playback clock, so the output only
/// depends on project state.
#[derive(Clone, Copy, Debug)]
pub struct FrameSequencer {
    timeline: Timeline,
    fps: Fps,
    canvas: Canvas,
}

impl FrameSequencer {
    pub fn new(timeline: Timeline, fps: Fps, canvas: Canvas) -> Self {
        Self {
            timeline,
            fps,
            canvas,
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.timeline.total_frames
    }

    pub fn source(&self) -> SweepSource {
        SweepSource::upto(self.timeline.total_frames)
    }

    /// Render `[0, total_frames)` into `sink`.
    ///
    /// Fails if any frame comes back empty or with a different size than the canvas, since that
    /// would leave a gap in the output.
    #[tracing::instrument(skip(self, renderer, sink), fields(total = self.timeline.total_frames))]
    pub fn run<R>(&self, renderer: &mut R, sink: &mut dyn FrameSink) -> AnitypeResult<ExportSummary>
    where
        R: FrameRenderer + ?Sized,
    {
        let total = self.timeline.total_frames;
        sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
            total_frames: total,
        })?;

        let canvas = self.canvas;
        let step = (total / 10).max(1);
        let mut source = self.source();
        let pushed = drive(&mut source, renderer, |idx, frame| {
            if frame.width != canvas.width || frame.height != canvas.height {
                return Err(AnitypeError::encode(format!(
                    "frame {} is {}x{}, expected {}x{}",
                    idx.0, frame.width, frame.height, canvas.width, canvas.height
                )));
            }
            sink.push_frame(idx, frame)?;
            if (idx.0 + 1) % step == 0 {
                tracing::debug!(frame = idx.0 + 1, total, "export progress");
            }
            Ok(())
        })?;

        if pushed != total {
            return Err(AnitypeError::encode(format!(
                "export rendered {pushed} of {total} frames"
            )));
        }
        sink.end()?;
        tracing::info!(frames = total, fps = %self.fps, "export finished");

        Ok(ExportSummary {
            frames: total,
            fps: self.fps,
            canvas,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequencer.rs"]
mod tests;
