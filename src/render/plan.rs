use crate::{
    assets::library::{AssetKind, AssetLibrary},
    foundation::core::{Canvas, Fps, FrameIndex, Point},
    foundation::error::AnitypeResult,
    layout::text::{LayoutOutcome, TextLayout, layout_text},
    project::settings::ProjectSettings,
    timing::{
        frame_index::resolve_source_frame,
        timeline::{Timeline, resolve_timeline, stagger_offset},
    },
};

/// One blit request: which source frame of `letter` goes where.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LetterDraw {
    pub letter: char,
    pub kind: AssetKind,
    /// Top-left corner on the canvas.
    pub origin: Point,
    pub stagger_offset: u64,
    /// Index into the letter's source frames.
    pub source_frame: u32,
}

/// Everything needed to draw one global frame, computed without touching any video handle.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FramePlan {
    pub frame: FrameIndex,
    pub fps: Fps,
    pub canvas: Canvas,
    pub timeline: Timeline,
    /// Draw requests in reading order.
    pub draws: Vec<LetterDraw>,
}

/// Result of planning a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum RenderOutcome {
    /// The text has no drawable letter.
    Empty,
    Frame(FramePlan),
}

impl RenderOutcome {
    pub fn plan(&self) -> Option<&FramePlan> {
        match self {
            Self::Empty => None,
            Self::Frame(plan) => Some(plan),
        }
    }
}

/// Plan `frame` for the project text from scratch.
///
/// Layout, timeline and per-letter source frames are all pure functions of the inputs, so two
/// calls with the same arguments return equal plans.
#[tracing::instrument(skip(settings, library), fields(frame = frame.0))]
pub fn plan_frame(
    settings: &ProjectSettings,
    library: &AssetLibrary,
    frame: FrameIndex,
) -> AnitypeResult<RenderOutcome> {
    let layout = match layout_text(&settings.text, library, settings) {
        LayoutOutcome::Empty => return Ok(RenderOutcome::Empty),
        LayoutOutcome::Ready(layout) => layout,
    };
    let timeline = resolve_timeline(library, &layout, settings)?;
    Ok(RenderOutcome::Frame(plan_with(
        &layout, timeline, settings, library, frame,
    )))
}

/// Resolve per-letter source frames against an already computed layout and timeline.
pub fn plan_with(
    layout: &TextLayout,
    timeline: Timeline,
    settings: &ProjectSettings,
    library: &AssetLibrary,
    frame: FrameIndex,
) -> FramePlan {
    let draws = layout
        .letters()
        .filter_map(|placed| {
            let asset = library.get(placed.letter)?;
            let offset = stagger_offset(placed, settings);
            Some(LetterDraw {
                letter: placed.letter,
                kind: asset.kind(),
                origin: placed.origin,
                stagger_offset: offset,
                source_frame: resolve_source_frame(
                    asset.frame_count(),
                    frame,
                    offset,
                    timeline.duration_frames,
                    settings.hold_last_frame,
                ),
            })
        })
        .collect();

    FramePlan {
        frame,
        fps: settings.fps,
        canvas: layout.canvas,
        timeline,
        draws,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
