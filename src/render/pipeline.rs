use crate::{
    assets::library::AssetLibrary,
    foundation::{core::FrameIndex, error::AnitypeResult},
    project::settings::ProjectSettings,
    render::{
        cache::RenderCache,
        plan::RenderOutcome,
        surface::{CpuSurface, DrawStats, FrameRGBA, draw_plan},
    },
    timing::timeline::Timeline,
};

/// Anything that turns a global frame number into pixels.
///
/// Returns `None` when there is nothing to draw.
pub trait FrameRenderer {
    fn render_frame(&mut self, frame: FrameIndex) -> AnitypeResult<Option<&FrameRGBA>>;
}

/// Plan + draw into a reusable CPU surface.
///
/// Pipeline:
/// 1. layout and timeline, reused from [`RenderCache`] while text, settings and library are
///    unchanged
/// 2. per-letter source frames for `frame`
/// 3. [`draw_plan`], which seeks video handles and blits
#[derive(Debug, Default)]
pub struct Renderer {
    cache: RenderCache,
    surface: CpuSurface,
    has_frame: bool,
    last_stats: DrawStats,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer whose surface clears to `clear_rgba` instead of transparent.
    pub fn with_background(clear_rgba: [u8; 4]) -> Self {
        Self {
            surface: CpuSurface::new(clear_rgba),
            ..Self::default()
        }
    }

    pub fn plan(
        &mut self,
        settings: &ProjectSettings,
        library: &AssetLibrary,
        frame: FrameIndex,
    ) -> AnitypeResult<RenderOutcome> {
        self.cache.plan(settings, library, frame)
    }

    pub fn timeline(
        &mut self,
        settings: &ProjectSettings,
        library: &AssetLibrary,
    ) -> AnitypeResult<Option<Timeline>> {
        self.cache.timeline(settings, library)
    }

    /// Render `frame`, returning the surface contents or `None` for an empty composition.
    ///
    /// After an error or an empty outcome, [`Renderer::last_frame`] reports no frame.
    pub fn render(
        &mut self,
        settings: &ProjectSettings,
        library: &mut AssetLibrary,
        frame: FrameIndex,
    ) -> AnitypeResult<Option<&FrameRGBA>> {
        let outcome = self.cache.plan(settings, library, frame).inspect_err(|_| {
            self.has_frame = false;
            self.last_stats = DrawStats::default();
        })?;
        let plan = match outcome {
            RenderOutcome::Empty => {
                self.has_frame = false;
                self.last_stats = DrawStats::default();
                return Ok(None);
            }
            RenderOutcome::Frame(plan) => plan,
        };
        self.last_stats = draw_plan(&plan, library, &mut self.surface);
        self.has_frame = true;
        Ok(Some(self.surface.frame()))
    }

    /// Most recently rendered frame, if the last render had content.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.has_frame.then(|| self.surface.frame())
    }

    pub fn last_stats(&self) -> DrawStats {
        self.last_stats
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
