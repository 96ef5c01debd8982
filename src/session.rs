//! Single control-thread owner of project state.
//!
//! [`Studio`] ties the library, settings, playback clock and renderer together so that the two
//! frame drivers (host ticks and the export sweep) never run at the same time.

use std::path::{Path, PathBuf};

use crate::{
    assets::{
        library::AssetLibrary,
        loader::{LoadReport, discover_font_packs, load_files},
    },
    encode::{
        naming::{ExportNames, sanitize_filename},
        sequencer::{ExportSummary, FrameSequencer},
        sink::FrameSink,
    },
    foundation::{
        core::{Fps, FrameIndex},
        error::{AnitypeError, AnitypeResult},
    },
    layout::text::{LayoutOutcome, drawable_lines, layout_text},
    playback::{
        controller::{PlaybackController, PlaybackState},
        source::{Limit, drive},
    },
    project::settings::ProjectSettings,
    render::{
        pipeline::{FrameRenderer, Renderer},
        plan::RenderOutcome,
        surface::FrameRGBA,
    },
    timing::{
        fps::{FpsReport, apply_frame_rate_detection},
        timeline::{Timeline, resolve_duration},
    },
};

/// Result of replacing the letter library.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryLoad {
    pub report: LoadReport,
    pub fps: FpsReport,
}

/// Interactive session: one project, one library, one playback clock.
#[derive(Debug)]
pub struct Studio {
    settings: ProjectSettings,
    library: AssetLibrary,
    controller: PlaybackController,
    renderer: Renderer,
    export_names: ExportNames,
}

/// Borrowed view used as the render target of a frame source.
struct Stage<'a> {
    settings: &'a ProjectSettings,
    library: &'a mut AssetLibrary,
    renderer: &'a mut Renderer,
}

impl FrameRenderer for Stage<'_> {
    fn render_frame(&mut self, frame: FrameIndex) -> AnitypeResult<Option<&FrameRGBA>> {
        self.renderer.render(self.settings, self.library, frame)
    }
}

impl Studio {
    pub fn new(settings: ProjectSettings) -> Self {
        Self::with_library(settings, AssetLibrary::new())
    }

    pub fn with_library(settings: ProjectSettings, library: AssetLibrary) -> Self {
        Self {
            settings,
            library,
            controller: PlaybackController::new(),
            renderer: Renderer::new(),
            export_names: ExportNames::new(),
        }
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Mutable settings. A changed `fps` re-derives video frame counts before the next
    /// render, plan or export; [`Studio::set_fps`] does it immediately.
    pub fn settings_mut(&mut self) -> &mut ProjectSettings {
        &mut self.settings
    }

    /// Switch the project rate and re-derive every video's frame count at it.
    pub fn set_fps(&mut self, fps: Fps) {
        self.settings.fps = fps;
        self.library.recompute_video_frame_counts(fps);
    }

    /// Bring video frame counts in line with the project rate if they were derived at another.
    fn sync_frame_counts(&mut self) {
        if self.library.counted_at() != Some(self.settings.fps) {
            self.library.recompute_video_frame_counts(self.settings.fps);
        }
    }

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut AssetLibrary {
        &mut self.library
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn global_frame(&self) -> FrameIndex {
        self.controller.global_frame()
    }

    /// Replace the library with the letters decoded from `files`, then re-detect the frame rate.
    pub fn load_library(&mut self, files: &[PathBuf]) -> LibraryLoad {
        let report = load_files(files, self.settings.fps, &mut self.library);
        let fps = self.detect_frame_rate();
        LibraryLoad { report, fps }
    }

    /// Load a font pack variant (or loose files) found under `root`.
    pub fn load_directory(
        &mut self,
        root: &Path,
        pack: Option<&str>,
        variant: Option<&str>,
    ) -> AnitypeResult<LibraryLoad> {
        let files = discover_font_packs(root)?.select(pack, variant)?;
        Ok(self.load_library(&files))
    }

    pub fn detect_frame_rate(&mut self) -> FpsReport {
        apply_frame_rate_detection(&mut self.settings, &mut self.library)
    }

    pub fn start(&mut self) {
        self.controller.start(&mut self.library);
    }

    pub fn stop(&mut self) {
        self.controller.stop(&mut self.library);
    }

    pub fn toggle_play(&mut self) -> PlaybackState {
        self.controller.toggle(&mut self.library)
    }

    /// One host animation tick: advance the clock and draw the new frame.
    ///
    /// Returns the frame drawn, or `None` when stopped or when the text has nothing to draw.
    pub fn tick(&mut self) -> AnitypeResult<Option<FrameIndex>> {
        self.sync_frame_counts();
        let mut stage = Stage {
            settings: &self.settings,
            library: &mut self.library,
            renderer: &mut self.renderer,
        };
        let mut drawn = None;
        drive(
            &mut Limit::new(&mut self.controller, 1),
            &mut stage,
            |idx, _| {
                drawn = Some(idx);
                Ok(())
            },
        )?;
        Ok(drawn)
    }

    /// Stop, rewind to frame 0 and draw it.
    pub fn reset(&mut self) -> AnitypeResult<Option<&FrameRGBA>> {
        self.controller.reset(&mut self.library);
        self.render_frame(FrameIndex(0))
    }

    /// Draw an explicit frame, independent of the playback clock.
    pub fn render_frame(&mut self, frame: FrameIndex) -> AnitypeResult<Option<&FrameRGBA>> {
        self.sync_frame_counts();
        self.renderer.render(&self.settings, &mut self.library, frame)
    }

    /// Plan a frame without drawing it.
    pub fn plan_frame(&mut self, frame: FrameIndex) -> AnitypeResult<RenderOutcome> {
        self.sync_frame_counts();
        self.renderer.plan(&self.settings, &self.library, frame)
    }

    /// Most recently drawn frame.
    pub fn current_frame(&self) -> Option<&FrameRGBA> {
        self.renderer.last_frame()
    }

    pub fn timeline(&mut self) -> AnitypeResult<Option<Timeline>> {
        self.sync_frame_counts();
        self.renderer.timeline(&self.settings, &self.library)
    }

    /// Render the whole timeline into `sink`.
    ///
    /// Playback is stopped for the duration of the sweep and restarted from frame 0 afterwards
    /// if it was running.
    pub fn export(&mut self, sink: &mut dyn FrameSink) -> AnitypeResult<ExportSummary> {
        let was_playing = self.controller.is_playing();
        if was_playing {
            self.controller.stop(&mut self.library);
        }
        let result = self.export_stopped(sink);
        if was_playing {
            self.controller.start(&mut self.library);
        }
        result
    }

    fn export_stopped(&mut self, sink: &mut dyn FrameSink) -> AnitypeResult<ExportSummary> {
        self.sync_frame_counts();
        let outcome = self
            .renderer
            .plan(&self.settings, &self.library, FrameIndex(0))?;
        let Some(plan) = outcome.plan() else {
            return Err(AnitypeError::validation(
                "nothing to export: no letter of the text is in the library",
            ));
        };
        let sequencer = FrameSequencer::new(plan.timeline, plan.fps, plan.canvas);
        let mut stage = Stage {
            settings: &self.settings,
            library: &mut self.library,
            renderer: &mut self.renderer,
        };
        sequencer.run(&mut stage, sink)
    }

    /// Session-unique export file name derived from the project text.
    pub fn export_file_name(&mut self, ext: &str) -> String {
        self.export_names
            .unique(&sanitize_filename(&self.settings.text), ext)
    }

    pub fn has_content(&self) -> bool {
        drawable_lines(&self.settings.text, &self.library)
            .iter()
            .any(|l| !l.is_empty())
    }

    pub fn status_line(&self) -> String {
        if self.has_content() {
            format!(
                "● Ready  Frame: {}  Letters: {}",
                self.controller.global_frame().0,
                self.library.len()
            )
        } else {
            "No content - Load letters and enter text".to_owned()
        }
    }

    /// Current rate and per-letter duration, e.g. `Auto-detected: 24 FPS | Duration: 48f (2.00s)`.
    pub fn duration_info(&mut self) -> String {
        self.sync_frame_counts();
        let lines = match layout_text(&self.settings.text, &self.library, &self.settings) {
            LayoutOutcome::Empty => Vec::new(),
            LayoutOutcome::Ready(layout) => layout.lines,
        };
        let frames = resolve_duration(&self.library, &lines, &self.settings);
        let fps = self.settings.fps;
        format!(
            "Auto-detected: {fps} FPS | Duration: {frames}f ({:.2}s)",
            fps.frames_to_secs(frames)
        )
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
