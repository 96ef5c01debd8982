use std::sync::Arc;

use crate::{
    assets::library::AssetLibrary,
    foundation::{core::FrameIndex, error::AnitypeResult, math::Fnv1a64},
    layout::text::{LayoutOutcome, TextLayout, layout_text},
    project::settings::ProjectSettings,
    render::plan::{RenderOutcome, plan_with},
    timing::timeline::{Timeline, resolve_timeline},
};

/// Identity of a cached layout: the text, every other setting that shapes geometry or timing,
/// and the library version it was computed against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKey {
    pub text: String,
    pub settings_fingerprint: u64,
    pub library_version: u64,
}

impl CacheKey {
    pub fn new(settings: &ProjectSettings, library: &AssetLibrary) -> Self {
        Self {
            text: settings.text.clone(),
            settings_fingerprint: settings_fingerprint(settings),
            library_version: library.version(),
        }
    }
}

/// Stable hash of every setting except `text`.
pub fn settings_fingerprint(s: &ProjectSettings) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_i64(i64::from(s.spacing));
    h.write_i64(i64::from(s.char_spacing));
    h.write_i64(i64::from(s.line_spacing));
    h.write_u8(s.alignment as u8);
    h.write_u64(u64::from(s.fps.num));
    h.write_u64(u64::from(s.fps.den));
    h.write_u8(s.timing_mode as u8);
    h.write_u64(u64::from(s.stagger_frames));
    h.write_u8(s.duration_mode as u8);
    h.write_f64(s.custom_duration_value);
    h.write_u8(s.duration_unit as u8);
    h.write_u8(u8::from(s.hold_last_frame));
    h.write_u8(s.missing_letters as u8);
    h.finish()
}

#[derive(Debug)]
enum Resolved {
    Empty,
    Ready {
        layout: TextLayout,
        timeline: Timeline,
    },
}

/// Single-entry memo of the layout and timeline for the current project state.
///
/// Per-frame source indices are never cached; only the frame-independent part is reused.
#[derive(Debug, Default)]
pub struct RenderCache {
    entry: Option<(CacheKey, Arc<Resolved>)>,
    hits: u64,
    misses: u64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Same result as [`crate::render::plan::plan_frame`], reusing layout and timeline while the
    /// key is unchanged. Errors are never cached.
    pub fn plan(
        &mut self,
        settings: &ProjectSettings,
        library: &AssetLibrary,
        frame: FrameIndex,
    ) -> AnitypeResult<RenderOutcome> {
        let resolved = self.resolve(settings, library)?;
        Ok(match resolved.as_ref() {
            Resolved::Empty => RenderOutcome::Empty,
            Resolved::Ready { layout, timeline } => {
                RenderOutcome::Frame(plan_with(layout, *timeline, settings, library, frame))
            }
        })
    }

    /// Cached timeline, or `None` when the text has nothing to draw.
    pub fn timeline(
        &mut self,
        settings: &ProjectSettings,
        library: &AssetLibrary,
    ) -> AnitypeResult<Option<Timeline>> {
        Ok(match self.resolve(settings, library)?.as_ref() {
            Resolved::Empty => None,
            Resolved::Ready { timeline, .. } => Some(*timeline),
        })
    }

    fn resolve(
        &mut self,
        settings: &ProjectSettings,
        library: &AssetLibrary,
    ) -> AnitypeResult<Arc<Resolved>> {
        let key = CacheKey::new(settings, library);
        if let Some((cached, resolved)) = &self.entry
            && *cached == key
        {
            self.hits += 1;
            return Ok(Arc::clone(resolved));
        }

        self.misses += 1;
        let resolved = Arc::new(match layout_text(&settings.text, library, settings) {
            LayoutOutcome::Empty => Resolved::Empty,
            LayoutOutcome::Ready(layout) => {
                let timeline = resolve_timeline(library, &layout, settings)?;
                Resolved::Ready { layout, timeline }
            }
        });
        tracing::debug!(
            library_version = key.library_version,
            "layout cache refreshed"
        );
        self.entry = Some((key, Arc::clone(&resolved)));
        Ok(resolved)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
