//! Frame-rate inference from loaded letter assets.
//!
//! Detection and frame-count recomputation are two separate passes: [`detect_frame_rate`] only
//! reads the frame counts stored at the previous rate, and [`apply_frame_rate_detection`]
//! rewrites video frame counts afterwards.

use crate::{
    assets::library::{AssetKind, AssetLibrary},
    foundation::core::Fps,
    project::settings::ProjectSettings,
};

/// Highest rate accepted from a video's frame count and duration.
pub const MAX_DETECTED_FPS: u32 = 120;

/// Where a detected rate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum FpsSource {
    /// `round(frame_count / duration)` of a video letter.
    Video,
    /// Common animation rate guessed from an image sequence's length.
    SequenceHeuristic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DetectedFps {
    pub fps: u32,
    pub source: FpsSource,
    /// Letter that supplied the signal.
    pub letter: char,
}

/// Infer a project rate from `library`.
///
/// Precedence, scanning letters in insertion order: the first video whose derived rate lies in
/// `1..=120`; otherwise 24 for the first image sequence of at least 24 frames; otherwise 12 for
/// the first image sequence of at least 12 frames.
pub fn detect_frame_rate(library: &AssetLibrary) -> Option<DetectedFps> {
    let video = library.iter().find_map(|(letter, asset)| {
        let duration = asset.duration_secs().filter(|d| *d > 0.0)?;
        let fps = (f64::from(asset.frame_count()) / duration).round();
        (fps > 0.0 && fps <= f64::from(MAX_DETECTED_FPS)).then_some(DetectedFps {
            fps: fps as u32,
            source: FpsSource::Video,
            letter,
        })
    });
    if video.is_some() {
        return video;
    }

    for (threshold, fps) in [(24u32, 24u32), (12, 12)] {
        let hit = library.iter().find(|(_, asset)| {
            asset.kind() == AssetKind::ImageSequence && asset.frame_count() >= threshold
        });
        if let Some((letter, _)) = hit {
            return Some(DetectedFps {
                fps,
                source: FpsSource::SequenceHeuristic,
                letter,
            });
        }
    }
    None
}

/// Outcome of running detection against the project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum FpsReport {
    /// The project rate changed and video frame counts were recomputed.
    Changed { from: Fps, to: Fps, source: FpsSource },
    /// A rate was detected and already matched the project.
    Unchanged { fps: Fps, source: FpsSource },
    /// Nothing conclusive; the current rate is kept.
    Default { fps: Fps },
}

impl FpsReport {
    pub fn fps(&self) -> Fps {
        match *self {
            Self::Changed { to, .. } => to,
            Self::Unchanged { fps, .. } | Self::Default { fps } => fps,
        }
    }
}

impl std::fmt::Display for FpsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Changed { to, .. } => write!(f, "Auto-detected: {to} FPS from clips"),
            Self::Unchanged { fps, .. } => write!(f, "Auto-detected: {fps} FPS from clips"),
            Self::Default { fps } => write!(f, "Default: {fps} FPS"),
        }
    }
}

/// Detect a rate and, when it differs from the project's, adopt it and recompute every video
/// frame count at the new rate.
pub fn apply_frame_rate_detection(
    settings: &mut ProjectSettings,
    library: &mut AssetLibrary,
) -> FpsReport {
    let Some(detected) = detect_frame_rate(library) else {
        tracing::debug!(fps = %settings.fps, "no conclusive frame rate, keeping current");
        return FpsReport::Default { fps: settings.fps };
    };
    let Ok(fps) = Fps::whole(detected.fps) else {
        return FpsReport::Default { fps: settings.fps };
    };
    if fps == settings.fps {
        return FpsReport::Unchanged {
            fps,
            source: detected.source,
        };
    }

    let from = settings.fps;
    settings.fps = fps;
    library.recompute_video_frame_counts(fps);
    tracing::info!(
        from = %from,
        to = %fps,
        letter = %detected.letter,
        source = ?detected.source,
        "project frame rate auto-detected"
    );
    FpsReport::Changed {
        from,
        to: fps,
        source: detected.source,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/fps.rs"]
mod tests;
