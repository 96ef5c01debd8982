use crate::{
    assets::library::AssetLibrary,
    foundation::error::{AnitypeError, AnitypeResult},
    layout::text::{LaidOutLine, PlacedLetter, TextLayout},
    project::settings::{DurationMode, DurationUnit, MissingLetterPolicy, ProjectSettings, TimingMode},
};

/// Distance between the first stagger slot of consecutive lines.
///
/// A line may therefore use at most `STAGGER_LINE_STRIDE - 1` slots; longer lines are rejected
/// by [`resolve_timeline`] rather than bleeding into the next line's slots.
pub const STAGGER_LINE_STRIDE: usize = 100;

/// Per-letter duration used in auto mode when no letter contributes a clip length.
pub const FALLBACK_DURATION_FRAMES: u64 = 24;

/// Resolved animation lengths for one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Timeline {
    /// Per-letter animation length.
    pub duration_frames: u64,
    /// Frames an export must cover so the last letter completes its duration.
    pub total_frames: u64,
    /// Global stagger index of the last letter in reading order.
    pub last_global_index: u64,
}

/// Per-letter animation length in frames.
///
/// Custom seconds are rounded at the project rate, custom frames are taken as-is. Auto mode
/// uses the longest clip among the letters in `lines`, or 24 frames when there are none.
pub fn resolve_duration(
    library: &AssetLibrary,
    lines: &[LaidOutLine],
    settings: &ProjectSettings,
) -> u64 {
    match settings.duration_mode {
        DurationMode::Custom => match settings.duration_unit {
            DurationUnit::Seconds => settings
                .fps
                .secs_to_frames_round(settings.custom_duration_value),
            DurationUnit::Frames => settings.custom_duration_value.max(0.0) as u64,
        },
        DurationMode::Auto => lines
            .iter()
            .flat_map(|l| l.letters.iter())
            .filter_map(|l| library.get(l.letter))
            .map(|a| u64::from(a.frame_count()))
            .max()
            .filter(|&m| m > 0)
            .unwrap_or(FALLBACK_DURATION_FRAMES),
    }
}

/// Stagger slot of a letter within its line.
pub fn stagger_slot(letter: &PlacedLetter, policy: MissingLetterPolicy) -> usize {
    match policy {
        MissingLetterPolicy::Skip => letter.position,
        MissingLetterPolicy::ReserveSlot => letter.column,
    }
}

/// `line * 100 + slot`.
pub fn global_index(letter: &PlacedLetter, settings: &ProjectSettings) -> u64 {
    (letter.line as u64) * (STAGGER_LINE_STRIDE as u64)
        + stagger_slot(letter, settings.missing_letters) as u64
}

/// Frames a letter waits before its entrance; zero unless timing is staggered.
pub fn stagger_offset(letter: &PlacedLetter, settings: &ProjectSettings) -> u64 {
    match settings.timing_mode {
        TimingMode::Simultaneous => 0,
        TimingMode::Stagger => global_index(letter, settings) * u64::from(settings.stagger_frames),
    }
}

/// Resolve per-letter duration and total timeline length for `layout`.
///
/// Under stagger timing, a line that needs [`STAGGER_LINE_STRIDE`] or more slots is reported
/// as [`AnitypeError::StaggerOverflow`].
pub fn resolve_timeline(
    library: &AssetLibrary,
    layout: &TextLayout,
    settings: &ProjectSettings,
) -> AnitypeResult<Timeline> {
    if settings.timing_mode == TimingMode::Stagger {
        check_stagger_capacity(layout, settings.missing_letters)?;
    }

    let duration_frames = resolve_duration(library, &layout.lines, settings);
    let last_global_index = layout
        .letters()
        .map(|l| global_index(l, settings))
        .max()
        .unwrap_or(0);
    let total_frames = match settings.timing_mode {
        TimingMode::Simultaneous => duration_frames,
        TimingMode::Stagger => last_global_index
            .checked_mul(u64::from(settings.stagger_frames))
            .and_then(|s| s.checked_add(duration_frames))
            .ok_or_else(|| AnitypeError::validation("stagger timeline length overflows"))?,
    };

    Ok(Timeline {
        duration_frames,
        total_frames,
        last_global_index,
    })
}

fn check_stagger_capacity(layout: &TextLayout, policy: MissingLetterPolicy) -> AnitypeResult<()> {
    for (line_idx, line) in layout.lines.iter().enumerate() {
        let used = line
            .letters
            .iter()
            .map(|l| stagger_slot(l, policy) + 1)
            .max()
            .unwrap_or(0);
        if used >= STAGGER_LINE_STRIDE {
            return Err(AnitypeError::StaggerOverflow {
                line: line_idx,
                letters: used,
                limit: STAGGER_LINE_STRIDE,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timing/timeline.rs"]
mod tests;
