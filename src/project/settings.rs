use std::path::Path;

use anyhow::Context as _;

use crate::foundation::{
    core::Fps,
    error::{AnitypeError, AnitypeResult},
};

/// Placement of letters within a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Lines centered horizontally, letters centered vertically within the line.
    #[default]
    Center,
    /// Lines start at the left margin, letter bottoms share the line's bottom edge.
    Baseline,
    /// Lines start at the left margin, letters centered vertically within the line.
    Left,
}

/// How letter entrances are spread over time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingMode {
    /// Every letter starts at frame 0.
    #[default]
    Simultaneous,
    /// Each letter waits `stagger_frames` per position in the text.
    Stagger,
}

/// Source of the per-letter animation length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationMode {
    /// Longest clip among the letters in the text.
    #[default]
    Auto,
    /// `custom_duration_value` in `duration_unit`.
    Custom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    #[default]
    Seconds,
    Frames,
}

/// Whether characters without a letter asset still occupy a stagger slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingLetterPolicy {
    /// Missing characters are dropped before stagger positions are assigned.
    #[default]
    Skip,
    /// Missing characters keep their position, so later letters keep their timing.
    ReserveSlot,
}

/// Project configuration read by every resolver.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Multi-line text to animate.
    pub text: String,
    /// Gap in pixels between adjacent letters.
    pub spacing: i32,
    /// Extra per-letter tracking added on top of `spacing`.
    pub char_spacing: i32,
    /// Gap in pixels between lines.
    pub line_spacing: i32,
    pub alignment: Alignment,
    pub fps: Fps,
    pub timing_mode: TimingMode,
    pub stagger_frames: u32,
    pub duration_mode: DurationMode,
    pub custom_duration_value: f64,
    pub duration_unit: DurationUnit,
    /// Freeze on the final source frame once the letter's duration has elapsed.
    pub hold_last_frame: bool,
    pub missing_letters: MissingLetterPolicy,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            text: "AniType".to_string(),
            spacing: 12,
            char_spacing: 0,
            line_spacing: 24,
            alignment: Alignment::Center,
            fps: Fps::default(),
            timing_mode: TimingMode::Simultaneous,
            stagger_frames: 6,
            duration_mode: DurationMode::Auto,
            custom_duration_value: 1.0,
            duration_unit: DurationUnit::Seconds,
            hold_last_frame: true,
            missing_letters: MissingLetterPolicy::Skip,
        }
    }
}

impl ProjectSettings {
    /// Parse a project file from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> AnitypeResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| AnitypeError::serde(format!("project json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> AnitypeResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read project file '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> AnitypeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnitypeError::serde(format!("project json: {e}")))
    }

    pub fn validate(&self) -> AnitypeResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(AnitypeError::validation("fps must have num>0 and den>0"));
        }
        if self.duration_mode == DurationMode::Custom {
            let v = self.custom_duration_value;
            if !v.is_finite() || v < 0.0 {
                return Err(AnitypeError::validation(
                    "custom_duration_value must be finite and >= 0",
                ));
            }
            if self.duration_unit == DurationUnit::Frames && v.fract() != 0.0 {
                return Err(AnitypeError::validation(
                    "custom_duration_value must be a whole number of frames",
                ));
            }
        }
        Ok(())
    }

    /// Horizontal advance added between two adjacent letters, before kerning.
    pub fn letter_gap(&self) -> i64 {
        i64::from(self.spacing) + i64::from(self.char_spacing)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/settings.rs"]
mod tests;
