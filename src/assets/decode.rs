use anyhow::Context;

use crate::{
    AnitypeResult,
    assets::library::{Raster, fold_letter},
    foundation::math::premultiply_rgba8_in_place,
};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> AnitypeResult<Raster> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Raster::new(width, height, rgba8_premul)
}

const SEQUENCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "mkv", "avi"];

/// What a letter file contributes to the library, judged by its name alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LetterFile {
    /// One numbered frame of an image sequence (`A_003.png`).
    SequenceFrame {
        /// Library key.
        letter: char,
        /// Position within the sequence.
        index: u64,
    },
    /// A whole video clip for its first character.
    Video {
        /// Library key.
        letter: char,
    },
    /// A single still image for its first character.
    Still {
        /// Library key.
        letter: char,
    },
}

impl LetterFile {
    pub fn letter(&self) -> char {
        match self {
            Self::SequenceFrame { letter, .. } | Self::Video { letter } | Self::Still { letter } => {
                *letter
            }
        }
    }
}

/// Classify a letter file by name.
///
/// Returns `None` for hidden files and for sequence frames whose prefix is longer than one
/// character, since those can never be a library key.
pub fn classify_file_name(name: &str) -> Option<LetterFile> {
    if name.starts_with('.') {
        return None;
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
    let ext = ext.to_ascii_lowercase();

    if SEQUENCE_EXTENSIONS.contains(&ext.as_str())
        && let Some((prefix, digits)) = stem.rsplit_once('_')
        && !prefix.is_empty()
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
    {
        let mut chars = prefix.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            tracing::debug!(name, "sequence prefix is not a single letter, skipping");
            return None;
        };
        let index = digits.parse::<u64>().ok()?;
        return Some(LetterFile::SequenceFrame {
            letter: fold_letter(c),
            index,
        });
    }

    let letter = fold_letter(name.chars().next()?);
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(LetterFile::Video { letter })
    } else {
        Some(LetterFile::Still { letter })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
