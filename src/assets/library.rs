use std::{collections::HashMap, sync::Arc};

use crate::foundation::{
    core::Fps,
    error::{AnitypeError, AnitypeResult},
};

/// Decoded still frame in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Raster {
    /// Build a raster, checking that `rgba8_premul` matches `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> AnitypeResult<Self> {
        if width == 0 || height == 0 {
            return Err(AnitypeError::validation("raster width/height must be > 0"));
        }
        let expected = width as usize * height as usize * 4;
        if rgba8_premul.len() != expected {
            return Err(AnitypeError::validation(format!(
                "raster data has {} bytes, expected {expected}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Single-color raster, mostly useful for placeholders and tests.
    pub fn solid(width: u32, height: u32, rgba8_premul: [u8; 4]) -> AnitypeResult<Self> {
        let px = width as usize * height as usize;
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&rgba8_premul);
        }
        Self::new(width, height, data)
    }
}

/// Seekable video source owned outside the engine.
///
/// The engine only seeks, starts and pauses the handle and reads back whatever frame the
/// handle currently presents. A handle that has nothing ready yet returns `None` from
/// [`VideoHandle::current_frame`] and the letter is skipped for that frame.
pub trait VideoHandle: Send {
    /// Current playhead position in seconds.
    fn current_time(&self) -> f64;
    /// Move the playhead to `secs`.
    fn seek(&mut self, secs: f64) -> AnitypeResult<()>;
    /// Begin playback from the current position.
    fn play(&mut self) -> AnitypeResult<()>;
    /// Pause playback, keeping the current position.
    fn pause(&mut self);
    /// Frame presented at the current position, if decoded.
    fn current_frame(&self) -> Option<&Raster>;
}

/// Variant tag of a letter asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AssetKind {
    /// Seekable video clip.
    Video,
    /// Ordered list of decoded still frames.
    ImageSequence,
}

/// Pixel source backing a letter asset.
pub enum AssetSource {
    /// Video handle plus its native duration.
    Video {
        /// Native clip duration in seconds.
        duration_secs: f64,
        /// External playback handle.
        handle: Box<dyn VideoHandle>,
    },
    /// Frames in playback order.
    ImageSequence {
        /// Decoded frames, never empty.
        frames: Vec<Raster>,
    },
}

/// Metadata and source of one library letter.
///
/// Geometry is fixed at construction; replace the letter through [`AssetLibrary::insert`] to
/// change it.
pub struct AssetDescriptor {
    width: u32,
    height: u32,
    baseline: u32,
    frame_count: u32,
    source: AssetSource,
}

impl std::fmt::Debug for AssetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetDescriptor")
            .field("kind", &self.kind())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("baseline", &self.baseline)
            .field("frame_count", &self.frame_count)
            .field("duration_secs", &self.duration_secs())
            .finish()
    }
}

impl AssetDescriptor {
    /// Describe a video letter whose frame count is derived from `duration_secs * fps`.
    pub fn video(
        width: u32,
        height: u32,
        duration_secs: f64,
        fps: Fps,
        handle: Box<dyn VideoHandle>,
    ) -> AnitypeResult<Self> {
        if width == 0 || height == 0 {
            return Err(AnitypeError::validation("video width/height must be > 0"));
        }
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(AnitypeError::validation(
                "video duration must be finite and > 0",
            ));
        }
        Ok(Self {
            width,
            height,
            baseline: baseline_for(height),
            frame_count: video_frame_count(duration_secs, fps),
            source: AssetSource::Video {
                duration_secs,
                handle,
            },
        })
    }

    /// Describe an image-sequence letter. Size is taken from the first frame.
    pub fn image_sequence(frames: Vec<Raster>) -> AnitypeResult<Self> {
        let first = frames
            .first()
            .ok_or_else(|| AnitypeError::validation("image sequence needs at least one frame"))?;
        let (width, height) = (first.width, first.height);
        let frame_count = u32::try_from(frames.len())
            .map_err(|_| AnitypeError::validation("image sequence has too many frames"))?;
        Ok(Self {
            width,
            height,
            baseline: baseline_for(height),
            frame_count,
            source: AssetSource::ImageSequence { frames },
        })
    }

    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `floor(height * 0.8)`, vertical reference for baseline alignment.
    pub fn baseline(&self) -> u32 {
        self.baseline
    }

    pub fn kind(&self) -> AssetKind {
        match self.source {
            AssetSource::Video { .. } => AssetKind::Video,
            AssetSource::ImageSequence { .. } => AssetKind::ImageSequence,
        }
    }

    /// Number of source frames, always at least 1.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Native duration, present only for videos.
    pub fn duration_secs(&self) -> Option<f64> {
        match &self.source {
            AssetSource::Video { duration_secs, .. } => Some(*duration_secs),
            AssetSource::ImageSequence { .. } => None,
        }
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    pub(crate) fn source_mut(&mut self) -> &mut AssetSource {
        &mut self.source
    }

    /// Re-derive a video's frame count for a new project rate. No-op for image sequences.
    pub(crate) fn recompute_frame_count(&mut self, fps: Fps) {
        if let AssetSource::Video { duration_secs, .. } = &self.source {
            self.frame_count = video_frame_count(*duration_secs, fps);
        }
    }
}

fn baseline_for(height: u32) -> u32 {
    ((f64::from(height)) * 0.8).floor() as u32
}

fn video_frame_count(duration_secs: f64, fps: Fps) -> u32 {
    let frames = fps.secs_to_frames_floor(duration_secs);
    u32::try_from(frames).unwrap_or(u32::MAX).max(1)
}

/// Case-fold a text character to the library key space.
///
/// Characters whose uppercase form is not a single character keep their original form.
pub fn fold_letter(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Letter assets keyed by uppercase character, iterated in insertion order.
///
/// Every insert, removal or frame-count change bumps [`AssetLibrary::version`], which render
/// caches use as part of their key. Mutable access is limited to video handles, which cannot
/// change geometry or frame counts.
#[derive(Default)]
pub struct AssetLibrary {
    order: Vec<char>,
    entries: HashMap<char, AssetDescriptor>,
    version: u64,
    /// Rate every video frame count was derived at; `None` after a video is inserted.
    counted_at: Option<Fps>,
}

impl std::fmt::Debug for AssetLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLibrary")
            .field("letters", &self.order)
            .field("version", &self.version)
            .field("counted_at", &self.counted_at)
            .finish()
    }
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the asset for `letter`. A replaced letter keeps its original position.
    pub fn insert(&mut self, letter: char, asset: AssetDescriptor) -> Option<AssetDescriptor> {
        let key = fold_letter(letter);
        if asset.kind() == AssetKind::Video {
            self.counted_at = None;
        }
        let prev = self.entries.insert(key, asset);
        if prev.is_none() {
            self.order.push(key);
        }
        self.version += 1;
        prev
    }

    pub fn remove(&mut self, letter: char) -> Option<AssetDescriptor> {
        let key = fold_letter(letter);
        let prev = self.entries.remove(&key)?;
        self.order.retain(|&c| c != key);
        self.version += 1;
        Some(prev)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
        self.version += 1;
    }

    pub fn get(&self, letter: char) -> Option<&AssetDescriptor> {
        self.entries.get(&letter)
    }

    /// Playback handle of a video letter.
    pub fn handle_mut(&mut self, letter: char) -> Option<&mut (dyn VideoHandle + 'static)> {
        match &mut self.entries.get_mut(&letter)?.source {
            AssetSource::Video { handle, .. } => Some(handle.as_mut()),
            AssetSource::ImageSequence { .. } => None,
        }
    }

    pub(crate) fn entry_mut(&mut self, letter: char) -> Option<&mut AssetDescriptor> {
        self.entries.get_mut(&letter)
    }

    pub fn contains(&self, letter: char) -> bool {
        self.entries.contains_key(&letter)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Monotonic mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Letters and assets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &AssetDescriptor)> {
        self.order
            .iter()
            .filter_map(|c| self.entries.get(c).map(|a| (*c, a)))
    }

    /// Every video handle, in no particular order.
    pub fn video_handles_mut(&mut self) -> impl Iterator<Item = &mut (dyn VideoHandle + 'static)> {
        self.entries
            .values_mut()
            .filter_map(|asset| match &mut asset.source {
                AssetSource::Video { handle, .. } => Some(handle.as_mut()),
                AssetSource::ImageSequence { .. } => None,
            })
    }

    /// Letters sorted for display.
    pub fn letters_sorted(&self) -> Vec<char> {
        let mut letters = self.order.clone();
        letters.sort_unstable();
        letters
    }

    /// Rate the video frame counts were last derived at, or `None` if a video was inserted
    /// since.
    pub fn counted_at(&self) -> Option<Fps> {
        self.counted_at
    }

    /// Re-derive every video's frame count from its duration at `fps`.
    pub fn recompute_video_frame_counts(&mut self, fps: Fps) {
        for asset in self.entries.values_mut() {
            asset.recompute_frame_count(fps);
        }
        self.counted_at = Some(fps);
        self.version += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/library.rs"]
mod tests;
