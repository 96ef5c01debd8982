//! AniType composites short per-letter clips into a synchronized text animation.
//!
//! Each letter of the text is backed by a video or an image sequence from an
//! [`AssetLibrary`]. For every global frame the engine decides which source frame of each
//! letter to show and where to put it.
//!
//! # Pipeline overview
//!
//! 1. **Detect**: infer a project frame rate from the library ([`apply_frame_rate_detection`])
//! 2. **Layout**: `text + library + settings -> TextLayout` (lines, kerning, alignment, canvas)
//! 3. **Time**: `TextLayout -> Timeline` (per-letter duration, stagger offsets, total length)
//! 4. **Plan**: `FrameIndex -> FramePlan` (source frame per letter, pure)
//! 5. **Draw**: `FramePlan -> FrameRGBA` (seeks video handles, blits rasters)
//! 6. **Export** (optional): sweep every frame into a PNG sequence or through `ffmpeg`
//!
//! Playback ([`PlaybackController`]) and export ([`FrameSequencer`]) are two
//! [`FrameSource`]s driving the same render loop; [`Studio`] owns both and never runs them at
//! the same time.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure planning**: layout, timeline and frame planning are functions of
//!   `(settings, library, frame)` only.
//! - **Premultiplied RGBA8** end-to-end; sinks convert to straight alpha on write.
#![forbid(unsafe_code)]

mod assets;
mod encode;
mod foundation;
mod layout;
mod playback;
mod project;
mod render;
mod session;
mod timing;

pub use assets::decode::{LetterFile, classify_file_name, decode_image};
pub use assets::library::{
    AssetDescriptor, AssetKind, AssetLibrary, AssetSource, Raster, VideoHandle, fold_letter,
};
pub use assets::loader::{
    FontPack, LoadReport, PackIndex, PackVariant, discover_font_packs, load_files,
};
pub use assets::media::{
    VideoSourceInfo, decode_video, open_video_asset, parse_rate, probe_video,
};
pub use assets::memory::MemoryVideo;
pub use encode::ffmpeg::{
    ExportFormat, FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, ffmpeg_version,
};
pub use encode::naming::{ExportNames, sanitize_filename};
pub use encode::png::{PngSequenceSink, conversion_command, frame_file_name};
pub use encode::sequencer::{ExportSummary, FrameSequencer};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Canvas, Fps, FrameIndex, Point};
pub use foundation::error::{AnitypeError, AnitypeResult};
pub use layout::text::{
    KERNING_PAIRS, LaidOutLine, LayoutOutcome, PlacedLetter, TextLayout, kerning_adjust,
    layout_text,
};
pub use playback::controller::{PlaybackController, PlaybackState};
pub use playback::source::{FrameSource, Limit, SweepSource, drive};
pub use project::settings::{
    Alignment, DurationMode, DurationUnit, MissingLetterPolicy, ProjectSettings, TimingMode,
};
pub use render::cache::{CacheKey, RenderCache, settings_fingerprint};
pub use render::pipeline::{FrameRenderer, Renderer};
pub use render::plan::{FramePlan, LetterDraw, RenderOutcome, plan_frame};
pub use render::surface::{CpuSurface, DrawStats, FrameRGBA, Surface, draw_plan};
pub use session::{LibraryLoad, Studio};
pub use timing::fps::{
    DetectedFps, FpsReport, FpsSource, apply_frame_rate_detection, detect_frame_rate,
};
pub use timing::frame_index::{resolve_source_frame, video_seek_time};
pub use timing::timeline::{
    STAGGER_LINE_STRIDE, Timeline, global_index, resolve_duration, resolve_timeline,
    stagger_offset,
};
