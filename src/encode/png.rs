use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    encode::{
        ffmpeg::ExportFormat,
        sink::{FrameSink, SinkConfig, check_next_index},
    },
    foundation::{
        core::{Fps, FrameIndex},
        error::{AnitypeError, AnitypeResult},
        math::unpremultiply_rgba8_into,
    },
    render::surface::FrameRGBA,
};

/// `frame_00000.png` style name for frame `idx`.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame_{:05}.png", idx.0)
}

/// Writes each frame as a straight-alpha PNG into one directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    scratch: Vec<u8>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            scratch: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> AnitypeResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(AnitypeError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create frame directory '{}'", self.dir.display()))?;
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.written.clear();
        self.last_idx = None;
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AnitypeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| AnitypeError::encode("png sink not started"))?;
        check_next_index(self.last_idx, idx)?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(AnitypeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(AnitypeError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            unpremultiply_rgba8_into(&mut self.scratch, &frame.data);
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }
        let path = self.dir.join(frame_file_name(idx));
        image::save_buffer(
            &path,
            &self.scratch,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("failed to write '{}'", path.display()))?;

        self.written.push(path);
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> AnitypeResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| AnitypeError::encode("png sink not started"))?;
        if self.written.len() as u64 != cfg.total_frames {
            return Err(AnitypeError::encode(format!(
                "png sink received {} of {} frames",
                self.written.len(),
                cfg.total_frames
            )));
        }
        Ok(())
    }
}

/// Command line that turns a PNG sequence in the current directory into `format`.
pub fn conversion_command(fps: Fps, format: ExportFormat, output: &str) -> String {
    let mut parts = vec![
        "ffmpeg".to_owned(),
        "-framerate".to_owned(),
        format!("{fps}"),
        "-i".to_owned(),
        "frame_%05d.png".to_owned(),
    ];
    parts.extend(format.codec_args().iter().map(|s| (*s).to_owned()));
    parts.push(output.to_owned());
    parts.join(" ")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
