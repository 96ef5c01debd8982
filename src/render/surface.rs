use crate::{
    assets::library::{AssetLibrary, AssetSource, Raster},
    foundation::{core::Canvas, math::unpremultiply_rgba8_into},
    render::plan::FramePlan,
    timing::frame_index::video_seek_time,
};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Pixel bytes with straight (non-premultiplied) alpha.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = vec![0u8; self.data.len()];
        unpremultiply_rgba8_into(&mut out, &self.data);
        out
    }
}

/// Draw primitive: clear to a canvas, then place rasters unscaled at integer positions.
pub trait Surface {
    /// Start a new frame of `canvas` size with every pixel cleared.
    fn begin(&mut self, canvas: Canvas);
    /// Place `raster` with its top-left corner at `(x, y)`. Parts outside the canvas are clipped.
    fn blit(&mut self, x: i64, y: i64, raster: &Raster);
}

/// Per-frame draw counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub drawn: usize,
    /// Letters whose pixels were unavailable this frame.
    pub skipped: usize,
}

/// CPU surface holding one premultiplied RGBA8 frame.
#[derive(Debug)]
pub struct CpuSurface {
    frame: FrameRGBA,
    clear_rgba: [u8; 4],
}

impl Default for CpuSurface {
    fn default() -> Self {
        Self::new([0, 0, 0, 0])
    }
}

impl CpuSurface {
    /// New surface that clears to `clear_rgba` (premultiplied) at every `begin`.
    pub fn new(clear_rgba: [u8; 4]) -> Self {
        Self {
            frame: FrameRGBA {
                width: 0,
                height: 0,
                data: Vec::new(),
                premultiplied: true,
            },
            clear_rgba,
        }
    }

    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    pub fn into_frame(self) -> FrameRGBA {
        self.frame
    }
}

impl Surface for CpuSurface {
    fn begin(&mut self, canvas: Canvas) {
        self.frame.width = canvas.width;
        self.frame.height = canvas.height;
        self.frame.data.clear();
        self.frame.data.reserve(canvas.byte_len());
        for _ in 0..(canvas.width as usize * canvas.height as usize) {
            self.frame.data.extend_from_slice(&self.clear_rgba);
        }
    }

    fn blit(&mut self, x: i64, y: i64, raster: &Raster) {
        let (fw, fh) = (i64::from(self.frame.width), i64::from(self.frame.height));
        let (rw, rh) = (i64::from(raster.width), i64::from(raster.height));
        let x0 = x.max(0);
        let x1 = (x + rw).min(fw);
        if x0 >= x1 {
            return;
        }
        let row_bytes = ((x1 - x0) * 4) as usize;
        let src_skip = ((x0 - x) * 4) as usize;
        for sy in 0..rh {
            let dy = y + sy;
            if dy < 0 {
                continue;
            }
            if dy >= fh {
                break;
            }
            let src = (sy * rw * 4) as usize + src_skip;
            let dst = ((dy * fw + x0) * 4) as usize;
            self.frame.data[dst..dst + row_bytes]
                .copy_from_slice(&raster.rgba8_premul[src..src + row_bytes]);
        }
    }
}

/// Execute `plan` against `surface`, seeking video handles as needed.
///
/// A letter whose pixels cannot be produced (missing asset, failed seek, undecoded video
/// frame, out-of-range sequence index) is skipped for this frame only.
pub fn draw_plan(
    plan: &FramePlan,
    library: &mut AssetLibrary,
    surface: &mut dyn Surface,
) -> DrawStats {
    let mut stats = DrawStats::default();
    surface.begin(plan.canvas);

    for draw in &plan.draws {
        let x = draw.origin.x.round() as i64;
        let y = draw.origin.y.round() as i64;
        let Some(asset) = library.entry_mut(draw.letter) else {
            stats.skipped += 1;
            continue;
        };
        let raster = match asset.source_mut() {
            AssetSource::ImageSequence { frames } => frames.get(draw.source_frame as usize),
            AssetSource::Video {
                duration_secs,
                handle,
            } => {
                let t = video_seek_time(draw.source_frame, plan.fps, *duration_secs);
                if handle.current_time() != t
                    && let Err(err) = handle.seek(t)
                {
                    tracing::debug!(letter = %draw.letter, error = %err, "video seek failed");
                    stats.skipped += 1;
                    continue;
                }
                handle.current_frame()
            }
        };
        match raster {
            Some(raster) => {
                surface.blit(x, y, raster);
                stats.drawn += 1;
            }
            None => {
                tracing::debug!(
                    letter = %draw.letter,
                    source_frame = draw.source_frame,
                    "letter frame unavailable"
                );
                stats.skipped += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
