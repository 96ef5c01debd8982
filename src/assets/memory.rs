use crate::{
    assets::library::{Raster, VideoHandle},
    foundation::{
        core::Fps,
        error::{AnitypeError, AnitypeResult},
    },
};

/// Video handle over frames that were decoded up front.
///
/// Seeking selects the frame covering the requested time at the clip's native rate.
#[derive(Clone, Debug)]
pub struct MemoryVideo {
    frames: Vec<Raster>,
    native_fps: Fps,
    position_secs: f64,
    playing: bool,
    seeks: u64,
}

impl MemoryVideo {
    pub fn new(frames: Vec<Raster>, native_fps: Fps) -> AnitypeResult<Self> {
        if frames.is_empty() {
            return Err(AnitypeError::validation("video needs at least one frame"));
        }
        Ok(Self {
            frames,
            native_fps,
            position_secs: 0.0,
            playing: false,
            seeks: 0,
        })
    }

    /// Native clip duration implied by frame count and rate.
    pub fn duration_secs(&self) -> f64 {
        self.native_fps.frames_to_secs(self.frames.len() as u64)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Number of seeks applied since creation.
    pub fn seek_count(&self) -> u64 {
        self.seeks
    }

    fn frame_at(&self, secs: f64) -> usize {
        // Seek targets are computed as frame / fps; absorb rounding just below a boundary.
        let idx = self.native_fps.secs_to_frames_floor(secs + 1e-9) as usize;
        idx.min(self.frames.len() - 1)
    }
}

impl VideoHandle for MemoryVideo {
    fn current_time(&self) -> f64 {
        self.position_secs
    }

    fn seek(&mut self, secs: f64) -> AnitypeResult<()> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(AnitypeError::evaluation(format!(
                "cannot seek video to {secs}"
            )));
        }
        self.position_secs = secs;
        self.seeks += 1;
        Ok(())
    }

    fn play(&mut self) -> AnitypeResult<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_frame(&self) -> Option<&Raster> {
        self.frames.get(self.frame_at(self.position_secs))
    }
}
