use crate::{
    assets::library::AssetLibrary,
    foundation::core::FrameIndex,
    playback::source::FrameSource,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Real-time driver of the global frame counter.
///
/// The host calls [`PlaybackController::tick`] at its animation cadence; the controller only
/// counts ticks and never schedules anything itself. `stop` keeps the counter, but `start`
/// always restarts from frame 0.
#[derive(Clone, Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
    frame: FrameIndex,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn global_frame(&self) -> FrameIndex {
        self.frame
    }

    /// Rewind to frame 0 and start every video handle from its beginning.
    ///
    /// Handles that refuse to seek or play are left as they are.
    pub fn start(&mut self, library: &mut AssetLibrary) {
        for handle in library.video_handles_mut() {
            if let Err(err) = handle.seek(0.0) {
                tracing::debug!(error = %err, "video rewind failed");
            }
            if let Err(err) = handle.play() {
                tracing::debug!(error = %err, "video play failed");
            }
        }
        self.state = PlaybackState::Playing;
        self.frame = FrameIndex(0);
        tracing::info!("playback started");
    }

    /// Pause every video handle. The global frame is kept.
    pub fn stop(&mut self, library: &mut AssetLibrary) {
        for handle in library.video_handles_mut() {
            handle.pause();
        }
        self.state = PlaybackState::Stopped;
        tracing::info!(frame = self.frame.0, "playback stopped");
    }

    /// Start when stopped, stop when playing. Returns the new state.
    pub fn toggle(&mut self, library: &mut AssetLibrary) -> PlaybackState {
        match self.state {
            PlaybackState::Stopped => self.start(library),
            PlaybackState::Playing => self.stop(library),
        }
        self.state
    }

    /// Stop and force the global frame back to 0.
    pub fn reset(&mut self, library: &mut AssetLibrary) {
        self.stop(library);
        self.frame = FrameIndex(0);
    }

    /// Advance by exactly one frame while playing. Returns the frame to render.
    pub fn tick(&mut self) -> Option<FrameIndex> {
        if !self.is_playing() {
            return None;
        }
        self.frame = FrameIndex(self.frame.0.saturating_add(1));
        Some(self.frame)
    }
}

impl FrameSource for PlaybackController {
    fn next_frame(&mut self) -> Option<FrameIndex> {
        self.tick()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
