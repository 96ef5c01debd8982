//! Export sinks and the eager frame sweep that feeds them.

pub mod ffmpeg;
pub mod naming;
pub mod png;
pub mod sequencer;
pub mod sink;
