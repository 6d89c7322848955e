pub mod overlay;
pub mod replay;
pub mod stream;

use crate::types::LandmarkFrame;

pub use replay::ReplaySource;
pub use stream::{LandmarkStream, start_landmark_stream};

/// Anything that yields hand landmarks frame by frame, such as a recording
/// or a live hand-tracking model. `Ok(None)` ends the stream.
pub trait LandmarkSource: Send + 'static {
    fn next_frame(&mut self) -> anyhow::Result<Option<LandmarkFrame>>;
}
