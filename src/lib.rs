pub mod audio;
pub mod bend;
pub mod config;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod pipeline;
pub mod press;
pub mod types;

pub use config::PianoConfig;
pub use engine::{FrameOutcome, PianoEngine};
pub use error::EngineError;
pub use press::KeyEvent;
