use std::path::PathBuf;

use crate::{bend::BendThresholds, keyboard::LayoutConfig};

pub const DEFAULT_VOLUME: f32 = 0.1;
const DEFAULT_SOUND_DIR: &str = "piano_sounds";

#[derive(Clone, Debug, PartialEq)]
pub struct PianoConfig {
    pub layout: LayoutConfig,
    pub thresholds: BendThresholds,
    /// Directory holding one `<key>.wav` per key, e.g. `C#2.wav`.
    pub sound_dir: PathBuf,
    pub volume: f32,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            thresholds: BendThresholds::default(),
            sound_dir: PathBuf::from(DEFAULT_SOUND_DIR),
            volume: DEFAULT_VOLUME,
        }
    }
}
