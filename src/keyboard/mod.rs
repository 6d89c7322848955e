pub mod layout;

pub use hit_test::resolve_key;
pub use layout::{BlackNeighbors, Key, KeyboardLayout, LayoutConfig, Rect, WHITE_KEY_COUNT};
