use crate::{
    error::LayoutError,
    types::{KeyColor, KeyId, NoteName, Octave},
};

pub const WHITE_KEY_COUNT: usize = 14;

const DEFAULT_WHITE_KEY_HEIGHT: f32 = 180.0;
const DEFAULT_TOP_MARGIN: f32 = 5.0;
const DEFAULT_BLACK_WIDTH_RATIO: f32 = 0.6;
const DEFAULT_BLACK_HEIGHT_RATIO: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub white_key_height: f32,
    pub top_margin: f32,
    pub black_width_ratio: f32,
    pub black_height_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            white_key_height: DEFAULT_WHITE_KEY_HEIGHT,
            top_margin: DEFAULT_TOP_MARGIN,
            black_width_ratio: DEFAULT_BLACK_WIDTH_RATIO,
            black_height_ratio: DEFAULT_BLACK_HEIGHT_RATIO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open containment, so neighbouring keys never share a point.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// Which top corners of a white key are covered by a black key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlackNeighbors {
    Right,
    Left,
    Both,
}

impl BlackNeighbors {
    pub fn for_note(note: NoteName) -> Option<Self> {
        match note {
            NoteName::C | NoteName::F => Some(BlackNeighbors::Right),
            NoteName::E | NoteName::B => Some(BlackNeighbors::Left),
            NoteName::D | NoteName::G | NoteName::A => Some(BlackNeighbors::Both),
            _ => None,
        }
    }

    pub fn left(&self) -> bool {
        matches!(self, BlackNeighbors::Left | BlackNeighbors::Both)
    }

    pub fn right(&self) -> bool {
        matches!(self, BlackNeighbors::Right | BlackNeighbors::Both)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key {
    pub id: KeyId,
    pub color: KeyColor,
    pub rect: Rect,
    pub black_left: bool,
    pub black_right: bool,
}

/// Two octaves of keys laid out across the top of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardLayout {
    frame_width: u32,
    frame_height: u32,
    white: Vec<Key>,
    black: Vec<Option<Key>>,
}

impl KeyboardLayout {
    pub fn new(
        frame_width: u32,
        frame_height: u32,
        config: &LayoutConfig,
    ) -> Result<Self, LayoutError> {
        if frame_width == 0 {
            return Err(LayoutError::ZeroWidth);
        }

        let white_width = frame_width as f32 / WHITE_KEY_COUNT as f32;
        let white_height = config.white_key_height;
        let black_width = white_width * config.black_width_ratio;
        let black_height = white_height * config.black_height_ratio;
        let start_x = (frame_width as f32 - WHITE_KEY_COUNT as f32 * white_width) / 2.0;
        let top = config.top_margin;

        let mut white = Vec::with_capacity(WHITE_KEY_COUNT);
        let mut black = Vec::with_capacity(WHITE_KEY_COUNT);

        let notes = Octave::ALL
            .into_iter()
            .flat_map(|octave| NoteName::WHITE.into_iter().map(move |n| (n, octave)));
        for (i, (note, octave)) in notes.enumerate() {
            let x = start_x + i as f32 * white_width;
            let neighbors = BlackNeighbors::for_note(note);
            white.push(Key {
                id: KeyId::new(note, octave),
                color: KeyColor::White,
                rect: Rect {
                    x,
                    y: top,
                    width: white_width,
                    height: white_height,
                },
                black_left: neighbors.is_some_and(|n| n.left()),
                black_right: neighbors.is_some_and(|n| n.right()),
            });

            black.push(note.sharp().map(|sharp| Key {
                id: KeyId::new(sharp, octave),
                color: KeyColor::Black,
                rect: Rect {
                    x: x + white_width - black_width / 2.0,
                    y: top,
                    width: black_width,
                    height: black_height,
                },
                black_left: false,
                black_right: false,
            }));
        }

        Ok(Self {
            frame_width,
            frame_height,
            white,
            black,
        })
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn white_keys(&self) -> &[Key] {
        &self.white
    }

    /// One slot per white key; `None` where no black key follows it.
    pub fn black_slots(&self) -> &[Option<Key>] {
        &self.black
    }

    pub fn black_keys(&self) -> impl Iterator<Item = &Key> {
        self.black.iter().flatten()
    }

    /// Black keys first, then white keys: the order hits are resolved in.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.black_keys().chain(self.white.iter())
    }

    pub fn key(&self, id: KeyId) -> Option<&Key> {
        self.keys().find(|k| k.id == id)
    }

    pub fn black_key_size(&self) -> (f32, f32) {
        self.black_keys()
            .next()
            .map(|k| (k.rect.width, k.rect.height))
            .unwrap_or((0.0, 0.0))
    }
}
