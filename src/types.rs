use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::{KeyNameError, LandmarkError};

pub const NUM_LANDMARKS: usize = 21;

#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (width as usize).saturating_mul(height as usize);
        let mut rgba = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            rgba.extend_from_slice(&color);
        }
        Self {
            rgba,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn label(&self) -> &'static str {
        match self {
            Hand::Left => "Left",
            Hand::Right => "Right",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index",
            Finger::Middle => "Middle",
            Finger::Ring => "Ring",
            Finger::Pinky => "Pinky",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Finger::Thumb => 0,
            Finger::Index => 1,
            Finger::Middle => 2,
            Finger::Ring => 3,
            Finger::Pinky => 4,
        }
    }

    /// Landmark indices of the three joints whose angle decides a bend.
    /// The thumb measures at its MCP joint, the other fingers at the PIP joint.
    pub fn bend_joints(&self) -> [usize; 3] {
        match self {
            Finger::Thumb => [1, 2, 4],
            Finger::Index => [5, 6, 7],
            Finger::Middle => [9, 10, 11],
            Finger::Ring => [13, 14, 15],
            Finger::Pinky => [17, 18, 19],
        }
    }

    pub fn tip(&self) -> usize {
        match self {
            Finger::Thumb => 4,
            Finger::Index => 8,
            Finger::Middle => 12,
            Finger::Ring => 16,
            Finger::Pinky => 20,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    pub const WHITE: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }

    pub fn color(&self) -> KeyColor {
        match self {
            NoteName::CSharp
            | NoteName::DSharp
            | NoteName::FSharp
            | NoteName::GSharp
            | NoteName::ASharp => KeyColor::Black,
            _ => KeyColor::White,
        }
    }

    /// The black key sitting between this white key and the next one, if any.
    pub fn sharp(&self) -> Option<NoteName> {
        match self {
            NoteName::C => Some(NoteName::CSharp),
            NoteName::D => Some(NoteName::DSharp),
            NoteName::F => Some(NoteName::FSharp),
            NoteName::G => Some(NoteName::GSharp),
            NoteName::A => Some(NoteName::ASharp),
            _ => None,
        }
    }

    fn semitone(&self) -> usize {
        *self as usize
    }

    fn from_label(label: &str) -> Option<NoteName> {
        let note = match label {
            "C" => NoteName::C,
            "C#" => NoteName::CSharp,
            "D" => NoteName::D,
            "D#" => NoteName::DSharp,
            "E" => NoteName::E,
            "F" => NoteName::F,
            "F#" => NoteName::FSharp,
            "G" => NoteName::G,
            "G#" => NoteName::GSharp,
            "A" => NoteName::A,
            "A#" => NoteName::ASharp,
            "B" => NoteName::B,
            _ => return None,
        };
        Some(note)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Octave {
    Lower,
    Upper,
}

impl Octave {
    pub const ALL: [Octave; 2] = [Octave::Lower, Octave::Upper];

    fn suffix(&self) -> &'static str {
        match self {
            Octave::Lower => "",
            Octave::Upper => "2",
        }
    }
}

/// Identity of one of the 24 keys of the two-octave keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId {
    pub note: NoteName,
    pub octave: Octave,
}

impl KeyId {
    pub const COUNT: usize = 24;

    pub const fn new(note: NoteName, octave: Octave) -> Self {
        Self { note, octave }
    }

    pub fn color(&self) -> KeyColor {
        self.note.color()
    }

    /// Dense index in `0..KeyId::COUNT`, ordered by pitch.
    pub fn index(&self) -> usize {
        let base = match self.octave {
            Octave::Lower => 0,
            Octave::Upper => 12,
        };
        base + self.note.semitone()
    }

    pub fn all() -> impl Iterator<Item = KeyId> {
        Octave::ALL.into_iter().flat_map(|octave| {
            [
                NoteName::C,
                NoteName::CSharp,
                NoteName::D,
                NoteName::DSharp,
                NoteName::E,
                NoteName::F,
                NoteName::FSharp,
                NoteName::G,
                NoteName::GSharp,
                NoteName::A,
                NoteName::ASharp,
                NoteName::B,
            ]
            .into_iter()
            .map(move |note| KeyId::new(note, octave))
        })
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note.label(), self.octave.suffix())
    }
}

impl FromStr for KeyId {
    type Err = KeyNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (note_part, octave) = match s.strip_suffix('2') {
            Some(rest) => (rest, Octave::Upper),
            None => (s, Octave::Lower),
        };
        NoteName::from_label(note_part)
            .map(|note| KeyId::new(note, octave))
            .ok_or_else(|| KeyNameError(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The 21 normalized landmarks of one tracked hand. Construction rejects
/// anything the classifier could not index safely.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: Vec<Point>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, LandmarkError> {
        if points.len() != NUM_LANDMARKS {
            return Err(LandmarkError::WrongCount {
                got: points.len(),
                expected: NUM_LANDMARKS,
            });
        }
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self { points })
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Landmarks scaled from normalized coordinates to frame pixels.
    pub fn to_pixels(&self, width: u32, height: u32) -> Vec<(f32, f32)> {
        self.points
            .iter()
            .map(|p| (p.x * width as f32, p.y * height as f32))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct HandObservation {
    pub hand: Hand,
    pub landmarks: HandLandmarks,
}

#[derive(Clone, Debug)]
pub struct LandmarkFrame {
    pub width: u32,
    pub height: u32,
    pub hands: Vec<HandObservation>,
}
